use crate::domain::model::{CountryCodeFormat, GraphFormat, InvalidCountryPolicy};
use crate::utils::error::{EcUtilsError, Result};
use crate::utils::validation::{self, Validate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

lazy_static! {
    // ${VAR_NAME}
    static ref ENV_VAR: std::result::Result<Regex, regex::Error> = Regex::new(r"\$\{([^}]+)\}");
}

pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub countries: CountriesConfig,
    #[serde(default)]
    pub modulegraph: ModulegraphConfig,
    #[serde(default)]
    pub regroup: RegroupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountriesConfig {
    pub output: Option<CountryCodeFormat>,
    pub errors: Option<InvalidCountryPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModulegraphConfig {
    pub prefixes: Option<Vec<String>>,
    pub format: Option<GraphFormat>,
    pub graphviz_binary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegroupConfig {
    pub value_column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EcUtilsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EcUtilsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SNAKEMAKE_MODULE})，未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = ENV_VAR
            .as_ref()
            .map_err(|e| EcUtilsError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(prefixes) = &self.modulegraph.prefixes {
            for prefix in prefixes {
                validation::validate_non_empty_string("modulegraph.prefixes", prefix)?;
            }
        }

        if let Some(binary) = &self.modulegraph.graphviz_binary {
            validation::validate_path("modulegraph.graphviz_binary", binary)?;
        }

        if let Some(column) = &self.regroup.value_column {
            validation::validate_non_empty_string("regroup.value_column", column)?;
        }

        if let Some(format) = &self.logging.format {
            validation::validate_one_of("logging.format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    /// 取得國家代碼輸出格式，命令列參數優先
    pub fn country_output(&self, flag: Option<CountryCodeFormat>) -> CountryCodeFormat {
        flag.or(self.countries.output).unwrap_or_default()
    }

    pub fn country_errors(&self, flag: Option<InvalidCountryPolicy>) -> InvalidCountryPolicy {
        flag.or(self.countries.errors).unwrap_or_default()
    }

    /// 命令列沒有指定前綴時使用配置檔中的前綴
    pub fn module_prefixes(&self, flag: &[String]) -> Result<Vec<String>> {
        if !flag.is_empty() {
            return Ok(flag.to_vec());
        }
        let prefixes = validation::validate_required_field(
            "modulegraph.prefixes",
            &self.modulegraph.prefixes,
        )?;
        if prefixes.is_empty() {
            return Err(EcUtilsError::MissingConfigError {
                field: "modulegraph.prefixes".to_string(),
            });
        }
        Ok(prefixes.clone())
    }

    pub fn graph_format(&self, flag: Option<GraphFormat>) -> GraphFormat {
        flag.or(self.modulegraph.format).unwrap_or_default()
    }

    pub fn graphviz_binary(&self) -> &str {
        self.modulegraph.graphviz_binary.as_deref().unwrap_or("dot")
    }

    pub fn value_column(&self, flag: Option<&str>) -> String {
        flag.or(self.regroup.value_column.as_deref())
            .unwrap_or(crate::adapters::csv_io::DEFAULT_VALUE_COLUMN)
            .to_string()
    }

    pub fn json_logs(&self, flag: Option<&str>) -> bool {
        flag.or(self.logging.format.as_deref()) == Some("json")
    }

    pub fn verbose(&self, flag: bool) -> bool {
        flag || self.logging.verbose.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
