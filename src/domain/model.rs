use crate::utils::error::{EcUtilsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 一筆 ISO 3166-1 國家資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub alpha_2: String,
    pub alpha_3: String,
    pub numeric: String,
    pub name: String,
    pub official_name: Option<String>,
    pub common_name: Option<String>,
}

/// 國家代碼輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryCodeFormat {
    /// ISO alpha-2
    Alpha2,
    /// ISO alpha-2，但英國、希臘使用歐盟代碼 (UK, EL)
    #[serde(rename = "alpha2_eu")]
    Alpha2Eu,
    /// ISO alpha-3
    #[default]
    Alpha3,
    /// 正規化後的國家名稱
    Name,
}

impl CountryCodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryCodeFormat::Alpha2 => "alpha2",
            CountryCodeFormat::Alpha2Eu => "alpha2_eu",
            CountryCodeFormat::Alpha3 => "alpha3",
            CountryCodeFormat::Name => "name",
        }
    }
}

impl FromStr for CountryCodeFormat {
    type Err = EcUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alpha2" => Ok(CountryCodeFormat::Alpha2),
            "alpha2_eu" => Ok(CountryCodeFormat::Alpha2Eu),
            "alpha3" => Ok(CountryCodeFormat::Alpha3),
            "name" => Ok(CountryCodeFormat::Name),
            other => Err(EcUtilsError::InvalidConfigValueError {
                field: "output".to_string(),
                value: other.to_string(),
                reason: "Valid formats: alpha2, alpha2_eu, alpha3, name".to_string(),
            }),
        }
    }
}

impl fmt::Display for CountryCodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 遇到無效國家代碼時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidCountryPolicy {
    #[default]
    Raise,
    Ignore,
}

impl FromStr for InvalidCountryPolicy {
    type Err = EcUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raise" => Ok(InvalidCountryPolicy::Raise),
            "ignore" => Ok(InvalidCountryPolicy::Ignore),
            other => Err(EcUtilsError::InvalidConfigValueError {
                field: "errors".to_string(),
                value: other.to_string(),
                reason: "Valid values: raise, ignore".to_string(),
            }),
        }
    }
}

impl fmt::Display for InvalidCountryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidCountryPolicy::Raise => f.write_str("raise"),
            InvalidCountryPolicy::Ignore => f.write_str("ignore"),
        }
    }
}

/// 模組圖輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphFormat {
    #[default]
    Png,
    Dot,
}

impl FromStr for GraphFormat {
    type Err = EcUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "png" => Ok(GraphFormat::Png),
            "dot" => Ok(GraphFormat::Dot),
            other => Err(EcUtilsError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: png, dot".to_string(),
            }),
        }
    }
}
