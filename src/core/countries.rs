//! Country code/name normalisation on top of the ISO 3166-1 table.
//!
//! The European Union uses its own two-letter codes, which mostly match
//! ISO 3166-1 alpha-2 except for Greece (`EL`) and the United Kingdom (`UK`).
//! Both spellings are accepted on input and can be produced on output.

use crate::domain::model::{Country, CountryCodeFormat, InvalidCountryPolicy};
use crate::utils::error::{EcUtilsError, Result};
use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};

const ISO_3166_1_CSV: &str = include_str!("../../data/iso_3166-1.csv");

/// 非 ISO 的代碼在查詢前先轉成 ISO alpha-2
const CODE_ALIASES: [(&str, &str); 3] = [
    ("el", "gr"),
    ("uk", "gb"),
    // biofuels 資料集使用的波士尼亞代碼
    ("bh", "ba"),
];

/// 內建表使用目前的 ISO 名稱；舊版名稱仍可查詢
const LEGACY_NAMES: [(&str, &str); 2] = [
    ("macedonia, republic of", "mk"),
    ("the former yugoslav republic of macedonia", "mk"),
];

lazy_static! {
    static ref REGISTRY: std::result::Result<CountryRegistry, String> =
        CountryRegistry::from_csv(ISO_3166_1_CSV).map_err(|e| e.to_string());
}

/// ISO 3166-1 國家表，支援不分大小寫的查詢
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    countries: Vec<Country>,
    // 依 alpha_2, alpha_3, numeric, name, official_name, common_name 的順序建立索引
    indices: Vec<HashMap<String, usize>>,
}

impl CountryRegistry {
    /// 取得內建的 ISO 3166-1 國家表
    pub fn global() -> Result<&'static CountryRegistry> {
        REGISTRY
            .as_ref()
            .map_err(|message| EcUtilsError::ProcessingError {
                message: format!("Embedded ISO 3166-1 table is invalid: {}", message),
            })
    }

    /// 從 CSV 文字載入國家表
    pub fn from_csv(content: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut countries = Vec::new();
        for row in reader.deserialize() {
            let country: Country = row?;
            countries.push(country);
        }
        Ok(Self::new(countries))
    }

    pub fn new(countries: Vec<Country>) -> Self {
        let mut indices: Vec<HashMap<String, usize>> = vec![HashMap::new(); 6];

        for (position, country) in countries.iter().enumerate() {
            let keys = [
                Some(&country.alpha_2),
                Some(&country.alpha_3),
                Some(&country.numeric),
                Some(&country.name),
                country.official_name.as_ref(),
                country.common_name.as_ref(),
            ];
            for (index, key) in indices.iter_mut().zip(keys) {
                if let Some(key) = key {
                    index.entry(key.to_lowercase()).or_insert(position);
                }
            }
        }

        Self { countries, indices }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// 依代碼或名稱查詢國家
    pub fn lookup(&self, value: &str) -> Result<&Country> {
        let needle = value.to_lowercase();
        self.indices
            .iter()
            .find_map(|index| index.get(&needle))
            .map(|&position| &self.countries[position])
            .ok_or_else(|| EcUtilsError::CountryNotFound {
                input: value.to_string(),
            })
    }
}

/// Converts an EU country code to ISO 3166-1 alpha-3.
pub fn eu_country_code_to_iso3(eu_country_code: &str) -> Result<String> {
    if eu_country_code.chars().count() != 2 {
        return Err(EcUtilsError::InvalidEuCountryCode {
            code: eu_country_code.to_string(),
        });
    }

    convert_country_code(eu_country_code, CountryCodeFormat::Alpha3)
}

/// Converts a country code or name into the requested output format.
///
/// Accepts ISO alpha-2/alpha-3/numeric codes, country names and the EU codes
/// `EL` and `UK`.
pub fn convert_country_code(input_country: &str, output: CountryCodeFormat) -> Result<String> {
    let registry = CountryRegistry::global()?;
    let lowered = input_country.to_lowercase();
    let query = CODE_ALIASES
        .iter()
        .chain(LEGACY_NAMES.iter())
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, iso)| *iso)
        .unwrap_or(input_country);

    let country = registry.lookup(query).map_err(|_| EcUtilsError::CountryNotFound {
        input: input_country.to_string(),
    })?;

    let converted = match output {
        CountryCodeFormat::Alpha2 => country.alpha_2.clone(),
        CountryCodeFormat::Alpha2Eu => match country.alpha_2.as_str() {
            "GB" => "UK".to_string(),
            "GR" => "EL".to_string(),
            other => other.to_string(),
        },
        CountryCodeFormat::Alpha3 => country.alpha_3.clone(),
        CountryCodeFormat::Name => country.name.clone(),
    };

    Ok(converted)
}

/// Maps country codes / names to one uniform output format.
///
/// `["France", "FRA", "FR"]` all map to `"FRA"` with [`CountryCodeFormat::Alpha3`].
/// Inputs that are not countries (e.g. `"EU27"`) either abort the conversion or are
/// logged and skipped, depending on `errors`.
pub fn convert_valid_countries<S: AsRef<str>>(
    country_codes: &[S],
    output: CountryCodeFormat,
    errors: InvalidCountryPolicy,
) -> Result<BTreeMap<String, String>> {
    let mut mapped_codes = BTreeMap::new();

    for country_code in country_codes {
        let country_code = country_code.as_ref();
        match convert_country_code(country_code, output) {
            Ok(converted) => {
                mapped_codes.insert(country_code.to_string(), converted);
            }
            Err(err @ EcUtilsError::CountryNotFound { .. }) => match errors {
                InvalidCountryPolicy::Raise => return Err(err),
                InvalidCountryPolicy::Ignore => {
                    tracing::info!("Skipping country/region {}", country_code);
                }
            },
            Err(err) => return Err(err),
        }
    }

    tracing::debug!(
        "Mapped {} of {} country codes to {}",
        mapped_codes.len(),
        country_codes.len(),
        output
    );

    Ok(mapped_codes)
}
