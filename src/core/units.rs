use crate::core::labelled::LabelledArray;
use crate::utils::error::{EcUtilsError, Result};
use std::fmt;
use std::str::FromStr;

/// Convert ktoe to TWh.
pub fn ktoe_to_twh(value: f64) -> f64 {
    value * 1.163e-2
}

/// Convert GWh to TJ.
pub fn gwh_to_tj(value: f64) -> f64 {
    value * 3.6
}

/// Convert PJ to TWh.
pub fn pj_to_twh(value: f64) -> f64 {
    value / 3.6
}

/// Convert TJ to TWh.
pub fn tj_to_twh(value: f64) -> f64 {
    pj_to_twh(value) / 1000.0
}

/// Convert TJ to ktoe.
pub fn tj_to_ktoe(value: f64) -> f64 {
    value * 23.88e-3
}

/// 可用名稱指定的能源單位換算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyConversion {
    KtoeToTwh,
    GwhToTj,
    PjToTwh,
    TjToTwh,
    TjToKtoe,
}

impl EnergyConversion {
    pub const ALL: [EnergyConversion; 5] = [
        EnergyConversion::KtoeToTwh,
        EnergyConversion::GwhToTj,
        EnergyConversion::PjToTwh,
        EnergyConversion::TjToTwh,
        EnergyConversion::TjToKtoe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyConversion::KtoeToTwh => "ktoe_to_twh",
            EnergyConversion::GwhToTj => "gwh_to_tj",
            EnergyConversion::PjToTwh => "pj_to_twh",
            EnergyConversion::TjToTwh => "tj_to_twh",
            EnergyConversion::TjToKtoe => "tj_to_ktoe",
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            EnergyConversion::KtoeToTwh => ktoe_to_twh(value),
            EnergyConversion::GwhToTj => gwh_to_tj(value),
            EnergyConversion::PjToTwh => pj_to_twh(value),
            EnergyConversion::TjToTwh => tj_to_twh(value),
            EnergyConversion::TjToKtoe => tj_to_ktoe(value),
        }
    }

    /// 對陣列中每個值換算，NaN 保持 NaN
    pub fn apply_array(&self, array: &LabelledArray) -> LabelledArray {
        array.map_values(|value| self.apply(value))
    }
}

impl FromStr for EnergyConversion {
    type Err = EcUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase();
        EnergyConversion::ALL
            .into_iter()
            .find(|conversion| conversion.as_str() == lowered)
            .ok_or_else(|| EcUtilsError::InvalidConfigValueError {
                field: "conversion".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown conversion. Valid conversions: {}",
                    EnergyConversion::ALL
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

impl fmt::Display for EnergyConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
