//! Coordinate reference systems shared by the geographic modules.

use crate::utils::error::{EcUtilsError, Result};
use std::fmt;
use std::str::FromStr;

pub const WGS84: &str = "EPSG:4326";
pub const EPSG3035: &str = "EPSG:3035";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// 經緯度
    Wgs84,
    /// ETRS89 / LAEA Europe，等面積投影
    Epsg3035,
}

impl Crs {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crs::Wgs84 => WGS84,
            Crs::Epsg3035 => EPSG3035,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Crs {
    type Err = EcUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            WGS84 | "WGS84" => Ok(Crs::Wgs84),
            EPSG3035 => Ok(Crs::Epsg3035),
            _ => Err(EcUtilsError::InvalidConfigValueError {
                field: "crs".to_string(),
                value: s.to_string(),
                reason: format!("Supported: {}, {}", WGS84, EPSG3035),
            }),
        }
    }
}
