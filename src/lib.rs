//! Utilities shared by the ec_modules data-processing workflows.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "geo")]
pub mod geo;
pub mod utils;

pub use crate::adapters::graphviz::GraphvizRenderer;
pub use crate::core::countries::{convert_country_code, convert_valid_countries, eu_country_code_to_iso3};
pub use crate::core::labelled::{Dimension, LabelledArray};
pub use crate::core::modulegraph::{write_snakemake_modulegraph_dot, write_snakemake_modulegraph_png};
pub use crate::core::regroup::{rename_and_groupby, RegroupOptions};
pub use crate::domain::model::{CountryCodeFormat, GraphFormat, InvalidCountryPolicy};
pub use crate::utils::error::{EcUtilsError, Result};
