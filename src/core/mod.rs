pub mod countries;
pub mod dot;
pub mod labelled;
pub mod modulegraph;
pub mod regroup;
pub mod units;

pub use crate::domain::model::{Country, CountryCodeFormat, GraphFormat, InvalidCountryPolicy};
pub use crate::domain::ports::GraphRenderer;
pub use crate::utils::error::Result;
