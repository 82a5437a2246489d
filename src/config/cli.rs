use crate::core::units::EnergyConversion;
use crate::domain::model::{CountryCodeFormat, GraphFormat, InvalidCountryPolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ec-utils")]
#[command(version, about = "Utilities for ec_modules")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (compact or json)
    #[arg(long, global = true, value_parser = ["compact", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert country codes or names to a uniform format
    Country(CountryArgs),

    /// Convert an EU country code to ISO 3166-1 alpha-3
    EuToIso3 {
        /// Two-letter EU country code, e.g. EL
        code: String,
    },

    /// Apply an energy unit conversion to values
    Convert(ConvertArgs),

    /// Collapse the rules of each module in a snakemake rule graph
    Modulegraph(ModulegraphArgs),

    /// Rename and aggregate the labels of one dimension of a tidy CSV
    Regroup(RegroupArgs),
}

#[derive(Debug, Args)]
pub struct CountryArgs {
    /// Country codes or names
    #[arg(required = true)]
    pub codes: Vec<String>,

    /// Output format: alpha2, alpha2_eu, alpha3, name
    #[arg(short, long)]
    pub output: Option<CountryCodeFormat>,

    /// What to do with invalid countries: raise or ignore
    #[arg(short, long)]
    pub errors: Option<InvalidCountryPolicy>,

    /// Print the mapping as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Conversion name, e.g. ktoe_to_twh
    pub conversion: EnergyConversion,

    /// Values to convert
    #[arg(required = true, allow_negative_numbers = true)]
    pub values: Vec<f64>,
}

#[derive(Debug, Args)]
pub struct ModulegraphArgs {
    /// Snakemake rule graph (.dot)
    pub dotfile: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// Module prefix; repeat for several modules
    #[arg(short, long = "prefix")]
    pub prefixes: Vec<String>,

    /// Output format: png or dot
    #[arg(short, long)]
    pub format: Option<GraphFormat>,
}

#[derive(Debug, Args)]
pub struct RegroupArgs {
    /// Tidy CSV input (one column per dimension plus a value column)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Dimension whose labels are renamed
    #[arg(short, long)]
    pub dim: String,

    /// Two-column CSV mapping old labels to new labels
    #[arg(short, long)]
    pub mapping: PathBuf,

    /// Rename the dimension in the output
    #[arg(long)]
    pub new_dim: Option<String>,

    /// Drop labels whose values are all missing after grouping
    #[arg(long)]
    pub dropna: bool,

    /// Keep labels that are not in the mapping under their own name
    #[arg(long)]
    pub keep_other: bool,

    /// Name of the value column
    #[arg(long)]
    pub value_column: Option<String>,

    /// Output CSV
    #[arg(short, long)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modulegraph_args() {
        let cli = Cli::parse_from([
            "ec-utils",
            "modulegraph",
            "rulegraph.dot",
            "modulegraph.png",
            "--prefix",
            "module_hydropower",
            "--prefix",
            "module_wind_pv",
            "--format",
            "dot",
        ]);

        match cli.command {
            Command::Modulegraph(args) => {
                assert_eq!(args.prefixes, vec!["module_hydropower", "module_wind_pv"]);
                assert_eq!(args.format, Some(GraphFormat::Dot));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_country_args() {
        let cli = Cli::parse_from([
            "ec-utils", "--verbose", "country", "FRA", "EL", "--output", "alpha2_eu", "--errors",
            "ignore",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Command::Country(args) => {
                assert_eq!(args.codes, vec!["FRA", "EL"]);
                assert_eq!(args.output, Some(CountryCodeFormat::Alpha2Eu));
                assert_eq!(args.errors, Some(InvalidCountryPolicy::Ignore));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_conversion() {
        let result = Cli::try_parse_from(["ec-utils", "convert", "twh_to_ktoe", "1"]);
        assert!(result.is_err());
    }
}
