use anyhow::Context;
use clap::Parser;
use ec_utils::adapters::csv_io;
use ec_utils::config::{Cli, Command, TomlConfig};
use ec_utils::core::modulegraph::write_snakemake_modulegraph;
use ec_utils::utils::error::{EcUtilsError, ErrorSeverity};
use ec_utils::utils::logger;
use ec_utils::utils::validation::{self, Validate};
use ec_utils::{
    convert_valid_countries, eu_country_code_to_iso3, rename_and_groupby, GraphvizRenderer,
    RegroupOptions,
};

fn main() {
    let cli = Cli::parse();

    // 載入配置檔
    let config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    // 初始化日誌
    let verbose = config.verbose(cli.verbose);
    if config.json_logs(cli.log_format.as_deref()) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = run(cli.command, &config) {
        let exit_code = match e.downcast_ref::<EcUtilsError>() {
            Some(err) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    e,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {:#}", e);
                eprintln!("💡 {}", err.recovery_suggestion());
                match err.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(command: Command, config: &TomlConfig) -> anyhow::Result<()> {
    match command {
        Command::Country(args) => {
            let output = config.country_output(args.output);
            let errors = config.country_errors(args.errors);
            let mapped = convert_valid_countries(&args.codes, output, errors)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&mapped)?);
            } else {
                // 依輸入順序輸出，重複的輸入只列一次
                let mut printed = std::collections::HashSet::new();
                for code in &args.codes {
                    if let Some(converted) = mapped.get(code) {
                        if printed.insert(code) {
                            println!("{}\t{}", code, converted);
                        }
                    }
                }
            }
        }
        Command::EuToIso3 { code } => {
            println!("{}", eu_country_code_to_iso3(&code)?);
        }
        Command::Convert(args) => {
            for value in args.values {
                println!("{}", args.conversion.apply(value));
            }
        }
        Command::Modulegraph(args) => {
            let prefixes = config.module_prefixes(&args.prefixes)?;
            let format = config.graph_format(args.format);
            let renderer = GraphvizRenderer::new(config.graphviz_binary());

            tracing::info!(
                "🔧 Collapsing modules [{}] in {}",
                prefixes.join(", "),
                args.dotfile.display()
            );
            write_snakemake_modulegraph(&renderer, &args.dotfile, &args.output, &prefixes, format)
                .with_context(|| format!("while processing {}", args.dotfile.display()))?;
            println!("📁 Module graph saved to: {}", args.output.display());
        }
        Command::Regroup(args) => {
            validation::validate_file_extensions(
                "regroup",
                &[args.input.as_path(), args.mapping.as_path(), args.output.as_path()],
                &["csv"],
            )?;

            let value_column = config.value_column(args.value_column.as_deref());
            let array = csv_io::read_labelled_csv_file(&args.input, &value_column)
                .with_context(|| format!("while reading {}", args.input.display()))?;
            let mapping = csv_io::read_mapping_csv_file(&args.mapping)
                .with_context(|| format!("while reading {}", args.mapping.display()))?;

            let mut options = RegroupOptions::new()
                .dropna(args.dropna)
                .keep_other_dim_items(args.keep_other);
            if let Some(new_dim) = args.new_dim {
                options = options.new_dim_name(new_dim);
            }

            let regrouped = rename_and_groupby(&array, &mapping, &args.dim, &options)?;
            csv_io::write_labelled_csv_file(&regrouped, &args.output)?;
            println!("📁 Output saved to: {}", args.output.display());
        }
    }

    Ok(())
}
