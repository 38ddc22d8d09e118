//! Card Schemas CLI
//!
//! Validates card data files and exports merged card data.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use card_schemas::{
    discover_files, export_directory, write_export, CardValidator, CardsConfig, DocumentOutcome,
    OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "card-schemas")]
#[command(about = "Validate and export trading-card data files")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate card files (directories are searched recursively)
    Validate {
        /// Files or directories to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout (JSON only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge all card files in a directory into one JSON file
    Export {
        /// Directory holding card files
        #[arg(short, long, default_value = "card_data")]
        input: PathBuf,

        /// Output file (defaults to export.output from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration as TOML
    Show,

    /// Write a default config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "card-schemas.toml")]
        output: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CardsConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Validate {
            paths,
            format,
            output,
        } => {
            let validator = CardValidator::new(&config)?;
            let files = discover_files(&paths, &config.files.extension);
            if files.is_empty() {
                anyhow::bail!("no card files found");
            }

            let reports = validator.validate_paths(&files);
            let total: usize = reports.iter().map(|r| r.errors.len()).sum();

            match format {
                ReportFormat::Text => {
                    for report in &reports {
                        println!("🔍 Validating {}...", report.file.display());
                        match report.outcome {
                            DocumentOutcome::Empty => println!("   ℹ️  no cards declared"),
                            DocumentOutcome::Records(n) if report.is_clean() => {
                                println!("   ✅ {} card(s)", n)
                            }
                            _ => println!("   ❌ {} error(s)", report.errors.len()),
                        }
                    }

                    println!();
                    if total > 0 {
                        eprintln!("❌ Validation failed with the following errors:");
                        for error in reports.iter().flat_map(|r| &r.errors) {
                            eprintln!("- {}", error);
                        }
                    } else {
                        println!("✅ Validation successful. All files conform to the card schemas.");
                    }
                }
                ReportFormat::Json => {
                    let report = serde_json::json!({
                        "generated_at": chrono::Utc::now().to_rfc3339(),
                        "files": reports.len(),
                        "errors": total,
                        "results": reports.iter().map(|r| r.to_json()).collect::<Vec<_>>(),
                    });
                    let report_json = serde_json::to_string_pretty(&report)?;

                    if let Some(path) = output {
                        std::fs::write(&path, &report_json)
                            .with_context(|| format!("writing report to {}", path.display()))?;
                        println!("✅ Report written to {:?}", path);
                    } else {
                        println!("{}", report_json);
                    }
                }
            }

            if total > 0 {
                std::process::exit(1);
            }
        }

        Commands::Export {
            input,
            output,
            compact,
        } => {
            let validator = CardValidator::new(&config)?;
            let output = output.unwrap_or_else(|| config.export.output.clone());
            let format = if compact {
                OutputFormat::Compact
            } else {
                config.export.output_format
            };

            println!("📦 Card Export");
            println!("  Input: {:?}", input);

            let export = export_directory(&input, &validator, &config.files.extension)?;
            write_export(&export, &output, format)?;

            println!("✅ Exported {} card(s) to {:?}", export.data.len(), output);
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { output } => {
                CardsConfig::default().save(&output)?;
                println!("✅ Created config file: {}", output);
            }
        },
    }

    Ok(())
}
