//! CLI Module
//!
//! Command-line interface for lrdetect using Clap v4.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{AnalysisReport, AnalysisRequest, Analyzer, HttpAnalyzer};
use crate::config::Config;
use crate::logging;
use crate::tui::{self, App, Wizard};

/// lrdetect - Load Redistribution attack detection for radial distribution systems
#[derive(Parser, Debug)]
#[command(name = "lrdetect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (verbose logs in .lrdetect/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive detection wizard (default)
    Wizard {
        /// Saved request whose busData/lineData pre-fill the grids
        #[arg(short, long)]
        grid_data: Option<PathBuf>,
    },

    /// Send a saved request payload to the backend and print the report
    Analyze {
        /// JSON file holding an analysis request
        #[arg(short, long)]
        payload: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config,

    /// Log management operations
    Logs {
        #[command(subcommand)]
        operation: LogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show log file location and status
    Status,
    /// View recent log entries
    View {
        /// Number of lines to show (default: 50)
        #[arg(short, long, default_value = "50")]
        lines: usize,
    },
    /// Clean up old log files
    Clean {
        /// Maximum age in days (default: 7)
        #[arg(short = 'a', long, default_value = "7")]
        days: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Main CLI entry point; `config` is already loaded and validated
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        None => cmd_wizard(&config, None).await,
        Some(Commands::Wizard { grid_data }) => cmd_wizard(&config, grid_data.as_deref()).await,
        Some(Commands::Analyze { payload, format }) => {
            cmd_analyze(&config, &payload, format).await
        }
        Some(Commands::Init { force }) => cmd_init(force).await,
        Some(Commands::Config) => cmd_config(&config).await,
        Some(Commands::Logs { operation }) => cmd_logs(&config, operation).await,
    }
}

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    // Validate configuration
    config.validate()?;

    Ok(config)
}

/// Directory logs are written to under this configuration
pub fn log_dir(config: &Config) -> PathBuf {
    config
        .logging
        .dir
        .clone()
        .unwrap_or_else(logging::default_log_dir)
}

/// Launch the full-screen wizard
async fn cmd_wizard(config: &Config, grid_data: Option<&Path>) -> Result<()> {
    let analyzer = HttpAnalyzer::new(&config.backend.base_url)
        .context("Failed to build analysis client")?;
    tracing::info!("Analysis backend: {}", analyzer.endpoint());

    let mut wizard = Wizard::new(config.detection.candidate_pairs.clone());
    if let Some(path) = grid_data {
        let saved = read_payload(path)?;
        tracing::info!("Pre-filling grids from {}", path.display());
        wizard = wizard.with_grid_data(saved.bus_data, saved.line_data);
    }
    let app = App::new(wizard, Arc::new(analyzer));

    tui::run(app).await
}

/// Read a saved request, send it, print the report
async fn cmd_analyze(config: &Config, payload: &Path, format: OutputFormat) -> Result<()> {
    let request = read_payload(payload)?;
    let analyzer = HttpAnalyzer::new(&config.backend.base_url)
        .context("Failed to build analysis client")?;

    tracing::info!(
        "Analyzing {} against {}",
        payload.display(),
        analyzer.endpoint()
    );

    let response = analyzer
        .analyze(&request)
        .await
        .with_context(|| format!("Analysis request to {} failed", analyzer.endpoint()))?;

    let report = AnalysisReport::new(request.suspected_nodes, &response);
    println!("{}", render_report(&report, format)?);
    Ok(())
}

fn read_payload(path: &Path) -> Result<AnalysisRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse payload file: {}", path.display()))
}

fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_text()),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "report": report,
                "status": report.verdict.message(),
            });
            serde_json::to_string_pretty(&output).context("Failed to serialize report")
        }
    }
}

/// Initialize configuration file
async fn cmd_init(force: bool) -> Result<()> {
    println!("⚡ lrdetect Configuration Initialization\n");

    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;

    // Check if config already exists
    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("✅ Configuration initialized at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Point [backend] base_url at your analysis server");
    println!("   2. Or set LRDETECT_BACKEND_URL in the environment");
    println!("   3. Run 'lrdetect' to start the wizard");

    Ok(())
}

/// Print the effective configuration as TOML
async fn cmd_config(config: &Config) -> Result<()> {
    println!("⚙️  lrdetect Configuration\n");
    let rendered =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", rendered);
    Ok(())
}

async fn cmd_logs(config: &Config, operation: LogCommands) -> Result<()> {
    use std::io::{BufRead, BufReader};

    let log_dir = log_dir(config);

    match operation {
        LogCommands::Status => {
            println!("📊 lrdetect Logging Status\n");
            println!("Log directory: {}", log_dir.display());
            println!("Log level: {}", config.logging.level);

            if log_dir.exists() {
                let mut file_count = 0;
                let mut total_size = 0u64;
                for entry in std::fs::read_dir(&log_dir)? {
                    let entry = entry?;
                    if let Ok(metadata) = entry.metadata()
                        && metadata.is_file()
                    {
                        file_count += 1;
                        total_size += metadata.len();
                    }
                }

                println!("Status: ✅ Active");
                println!("Log files: {}", file_count);
                println!("Total size: {:.2} MB", total_size as f64 / (1024.0 * 1024.0));

                if let Some(newest) = logging::get_log_path(&log_dir) {
                    println!("Latest log: {}", newest.display());
                }
            } else {
                println!("Status: ❌ No logs found");
                println!("\n💡 Logs are created the first time lrdetect runs:");
                println!("   {}", log_dir.display());
            }

            Ok(())
        }

        LogCommands::View { lines } => {
            if let Some(log_path) = logging::get_log_path(&log_dir) {
                println!("📜 Viewing last {} lines of: {}\n", lines, log_path.display());

                let file = std::fs::File::open(&log_path)
                    .with_context(|| format!("Failed to open log: {}", log_path.display()))?;
                let reader = BufReader::new(file);

                // Collect all lines then show last N
                let all_lines: Vec<String> = reader.lines().map_while(std::result::Result::ok).collect();
                let start = all_lines.len().saturating_sub(lines);

                for line in &all_lines[start..] {
                    println!("{}", line);
                }

                if all_lines.is_empty() {
                    println!("(empty log file)");
                }
            } else {
                println!("❌ No log files found in {}", log_dir.display());
                println!("\n💡 Run with -d for verbose logging:");
                println!("   lrdetect -d");
            }

            Ok(())
        }

        LogCommands::Clean { days } => {
            println!("🧹 Cleaning up log files older than {} days...\n", days);

            match logging::cleanup_old_logs(&log_dir, days) {
                Ok(removed) if removed > 0 => println!("✅ Removed {} old log file(s)", removed),
                Ok(_) => println!("✅ No old log files to remove"),
                Err(e) => println!("❌ Error cleaning logs: {}", e),
            }

            Ok(())
        }
    }
}
