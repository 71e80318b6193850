//! Render a report request to PDF.
//!
//! Usage:
//!   slide_report results.json
//!   slide_report results.json --output-dir out --tier chart-only
//!   slide_report results.json --config report.json --compress --verbose

use slide_report::config::{ExportTier, ReportConfig};
use slide_report::report::{order_units, save_report_pdf, ReportRequest};
use std::path::PathBuf;
use std::process::ExitCode;

struct CliConfig {
    request: Option<PathBuf>,
    output_dir: PathBuf,
    config_file: Option<PathBuf>,
    tier: Option<String>,
    compress: bool,
    verbose: bool,
}

impl CliConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            request: None,
            output_dir: PathBuf::from("."),
            config_file: None,
            tier: None,
            compress: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output-dir" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        config.output_dir = PathBuf::from(&args[i]);
                    }
                },
                "--config" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        config.config_file = Some(PathBuf::from(&args[i]));
                    }
                },
                "--tier" => {
                    i += 1;
                    if i < args.len() {
                        config.tier = Some(args[i].clone());
                    }
                },
                "--compress" => config.compress = true,
                "--verbose" | "-v" => config.verbose = true,
                other if !other.starts_with('-') && config.request.is_none() => {
                    config.request = Some(PathBuf::from(other));
                },
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
            i += 1;
        }
        config
    }

    fn report_config(&self) -> slide_report::Result<ReportConfig> {
        let mut config = match &self.config_file {
            Some(path) => ReportConfig::from_file(path)?,
            None => ReportConfig::default(),
        };
        if let Some(tier) = &self.tier {
            config = config.with_tier(tier.parse::<ExportTier>()?);
        }
        if self.compress {
            config = config.with_compress(true);
        }
        Ok(config)
    }
}

fn run(cli: &CliConfig) -> slide_report::Result<PathBuf> {
    let Some(path) = &cli.request else {
        return Err(slide_report::Error::InvalidInput(
            "usage: slide_report <request.json> [--output-dir DIR] [--tier full|chart-only] [--config FILE] [--compress] [--verbose]"
                .to_string(),
        ));
    };
    let config = cli.report_config()?;
    let json = std::fs::read_to_string(path)?;
    let mut request = ReportRequest::from_json_str(&json)?;
    request.units = order_units(&request.units);
    std::fs::create_dir_all(&cli.output_dir)?;
    save_report_pdf(&request, &config, &cli.output_dir)
}

fn main() -> ExitCode {
    let cli = CliConfig::from_args();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
