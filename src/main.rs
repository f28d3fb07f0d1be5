//! `hydrograph`: fetch the last few days of streamflow for one USGS gauge,
//! print summary statistics, and save a hydrograph image.
//!
//! Exit codes: 0 success, 2 configuration, 3 fetch, 4 parse, 5 no data,
//! 6 chart/file output.

use clap::Parser;
use hydrograph::config::DashboardConfig;
use hydrograph::dev_mode::ReplaySource;
use hydrograph::ingest::FlowSource;
use hydrograph::ingest::usgs::UsgsSource;
use hydrograph::logging::{self, LogLevel};
use hydrograph::model::HydroError;
use hydrograph::pipeline::{self, Output};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "hydrograph",
    version,
    about = "Fetch recent USGS streamflow for one site, print summary statistics and save a hydrograph"
)]
struct Args {
    /// TOML config file (defaults to ./hydrograph.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// USGS site number, e.g. 09504500
    #[arg(long)]
    site: Option<String>,

    /// USGS parameter code (00060 = discharge)
    #[arg(long)]
    parameter: Option<String>,

    /// ISO-8601 look-back period, e.g. P7D or PT12H
    #[arg(long)]
    period: Option<String>,

    /// Chart output path (.png, .jpg or .bmp)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// IV service endpoint
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Read a saved RDB response instead of calling the API
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Print the run summary as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Minimum log level: debug, info, warn, error
    #[arg(long, env = "HYDROGRAPH_LOG_LEVEL", default_value = "warn")]
    log_level: LogLevel,

    /// Also append log entries to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Include timestamps in console log lines
    #[arg(long)]
    log_timestamps: bool,
}

impl Args {
    /// Command-line flags are the last configuration layer.
    fn apply_to(&self, config: &mut DashboardConfig) {
        if let Some(site) = &self.site {
            config.site_code = site.clone();
        }
        if let Some(parameter) = &self.parameter {
            config.parameter_code = parameter.clone();
        }
        if let Some(period) = &self.period {
            config.period = period.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = logging::init_logger(args.log_level, args.log_file.as_deref(), args.log_timestamps) {
        eprintln!("❌ An error occurred: {}", e);
        return ExitCode::from(e.exit_code());
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::log_failure("dashboard run", &e);
            eprintln!("❌ An error occurred: {}", e);
            eprintln!("   hint: {}", logging::failure_hint(e.failure_type()));
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), HydroError> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    args.apply_to(&mut config);
    config.validate()?;
    tracing::debug!(?config, "configuration resolved");

    let source: Box<dyn FlowSource> = match &args.replay {
        Some(path) => Box::new(ReplaySource::new(path.clone())),
        None => Box::new(UsgsSource::new(
            config.iv_url(),
            Duration::from_secs(config.timeout_secs),
        )?),
    };

    let output = if args.json { Output::Json } else { Output::Human };
    let report = pipeline::run(&config, source.as_ref(), output)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{}", json);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let args = Args::parse_from([
            "hydrograph",
            "--site",
            "05568500",
            "--period",
            "PT12H",
            "--output",
            "out.png",
            "--timeout",
            "5",
        ]);
        let mut config = DashboardConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.site_code, "05568500");
        assert_eq!(config.period, "PT12H");
        assert_eq!(config.output_path, PathBuf::from("out.png"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.parameter_code, "00060");
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["hydrograph"]);
        assert!(!args.json);
        assert!(args.replay.is_none());
        let mut config = DashboardConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
