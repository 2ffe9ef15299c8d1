mod app;
mod config;

use std::process::ExitCode;

use monitor_logging::{monitor_error, monitor_warn, LogDestination};

use crate::config::{Config, LogSettings};

fn main() -> ExitCode {
    let log_settings = LogSettings::from_env();
    let destination = match log_settings.file {
        Some(path) => LogDestination::TerminalAndFile(path),
        None => LogDestination::Terminal,
    };
    monitor_logging::initialize(log_settings.level, destination);
    if let Some(rejected) = log_settings.rejected_level {
        monitor_warn!("Unknown MONITOR_LOG_LEVEL {:?}; using info", rejected);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            monitor_error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match app::run(config) {
        Ok(summary) => {
            if summary.failed > 0 {
                monitor_warn!(
                    "{} notification(s) failed; they will not be retried",
                    summary.failed
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            monitor_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
