//! aquaguard-analyze: run the anomaly report or the maintenance plan once
//!
//! ```text
//! aquaguard-analyze [analyze|maintenance] [--json]
//! ```
//!
//! Configured from the environment (see `aquaguard_connectors::config`).
//! Prints the response body and exits non-zero on any non-2xx status.

use std::process::ExitCode;

use aquaguard_connectors::service::{AnalyzeRequest, MaintenanceRequest, ResponseFormat};
use aquaguard_connectors::ServiceConfig;

const USAGE: &str = "usage: aquaguard-analyze [analyze|maintenance] [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Analyze,
    Maintenance,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<(Command, ResponseFormat), String> {
    let mut command = None;
    let mut format = ResponseFormat::Text;

    for arg in args {
        match arg.as_str() {
            "--json" => format = ResponseFormat::Json,
            "analyze" if command.is_none() => command = Some(Command::Analyze),
            "maintenance" if command.is_none() => command = Some(Command::Maintenance),
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unexpected argument '{}'\n{}", other, USAGE)),
        }
    }

    Ok((command.unwrap_or(Command::Analyze), format))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (command, format) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    let config = ServiceConfig::from_env();
    let service = match config.build_service() {
        Ok(service) => service,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = match command {
        Command::Analyze => service.analyze(&AnalyzeRequest {
            format,
            ..Default::default()
        }),
        Command::Maintenance => service.maintenance(&MaintenanceRequest {
            last_maintenance: config.last_maintenance,
            format,
        }),
    };

    println!("{}", response.body);
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        log::error!("{:?} finished with status {}", command, response.status);
        ExitCode::FAILURE
    }
}
