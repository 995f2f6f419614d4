use clap::Parser;
use navigators::LogLevel;
use navigators::core::config::{self, CliOverrides};
use navigators::core::flow::{self, DEMO_FLOW};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "navigators", about = "Step through a page flow in the terminal")]
struct Args {
    /// Flow file to run (TOML); the built-in demo when omitted
    #[arg(short, long)]
    flow: Option<PathBuf>,

    /// Log verbosity, written to the log file
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("navigators: {e}");
            return ExitCode::FAILURE;
        }
    };
    let cli = CliOverrides {
        flow: args.flow,
        log_level: args.log_level.map(Into::into),
    };
    let resolved = config::resolve(&file_config, &cli);

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("Navigators starting up with flow: {:?}", resolved.flow);

    let definition = match &resolved.flow {
        Some(path) => flow::load_flow(path),
        None => flow::parse_flow(DEMO_FLOW),
    };
    let definition = match definition {
        Ok(d) => d,
        Err(e) => {
            log::error!("Could not load flow: {e}");
            eprintln!("navigators: {e}");
            return ExitCode::FAILURE;
        }
    };

    match navigators::tui::run(&resolved, &definition) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Terminal session failed: {e}");
            eprintln!("navigators: {e}");
            ExitCode::FAILURE
        }
    }
}
