//! Encode JSON datums to Avro binary and back.
//!
//! Usage:
//!   avro-interop write  --schema <AVSC> [--input <JSON>] [--output <FILE>] [--config <TOML>]
//!   avro-interop read   --schema <AVSC> [--input <FILE>] [--config <TOML>]
//!   avro-interop schema --schema <AVSC>

use std::process::ExitCode;

use avro_interop::cli::{run, Args};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("avro-interop: {e}");
            ExitCode::FAILURE
        }
    }
}
