//! # Lock Contention Benchmark Entry Point
//!
//! Runs N pinned worker threads through a shared critical section guarded by
//! either a re-entrant mutex or a monitor lock, and prints one CSV row per run.
//!
//! ## Exit codes
//! - `0`: all runs completed.
//! - `1`: invalid arguments (usage printed to stderr).
//! - `2`: at least one run failed (worker fault, barrier timeout) or output
//!   failed. Rows of the runs that succeeded are still printed.
//!
//! The worker-to-core mapping is written to stderr once at startup. Other
//! diagnostics go to stderr via `env_logger`; set `RUST_LOG=info` to see
//! per-run progress.

mod cli;

use std::{io, process};

use clap::{Parser, error::ErrorKind};
use log::{error, info};

use cli::{CliArgs, USAGE};
use lock_bench::{CoreAffinityBinder, run_benchmark, utils::export::ReportWriter};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let config = args.into_config();
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    info!("=== LOCK BENCHMARK START ===");
    let binder = CoreAffinityBinder::detect();
    if binder.core_count() > 0 {
        eprintln!("core mapping: {}", binder.describe_mapping());
    }

    let mut report = ReportWriter::new(io::stdout().lock());
    if let Err(e) = report.write_header() {
        error!("Failed to write CSV header: {}", e);
        process::exit(2);
    }

    match run_benchmark(&config, &binder, |result| report.write_result(result)) {
        Ok(results) => info!("=== LOCK BENCHMARK FINISHED: {} runs ===", results.len()),
        Err(e) => {
            error!("Benchmark aborted: {}", e);
            process::exit(2);
        }
    }
}
