//! Main entry point for the ncompare CLI

use clap::Parser;
use ncompare::cli::Cli;
use ncompare::compare;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = compare(&cli.nc_a, &cli.nc_b, &cli.to_options()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
