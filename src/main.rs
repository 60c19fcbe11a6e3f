// CLI binary entry point for flvio

use std::process;

use clap::Parser;

mod cli;

fn main() {
    let config = cli::Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = cli::run(&config) {
        eprintln!("✗ {:#}", e);
        process::exit(1);
    }
}
