use c2zig::driver::{self, Cli};
use clap::Parser as ClapParser;
use std::process::exit;

/// The main entry point for the application.
fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    if let Err(err) = driver::run(&cli) {
        eprintln!("error: {}", err);
        exit(1);
    }
}
