//! Benchrank CLI entry point.

use benchrank_cli::{exit_code, logging, run, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
