//! triage binary - classify and route GitHub issues from the command line.

use clap::Parser;
use triage::cli::{run, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
