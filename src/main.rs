use std::env;
use std::process;

use finance_ledger::orchestrator::{Invocation, USAGE, run};
use finance_ledger::Config;
use log::info;

fn main() {
    // Initialize logger (respect RUST_LOG env var if set)
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    let mut config = Config::from_env();
    if let Some(file) = invocation.file {
        config = config.with_ledger_file(file);
    }

    info!("using ledger file: {}", config.ledger_file.display());

    if let Err(e) = run(&config, invocation.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
