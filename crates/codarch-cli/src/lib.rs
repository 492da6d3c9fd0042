pub mod cli;
pub mod commands;
pub mod utils;

use clap::Parser;
use cli::Codarch;
use commands::handle_command;
use std::process;

/// Run the codarch CLI application
pub fn run_main() {
    utils::init_logging();

    let args = Codarch::parse();
    let result = handle_command(args.commands);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
