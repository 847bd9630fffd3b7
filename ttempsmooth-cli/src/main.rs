// ttempsmooth-cli/src/main.rs
//
// Entry point of the `ttempsmooth` binary: parses arguments, sets up
// logging, dispatches to the selected command and maps failures to a
// non-zero exit code.

use std::process;

use clap::Parser;
use log::debug;

use ttempsmooth_cli::output::print_error;
use ttempsmooth_cli::{execute_bench, execute_validate, execute_weights, logging, Cli, CliResult, Commands};

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Validate(args) => execute_validate(args),
        Commands::Weights(args) => execute_weights(args),
        Commands::Bench(args) => execute_bench(args).map(|_| ()),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        print_error(&e.to_string());
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        debug!("Command failed: {:?}", e);
        print_error(&e.to_string());
        process::exit(1);
    }
}
