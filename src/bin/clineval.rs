//! Binary entry point for the evaluator CLI.

use std::process;

fn main() {
    if let Err(e) = clineval::cli::run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
