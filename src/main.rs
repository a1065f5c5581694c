//! agromart CLI entry point
//!
//! main.rs only parses arguments and reports errors; everything else is in
//! the CLI module.

use agromart::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
