//! Bundleplan - command-line tool for planning and finalising asset builds

use std::process::ExitCode;

use bundleplan::cli;

fn main() -> ExitCode {
    cli::run()
}
