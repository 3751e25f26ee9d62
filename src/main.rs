use clap::Parser;
use tradesig::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
