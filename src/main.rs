use clap::Parser;
use tickwise::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
