use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod config;
mod external;
mod frontend;
mod install;
mod manifest;
mod markup;
mod paths;
mod preprocess;
mod staging;
mod templates;
mod tokens;
mod util;
mod workflow;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose());

    match args.command {
        Command::Generate(args) => workflow::run_generate(args),
        Command::Install(args) => workflow::run_install(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
