// cachebust - cache-busting import rewriter
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::io;

use cachebust::cli::{commands, Cli};
use cachebust::config::load_config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    cachebust::logging::init(&cli.log_level);

    let overrides = cli.target.overrides();
    let load = || load_config(cli.config.as_deref(), &overrides);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::execute(&cli.command, load, &mut out)
}
