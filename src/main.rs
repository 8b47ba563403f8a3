use anyhow::Context;
use clap::Parser;
use dirsort::cli::{Cli, run_cli};
use dirsort::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Sorting failures are reported on stdout and still end with "Finished";
    // only an unusable configuration makes the process fail.
    run_cli(&cli).context("could not load dirsort configuration")?;
    Ok(())
}
