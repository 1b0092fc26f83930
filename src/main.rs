use clap::Parser;
use rastercam::cli::{run, Cli};
use rastercam::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    run(cli)
}
