use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tractor::{stop_on_interrupt, train, TractorConfig};

/// Train the tractor agent against the simulator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration, defaults are used for missing sections
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = TractorConfig::load_or_default(args.config.as_deref())?;

    train(&config, stop_on_interrupt()?)
}
