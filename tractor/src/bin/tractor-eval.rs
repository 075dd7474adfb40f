use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tractor::{evaluate, stop_on_interrupt, TractorConfig};

/// Drive the simulator with a trained tractor agent
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Parameters of the trained model
    #[arg(default_value = "tractor_model_final.safetensors")]
    model: PathBuf,

    /// YAML configuration, defaults are used for missing sections
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = TractorConfig::load_or_default(args.config.as_deref())?;

    evaluate(&config, &args.model, stop_on_interrupt()?)
}
