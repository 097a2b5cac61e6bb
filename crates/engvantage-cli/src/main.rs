//! engvantage CLI — interactive vocabulary trainer.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use engvantage_core::audio::NullPlayer;
use engvantage_core::session::SessionController;
use engvantage_core::stats::StatsStore;
use engvantage_gateway::{create_gateway, load_config_from};

mod app;

#[derive(Parser)]
#[command(name = "engvantage", version, about = "AI-powered vocabulary trainer")]
struct Cli {
    /// Config file path (default: engvantage.toml, then
    /// ~/.config/engvantage/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("engvantage=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_from(cli.config.as_deref())?;
    let gateway = create_gateway(&config.gateway, Arc::new(NullPlayer))?;
    let store = StatsStore::open()?;
    let mut controller =
        SessionController::new(gateway, store).with_word_count(config.word_count);

    app::run(&mut controller).await
}
