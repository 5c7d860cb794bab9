use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use fare_model::{FareModel, TripInput};
use std::{net::IpAddr, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

mod form;
mod server;
mod types;

#[derive(Parser, Debug)]
#[command(name = "fare_predictor", version, about = "Estimate a taxi fare from a trained bundle")]
struct Cli {
    /// Directory holding scaler.json, model.json and expected_columns.json
    #[arg(long, env = "FARE_ARTIFACT_DIR", default_value = "artifacts", global = true)]
    artifacts: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in one trip interactively and print the estimate
    Form,
    /// Answer POST /predict with a JSON estimate
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
        bind: IpAddr,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let model = FareModel::load(&cli.artifacts)
        .with_context(|| format!("failed to load artifact bundle from {}", cli.artifacts.display()))?;

    match cli.command {
        Command::Form => form::run(&model),
        Command::Serve { bind, port } => {
            // Warmup on the default trip so a bad bundle fails before we bind
            let warm = model
                .predict(&TripInput::default_on(Local::now().date_naive()))
                .context("warmup prediction failed")?;
            tracing::info!("warmup ok, default trip estimate {}", warm);
            tracing::info!("loaded model; feat_list[{}]: {:?}", model.layout().len(), model.layout().columns());

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(server::serve(Arc::new(model), SocketAddr::new(bind, port)))
        }
    }
}
