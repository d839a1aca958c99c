use std::path::PathBuf;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::ConfigLoader;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "attendance-engine")]
#[command(about = "Punch-clock attendance reconciliation server.")]
struct Args {
    /// Directory holding policy.yaml and an optional roster.yaml
    #[arg(long, default_value = "./config/default")]
    config: PathBuf,
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ConfigLoader::load(&args.config)?;
    info!(
        config = %args.config.display(),
        employees = config.employees().len(),
        cutoff = %config.policy().lateness_cutoff,
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = TcpListener::bind(&args.bind).await?;
    info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, router).await?;

    Ok(())
}
