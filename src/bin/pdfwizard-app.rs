use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tower_http::trace::TraceLayer;

use pdfwizard::app::routes::{AppState, router};
use pdfwizard::auth::AccessGate;
use pdfwizard::cli::LlmEngine;
use pdfwizard::config::AppConfig;
use pdfwizard::generator::{self, TextGenerator};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[arg(long, value_enum, default_value_t = LlmEngine::Openai)]
    engine: LlmEngine,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    pdfwizard::logging::init()?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting pdfwizard-app");

    let config = AppConfig::from_env().context("load app config")?;
    let generator: Arc<dyn TextGenerator> = Arc::from(generator::from_engine(args.engine)?);
    let state = AppState::new(AccessGate::new(&config.password), generator);

    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
