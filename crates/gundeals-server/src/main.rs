mod api;
mod middleware;
mod policy;

use std::sync::Arc;

use clap::Parser;
use gundeals_scraper::Pipeline;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[derive(Debug, Parser)]
#[command(name = "gundeals-server")]
#[command(about = "JSON API over gun.deals listings, search, products and coupons")]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "GUNDEALS_HOST", default_value = "localhost")]
    host: String,

    #[arg(long, env = "GUNDEALS_PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = gundeals_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = Pipeline::from_config(&config)?;
    tracing::info!(
        env = %config.env,
        site = %config.site_url,
        link_domain = %config.link_domain,
        "scrape pipeline ready"
    );

    let app = build_app(AppState {
        pipeline: Arc::new(pipeline),
    });

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
