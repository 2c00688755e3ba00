use quant_desk::config::AppConfig;
use quant_desk::feeds::yahoo::YahooChartProvider;
use quant_desk::feeds::HistoricalQuoteProvider;
use quant_desk::state::AppState;
use quant_desk::{db, server};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("quant_desk starting");

    // Load config
    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    let quotes: Arc<dyn HistoricalQuoteProvider> =
        Arc::new(YahooChartProvider::new(&cfg.quote_api_base_url, cfg.quote_timeout_secs));
    tracing::info!(provider = quotes.name(), base_url = %cfg.quote_api_base_url, "quote provider ready");

    let port = cfg.server_port;
    let app_state = AppState::new(cfg, db_pool, quotes);
    let app = server::create_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
    }

    tracing::info!("quant_desk stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("ctrl-c handler error: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
