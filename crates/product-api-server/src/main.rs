use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use product_api_server::app::build_router;
use product_api_server::catalog::{CatalogLoader, CatalogService, LoadedCatalog};
use product_api_server::config::{CatalogConfig, Settings};
use product_api_server::services::{AnswerProvider, AssistantService, GeminiService};
use product_api_server::state::AppState;
use product_api_server::telemetry::init_telemetry;
use product_api_server::utils::Limiters;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging (guard harus hidup sampai main selesai)
    let _log_guard = init_telemetry(&settings.logging)?;

    info!("🚀 Starting Product API Server...");

    let catalog = Arc::new(CatalogService::new(
        load_catalog(&settings.catalog).await,
        settings.catalog.default_limit,
    ));
    info!(
        "✅ Catalog ready: {} products from {}",
        catalog.len(),
        catalog.origin()
    );

    let provider: Option<Arc<dyn AnswerProvider>> = match settings.gemini.clone() {
        Some(gemini) => {
            let limiters = Arc::new(Limiters::new(&settings.limits));
            let service: Arc<dyn AnswerProvider> = Arc::new(GeminiService::new(
                gemini,
                settings.prompts.system_prompt.clone(),
                limiters,
            )?);
            info!("✅ Gemini provider configured");
            Some(service)
        }
        None => {
            warn!("GEMINI_API_KEY not set, /ask will answer from the catalog only");
            None
        }
    };

    let assistant = Arc::new(AssistantService::new(
        catalog.clone(),
        provider,
        settings.assistant.clone(),
    ));

    let app = build_router(AppState { catalog, assistant });

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Loader is synchronous file I/O, so run it off the async workers with a deadline
async fn load_catalog(config: &CatalogConfig) -> LoadedCatalog {
    let loader = CatalogLoader::new(config.path.clone());
    let deadline = Duration::from_secs(config.load_timeout_seconds.max(1));

    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(move || loader.load_catalog()))
        .await
    {
        Ok(Ok(catalog)) => catalog,
        Ok(Err(e)) => LoadedCatalog::fallback(format!("catalog load task failed: {}", e)),
        Err(_) => LoadedCatalog::fallback(format!("catalog load timed out after {:?}", deadline)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
