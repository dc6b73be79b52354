use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use grammar_fixer_api::api::{router, AppState};
use grammar_fixer_api::config::Config;
use grammar_fixer_api::detector::{Detector, NoopDetector, OllamaDetector};
use grammar_fixer_api::grammar::GrammarFixer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let config = Config::load();

    let detector: Arc<dyn Detector> = if config.use_ollama {
        info!(
            "using Ollama detector at {} with model '{}'",
            config.ollama_url, config.ollama_model
        );
        Arc::new(OllamaDetector::new(&config.ollama_url, &config.ollama_model))
    } else {
        info!("no detector configured, using placeholder (no corrections)");
        Arc::new(NoopDetector)
    };

    let state = Arc::new(AppState {
        fixer: GrammarFixer::new(detector),
    });
    let app = router(state);

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
