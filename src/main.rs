use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use research_assistant::{config::Config, db, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_assistant=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    if config.search.tavily_api_key.is_none() {
        warn!("TAVILY_API_KEY is not set, /tools/search_web will report a configuration error");
    }
    if config.llm.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, /tools/ask_ai will report a configuration error");
    }

    // Optional tool-call sink
    let pool = db::connect_optional(&config.database).await?;
    match &pool {
        Some(_) => info!("Tool call logging enabled"),
        None => info!("DATABASE_URL not set, tool call logging disabled"),
    }

    // Create shared state
    let state = AppState::from_config(config.clone(), db::ToolCallLog::new(pool))?;

    // Create router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
