use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shrimaya::config::AppConfig;
use shrimaya::db;
use shrimaya::handlers;
use shrimaya::services::ai::ollama::OllamaProvider;
use shrimaya::services::ai::openai::OpenAiProvider;
use shrimaya::services::ai::LlmProvider;
use shrimaya::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let timeout = Duration::from_secs(config.llm_timeout_secs);
    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                timeout,
            ))
        }
        _ => {
            anyhow::ensure!(
                !config.openai_api_key.is_empty(),
                "OPENAI_API_KEY must be set when LLM_PROVIDER=openai"
            );
            tracing::info!("using OpenAI LLM provider (model: {})", config.openai_model);
            Box::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                timeout,
            ))
        }
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        llm,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/menu-items", get(handlers::menu::list_menu_items))
        .route(
            "/api/menu-items/bulk-insert",
            post(handlers::menu::bulk_insert),
        )
        .route("/api/categories", get(handlers::menu::list_categories))
        .route("/api/cart/add", post(handlers::cart::add_to_cart))
        .route("/api/cart/remove", post(handlers::cart::remove_from_cart))
        .route(
            "/api/cart/remove-item",
            post(handlers::cart::remove_cart_item),
        )
        .route("/api/cart/:table_id", get(handlers::cart::get_cart))
        .route(
            "/api/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route(
            "/api/orders/:id/status",
            post(handlers::orders::update_order_status),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/ai-order", post(handlers::chat::ai_order))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
