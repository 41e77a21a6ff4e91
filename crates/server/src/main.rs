use std::path::PathBuf;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

mod routes;

#[derive(Clone)]
pub struct AppState {
    /// Directory served as static files
    pub data_dir: PathBuf,
    /// Dataset file name inside `data_dir` used by `/api/summary`
    pub dataset: String,
}

impl AppState {
    fn from_env() -> Self {
        Self {
            data_dir: std::env::var("STOCKWALK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            dataset: std::env::var("STOCKWALK_DATASET")
                .unwrap_or_else(|_| "stock_dummy_data.csv".to_string()),
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }
}

pub fn app(state: AppState) -> Router {
    let files = ServeDir::new(&state.data_dir);
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/summary", get(routes::summary))
        .fallback_service(files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let state = AppState::from_env();
    let addr = std::env::var("STOCKWALK_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    tracing::info!("Serving {} from {}", state.dataset, state.data_dir.display());

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            return;
        }
    };
    tracing::info!("Data host running on http://{addr}");
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {e}");
    }
}
