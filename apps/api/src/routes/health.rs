use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
/// Returns service status, version, the model in use and the number of
/// cached rule sets (`null` when the cache directory cannot be read).
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let cache_entries = match state.extractor.cache().entry_count() {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Could not count cache entries: {e}");
            None
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tatatulis",
        "model": crate::llm_client::MODEL,
        "cache_entries": cache_entries
    }))
}
