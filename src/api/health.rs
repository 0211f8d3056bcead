use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::config::{FlipPolicy, UnrealizedPolicy};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness plus the matching policies this instance applies.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let policy = state.analyzer.policy();
    let flip = match policy.flip {
        FlipPolicy::Reverse => "reverse",
        FlipPolicy::Discard => "discard",
    };
    let unrealized = match policy.unrealized {
        UnrealizedPolicy::MarkToLast => "mark",
        UnrealizedPolicy::Exclude => "exclude",
    };
    Json(serde_json::json!({
        "status": "ready",
        "flipPolicy": flip,
        "unrealizedPnl": unrealized,
    }))
}
