use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::ax_state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "splice_mode": state.synthesizer.mode(),
        "database_connected": state.store.is_connected(),
        "sessions": state.sessions.len(),
    }))
}

/// 按展示顺序列出全部预置查询标题
pub async fn list_queries(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let titles: Vec<&str> = state.catalog.titles().collect();
    Json(json!({ "titles": titles }))
}

/// 轨道天体下拉框的候选值 (失败时为空列表)
pub async fn list_orbiting_bodies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let bodies = state.store.orbiting_bodies().await;
    Json(json!({ "orbiting_bodies": bodies }))
}
