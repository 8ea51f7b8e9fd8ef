use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::query::{count_matching, execute_title};
use crate::ax_state::AppState;
use crate::error::AppError;
use crate::models::filter::FilterState;
use crate::models::session::{RunResponse, SelectQueryRequest, SessionSnapshot, SummaryResponse};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let (id, session) = state.sessions.create();
    (StatusCode::CREATED, Json(SessionSnapshot { id, session }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(SessionSnapshot { id, session }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id)?;
    info!("会话已关闭: id={}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_filters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(filters): Json<FilterState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.replace_filters(id, filters)?;
    Ok(Json(SessionSnapshot { id, session }))
}

pub async fn reset_filters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.reset_filters(id)?;
    Ok(Json(SessionSnapshot { id, session }))
}

pub async fn select_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectQueryRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.select(id, &payload.title)?;
    Ok(Json(SessionSnapshot { id, session }))
}

/// 切换到明细查询，查看满足过滤条件的小行星
pub async fn view_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.select(id, state.catalog.detail_title())?;
    Ok(Json(SessionSnapshot { id, session }))
}

pub async fn run_selected(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunResponse>, AppError> {
    let session = state.sessions.get(id)?;
    execute_title(&state, session.selected_title, &session.filters)
        .await
        .map(Json)
}

pub async fn session_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = state.sessions.get(id)?;
    count_matching(&state, &session.filters).await.map(Json)
}
