use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::ax_state::AppState;
use crate::core::catalog::SUMMARY_COUNT_QUERY;
use crate::core::synthesizer::{synthesize, FilterSynthesizer};
use crate::error::AppError;
use crate::models::filter::FilterState;
use crate::models::session::{
    PreviewRequest, PreviewResponse, QueryRequest, RunResponse, SummaryRequest, SummaryResponse,
};

/// 选中模板 + 过滤条件 -> 合成 SQL -> 执行。
/// 标题无效时返回 "无可执行"，不视为错误。
pub async fn execute_title(
    state: &AppState,
    title: String,
    filters: &FilterState,
) -> Result<RunResponse, AppError> {
    let Some(base) = state.catalog.get(&title) else {
        warn!("查询标题不存在，跳过执行: {}", title);
        return Ok(RunResponse::nothing_to_run(title));
    };

    let sql = state.synthesizer.synthesize(base, filters);
    info!("执行分析查询: {}", title);
    let table = state.store.fetch_table(&sql).await?;
    Ok(RunResponse::from_table(title, sql, table))
}

/// 过滤摘要：满足全部过滤条件的小行星数量。
/// 计数查询没有分组或排序子句，固定走兼容模式。
pub async fn count_matching(
    state: &AppState,
    filters: &FilterState,
) -> Result<SummaryResponse, AppError> {
    let sql = synthesize(SUMMARY_COUNT_QUERY, filters);
    let unique_asteroids = state.store.fetch_count(&sql).await?;
    info!("过滤摘要: {} 个小行星满足条件", unique_asteroids);
    Ok(SummaryResponse {
        unique_asteroids,
        sql,
    })
}

pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let filters = payload.filters.normalized()?;
    execute_title(&state, payload.title, &filters).await.map(Json)
}

/// 只生成 SQL，不访问数据库
pub async fn preview_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let filters = payload.filters.normalized()?;
    let synthesizer = payload
        .mode
        .map(FilterSynthesizer::new)
        .unwrap_or(state.synthesizer);

    let (sql, predicates) = match state.catalog.get(&payload.title) {
        Some(base) => (
            Some(synthesizer.synthesize(base, &filters)),
            synthesizer.predicates(base, &filters),
        ),
        None => (None, Vec::new()),
    };

    Ok(Json(PreviewResponse {
        title: payload.title,
        mode: synthesizer.mode(),
        sql,
        predicates,
    }))
}

pub async fn filter_summary(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let filters = payload.filters.normalized()?;
    count_matching(&state, &filters).await.map(Json)
}
