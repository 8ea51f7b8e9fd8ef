use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// 对外暴露的错误类型。合成器本身从不返回错误，所有失败都发生在执行阶段。
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库不可达或凭据被拒绝
    #[error("database unreachable: {0}")]
    Connectivity(String),

    /// 生成的 SQL 执行失败，附带出错的 SQL 供用户调整过滤条件
    #[error("query execution failed: {message}")]
    Execution { message: String, sql: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unknown query title: {0}")]
    UnknownTitle(String),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Execution { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            Self::UnknownTitle(_) | Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Connectivity(_) => "connectivity",
            Self::Execution { .. } => "execution",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::UnknownTitle(_) => "unknown_title",
            Self::SessionNotFound(_) => "session_not_found",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let Self::Execution { sql, .. } = &self {
            body["sql"] = json!(sql);
        }
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_maps_to_unprocessable() {
        let err = AppError::Execution {
            message: "Unknown column 'ca.name'".into(),
            sql: "SELECT 1".into(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "execution");
        assert!(err.to_string().contains("Unknown column"));
    }

    #[test]
    fn connectivity_is_service_unavailable() {
        let err = AppError::Connectivity("refused".into());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn every_kind_maps_to_a_non_server_status() {
        let errors = [
            AppError::Connectivity("refused".into()),
            AppError::Execution { message: "bad".into(), sql: "SELECT".into() },
            AppError::InvalidFilter("velocity".into()),
            AppError::UnknownTitle("nope".into()),
            AppError::SessionNotFound(Uuid::nil()),
        ];
        let kinds: Vec<&str> = errors.iter().map(AppError::kind).collect();
        assert_eq!(
            kinds,
            ["connectivity", "execution", "invalid_filter", "unknown_title", "session_not_found"]
        );
        assert!(errors
            .iter()
            .all(|e| e.status_code() != StatusCode::INTERNAL_SERVER_ERROR));
    }
}
