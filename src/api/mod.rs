pub mod catalog;
pub mod query;
pub mod session;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::ax_state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(catalog::health))
        .route("/api/queries", get(catalog::list_queries))
        .route("/api/orbiting-bodies", get(catalog::list_orbiting_bodies))
        .route("/api/preview", post(query::preview_query))
        .route("/api/query", post(query::run_query))
        .route("/api/summary", post(query::filter_summary))
        .route("/api/sessions", post(session::create_session))
        .route(
            "/api/sessions/{id}",
            get(session::get_session).delete(session::delete_session),
        )
        .route(
            "/api/sessions/{id}/filters",
            put(session::replace_filters).delete(session::reset_filters),
        )
        .route("/api/sessions/{id}/selection", put(session::select_query))
        .route("/api/sessions/{id}/view-details", post(session::view_details))
        .route("/api/sessions/{id}/run", post(session::run_selected))
        .route("/api/sessions/{id}/summary", get(session::session_summary))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StoreSettings};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // 连接池是惰性的，这些路由都不会触碰数据库
    fn app() -> Router {
        router(Arc::new(AppState::new(&AppConfig::default())))
    }

    // 指向本机未监听的端口，任何访问数据库的路由都会立刻失败
    fn offline_app() -> Router {
        let config = AppConfig {
            store: StoreSettings {
                database_url: "mysql://root@127.0.0.1:1/project_1".to_string(),
                connect_timeout: std::time::Duration::from_secs(2),
                ..StoreSettings::default()
            },
            ..AppConfig::default()
        };
        router(Arc::new(AppState::new(&config)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_lazy_pool() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["splice_mode"], "compatible");
        assert_eq!(body["database_connected"], false);
    }

    #[tokio::test]
    async fn lists_titles_in_catalog_order() {
        let (status, body) = send(&app(), Method::GET, "/api/queries", None).await;
        assert_eq!(status, StatusCode::OK);
        let titles = body["titles"].as_array().unwrap();
        assert_eq!(titles.len(), 21);
        assert_eq!(titles[0], "0. All Filtered Asteroid Details");
        assert_eq!(
            titles[20],
            "20. Count the number of approaches grouped by velocity ranges (e.g., <20k, 20k-50k, >50k km/h)"
        );
    }

    #[tokio::test]
    async fn preview_renders_generated_sql() {
        let request = json!({
            "title": "7. Sort asteroids by maximum estimated diameter (descending)",
            "filters": { "name_substring": "6" }
        });
        let (status, body) = send(&app(), Method::POST, "/api/preview", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicates"], json!(["name LIKE '%6%'"]));
        let sql = body["sql"].as_str().unwrap();
        assert!(sql.contains("asteroids\nWHERE name LIKE '%6%'\nORDER BY"));
    }

    #[tokio::test]
    async fn preview_honours_mode_override() {
        let request = json!({
            "title": "16. Find asteroids with specific orbit characteristics (e.g., a specific orbit ID pattern)",
            "filters": { "hazard_flag": "Yes" },
            "mode": "scoped"
        });
        let (status, body) = send(&app(), Method::POST, "/api/preview", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "scoped");
        assert!(body["sql"].as_str().unwrap().contains("= TRUE\n;"));
    }

    #[tokio::test]
    async fn preview_of_unknown_title_has_no_sql() {
        let request = json!({ "title": "42. Missing" });
        let (status, body) = send(&app(), Method::POST, "/api/preview", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sql"], Value::Null);
        assert_eq!(body["predicates"], json!([]));
    }

    #[tokio::test]
    async fn invalid_filters_are_rejected() {
        let request = json!({
            "title": "0. All Filtered Asteroid Details",
            "filters": { "velocity_range": { "min": 90000.0, "max": 1000.0 } }
        });
        let (status, body) = send(&app(), Method::POST, "/api/preview", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_filter");
    }

    #[tokio::test]
    async fn unknown_title_is_nothing_to_run() {
        let request = json!({ "title": "42. Missing", "filters": {} });
        let (status, body) = send(&app(), Method::POST, "/api/query", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "nothing_to_run");
        assert_eq!(body["meta"]["row_count"], 0);
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let app = app();
        let (status, created) = send(&app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["selected_title"], "0. All Filtered Asteroid Details");

        let filters = json!({
            "hazard_flag": "hazardous_only",
            "orbiting_bodies": ["Earth", "Mars", "Earth"]
        });
        let (status, updated) =
            send(&app, Method::PUT, &format!("/api/sessions/{id}/filters"), Some(filters)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["filters"]["orbiting_bodies"], json!(["Earth", "Mars"]));

        let select = json!({ "title": "5. Find the month with the most asteroid approaches" });
        let (status, selected) =
            send(&app, Method::PUT, &format!("/api/sessions/{id}/selection"), Some(select)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(selected["selected_title"], "5. Find the month with the most asteroid approaches");

        let (status, details) =
            send(&app, Method::POST, &format!("/api/sessions/{id}/view-details"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["selected_title"], "0. All Filtered Asteroid Details");

        let (status, reset) =
            send(&app, Method::DELETE, &format!("/api/sessions/{id}/filters"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["filters"]["hazard_flag"], "any");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "session_not_found");
    }

    #[tokio::test]
    async fn selecting_unknown_title_is_not_found() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/sessions", None).await;
        let id = created["id"].as_str().unwrap().to_string();
        let select = json!({ "title": "nope" });
        let (status, body) =
            send(&app, Method::PUT, &format!("/api/sessions/{id}/selection"), Some(select)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "unknown_title");
    }

    #[tokio::test]
    async fn running_missing_session_is_not_found() {
        let uri = format!("/api/sessions/{}/run", uuid::Uuid::new_v4());
        let (status, body) = send(&app(), Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "session_not_found");
    }

    #[tokio::test]
    async fn orbiting_bodies_degrade_to_empty_list() {
        let (status, body) = send(&offline_app(), Method::GET, "/api/orbiting-bodies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "orbiting_bodies": [] }));
    }

    #[tokio::test]
    async fn unreachable_store_is_service_unavailable() {
        let app = offline_app();
        let request = json!({ "title": "0. All Filtered Asteroid Details", "filters": {} });
        let (status, body) = send(&app, Method::POST, "/api/query", Some(request)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "connectivity");
        assert!(body.get("sql").is_none());

        let (status, body) = send(&app, Method::POST, "/api/summary", Some(json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "connectivity");
    }
}
