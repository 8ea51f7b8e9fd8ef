use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::synthesizer::SpliceMode;
use crate::models::filter::FilterState;

/// 单个仪表盘会话：过滤条件 + 当前选中的查询
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardSession {
    pub filters: FilterState,
    pub selected_title: String,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    #[serde(flatten)]
    pub session: DashboardSession,
}

#[derive(Debug, Deserialize)]
pub struct SelectQueryRequest {
    pub title: String,
}

/// 无状态调用：直接携带标题与过滤条件
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub title: String,
    #[serde(default)]
    pub filters: FilterState,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub title: String,
    #[serde(default)]
    pub filters: FilterState,
    /// 覆盖配置中的拼接模式
    pub mode: Option<SpliceMode>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub filters: FilterState,
}

/// 有序的结果表：列名顺序与 SELECT 列表一致
#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// 查询成功但没有返回行，不是错误
    Empty,
    /// 标题暂时无效 (例如界面重绘期间)，没有可执行的查询
    NothingToRun,
}

#[derive(Debug, Serialize)]
pub struct RunMeta {
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: RunStatus,
    pub title: String,
    pub sql: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub meta: RunMeta,
}

impl RunResponse {
    pub fn nothing_to_run(title: String) -> Self {
        Self {
            status: RunStatus::NothingToRun,
            title,
            sql: None,
            columns: Vec::new(),
            rows: Vec::new(),
            meta: RunMeta { row_count: 0 },
        }
    }

    pub fn from_table(title: String, sql: String, table: ResultTable) -> Self {
        let row_count = table.rows.len();
        Self {
            status: if row_count == 0 {
                RunStatus::Empty
            } else {
                RunStatus::Success
            },
            title,
            sql: Some(sql),
            columns: table.columns,
            rows: table.rows,
            meta: RunMeta { row_count },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub title: String,
    pub mode: SpliceMode,
    pub sql: Option<String>,
    pub predicates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub unique_asteroids: i64,
    pub sql: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_table_reports_empty_status() {
        let resp = RunResponse::from_table("t".into(), "SELECT 1".into(), ResultTable::default());
        assert_eq!(resp.status, RunStatus::Empty);
        assert_eq!(resp.meta.row_count, 0);
    }

    #[test]
    fn populated_table_reports_success() {
        let table = ResultTable {
            columns: vec!["asteroid_name".into()],
            rows: vec![vec![json!("433 Eros")], vec![json!("99942 Apophis")]],
        };
        let resp = RunResponse::from_table("t".into(), "SELECT 1".into(), table);
        assert_eq!(resp.status, RunStatus::Success);
        assert_eq!(resp.meta.row_count, 2);
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["columns"][0], "asteroid_name");
    }

    #[test]
    fn snapshot_flattens_session() {
        let snapshot = SessionSnapshot {
            id: Uuid::nil(),
            session: DashboardSession {
                filters: FilterState::default(),
                selected_title: "0. All Filtered Asteroid Details".into(),
            },
        };
        let body = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(body["selected_title"], "0. All Filtered Asteroid Details");
        assert_eq!(body["filters"]["hazard_flag"], "any");
    }
}
