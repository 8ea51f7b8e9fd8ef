use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

use crate::models::session::ResultTable;

/// 按 MySQL 原生类型名把一个单元格转成 JSON；取值失败时为 null
fn cell_to_json(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    match type_name {
        "BOOLEAN" => json!(row.try_get::<Option<bool>, _>(idx).unwrap_or(None)),
        "TINYINT" | "SMALLINT" | "INT" | "MEDIUMINT" => {
            json!(row.try_get::<Option<i32>, _>(idx).unwrap_or(None))
        }
        "BIGINT" => json!(row.try_get::<Option<i64>, _>(idx).unwrap_or(None)),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "INT UNSIGNED" | "MEDIUMINT UNSIGNED"
        | "BIGINT UNSIGNED" => json!(row.try_get::<Option<u64>, _>(idx).unwrap_or(None)),
        "FLOAT" => json!(row.try_get::<Option<f32>, _>(idx).unwrap_or(None)),
        "DOUBLE" => json!(row.try_get::<Option<f64>, _>(idx).unwrap_or(None)),
        "DECIMAL" => {
            // AVG 等聚合返回 DECIMAL，前端按数值展示
            let v: Option<rust_decimal::Decimal> = row.try_get(idx).unwrap_or(None);
            json!(v.and_then(|d| d.to_f64()))
        }
        "DATE" => {
            let v: Option<NaiveDate> = row.try_get(idx).unwrap_or(None);
            json!(v.map(|d| d.to_string()))
        }
        "DATETIME" | "TIMESTAMP" => {
            let v: Option<NaiveDateTime> = row.try_get(idx).unwrap_or(None);
            json!(v.map(|dt| dt.to_string()))
        }
        _ => {
            // 文本类及未知类型 (GROUP_CONCAT 可能返回 BLOB)，尽量转成字符串
            match row.try_get::<Option<String>, _>(idx) {
                Ok(v) => json!(v),
                Err(_) => {
                    let bytes: Option<Vec<u8>> = row.try_get(idx).unwrap_or(None);
                    json!(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
                }
            }
        }
    }
}

pub fn mysql_rows_to_table(rows: &[MySqlRow]) -> ResultTable {
    let Some(first) = rows.first() else {
        return ResultTable::default();
    };

    let columns = first
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let type_names: Vec<String> = first
        .columns()
        .iter()
        .map(|col| col.type_info().name().to_string())
        .collect();

    let rows = rows
        .iter()
        .map(|row| {
            type_names
                .iter()
                .enumerate()
                .map(|(idx, type_name)| cell_to_json(row, idx, type_name))
                .collect()
        })
        .collect();

    ResultTable { columns, rows }
}
