use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::core::scanner::Scanner;
use crate::models::filter::{
    FilterState, RangeFilter, ASTRONOMICAL_SPAN, DIAMETER_SPAN, MAGNITUDE_SPAN, VELOCITY_SPAN,
};

/// 多个条件之间的连接方式，每个条件独占一行便于展示
const PREDICATE_SEPARATOR: &str = "\n  AND ";

/// WHERE 拼接策略
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpliceMode {
    /// 纯关键字边界扫描，与仪表盘的原有行为一致
    #[default]
    Compatible,
    /// 只认顶层关键字 (括号、字符串、注释之外)，顶层 `;` 也作为边界
    Scoped,
}

impl FromStr for SpliceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compatible" | "compat" => Ok(Self::Compatible),
            "scoped" => Ok(Self::Scoped),
            other => Err(anyhow::anyhow!("unknown splice mode: {other}")),
        }
    }
}

/// 某张表是否出现在模板中，以及使用的别名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableReference {
    pub present: bool,
    pub alias: Option<&'static str>,
}

impl TableReference {
    /// 按别名限定列名；无别名时原样返回
    pub fn column(&self, name: &str) -> String {
        match self.alias {
            Some(alias) => format!("{alias}.{name}"),
            None => name.to_string(),
        }
    }
}

/// 模板中两张表的出现情况。每次合成时重新计算，不做缓存。
///
/// 检测依赖目录 SQL 的书写约定：表名紧跟 FROM/JOIN，别名固定写作
/// `AS a` / `AS ca`。其它写法 (隐式别名、反引号表名) 不会被识别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableUsage {
    pub asteroids: TableReference,
    pub close_approach: TableReference,
}

impl TableUsage {
    pub fn detect(base_query: &str, mode: SpliceMode) -> Self {
        // 大写并把连续空白压成一个空格，`FROM\n    asteroids` 也能命中
        let text = base_query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        let bounded = mode == SpliceMode::Scoped;
        let has = |phrases: [&str; 2]| phrases.iter().any(|p| contains_phrase(&text, p, bounded));

        Self {
            asteroids: TableReference {
                present: has(["FROM ASTEROIDS", "JOIN ASTEROIDS"]),
                alias: has(["FROM ASTEROIDS AS A", "JOIN ASTEROIDS AS A"]).then_some("a"),
            },
            close_approach: TableReference {
                present: has(["FROM CLOSE_APPROACH", "JOIN CLOSE_APPROACH"]),
                alias: has(["FROM CLOSE_APPROACH AS CA", "JOIN CLOSE_APPROACH AS CA"])
                    .then_some("ca"),
            },
        }
    }
}

fn contains_phrase(text: &str, phrase: &str, bounded: bool) -> bool {
    if !bounded {
        return text.contains(phrase);
    }
    text.match_indices(phrase).any(|(idx, _)| {
        let before = text[..idx].chars().next_back();
        let after = text[idx + phrase.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn between(column: String, range: &RangeFilter) -> String {
    format!("{column} BETWEEN {} AND {}", range.min, range.max)
}

/// 把过滤状态翻译成限定好的谓词列表，只为模板中出现的表生成条件。
///
/// 名称片段和轨道天体原样拼进 SQL，不做转义。
pub fn build_predicates(usage: &TableUsage, filters: &FilterState) -> Vec<String> {
    let asteroids = &usage.asteroids;
    let approach = &usage.close_approach;
    let mut predicates = Vec::new();

    if asteroids.present {
        if let Some(fragment) = filters.name_fragment() {
            predicates.push(format!("{} LIKE '%{fragment}%'", asteroids.column("name")));
        }
        if let Some(literal) = filters.hazard_flag.sql_literal() {
            predicates.push(format!(
                "{} = {literal}",
                asteroids.column("is_potentially_hazardous_asteroid")
            ));
        }
    }

    if approach.present {
        if filters.velocity_range.narrows(&VELOCITY_SPAN) {
            predicates.push(between(
                approach.column("relative_velocity_kmph"),
                &filters.velocity_range,
            ));
        }
        if let Some(range) = filters.date_range.filter(|r| r.is_ordered()) {
            predicates.push(format!(
                "{} BETWEEN '{}' AND '{}'",
                approach.column("close_approach_date"),
                range.start.format("%Y-%m-%d"),
                range.end.format("%Y-%m-%d"),
            ));
        }
    }

    if asteroids.present {
        if filters.magnitude_range.narrows(&MAGNITUDE_SPAN) {
            predicates.push(between(
                asteroids.column("absolute_magnitude_h"),
                &filters.magnitude_range,
            ));
        }
        if filters.diameter_range.narrows(&DIAMETER_SPAN) {
            predicates.push(between(
                asteroids.column("estimated_diameter_min_km"),
                &filters.diameter_range,
            ));
        }
    }

    if approach.present {
        if filters.astronomical_range.narrows(&ASTRONOMICAL_SPAN) {
            predicates.push(between(
                approach.column("astronomical"),
                &filters.astronomical_range,
            ));
        }
        if !filters.orbiting_bodies.is_empty() {
            let quoted: Vec<String> = filters
                .orbiting_bodies
                .iter()
                .map(|body| format!("'{body}'"))
                .collect();
            predicates.push(format!(
                "{} IN ({})",
                approach.column("orbiting_body"),
                quoted.join(", ")
            ));
        }
    }

    predicates
}

/// `WHERE p1\n  AND p2 ...`；没有谓词时为空串
pub fn where_clause(predicates: &[String]) -> String {
    if predicates.is_empty() {
        return String::new();
    }
    format!("WHERE {}", predicates.join(PREDICATE_SEPARATOR))
}

/// 把谓词拼进模板：插在第一个 GROUP BY / HAVING / ORDER BY / LIMIT 之前，
/// 已有 WHERE 时用 AND 追加。尾部原样保留。
pub fn splice(base_query: &str, predicates: &[String], mode: SpliceMode) -> String {
    if predicates.is_empty() {
        return base_query.to_string();
    }
    let conditions = predicates.join(PREDICATE_SEPARATOR);

    let scanner = match mode {
        SpliceMode::Compatible => Scanner::compatible(base_query),
        SpliceMode::Scoped => Scanner::scoped(base_query),
    };
    let boundary = scanner.clause_boundary();
    let tail = base_query[boundary..].trim();

    let mut sql = match scanner.where_end(boundary) {
        Some(where_end) => {
            let keyword_part = base_query[..where_end].trim_start();
            let existing = base_query[where_end..boundary].trim();
            if existing.is_empty() {
                format!("{keyword_part} {conditions}")
            } else {
                format!("{keyword_part} {existing}{PREDICATE_SEPARATOR}{conditions}")
            }
        }
        None => format!("{}\n{}", base_query[..boundary].trim(), where_clause(predicates)),
    };

    if !tail.is_empty() {
        sql.push('\n');
        sql.push_str(tail);
    }
    sql
}

/// 过滤子句合成器：`(模板, 过滤状态) -> 最终 SQL` 的纯函数，自身不持有状态
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterSynthesizer {
    mode: SpliceMode,
}

impl FilterSynthesizer {
    pub fn new(mode: SpliceMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SpliceMode {
        self.mode
    }

    pub fn predicates(&self, base_query: &str, filters: &FilterState) -> Vec<String> {
        let usage = TableUsage::detect(base_query, self.mode);
        build_predicates(&usage, filters)
    }

    pub fn synthesize(&self, base_query: &str, filters: &FilterState) -> String {
        let predicates = self.predicates(base_query, filters);
        debug!(mode = ?self.mode, count = predicates.len(), "生成过滤条件: {:?}", predicates);
        splice(base_query, &predicates, self.mode)
    }
}

/// 兼容模式下的合成
pub fn synthesize(base_query: &str, filters: &FilterState) -> String {
    FilterSynthesizer::default().synthesize(base_query, filters)
}
