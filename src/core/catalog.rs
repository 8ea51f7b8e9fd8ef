//! 预置分析查询目录。标题唯一，定义顺序即展示顺序。

/// 一条不可变的 (标题, SQL) 模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub title: &'static str,
    pub sql: &'static str,
}

/// 过滤摘要使用的计数查询：显式连接两张表，保证所有过滤条件都能落地
pub const SUMMARY_COUNT_QUERY: &str = "SELECT COUNT(DISTINCT a.id)
FROM asteroids AS a
JOIN close_approach AS ca ON a.id = ca.neo_reference_id";

/// 轨道天体下拉框的候选值
pub const ORBITING_BODIES_QUERY: &str = "SELECT DISTINCT orbiting_body FROM close_approach WHERE orbiting_body IS NOT NULL ORDER BY orbiting_body";

static TEMPLATES: &[QueryTemplate] = &[
    QueryTemplate {
        title: "0. All Filtered Asteroid Details",
        sql: r#"
        SELECT
            a.id,
            a.name,
            a.absolute_magnitude_h,
            a.estimated_diameter_min_km,
            a.estimated_diameter_max_km,
            a.is_potentially_hazardous_asteroid,
            ca.close_approach_date,
            ca.relative_velocity_kmph,
            ca.astronomical,
            ca.miss_distance_km,
            ca.miss_distance_lunar,
            ca.orbiting_body
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
    "#,
    },
    QueryTemplate {
        title: "1. Count how many times each asteroid has approached Earth",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            COUNT(a.id) AS number_of_approaches
        FROM
            asteroids AS a
        LEFT JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        GROUP BY
            a.name
        ORDER BY
            number_of_approaches DESC, a.name;
    "#,
    },
    QueryTemplate {
        title: "2. Average velocity of each asteroid over multiple approaches",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            AVG(ca.relative_velocity_kmph) AS average_velocity_kmph
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        GROUP BY
            a.name
        HAVING
            COUNT(a.id) > 1
        ORDER BY
            average_velocity_kmph DESC;
    "#,
    },
    QueryTemplate {
        title: "3. List top 10 fastest asteroids (based on any approach)",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            MAX(ca.relative_velocity_kmph) AS fastest_velocity_kmph,
            ca.close_approach_date
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        GROUP BY
            a.name, ca.close_approach_date
        ORDER BY
            fastest_velocity_kmph DESC
        LIMIT 10;
    "#,
    },
    QueryTemplate {
        title: "4. Find potentially hazardous asteroids that have approached Earth more than 3 times",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            COUNT(a.id) AS number_of_approaches
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            a.is_potentially_hazardous_asteroid = TRUE
        GROUP BY
            a.name
        HAVING
            COUNT(a.id) > 3
        ORDER BY
            number_of_approaches DESC;
    "#,
    },
    QueryTemplate {
        title: "5. Find the month with the most asteroid approaches",
        sql: r#"
        SELECT
            DATE_FORMAT(close_approach_date, '%Y-%m') AS approach_month,
            COUNT(neo_reference_id) AS approaches_count
        FROM
            close_approach
        GROUP BY
            approach_month
        ORDER BY
            approaches_count DESC
        LIMIT 1;
    "#,
    },
    QueryTemplate {
        title: "6. Get the asteroid with the fastest ever approach speed",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            ca.relative_velocity_kmph,
            ca.close_approach_date
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        ORDER BY
            ca.relative_velocity_kmph DESC
        LIMIT 1;
    "#,
    },
    QueryTemplate {
        title: "7. Sort asteroids by maximum estimated diameter (descending)",
        sql: r#"
        SELECT
            name AS asteroid_name,
            estimated_diameter_max_km
        FROM
            asteroids
        ORDER BY
            estimated_diameter_max_km DESC;
    "#,
    },
    QueryTemplate {
        title: "8. An asteroid whose closest approach is getting nearer over time (decreasing astronomical distance for later dates)",
        sql: r#"
        SELECT DISTINCT
            a.name AS asteroid_name
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca1 ON a.id = ca1.neo_reference_id
        JOIN
            close_approach AS ca2 ON a.id = ca2.neo_reference_id
        WHERE
            ca1.close_approach_date < ca2.close_approach_date
            AND ca1.astronomical > ca2.astronomical -- Using 'astronomical' for AU distance
        GROUP BY
            a.name
        HAVING
            COUNT(DISTINCT ca1.neo_reference_id) > 1;
    "#,
    },
    QueryTemplate {
        title: "9. Display the name of each asteroid along with the date and miss distance of its closest approach to Earth",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            MIN(ca.astronomical) AS closest_astronomical_distance,
            SUBSTRING_INDEX(GROUP_CONCAT(ca.close_approach_date ORDER BY ca.astronomical ASC), ',', 1) AS closest_approach_date
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        GROUP BY
            a.name
        ORDER BY
            closest_astronomical_distance ASC;
    "#,
    },
    QueryTemplate {
        title: "10. List names of asteroids that approached Earth with velocity > 50,000 km/h",
        sql: r#"
        SELECT DISTINCT
            a.name AS asteroid_name,
            ca.relative_velocity_kmph,
            ca.close_approach_date
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            ca.relative_velocity_kmph > 50000
        ORDER BY
            ca.relative_velocity_kmph DESC;
    "#,
    },
    QueryTemplate {
        title: "11. Count how many approaches happened per month",
        sql: r#"
        SELECT
            DATE_FORMAT(close_approach_date, '%Y-%m') AS approach_month,
            COUNT(neo_reference_id) AS approaches_count
        FROM
            close_approach
        GROUP BY
            approach_month
        ORDER BY
            approach_month;
    "#,
    },
    QueryTemplate {
        title: "12. Find asteroid with the highest brightness (lowest magnitude value)",
        sql: r#"
        SELECT
            name AS asteroid_name,
            absolute_magnitude_h
        FROM
            asteroids
        ORDER BY
            absolute_magnitude_h ASC
        LIMIT 1;
    "#,
    },
    QueryTemplate {
        title: "13. Get number of hazardous vs non-hazardous asteroids",
        sql: r#"
        SELECT
            CASE
                WHEN is_potentially_hazardous_asteroid = TRUE THEN 'Hazardous'
                ELSE 'Non-Hazardous'
            END AS hazard_status,
            COUNT(id) AS asteroid_count
        FROM
            asteroids
        GROUP BY
            hazard_status;
    "#,
    },
    QueryTemplate {
        title: "14. Find asteroids that passed closer than the Moon (lesser than 1 LD), along with their close approach date and distance",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            ca.close_approach_date,
            ca.miss_distance_lunar AS miss_distance_lunar_distances,
            ca.astronomical AS astronomical_units_distance
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            ca.miss_distance_lunar < 1
        ORDER BY
            ca.miss_distance_lunar ASC;
    "#,
    },
    QueryTemplate {
        title: "15. Find asteroids that came within 0.05 AU (astronomical distance)",
        sql: r#"
        SELECT DISTINCT
            a.name AS asteroid_name,
            ca.close_approach_date,
            ca.astronomical
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            ca.astronomical <= 0.05
        ORDER BY
            ca.astronomical ASC;
    "#,
    },
    QueryTemplate {
        title: "16. Find asteroids with specific orbit characteristics (e.g., a specific orbit ID pattern)",
        sql: r#"
        SELECT
            name AS asteroid_name,
            is_potentially_hazardous_asteroid
        FROM
            asteroids
        WHERE
            name LIKE '6%'; -- Example: Finds asteroids where name starts with '6'
    "#,
    },
    QueryTemplate {
        title: "17. Calculate the total number of unique asteroids observed in approaches within a specific year (e.g., 2024)",
        sql: r#"
        SELECT
            COUNT(DISTINCT a.id) AS unique_asteroids_in_year
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            YEAR(ca.close_approach_date) = 2024;
    "#,
    },
    QueryTemplate {
        title: "18. List asteroids that are NOT potentially hazardous but have a very close approach distance (e.g., less than 0.001 AU)",
        sql: r#"
        SELECT DISTINCT
            a.name AS asteroid_name,
            ca.close_approach_date,
            ca.astronomical AS astronomical_distance,
            a.is_potentially_hazardous_asteroid
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        WHERE
            a.is_potentially_hazardous_asteroid = FALSE
            AND ca.astronomical < 0.001
        ORDER BY
            ca.astronomical ASC;
    "#,
    },
    QueryTemplate {
        title: "19. For each asteroid, find its earliest and latest recorded close approach dates",
        sql: r#"
        SELECT
            a.name AS asteroid_name,
            MIN(ca.close_approach_date) AS earliest_approach_date,
            MAX(ca.close_approach_date) AS latest_approach_date,
            COUNT(ca.neo_reference_id) AS total_approaches
        FROM
            asteroids AS a
        JOIN
            close_approach AS ca ON a.id = ca.neo_reference_id
        GROUP BY
            a.name
        ORDER BY
            a.name;
    "#,
    },
    QueryTemplate {
        title: "20. Count the number of approaches grouped by velocity ranges (e.g., <20k, 20k-50k, >50k km/h)",
        sql: r#"
        SELECT
            CASE
                WHEN relative_velocity_kmph < 20000 THEN 'Slow (< 20,000 km/h)'
                WHEN relative_velocity_kmph >= 20000 AND relative_velocity_kmph <= 50000 THEN 'Medium (20,000-50,000 km/h)'
                ELSE 'Fast (> 50,000 km/h)'
            END AS velocity_range,
            COUNT(neo_reference_id) AS number_of_approaches
        FROM
            close_approach
        GROUP BY
            velocity_range
        ORDER BY
            MIN(relative_velocity_kmph);
    "#,
    },
];

/// 目录只读视图
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCatalog;

impl QueryCatalog {
    /// 按标题取模板 SQL (去掉首尾空白)。未知标题返回 None，调用方按 "无可执行" 处理。
    pub fn get(&self, title: &str) -> Option<&'static str> {
        TEMPLATES
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.sql.trim())
    }

    pub fn titles(&self) -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|t| t.title)
    }

    pub fn templates(&self) -> &'static [QueryTemplate] {
        TEMPLATES
    }

    /// 明细查询 (第一条)，也是新会话的默认选择
    pub fn detail_title(&self) -> &'static str {
        TEMPLATES[0].title
    }

    pub fn contains(&self, title: &str) -> bool {
        TEMPLATES.iter().any(|t| t.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn titles_are_unique_and_ordered() {
        let catalog = QueryCatalog;
        let titles: Vec<_> = catalog.titles().collect();
        let unique: HashSet<_> = titles.iter().collect();
        assert_eq!(titles.len(), unique.len());
        assert_eq!(titles.len(), 21);
        for (idx, title) in titles.iter().enumerate() {
            assert!(title.starts_with(&format!("{idx}. ")), "out of order: {title}");
        }
    }

    #[test]
    fn get_trims_template_text() {
        let sql = QueryCatalog
            .get("7. Sort asteroids by maximum estimated diameter (descending)")
            .unwrap();
        assert!(sql.starts_with("SELECT"));
        assert!(sql.ends_with("DESC;"));
    }

    #[test]
    fn unknown_title_is_absent() {
        assert_eq!(QueryCatalog.get("99. Nothing here"), None);
        assert!(!QueryCatalog.contains(""));
    }

    #[test]
    fn detail_title_is_first() {
        assert_eq!(QueryCatalog.detail_title(), "0. All Filtered Asteroid Details");
        assert!(QueryCatalog.contains(QueryCatalog.detail_title()));
    }
}
