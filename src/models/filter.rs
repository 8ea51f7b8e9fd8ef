use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 相对速度滑块的完整范围 (km/h)
pub const VELOCITY_SPAN: RangeFilter = RangeFilter::new(0.0, 200_000.0);
/// 绝对星等 (H) 滑块的完整范围
pub const MAGNITUDE_SPAN: RangeFilter = RangeFilter::new(0.0, 40.0);
/// 估算直径滑块的完整范围 (km)
pub const DIAMETER_SPAN: RangeFilter = RangeFilter::new(0.0, 100.0);
/// 天文单位距离滑块的完整范围 (AU)
pub const ASTRONOMICAL_SPAN: RangeFilter = RangeFilter::new(0.0, 1.0);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HazardFlag {
    #[default]
    #[serde(alias = "All")]
    Any,
    #[serde(alias = "Yes")]
    HazardousOnly,
    #[serde(alias = "No")]
    NonHazardousOnly,
}

impl HazardFlag {
    /// 对应的 SQL 布尔字面量；`Any` 不产生条件
    pub fn sql_literal(self) -> Option<&'static str> {
        match self {
            HazardFlag::Any => None,
            HazardFlag::HazardousOnly => Some("TRUE"),
            HazardFlag::NonHazardousOnly => Some("FALSE"),
        }
    }
}

/// 闭区间数值过滤 `[min, max]`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 只要有一端收窄了完整范围就视为生效；恰好等于默认范围时不生成条件
    pub fn narrows(&self, span: &RangeFilter) -> bool {
        self.min > span.min || self.max < span.max
    }

    fn check(&self, field: &str, span: &RangeFilter) -> Result<(), AppError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(AppError::InvalidFilter(format!(
                "{field}: bounds must be finite numbers"
            )));
        }
        if self.min > self.max {
            return Err(AppError::InvalidFilter(format!(
                "{field}: min {} is greater than max {}",
                self.min, self.max
            )));
        }
        if self.min < span.min || self.max > span.max {
            return Err(AppError::InvalidFilter(format!(
                "{field}: [{}, {}] lies outside [{}, {}]",
                self.min, self.max, span.min, span.max
            )));
        }
        Ok(())
    }
}

/// 近地接近日期闭区间
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

/// 当前生效的全部过滤值快照。由调用方持有，合成器只读不写。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FilterState {
    /// 小行星名称的部分匹配 (区分大小写)
    pub name_substring: Option<String>,
    pub hazard_flag: HazardFlag,
    pub velocity_range: RangeFilter,
    /// 缺省时不做日期过滤；一旦给出且 start <= end 就总是生效
    pub date_range: Option<DateRange>,
    pub magnitude_range: RangeFilter,
    pub diameter_range: RangeFilter,
    pub astronomical_range: RangeFilter,
    /// 空列表表示不限制；顺序即 IN 列表中的顺序
    pub orbiting_bodies: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            name_substring: None,
            hazard_flag: HazardFlag::Any,
            velocity_range: VELOCITY_SPAN,
            date_range: None,
            magnitude_range: MAGNITUDE_SPAN,
            diameter_range: DIAMETER_SPAN,
            astronomical_range: ASTRONOMICAL_SPAN,
            orbiting_bodies: Vec::new(),
        }
    }
}

impl FilterState {
    /// 非空的名称片段
    pub fn name_fragment(&self) -> Option<&str> {
        self.name_substring.as_deref().filter(|s| !s.is_empty())
    }

    /// API 边界上的校验：区间有序且落在滑块范围内
    pub fn validate(&self) -> Result<(), AppError> {
        self.velocity_range.check("velocity_range", &VELOCITY_SPAN)?;
        self.magnitude_range.check("magnitude_range", &MAGNITUDE_SPAN)?;
        self.diameter_range.check("diameter_range", &DIAMETER_SPAN)?;
        self.astronomical_range
            .check("astronomical_range", &ASTRONOMICAL_SPAN)?;

        if let Some(range) = &self.date_range {
            if !range.is_ordered() {
                return Err(AppError::InvalidFilter(format!(
                    "date_range: start {} is after end {}",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    /// 校验并去掉重复的轨道天体 (保留首次出现的顺序)
    pub fn normalized(mut self) -> Result<Self, AppError> {
        self.validate()?;
        let mut seen = std::collections::HashSet::new();
        self.orbiting_bodies.retain(|body| seen.insert(body.clone()));
        Ok(self)
    }
}
