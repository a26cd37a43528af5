// ==========================================
// 供应链需求计划看板 - 指标透视器
// ==========================================
// 输入: 带日期与固定指标集的行
// 输出: 指标 → (日期 → 数值) + 全部日期（日历升序）
// 约束: 每个指标在每个日期都有值,缺失补 0
// 重复 (指标, 日期): 由 DuplicatePolicy 显式决定
// ==========================================

use crate::domain::metrics::DatedMetrics;
use crate::domain::types::DateKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

// ==========================================
// 重复单元格策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicatePolicy {
    /// 后写覆盖（与历史行为一致）
    #[default]
    LastWriteWins,
    /// 遇到重复直接报错
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::LastWriteWins => "LAST_WRITE_WINS",
            DuplicatePolicy::Reject => "REJECT",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LAST_WRITE_WINS" => Some(DuplicatePolicy::LastWriteWins),
            "REJECT" => Some(DuplicatePolicy::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 透视错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    #[error("透视单元格重复: metric={metric}, date={date}")]
    DuplicateCell { metric: String, date: String },
}

// ==========================================
// 透视结果
// ==========================================

/// 单个指标的日期序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: String,
    pub values: BTreeMap<DateKey, f64>,
}

/// 透视表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricPivot {
    /// 全部日期（升序,作为列）
    pub dates: Vec<DateKey>,
    /// 指标序列（首次出现顺序,作为行）
    pub metrics: Vec<MetricSeries>,
}

impl MetricPivot {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn series(&self, metric: &str) -> Option<&MetricSeries> {
        self.metrics.iter().find(|s| s.metric == metric)
    }

    /// 读取单元格（不存在为 0）
    pub fn value(&self, metric: &str, date: &DateKey) -> f64 {
        self.series(metric)
            .and_then(|s| s.values.get(date).copied())
            .unwrap_or(0.0)
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|s| s.metric.as_str()).collect()
    }
}

/// 指标透视
///
/// # 参数
/// - rows: 原始行（任意顺序）
/// - policy: 重复 (指标, 日期) 处理策略
///
/// # 返回
/// - Ok(MetricPivot): 透视结果
/// - Err(PivotError::DuplicateCell): policy 为 Reject 且出现重复
pub fn pivot_metrics<T: DatedMetrics>(
    rows: &[T],
    policy: DuplicatePolicy,
) -> Result<MetricPivot, PivotError> {
    let mut dates: BTreeSet<DateKey> = BTreeSet::new();
    let mut metric_order: Vec<String> = Vec::new();
    let mut cells: HashMap<String, BTreeMap<DateKey, Option<f64>>> = HashMap::new();
    let mut overwritten = 0usize;

    for row in rows {
        let date = DateKey::parse(row.date_str());
        dates.insert(date.clone());

        for (metric, value) in row.metric_values() {
            if !cells.contains_key(metric) {
                metric_order.push(metric.to_string());
            }
            let series = cells.entry(metric.to_string()).or_default();

            if series.insert(date.clone(), value).is_some() {
                if policy == DuplicatePolicy::Reject {
                    return Err(PivotError::DuplicateCell {
                        metric: metric.to_string(),
                        date: date.to_string(),
                    });
                }
                overwritten += 1;
            }
        }
    }

    if overwritten > 0 {
        tracing::debug!(overwritten, "透视存在重复单元格, 按后写覆盖处理");
    }

    let metrics = metric_order
        .into_iter()
        .map(|metric| {
            let raw = cells.remove(&metric).unwrap_or_default();
            let values = dates
                .iter()
                .map(|d| {
                    let v = raw
                        .get(d)
                        .copied()
                        .flatten()
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0);
                    (d.clone(), v)
                })
                .collect();
            MetricSeries { metric, values }
        })
        .collect();

    Ok(MetricPivot {
        dates: dates.into_iter().collect(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::supply_plan::SupplyPlanRow;
    use crate::domain::types::SupplyMetric;

    fn row(date: &str, forecast: Option<f64>) -> SupplyPlanRow {
        SupplyPlanRow {
            product_id: "P1".to_string(),
            location_id: "L1".to_string(),
            date: date.to_string(),
            forecast,
            ..Default::default()
        }
    }

    #[test]
    fn test_dates_sorted_regardless_of_input_order() {
        let rows = vec![row("2024-01-02", Some(5.0)), row("2024-01-01", Some(3.0))];
        let pivot = pivot_metrics(&rows, DuplicatePolicy::LastWriteWins).unwrap();

        let dates: Vec<String> = pivot.dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);

        let d1 = DateKey::parse("2024-01-01");
        let d2 = DateKey::parse("2024-01-02");
        assert_eq!(pivot.value("forecast", &d1), 3.0);
        assert_eq!(pivot.value("forecast", &d2), 5.0);
    }

    #[test]
    fn test_calendar_not_string_order() {
        // 字符串序 "2024-1-5" 与 ISO 日期混排时仍按日历
        let rows = vec![
            row("2024-02-01T00:00:00Z", Some(1.0)),
            row("2024-01-15", Some(1.0)),
        ];
        let pivot = pivot_metrics(&rows, DuplicatePolicy::LastWriteWins).unwrap();
        assert_eq!(pivot.dates[0].to_string(), "2024-01-15");
        assert_eq!(pivot.dates[1].to_string(), "2024-02-01");
    }

    #[test]
    fn test_missing_values_default_to_zero() {
        let rows = vec![row("2024-01-01", None), row("2024-01-02", Some(2.0))];
        let pivot = pivot_metrics(&rows, DuplicatePolicy::LastWriteWins).unwrap();

        assert_eq!(pivot.metrics.len(), SupplyMetric::ALL.len());
        for series in &pivot.metrics {
            assert_eq!(series.values.len(), 2, "指标 {} 缺列", series.metric);
        }
        assert_eq!(pivot.value("forecast", &DateKey::parse("2024-01-01")), 0.0);
        assert_eq!(pivot.value("safety_stock", &DateKey::parse("2024-01-02")), 0.0);
    }

    #[test]
    fn test_metric_order_follows_row_layout() {
        let pivot = pivot_metrics(&[row("2024-01-01", Some(1.0))], DuplicatePolicy::default())
            .unwrap();
        let expected: Vec<&str> = SupplyMetric::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(pivot.metric_names(), expected);
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let rows = vec![row("2024-01-01", Some(3.0)), row("2024-01-01", Some(9.0))];
        let pivot = pivot_metrics(&rows, DuplicatePolicy::LastWriteWins).unwrap();
        assert_eq!(pivot.dates.len(), 1);
        assert_eq!(pivot.value("forecast", &DateKey::parse("2024-01-01")), 9.0);
    }

    #[test]
    fn test_duplicate_reject() {
        let rows = vec![row("2024-01-01", Some(3.0)), row("2024-01-01", Some(9.0))];
        let err = pivot_metrics(&rows, DuplicatePolicy::Reject).unwrap_err();
        match err {
            PivotError::DuplicateCell { metric, date } => {
                assert_eq!(metric, "forecast");
                assert_eq!(date, "2024-01-01");
            }
        }
    }

    #[test]
    fn test_empty_rows() {
        let rows: Vec<SupplyPlanRow> = Vec::new();
        let pivot = pivot_metrics(&rows, DuplicatePolicy::Reject).unwrap();
        assert!(pivot.is_empty());
        assert!(pivot.metrics.is_empty());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            DuplicatePolicy::from_str("reject"),
            Some(DuplicatePolicy::Reject)
        );
        assert_eq!(
            DuplicatePolicy::from_str("LAST_WRITE_WINS"),
            Some(DuplicatePolicy::LastWriteWins)
        );
        assert_eq!(DuplicatePolicy::from_str("merge"), None);
    }
}
