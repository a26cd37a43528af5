// ==========================================
// 供应链需求计划看板 - 日期聚合器
// ==========================================
// 输入: 任意顺序的原始行（日期 + 可空数值字段）
// 输出: 每个日期一行,各字段求和,空值按 0 计
// 约束: 求和满足交换律/结合律,相同多重集输入得到相同输出
// ==========================================

use crate::domain::forecast::{ForecastRecord, ForecastSeriesPoint};
use crate::domain::metrics::DatedMetrics;
use crate::domain::types::{DateKey, ForecastField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单日聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAggregate {
    pub date: DateKey,
    /// 字段名 → 合计
    pub totals: BTreeMap<String, f64>,
    /// 参与聚合的原始行数
    pub row_count: usize,
}

impl DateAggregate {
    fn empty(date: DateKey) -> Self {
        Self {
            date,
            totals: BTreeMap::new(),
            row_count: 0,
        }
    }

    /// 读取字段合计（不存在的字段为 0）
    pub fn total(&self, field: &str) -> f64 {
        self.totals.get(field).copied().unwrap_or(0.0)
    }
}

/// 空值/非有限值按 0 计
fn value_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// 按日期聚合
///
/// # 参数
/// - rows: 原始行
///
/// # 返回
/// 按日期升序排列的聚合结果; 空输入返回空 Vec
pub fn aggregate_by_date<T: DatedMetrics>(rows: &[T]) -> Vec<DateAggregate> {
    let grouped = rows
        .iter()
        .fold(BTreeMap::<DateKey, DateAggregate>::new(), |mut acc, row| {
            let key = DateKey::parse(row.date_str());
            let entry = acc
                .entry(key.clone())
                .or_insert_with(|| DateAggregate::empty(key));

            entry.row_count += 1;
            for (field, value) in row.metric_values() {
                *entry.totals.entry(field.to_string()).or_insert(0.0) += value_or_zero(value);
            }
            acc
        });

    tracing::debug!(
        input_rows = rows.len(),
        output_dates = grouped.len(),
        "按日期聚合完成"
    );

    grouped.into_values().collect()
}

/// 预测记录聚合为图表序列
///
/// 同一日期多条记录（例如按品类筛选出多个产品/客户）逐字段求和
pub fn aggregate_forecast_series(records: &[ForecastRecord]) -> Vec<ForecastSeriesPoint> {
    aggregate_by_date(records)
        .into_iter()
        .map(|agg| ForecastSeriesPoint {
            forecast: agg.total(ForecastField::Forecast.as_str()),
            actual: agg.total(ForecastField::Actual.as_str()),
            sales_plan: agg.total(ForecastField::SalesPlan.as_str()),
            demand_planner: agg.total(ForecastField::DemandPlanner.as_str()),
            commercial_input: agg.total(ForecastField::CommercialInput.as_str()),
            date: agg.date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::RawMetricRow;

    fn record(date: &str, forecast: Option<f64>, actual: Option<f64>) -> ForecastRecord {
        ForecastRecord {
            date: date.to_string(),
            product_id: "P1".to_string(),
            forecast,
            actual,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let rows: Vec<ForecastRecord> = Vec::new();
        assert!(aggregate_by_date(&rows).is_empty());
        assert!(aggregate_forecast_series(&rows).is_empty());
    }

    #[test]
    fn test_rows_sharing_date_are_summed() {
        let rows = vec![
            record("2024-01-01", Some(3.0), Some(1.0)),
            record("2024-01-01", Some(4.0), Some(2.0)),
            record("2024-01-02", Some(5.0), None),
        ];

        let series = aggregate_forecast_series(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date.to_string(), "2024-01-01");
        assert_eq!(series[0].forecast, 7.0);
        assert_eq!(series[0].actual, 3.0);
        assert_eq!(series[1].forecast, 5.0);
    }

    #[test]
    fn test_missing_fields_contribute_zero() {
        let rows = vec![
            record("2024-01-01", None, None),
            record("2024-01-01", Some(2.0), None),
            record("2024-01-01", Some(f64::NAN), None),
        ];

        let aggregated = aggregate_by_date(&rows);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].total("forecast"), 2.0);
        assert_eq!(aggregated[0].total("actual"), 0.0);
        assert_eq!(aggregated[0].total("sales_plan"), 0.0);
        assert_eq!(aggregated[0].row_count, 3);
    }

    #[test]
    fn test_permutation_invariance() {
        let rows = vec![
            record("2024-01-03", Some(1.0), Some(10.0)),
            record("2024-01-01", Some(2.0), None),
            record("2024-01-03", Some(3.0), Some(20.0)),
            record("2024-01-02", None, Some(5.0)),
            record("2024-01-01", Some(4.0), Some(1.0)),
        ];
        let expected = aggregate_by_date(&rows);

        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(aggregate_by_date(&reversed), expected);

        let mut rotated = rows.clone();
        rotated.rotate_left(2);
        assert_eq!(aggregate_by_date(&rotated), expected);

        let mut swapped = rows;
        swapped.swap(0, 4);
        swapped.swap(1, 3);
        assert_eq!(aggregate_by_date(&swapped), expected);
    }

    #[test]
    fn test_iso_timestamps_share_calendar_date() {
        let rows = vec![
            record("2024-01-01T00:00:00.000Z", Some(1.0), None),
            record("2024-01-01", Some(2.0), None),
        ];

        let aggregated = aggregate_by_date(&rows);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].total("forecast"), 3.0);
    }

    #[test]
    fn test_raw_rows_with_distinct_fields() {
        let rows = vec![
            RawMetricRow {
                date: "2024-03-01".to_string(),
                values: [("a".to_string(), Some(1.0))].into_iter().collect(),
            },
            RawMetricRow {
                date: "2024-03-01".to_string(),
                values: [("b".to_string(), Some(2.0))].into_iter().collect(),
            },
        ];

        let aggregated = aggregate_by_date(&rows);
        assert_eq!(aggregated[0].total("a"), 1.0);
        assert_eq!(aggregated[0].total("b"), 2.0);
    }
}
