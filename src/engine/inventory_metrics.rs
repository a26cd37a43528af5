// ==========================================
// 供应链需求计划看板 - 库存指标
// ==========================================
// 基于单个 (产品, 地点) 的供应计划行计算:
// - 满足率 (fill rate) = min(实际, 总需求) / 总需求
// - 库存可用天数 (DDH) = 预计在库 / 近 N 个日期的日均总需求
// - 安全库存击穿 = 预计在库 < 安全库存
// ==========================================

use crate::domain::supply_plan::SupplyPlanRow;
use crate::domain::types::{DateKey, SupplyMetric};
use crate::engine::date_aggregator::aggregate_by_date;
use serde::{Deserialize, Serialize};

/// 单日库存指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetricPoint {
    pub date: DateKey,
    pub total_demand: f64,
    pub projected_on_hand: f64,
    pub safety_stock: f64,
    /// 总需求为 0 时无定义
    pub fill_rate: Option<f64>,
    /// 日均需求为 0 时无定义
    pub days_of_inventory: Option<f64>,
    pub below_safety_stock: bool,
}

/// 区间汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InventorySummary {
    pub average_fill_rate: Option<f64>,
    pub min_days_of_inventory: Option<f64>,
    pub safety_stock_breach_days: usize,
    pub first_breach_date: Option<DateKey>,
}

/// 计算库存指标
///
/// # 参数
/// - rows: 同一 (产品, 地点) 的供应计划行,同日多行先求和
/// - window_days: DDH 的日均需求窗口（按日期个数,0 视为 1）
///
/// # 返回
/// 按日期升序的指标序列
pub fn compute_inventory_metrics(
    rows: &[SupplyPlanRow],
    window_days: usize,
) -> Vec<InventoryMetricPoint> {
    let window = window_days.max(1);
    let daily = aggregate_by_date(rows);

    let demands: Vec<f64> = daily
        .iter()
        .map(|d| d.total(SupplyMetric::TotalDemand.as_str()))
        .collect();

    daily
        .iter()
        .enumerate()
        .map(|(idx, day)| {
            let total_demand = demands[idx];
            let actual = day.total(SupplyMetric::Actual.as_str());
            let projected_on_hand = day.total(SupplyMetric::ProjectedOnHand.as_str());
            let safety_stock = day.total(SupplyMetric::SafetyStock.as_str());

            let fill_rate = if total_demand > 0.0 {
                Some(actual.max(0.0).min(total_demand) / total_demand)
            } else {
                None
            };

            let start = (idx + 1).saturating_sub(window);
            let span = &demands[start..=idx];
            let avg_demand = span.iter().sum::<f64>() / span.len() as f64;
            let days_of_inventory = if avg_demand > 0.0 {
                Some(projected_on_hand / avg_demand)
            } else {
                None
            };

            InventoryMetricPoint {
                date: day.date.clone(),
                total_demand,
                projected_on_hand,
                safety_stock,
                fill_rate,
                days_of_inventory,
                below_safety_stock: projected_on_hand < safety_stock,
            }
        })
        .collect()
}

/// 汇总库存指标
pub fn summarize_inventory(points: &[InventoryMetricPoint]) -> InventorySummary {
    let fill_rates: Vec<f64> = points.iter().filter_map(|p| p.fill_rate).collect();
    let average_fill_rate = if fill_rates.is_empty() {
        None
    } else {
        Some(fill_rates.iter().sum::<f64>() / fill_rates.len() as f64)
    };

    let min_days_of_inventory = points
        .iter()
        .filter_map(|p| p.days_of_inventory)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));

    let breaches: Vec<&InventoryMetricPoint> =
        points.iter().filter(|p| p.below_safety_stock).collect();

    InventorySummary {
        average_fill_rate,
        min_days_of_inventory,
        safety_stock_breach_days: breaches.len(),
        first_breach_date: breaches.first().map(|p| p.date.clone()),
    }
}
