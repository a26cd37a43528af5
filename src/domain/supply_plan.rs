// ==========================================
// 供应链需求计划看板 - 供应计划领域模型
// ==========================================

use crate::domain::metrics::DatedMetrics;
use crate::domain::types::SupplyMetric;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplyPlanRow - 供应计划行
// ==========================================
// 主键: (product_id, location_id, date)
// 用途: 库存推演表 / 透视导出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupplyPlanRow {
    // ===== 主键 =====
    #[serde(alias = "productId")]
    pub product_id: String,
    #[serde(alias = "locationId")]
    pub location_id: String,
    pub date: String,

    // ===== 需求 =====
    pub forecast: Option<f64>,
    pub actual: Option<f64>,
    #[serde(alias = "totalDemand")]
    pub total_demand: Option<f64>,

    // ===== 供给 =====
    #[serde(alias = "plannedArrivals")]
    pub planned_arrivals: Option<f64>,
    #[serde(alias = "plannedOrders")]
    pub planned_orders: Option<f64>,

    // ===== 库存 =====
    #[serde(alias = "projectedOnHand")]
    pub projected_on_hand: Option<f64>,
    #[serde(alias = "safetyStock")]
    pub safety_stock: Option<f64>,
}

impl SupplyPlanRow {
    /// 读取指定指标
    pub fn metric(&self, metric: SupplyMetric) -> Option<f64> {
        match metric {
            SupplyMetric::Forecast => self.forecast,
            SupplyMetric::Actual => self.actual,
            SupplyMetric::TotalDemand => self.total_demand,
            SupplyMetric::PlannedArrivals => self.planned_arrivals,
            SupplyMetric::PlannedOrders => self.planned_orders,
            SupplyMetric::ProjectedOnHand => self.projected_on_hand,
            SupplyMetric::SafetyStock => self.safety_stock,
        }
    }
}

impl DatedMetrics for SupplyPlanRow {
    fn date_str(&self) -> &str {
        &self.date
    }

    fn metric_values(&self) -> Vec<(&str, Option<f64>)> {
        SupplyMetric::ALL
            .iter()
            .map(|m| (m.as_str(), self.metric(*m)))
            .collect()
    }
}
