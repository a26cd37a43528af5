// ==========================================
// 供应链需求计划看板 - 需求预测领域模型
// ==========================================

use crate::domain::metrics::DatedMetrics;
use crate::domain::types::{DateKey, ForecastField};
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastRecord - 需求预测记录
// ==========================================
// 主键: (date, product_id, location_id, customer_id)
// 同一日期多行（按品类筛选后）必须按字段求和,不能覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ForecastRecord {
    // ===== 主键 =====
    pub date: String,
    #[serde(alias = "productId")]
    pub product_id: String,
    #[serde(alias = "locationId")]
    pub location_id: String,
    #[serde(alias = "customerId")]
    pub customer_id: String,

    // ===== 数值字段（可空） =====
    pub forecast: Option<f64>,
    pub actual: Option<f64>,
    #[serde(alias = "salesPlan")]
    pub sales_plan: Option<f64>,
    #[serde(alias = "demandPlanner")]
    pub demand_planner: Option<f64>,
    #[serde(alias = "commercialInput")]
    pub commercial_input: Option<f64>,
}

impl ForecastRecord {
    /// 读取指定字段
    pub fn field(&self, field: ForecastField) -> Option<f64> {
        match field {
            ForecastField::Forecast => self.forecast,
            ForecastField::Actual => self.actual,
            ForecastField::SalesPlan => self.sales_plan,
            ForecastField::DemandPlanner => self.demand_planner,
            ForecastField::CommercialInput => self.commercial_input,
        }
    }
}

impl DatedMetrics for ForecastRecord {
    fn date_str(&self) -> &str {
        &self.date
    }

    fn metric_values(&self) -> Vec<(&str, Option<f64>)> {
        ForecastField::ALL
            .iter()
            .map(|f| (f.as_str(), self.field(*f)))
            .collect()
    }
}

// ==========================================
// ForecastSeriesPoint - 图表序列点
// ==========================================
// 按日期聚合后的结果,空值已按 0 计入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeriesPoint {
    pub date: DateKey,
    pub forecast: f64,
    pub actual: f64,
    pub sales_plan: f64,
    pub demand_planner: f64,
    pub commercial_input: f64,
}

// ==========================================
// ForecastQuery - 预测查询条件
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastQuery {
    /// 产品ID列表（空 = 不限）
    pub product_ids: Vec<String>,
    pub location_id: Option<String>,
    pub customer_id: Option<String>,
    /// 起始日期（含）
    pub date_from: Option<String>,
    /// 结束日期（含）
    pub date_to: Option<String>,
}

// ==========================================
// ForecastValueUpdate - 单元格编辑
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastValueUpdate {
    pub date: String,
    pub product_id: String,
    pub location_id: String,
    pub customer_id: String,
    pub field: ForecastField,
    /// None 表示清空
    pub value: Option<f64>,
}
