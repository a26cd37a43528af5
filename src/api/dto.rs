// ==========================================
// 供应链需求计划看板 - API 请求/响应 DTO
// ==========================================

use crate::engine::{InventoryMetricPoint, InventorySummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 日期区间（含两端,任一端可空）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }
}

/// 预测原始行过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastFilter {
    pub location_id: Option<String>,
    pub customer_id: Option<String>,
    pub range: DateRange,
}

/// 预测序列请求
///
/// node_key 指向品类/子品类/产品节点;与 product_id 二选一,node_key 优先
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSeriesRequest {
    pub node_key: Option<String>,
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    pub customer_id: Option<String>,
    pub range: DateRange,
}

fn default_date_field() -> String {
    "date".to_string()
}

/// 通用行数据变换请求（聚合 / 透视）
///
/// 只有 metrics 中列出的字段参与计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRowsRequest {
    #[serde(default = "default_date_field", alias = "dateField")]
    pub date_field: String,
    pub metrics: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// 库存指标报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    pub product_id: String,
    pub location_id: String,
    pub window_days: usize,
    pub points: Vec<InventoryMetricPoint>,
    pub summary: InventorySummary,
}

/// 健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub product_count: i64,
    pub checked_at: String,
}
