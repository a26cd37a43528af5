// ==========================================
// 供应链需求计划看板 - 领域类型定义
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ==========================================
// 日期键 (Date Key)
// ==========================================
// 聚合/透视共用的日期归一化键
// 可解析的日期按日历比较,不可解析的保留原文并排在日历日期之后
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateKey {
    Calendar(NaiveDate), // 日历日期
    Raw(String),         // 无法解析的原始字符串
}

impl DateKey {
    /// 解析日期字符串
    ///
    /// 支持: `YYYY-MM-DD` / RFC 3339 时间戳 / `YYYY-MM-DD HH:MM:SS` /
    /// 无时区的 ISO 时间戳。其余输入原样保留为 Raw,不报错。
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return DateKey::Calendar(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return DateKey::Calendar(dt.date_naive());
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return DateKey::Calendar(dt.date());
            }
        }

        DateKey::Raw(s.to_string())
    }

    /// 日历日期（Raw 返回 None）
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateKey::Calendar(date) => Some(*date),
            DateKey::Raw(_) => None,
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateKey::Calendar(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateKey::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey::Calendar(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DateKey::parse(&raw))
    }
}

// ==========================================
// 预测字段 (Forecast Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastField {
    Forecast,        // 统计预测
    Actual,          // 实际销量
    SalesPlan,       // 销售计划
    DemandPlanner,   // 需求计划员修正
    CommercialInput, // 商务输入
}

impl ForecastField {
    pub const ALL: [ForecastField; 5] = [
        ForecastField::Forecast,
        ForecastField::Actual,
        ForecastField::SalesPlan,
        ForecastField::DemandPlanner,
        ForecastField::CommercialInput,
    ];

    /// 字段名（与数据库列名、JSON 字段名一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastField::Forecast => "forecast",
            ForecastField::Actual => "actual",
            ForecastField::SalesPlan => "sales_plan",
            ForecastField::DemandPlanner => "demand_planner",
            ForecastField::CommercialInput => "commercial_input",
        }
    }

    /// 是否允许计划人员编辑
    ///
    /// 统计预测与实际销量来自上游系统,只读
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ForecastField::SalesPlan | ForecastField::DemandPlanner | ForecastField::CommercialInput
        )
    }
}

impl fmt::Display for ForecastField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 供应计划指标 (Supply Metric)
// ==========================================
// 顺序即透视表的行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyMetric {
    Forecast,
    Actual,
    TotalDemand,
    PlannedArrivals,
    PlannedOrders,
    ProjectedOnHand,
    SafetyStock,
}

impl SupplyMetric {
    pub const ALL: [SupplyMetric; 7] = [
        SupplyMetric::Forecast,
        SupplyMetric::Actual,
        SupplyMetric::TotalDemand,
        SupplyMetric::PlannedArrivals,
        SupplyMetric::PlannedOrders,
        SupplyMetric::ProjectedOnHand,
        SupplyMetric::SafetyStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyMetric::Forecast => "forecast",
            SupplyMetric::Actual => "actual",
            SupplyMetric::TotalDemand => "total_demand",
            SupplyMetric::PlannedArrivals => "planned_arrivals",
            SupplyMetric::PlannedOrders => "planned_orders",
            SupplyMetric::ProjectedOnHand => "projected_on_hand",
            SupplyMetric::SafetyStock => "safety_stock",
        }
    }
}

impl fmt::Display for SupplyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 供应网络节点类型 (Node Type)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Customer,           // 客户
    Warehouse,          // 仓库
    DistributionCenter, // 配送中心
    Plant,              // 工厂
    Supplier,           // 供应商
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Customer => "CUSTOMER",
            NodeType::Warehouse => "WAREHOUSE",
            NodeType::DistributionCenter => "DISTRIBUTION_CENTER",
            NodeType::Plant => "PLANT",
            NodeType::Supplier => "SUPPLIER",
        }
    }

    /// 从数据库字符串解析
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Some(NodeType::Customer),
            "WAREHOUSE" => Some(NodeType::Warehouse),
            "DISTRIBUTION_CENTER" => Some(NodeType::DistributionCenter),
            "PLANT" => Some(NodeType::Plant),
            "SUPPLIER" => Some(NodeType::Supplier),
            _ => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 商务协同状态 (Collaboration Status)
// ==========================================
// 状态机: DRAFT → SUBMITTED → ACCEPTED | REJECTED, REJECTED → DRAFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationStatus {
    Draft,     // 草稿
    Submitted, // 已提交
    Accepted,  // 已采纳
    Rejected,  // 已驳回
}

impl CollaborationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationStatus::Draft => "DRAFT",
            CollaborationStatus::Submitted => "SUBMITTED",
            CollaborationStatus::Accepted => "ACCEPTED",
            CollaborationStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Some(CollaborationStatus::Draft),
            "SUBMITTED" => Some(CollaborationStatus::Submitted),
            "ACCEPTED" => Some(CollaborationStatus::Accepted),
            "REJECTED" => Some(CollaborationStatus::Rejected),
            _ => None,
        }
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, next: CollaborationStatus) -> bool {
        use CollaborationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Accepted) | (Submitted, Rejected) | (Rejected, Draft)
        )
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
