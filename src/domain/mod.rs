// ==========================================
// 供应链需求计划看板 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、行数据接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod category_tree;
pub mod collaboration;
pub mod forecast;
pub mod metrics;
pub mod network;
pub mod product;
pub mod selection;
pub mod supply_plan;
pub mod types;

// 重导出核心类型
pub use category_tree::{
    CategoryNode, CategoryTree, NodeLookupError, ProductLeaf, SubcategoryNode, TreeNodeKind,
    TreeNodeRef,
};
pub use collaboration::{CollaborationRecord, NewCollaborationRecord};
pub use forecast::{ForecastQuery, ForecastRecord, ForecastSeriesPoint, ForecastValueUpdate};
pub use metrics::{DatedMetrics, RawMetricRow};
pub use network::{NewNodeRelationship, NodeRelationship, SupplyNode};
pub use product::Product;
pub use selection::FilterSelection;
pub use supply_plan::SupplyPlanRow;
pub use types::{CollaborationStatus, DateKey, ForecastField, NodeType, SupplyMetric};
