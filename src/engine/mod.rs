// ==========================================
// 供应链需求计划看板 - 引擎层
// ==========================================
// 职责: 把表格行整形成图表/表格可用的结构
// 红线: Engine 不拼 SQL, 全部为无状态纯函数
// ==========================================

pub mod date_aggregator;
pub mod hierarchy;
pub mod inventory_metrics;
pub mod metric_pivot;

// 重导出核心函数
pub use date_aggregator::{aggregate_by_date, aggregate_forecast_series, DateAggregate};
pub use hierarchy::{build_category_tree, collect_product_ids, collect_product_ids_by_key};
pub use inventory_metrics::{
    compute_inventory_metrics, summarize_inventory, InventoryMetricPoint, InventorySummary,
};
pub use metric_pivot::{pivot_metrics, DuplicatePolicy, MetricPivot, MetricSeries, PivotError};
