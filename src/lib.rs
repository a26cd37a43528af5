// ==========================================
// 供应链需求计划看板 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + actix-web
// 系统定位: 计划团队的预测/库存/网络/协同看板后端
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 纯数据变换（聚合/透视/层级）
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置与筛选状态
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/Schema）
pub mod db;

// 日志系统
pub mod logging;

// 导入层 - 外部文件
pub mod importer;

// 导出层 - 表格导出
pub mod export;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与 HTTP 服务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CategoryTree, CollaborationRecord, CollaborationStatus, DateKey, FilterSelection,
    ForecastRecord, NodeRelationship, NodeType, Product, SupplyNode, SupplyPlanRow,
};

// 引擎
pub use engine::{
    aggregate_by_date, build_category_tree, collect_product_ids, compute_inventory_metrics,
    pivot_metrics, DuplicatePolicy, MetricPivot,
};

// API
pub use api::{CollaborationApi, DashboardApi, ImportApi, NetworkApi, ProductApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应链需求计划看板";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
