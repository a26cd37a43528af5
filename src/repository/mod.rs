// ==========================================
// 供应链需求计划看板 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod collaboration_repo;
pub mod error;
pub mod forecast_repo;
pub mod network_repo;
pub mod product_repo;
pub mod supply_plan_repo;

// 重导出核心仓储
pub use collaboration_repo::CollaborationRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use forecast_repo::ForecastRepository;
pub use network_repo::NetworkRepository;
pub use product_repo::ProductRepository;
pub use supply_plan_repo::SupplyPlanRepository;

use crate::domain::types::DateKey;

/// 存储用日期字符串: 可解析的统一为 YYYY-MM-DD,其余原样
pub(crate) fn storage_date(raw: &str) -> String {
    DateKey::parse(raw).to_string()
}
