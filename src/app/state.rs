// ==========================================
// 供应链需求计划看板 - 应用状态
// ==========================================
// 职责: 管理共享连接与全部 API 实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    ApiResult, CollaborationApi, DashboardApi, HealthStatus, ImportApi, NetworkApi, ProductApi,
};
use crate::config::ConfigManager;
use crate::db::open_shared_connection;
use crate::importer::PlanningImporter;
use crate::repository::error::RepositoryResult;
use crate::repository::{
    CollaborationRepository, ForecastRepository, NetworkRepository, ProductRepository,
    SupplyPlanRepository,
};

/// 应用状态
///
/// 所有仓储共用一个 SQLite 连接,HTTP 层通过 web::Data 共享
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub product_api: Arc<ProductApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub network_api: Arc<NetworkApi>,
    pub collaboration_api: Arc<CollaborationApi>,
    pub import_api: Arc<ImportApi>,

    /// 配置管理器（筛选状态持久化也走这里）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 打开数据库并装配全部 API
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 可用于测试）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        tracing::info!(db_path, "初始化AppState");
        let conn = open_shared_connection(db_path)?;
        Ok(Self::from_connection(db_path, conn))
    }

    /// 基于已初始化 schema 的共享连接装配
    pub fn from_connection(db_path: &str, conn: Arc<Mutex<Connection>>) -> Self {
        // ===== Repository 层 =====
        let product_repo = Arc::new(ProductRepository::from_connection(conn.clone()));
        let forecast_repo = Arc::new(ForecastRepository::from_connection(conn.clone()));
        let supply_plan_repo = Arc::new(SupplyPlanRepository::from_connection(conn.clone()));
        let network_repo = Arc::new(NetworkRepository::from_connection(conn.clone()));
        let collaboration_repo = Arc::new(CollaborationRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let importer = Arc::new(PlanningImporter::from_connection(conn));

        // ===== API 层 =====
        let product_api = Arc::new(ProductApi::new(product_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(
            forecast_repo,
            supply_plan_repo,
            product_repo,
            config_manager.clone(),
        ));
        let network_api = Arc::new(NetworkApi::new(network_repo));
        let collaboration_api = Arc::new(CollaborationApi::new(collaboration_repo));
        let import_api = Arc::new(ImportApi::new(importer));

        tracing::info!("AppState初始化完成");

        Self {
            db_path: db_path.to_string(),
            product_api,
            dashboard_api,
            network_api,
            collaboration_api,
            import_api,
            config_manager,
        }
    }

    /// 健康检查（含数据库可用性）
    pub fn health(&self) -> ApiResult<HealthStatus> {
        let product_count = self.product_api.count_products()?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            version: crate::VERSION.to_string(),
            product_count,
            checked_at: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    crate::config::default_db_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_in_memory() {
        let state = AppState::new(":memory:").expect("内存数据库初始化失败");
        let health = state.health().expect("健康检查失败");
        assert_eq!(health.status, "healthy");
        assert_eq!(health.product_count, 0);
    }
}
