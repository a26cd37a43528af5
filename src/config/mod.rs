// ==========================================
// 供应链需求计划看板 - 配置层
// ==========================================
// 职责: 系统配置管理 / 视图筛选状态持久化 / 服务启动参数
// 存储: config_kv 表 + 环境变量
// ==========================================

pub mod config_manager;
pub mod filter_selection;
pub mod server_settings;

// 重导出
pub use config_manager::{config_keys, ConfigManager, MAX_FORECAST_HORIZON_DAYS};
pub use filter_selection::{load_selection, save_selection, selection_key};
pub use server_settings::{default_db_path, ServerSettings};
