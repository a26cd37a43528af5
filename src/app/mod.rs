// ==========================================
// 供应链需求计划看板 - 应用层
// ==========================================
// 职责: 状态装配 / 视图会话 / HTTP 服务
// ==========================================

pub mod http;
pub mod state;
pub mod view_state;

pub use state::{get_default_db_path, AppState};
pub use view_state::{
    ApiDataSource, ForecastViewSession, Notice, NoticeLevel, PlanningDataSource, RefreshTicket,
    RequestTracker,
};
