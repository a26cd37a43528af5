// ==========================================
// 供应链需求计划看板 - 业务 API 层
// ==========================================
// 职责: 参数校验 / 调用引擎与仓储 / 错误转换
// 说明: 与传输无关,HTTP 层只做编解码
// ==========================================

pub mod collaboration_api;
pub mod dashboard_api;
pub mod dto;
pub mod error;
pub mod import_api;
pub mod network_api;
pub mod product_api;

pub use collaboration_api::CollaborationApi;
pub use dashboard_api::DashboardApi;
pub use dto::{
    DateRange, ForecastFilter, ForecastSeriesRequest, HealthStatus, InventoryReport,
    RawRowsRequest,
};
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use network_api::NetworkApi;
pub use product_api::ProductApi;
