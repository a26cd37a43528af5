// ==========================================
// 供应链需求计划看板 - HTTP 服务（actix-web）
// ==========================================

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

pub use routes::configure_routes;
pub use server::ApiServer;
