// ==========================================
// 供应链需求计划看板 - 服务入口
// ==========================================

use anyhow::Context;
use supply_planning::app::http::ApiServer;
use supply_planning::app::AppState;
use supply_planning::config::ServerSettings;
use supply_planning::logging::init_tracing;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = ServerSettings::from_env()?;
    init_tracing("info,supply_planning=debug", settings.log_format)?;

    tracing::info!(
        app = supply_planning::APP_NAME,
        version = supply_planning::VERSION,
        "启动看板后端"
    );

    let state = AppState::new(&settings.db_path)
        .with_context(|| format!("无法打开数据库: {}", settings.db_path))?;

    ApiServer::new(&settings).run(state).await
}
