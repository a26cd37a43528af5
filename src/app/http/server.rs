// ==========================================
// 供应链需求计划看板 - HTTP 服务启动
// ==========================================

use crate::app::http::routes;
use crate::app::state::AppState;
use crate::config::ServerSettings;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};

pub struct ApiServer {
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
        }
    }

    /// 启动 HTTP 服务（阻塞直到退出）
    pub async fn run(self, state: AppState) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            db_path = %state.db_path,
            "供应计划 API 服务启动"
        );

        let state = web::Data::new(state);

        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Logger::new("%r %s %Dms"))
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("端口绑定失败: {}", bind_addr))?
        .run()
        .await
        .context("HTTP 服务异常退出")?;

        Ok(())
    }
}
