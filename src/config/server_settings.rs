// ==========================================
// 供应链需求计划看板 - 服务启动参数
// ==========================================
// 来源: 环境变量,缺省值适合本机单用户使用
// ==========================================

use crate::logging::LogFormat;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// 数据目录名
const DATA_DIR_NAME: &str = "supply-planning-dashboard";

/// 数据库文件名
const DB_FILE_NAME: &str = "planning.db";

/// 服务启动参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl ServerSettings {
    /// 从环境变量加载
    ///
    /// - PLANNING_DB_PATH: 数据库路径（默认用户数据目录）
    /// - API_HOST: 监听地址（默认 127.0.0.1）
    /// - API_PORT: 监听端口（默认 8080）
    /// - LOG_FORMAT: plain / json
    pub fn from_env() -> Result<Self> {
        let db_path = env::var("PLANNING_DB_PATH").unwrap_or_else(|_| default_db_path());
        let host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("API_PORT 不是合法端口")?;
        let log_format = env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            db_path,
            host,
            port,
            log_format,
        })
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 默认数据库路径: <用户数据目录>/supply-planning-dashboard/planning.db
///
/// 无法获取用户目录时退回当前目录
pub fn default_db_path() -> String {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join(DATA_DIR_NAME);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(error = %e, dir = %dir.display(), "创建数据目录失败, 使用当前目录");
        return DB_FILE_NAME.to_string();
    }
    dir.join(DB_FILE_NAME).to_string_lossy().to_string()
}
