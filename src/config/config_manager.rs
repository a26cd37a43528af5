// ==========================================
// 供应链需求计划看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::filter_selection::{load_selection, save_selection, selection_key};
use crate::domain::selection::FilterSelection;
use crate::engine::metric_pivot::DuplicatePolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 预测看板默认展示天数
    pub const FORECAST_HORIZON_DAYS: &str = "forecast_horizon_days";
    /// DDH 日均需求窗口（日期个数）
    pub const DOI_WINDOW_DAYS: &str = "doi_window_days";
    /// 透视重复单元格策略: LAST_WRITE_WINS / REJECT
    pub const PIVOT_DUPLICATE_POLICY: &str = "pivot_duplicate_policy";
}

const DEFAULT_FORECAST_HORIZON_DAYS: i64 = 90;
/// 展示天数上限（约十年）
pub const MAX_FORECAST_HORIZON_DAYS: i64 = 3660;
const DEFAULT_DOI_WINDOW_DAYS: usize = 7;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(format!("锁获取失败: {}", e)))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        if key.trim().is_empty() {
            return Err(RepositoryError::ValidationError("配置键不能为空".to_string()));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有 global 配置（按键排序）
    pub fn list_global_configs(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(config_map)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let config_map = self.list_global_configs()?;
        serde_json::to_string(&config_map)
            .map_err(|e| RepositoryError::InternalError(format!("配置快照序列化失败: {}", e)))
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)
            .map_err(|e| RepositoryError::ValidationError(format!("配置快照格式错误: {}", e)))?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 看板配置 =====

    /// 预测看板默认展示天数
    ///
    /// 非法值回退默认值 90,超过上限按上限计
    pub fn get_forecast_horizon_days(&self) -> RepositoryResult<i64> {
        let value = self.get_config_or_default(
            config_keys::FORECAST_HORIZON_DAYS,
            &DEFAULT_FORECAST_HORIZON_DAYS.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .map(|v| v.min(MAX_FORECAST_HORIZON_DAYS))
            .unwrap_or(DEFAULT_FORECAST_HORIZON_DAYS))
    }

    /// DDH 日均需求窗口
    pub fn get_doi_window_days(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(
            config_keys::DOI_WINDOW_DAYS,
            &DEFAULT_DOI_WINDOW_DAYS.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_DOI_WINDOW_DAYS))
    }

    /// 透视重复单元格策略
    ///
    /// 未配置或无法识别时为 LAST_WRITE_WINS
    pub fn get_pivot_duplicate_policy(&self) -> RepositoryResult<DuplicatePolicy> {
        let value = self.get_global_config_value(config_keys::PIVOT_DUPLICATE_POLICY)?;
        Ok(value
            .as_deref()
            .and_then(DuplicatePolicy::from_str)
            .unwrap_or_default())
    }

    // ===== 视图筛选状态 =====

    /// 读取视图筛选状态（不存在或损坏时为空筛选）
    pub fn load_filter_selection(&self, view: &str) -> RepositoryResult<FilterSelection> {
        let raw = self.get_global_config_value(&selection_key(view))?;
        Ok(load_selection(raw.as_deref()))
    }

    /// 保存视图筛选状态
    pub fn save_filter_selection(
        &self,
        view: &str,
        selection: &FilterSelection,
    ) -> RepositoryResult<()> {
        self.set_global_config_value(&selection_key(view), &save_selection(selection))
    }
}
