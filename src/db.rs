// ==========================================
// 供应链需求计划看板 - 数据库基础设施
// ==========================================
// 职责: 连接初始化 / PRAGMA 统一 / Schema 创建
// 说明: SQLite 作为本地文档库替身,每类文档一张表
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 忙等待超时
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// 打开数据库连接并应用统一 PRAGMA
pub fn open_sqlite_connection(db_path: &str) -> RepositoryResult<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开共享连接（仓储之间共用）
pub fn open_shared_connection(db_path: &str) -> RepositoryResult<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 应用统一 PRAGMA（幂等）
pub fn configure_sqlite_connection(conn: &Connection) -> RepositoryResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(journal_mode = %mode, "SQLite 连接已配置");
    Ok(())
}

/// 创建全部表（幂等）
pub fn init_schema(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO schema_version (version) VALUES (1);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS product (
    product_id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    category_id TEXT,
    category_name TEXT,
    subcategory_id TEXT,
    subcategory_name TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS forecast_data (
    date TEXT NOT NULL,
    product_id TEXT NOT NULL,
    location_id TEXT NOT NULL DEFAULT '',
    customer_id TEXT NOT NULL DEFAULT '',
    forecast REAL,
    actual REAL,
    sales_plan REAL,
    demand_planner REAL,
    commercial_input REAL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (date, product_id, location_id, customer_id)
);

CREATE INDEX IF NOT EXISTS idx_forecast_product ON forecast_data(product_id, date);

CREATE TABLE IF NOT EXISTS supply_plan (
    product_id TEXT NOT NULL,
    location_id TEXT NOT NULL,
    date TEXT NOT NULL,
    forecast REAL,
    actual REAL,
    total_demand REAL,
    planned_arrivals REAL,
    planned_orders REAL,
    projected_on_hand REAL,
    safety_stock REAL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (product_id, location_id, date)
);

CREATE TABLE IF NOT EXISTS supply_node (
    node_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    node_type TEXT NOT NULL,
    location_code TEXT
);

CREATE TABLE IF NOT EXISTS node_relationship (
    relationship_id TEXT PRIMARY KEY,
    from_node_id TEXT NOT NULL REFERENCES supply_node(node_id) ON DELETE CASCADE,
    to_node_id TEXT NOT NULL REFERENCES supply_node(node_id) ON DELETE CASCADE,
    product_id TEXT,
    lead_time_days INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_relationship_from ON node_relationship(from_node_id);

-- 同一 (起点, 终点, 产品) 只允许一条关系;产品为空视为同一键
CREATE UNIQUE INDEX IF NOT EXISTS uq_relationship_edge
    ON node_relationship(from_node_id, to_node_id, IFNULL(product_id, ''));

CREATE TABLE IF NOT EXISTS collaboration_record (
    record_id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL,
    customer_id TEXT NOT NULL,
    period TEXT NOT NULL,
    proposed_quantity REAL NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL,
    created_by TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_collaboration_product ON collaboration_record(product_id, customer_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM config_scope WHERE scope_id = 'global'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_relationship_edge_unique_with_null_product() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO supply_node (node_id, name, node_type) VALUES ('A', 'A', 'PLANT');
            INSERT INTO supply_node (node_id, name, node_type) VALUES ('B', 'B', 'WAREHOUSE');
            INSERT INTO node_relationship (relationship_id, from_node_id, to_node_id)
                VALUES ('r1', 'A', 'B');
            INSERT INTO node_relationship (relationship_id, from_node_id, to_node_id, product_id)
                VALUES ('r2', 'A', 'B', 'P1');
            "#,
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO node_relationship (relationship_id, from_node_id, to_node_id) VALUES ('r3', 'A', 'B')",
            [],
        );
        assert!(duplicate.is_err());
    }
}
