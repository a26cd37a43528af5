// ==========================================
// 供应链需求计划看板 - 供应计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::supply_plan::SupplyPlanRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage_date;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SupplyPlanRepository - 供应计划仓储
// ==========================================

/// 供应计划仓储
/// 职责: 管理 supply_plan 表
pub struct SupplyPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplyPlanRepository {
    /// 创建新的供应计划仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<SupplyPlanRow> {
        Ok(SupplyPlanRow {
            product_id: row.get(0)?,
            location_id: row.get(1)?,
            date: row.get(2)?,
            forecast: row.get(3)?,
            actual: row.get(4)?,
            total_demand: row.get(5)?,
            planned_arrivals: row.get(6)?,
            planned_orders: row.get(7)?,
            projected_on_hand: row.get(8)?,
            safety_stock: row.get(9)?,
        })
    }

    /// 按产品+地点查询供应计划
    ///
    /// # 参数
    /// - product_id: 产品ID
    /// - location_id: 地点ID
    /// - date_from / date_to: 可选日期边界（含）
    pub fn find_by_product_location(
        &self,
        product_id: &str,
        location_id: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> RepositoryResult<Vec<SupplyPlanRow>> {
        let conn = self.get_conn()?;
        let from = date_from.map(storage_date);
        let to = date_to.map(storage_date);

        let mut stmt = conn.prepare(
            r#"
            SELECT
                product_id, location_id, date,
                forecast, actual, total_demand,
                planned_arrivals, planned_orders,
                projected_on_hand, safety_stock
            FROM supply_plan
            WHERE product_id = ?1 AND location_id = ?2
              AND (?3 IS NULL OR date >= ?3)
              AND (?4 IS NULL OR date <= ?4)
            ORDER BY date
            "#,
        )?;

        let rows = stmt
            .query_map(params![product_id, location_id, from, to], Self::map_row)?
            .collect::<SqliteResult<Vec<SupplyPlanRow>>>()?;

        Ok(rows)
    }

    /// 查询产品有计划的地点
    pub fn list_locations_for_product(&self, product_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT location_id FROM supply_plan WHERE product_id = ?1 ORDER BY location_id",
        )?;

        let locations = stmt
            .query_map(params![product_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(locations)
    }

    /// 批量插入或更新供应计划行
    pub fn upsert_batch(&self, rows: &[SupplyPlanRow]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO supply_plan (
                    product_id, location_id, date,
                    forecast, actual, total_demand,
                    planned_arrivals, planned_orders,
                    projected_on_hand, safety_stock, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'))
                ON CONFLICT(product_id, location_id, date) DO UPDATE SET
                    forecast = excluded.forecast,
                    actual = excluded.actual,
                    total_demand = excluded.total_demand,
                    planned_arrivals = excluded.planned_arrivals,
                    planned_orders = excluded.planned_orders,
                    projected_on_hand = excluded.projected_on_hand,
                    safety_stock = excluded.safety_stock,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for row in rows {
                count += stmt.execute(params![
                    row.product_id,
                    row.location_id,
                    storage_date(&row.date),
                    row.forecast,
                    row.actual,
                    row.total_demand,
                    row.planned_arrivals,
                    row.planned_orders,
                    row.projected_on_hand,
                    row.safety_stock,
                ])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }
}
