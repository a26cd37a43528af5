// ==========================================
// 供应链需求计划看板 - 需求预测数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::forecast::{ForecastQuery, ForecastRecord, ForecastValueUpdate};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage_date;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT date, product_id, location_id, customer_id,
           forecast, actual, sales_plan, demand_planner, commercial_input
    FROM forecast_data
"#;

// ==========================================
// ForecastRepository - 需求预测仓储
// ==========================================

/// 需求预测仓储
/// 职责: 管理 forecast_data 表的查询/写入/单元格编辑
pub struct ForecastRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ForecastRepository {
    /// 创建新的需求预测仓储实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<ForecastRecord> {
        Ok(ForecastRecord {
            date: row.get(0)?,
            product_id: row.get(1)?,
            location_id: row.get(2)?,
            customer_id: row.get(3)?,
            forecast: row.get(4)?,
            actual: row.get(5)?,
            sales_plan: row.get(6)?,
            demand_planner: row.get(7)?,
            commercial_input: row.get(8)?,
        })
    }

    /// 按条件查询预测记录
    ///
    /// # 参数
    /// - query: 产品列表 / 地点 / 客户 / 日期区间,均可选
    ///
    /// # 返回
    /// 按日期、产品排序的记录
    pub fn find(&self, query: &ForecastQuery) -> RepositoryResult<Vec<ForecastRecord>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if !query.product_ids.is_empty() {
            let start = values.len() + 1;
            let placeholders: Vec<String> = (0..query.product_ids.len())
                .map(|i| format!("?{}", start + i))
                .collect();
            clauses.push(format!("product_id IN ({})", placeholders.join(", ")));
            values.extend(query.product_ids.iter().cloned());
        }
        if let Some(location_id) = &query.location_id {
            values.push(location_id.clone());
            clauses.push(format!("location_id = ?{}", values.len()));
        }
        if let Some(customer_id) = &query.customer_id {
            values.push(customer_id.clone());
            clauses.push(format!("customer_id = ?{}", values.len()));
        }
        if let Some(date_from) = &query.date_from {
            values.push(storage_date(date_from));
            clauses.push(format!("date >= ?{}", values.len()));
        }
        if let Some(date_to) = &query.date_to {
            values.push(storage_date(date_to));
            clauses.push(format!("date <= ?{}", values.len()));
        }

        let mut sql = SELECT_COLUMNS.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date, product_id, location_id, customer_id");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), Self::map_row)?
            .collect::<SqliteResult<Vec<ForecastRecord>>>()?;

        Ok(records)
    }

    /// 查询单个产品的全部预测记录
    pub fn find_by_product(&self, product_id: &str) -> RepositoryResult<Vec<ForecastRecord>> {
        self.find(&ForecastQuery {
            product_ids: vec![product_id.to_string()],
            ..Default::default()
        })
    }

    /// 批量插入或更新预测记录
    ///
    /// 日期统一存为 YYYY-MM-DD,与查询区间比较一致
    pub fn upsert_batch(&self, records: &[ForecastRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO forecast_data (
                    date, product_id, location_id, customer_id,
                    forecast, actual, sales_plan, demand_planner, commercial_input,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
                ON CONFLICT(date, product_id, location_id, customer_id) DO UPDATE SET
                    forecast = excluded.forecast,
                    actual = excluded.actual,
                    sales_plan = excluded.sales_plan,
                    demand_planner = excluded.demand_planner,
                    commercial_input = excluded.commercial_input,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for record in records {
                count += stmt.execute(params![
                    storage_date(&record.date),
                    record.product_id,
                    record.location_id,
                    record.customer_id,
                    record.forecast,
                    record.actual,
                    record.sales_plan,
                    record.demand_planner,
                    record.commercial_input,
                ])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 更新单个字段
    ///
    /// # 返回
    /// - Ok(()): 更新成功
    /// - Err(NotFound): 主键对应记录不存在
    ///
    /// # 说明
    /// 列名来自 ForecastField 枚举,不接受外部字符串
    pub fn update_field(&self, update: &ForecastValueUpdate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let date = storage_date(&update.date);
        let sql = format!(
            r#"
            UPDATE forecast_data
            SET {} = ?1, updated_at = datetime('now')
            WHERE date = ?2 AND product_id = ?3 AND location_id = ?4 AND customer_id = ?5
            "#,
            update.field.as_str()
        );

        let affected = conn.execute(
            &sql,
            params![
                update.value,
                date,
                update.product_id,
                update.location_id,
                update.customer_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ForecastRecord".to_string(),
                id: format!(
                    "{}/{}/{}/{}",
                    date, update.product_id, update.location_id, update.customer_id
                ),
            });
        }

        Ok(())
    }
}
