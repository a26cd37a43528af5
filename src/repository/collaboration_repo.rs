// ==========================================
// 供应链需求计划看板 - 商务协同数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（状态机校验在 API 层）
// ==========================================

use crate::domain::collaboration::CollaborationRecord;
use crate::domain::types::CollaborationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

// ==========================================
// CollaborationRepository - 商务协同仓储
// ==========================================

/// 商务协同仓储
/// 职责: 管理 collaboration_record 表
pub struct CollaborationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CollaborationRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<CollaborationRecord> {
        let period_raw: String = row.get(3)?;
        let period = NaiveDate::parse_from_str(&period_raw, DATE_FMT)
            .map_err(|e| conversion_error(3, format!("period 格式错误: {}", e)))?;

        let status_raw: String = row.get(6)?;
        let status = CollaborationStatus::from_str(&status_raw)
            .ok_or_else(|| conversion_error(6, format!("未知协同状态: {}", status_raw)))?;

        let created_raw: String = row.get(8)?;
        let updated_raw: String = row.get(9)?;
        let created_at = NaiveDateTime::parse_from_str(&created_raw, DATETIME_FMT)
            .map_err(|e| conversion_error(8, format!("created_at 格式错误: {}", e)))?;
        let updated_at = NaiveDateTime::parse_from_str(&updated_raw, DATETIME_FMT)
            .map_err(|e| conversion_error(9, format!("updated_at 格式错误: {}", e)))?;

        Ok(CollaborationRecord {
            record_id: row.get(0)?,
            product_id: row.get(1)?,
            customer_id: row.get(2)?,
            period,
            proposed_quantity: row.get(4)?,
            comment: row.get(5)?,
            status,
            created_by: row.get(7)?,
            created_at,
            updated_at,
        })
    }

    /// 插入协同记录
    pub fn insert(&self, record: &CollaborationRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO collaboration_record (
                record_id, product_id, customer_id, period, proposed_quantity,
                comment, status, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.record_id,
                record.product_id,
                record.customer_id,
                record.period.format(DATE_FMT).to_string(),
                record.proposed_quantity,
                record.comment,
                record.status.as_str(),
                record.created_by,
                record.created_at.format(DATETIME_FMT).to_string(),
                record.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<CollaborationRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT record_id, product_id, customer_id, period, proposed_quantity,
                       comment, status, created_by, created_at, updated_at
                FROM collaboration_record
                WHERE record_id = ?1
                "#,
                params![record_id],
                Self::map_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 按产品/客户查询（条件可空）
    pub fn list(
        &self,
        product_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> RepositoryResult<Vec<CollaborationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, product_id, customer_id, period, proposed_quantity,
                   comment, status, created_by, created_at, updated_at
            FROM collaboration_record
            WHERE (?1 IS NULL OR product_id = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
            ORDER BY period, created_at
            "#,
        )?;
        let records = stmt
            .query_map(params![product_id, customer_id], Self::map_row)?
            .collect::<SqliteResult<Vec<CollaborationRecord>>>()?;
        Ok(records)
    }

    /// 条件更新状态（乐观锁: 仅当当前状态等于 expected 时生效）
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    /// - Err(OptimisticLockFailure): 状态已被其他请求改动
    pub fn update_status(
        &self,
        record_id: &str,
        expected: CollaborationStatus,
        next: CollaborationStatus,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE collaboration_record
            SET status = ?1, updated_at = ?2
            WHERE record_id = ?3 AND status = ?4
            "#,
            params![
                next.as_str(),
                updated_at.format(DATETIME_FMT).to_string(),
                record_id,
                expected.as_str(),
            ],
        )?;

        if affected == 0 {
            let actual: Option<String> = conn
                .query_row(
                    "SELECT status FROM collaboration_record WHERE record_id = ?1",
                    params![record_id],
                    |row| row.get(0),
                )
                .optional()?;

            return Err(match actual {
                None => RepositoryError::NotFound {
                    entity: "CollaborationRecord".to_string(),
                    id: record_id.to_string(),
                },
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    entity: "CollaborationRecord".to_string(),
                    id: record_id.to_string(),
                    expected: expected.as_str().to_string(),
                    actual,
                },
            });
        }
        Ok(())
    }
}
