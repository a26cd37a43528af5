// ==========================================
// 供应链需求计划看板 - 产品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::product::Product;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepository - 产品仓储
// ==========================================

/// 产品仓储
/// 职责: 管理 product 表的读写
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 创建新的产品仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    fn map_row(row: &Row<'_>) -> SqliteResult<Product> {
        Ok(Product {
            product_id: row.get(0)?,
            name: row.get(1)?,
            category_id: row.get(2)?,
            category_name: row.get(3)?,
            subcategory_id: row.get(4)?,
            subcategory_name: row.get(5)?,
        })
    }

    /// 查询全部产品（按产品ID排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT product_id, name, category_id, category_name,
                   subcategory_id, subcategory_name
            FROM product
            ORDER BY product_id
            "#,
        )?;

        let products = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Product>>>()?;

        Ok(products)
    }

    /// 按产品ID查询
    ///
    /// # 返回
    /// - Ok(Some(Product)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, product_id: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let product = conn
            .query_row(
                r#"
                SELECT product_id, name, category_id, category_name,
                       subcategory_id, subcategory_name
                FROM product
                WHERE product_id = ?1
                "#,
                params![product_id],
                Self::map_row,
            )
            .optional()?;

        Ok(product)
    }

    /// 批量插入或更新产品
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    pub fn upsert_batch(&self, products: &[Product]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO product (
                    product_id, name, category_id, category_name,
                    subcategory_id, subcategory_name, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
                ON CONFLICT(product_id) DO UPDATE SET
                    name = excluded.name,
                    category_id = excluded.category_id,
                    category_name = excluded.category_name,
                    subcategory_id = excluded.subcategory_id,
                    subcategory_name = excluded.subcategory_name,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for product in products {
                count += stmt.execute(params![
                    product.product_id,
                    product.name,
                    product.category_id,
                    product.category_name,
                    product.subcategory_id,
                    product.subcategory_name,
                ])?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 产品总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count)
    }
}
