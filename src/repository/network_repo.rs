// ==========================================
// 供应链需求计划看板 - 供应网络数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::network::{NodeRelationship, SupplyNode};
use crate::domain::types::NodeType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// NetworkRepository - 供应网络仓储
// ==========================================

/// 供应网络仓储
/// 职责: 管理 supply_node / node_relationship 表
pub struct NetworkRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NetworkRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_node(row: &Row<'_>) -> SqliteResult<SupplyNode> {
        let node_type_raw: String = row.get(2)?;
        let node_type = NodeType::from_str(&node_type_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("未知节点类型: {}", node_type_raw).into(),
            )
        })?;

        Ok(SupplyNode {
            node_id: row.get(0)?,
            name: row.get(1)?,
            node_type,
            location_code: row.get(3)?,
        })
    }

    fn map_relationship(row: &Row<'_>) -> SqliteResult<NodeRelationship> {
        Ok(NodeRelationship {
            relationship_id: row.get(0)?,
            from_node_id: row.get(1)?,
            to_node_id: row.get(2)?,
            product_id: row.get(3)?,
            lead_time_days: row.get(4)?,
        })
    }

    // ==========================================
    // 节点
    // ==========================================

    /// 插入或更新节点
    pub fn upsert_node(&self, node: &SupplyNode) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO supply_node (node_id, name, node_type, location_code)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(node_id) DO UPDATE SET
                name = excluded.name,
                node_type = excluded.node_type,
                location_code = excluded.location_code
            "#,
            params![
                node.node_id,
                node.name,
                node.node_type.as_str(),
                node.location_code,
            ],
        )?;
        Ok(())
    }

    /// 查询全部节点
    pub fn list_nodes(&self) -> RepositoryResult<Vec<SupplyNode>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT node_id, name, node_type, location_code FROM supply_node ORDER BY node_id",
        )?;
        let nodes = stmt
            .query_map([], Self::map_node)?
            .collect::<SqliteResult<Vec<SupplyNode>>>()?;
        Ok(nodes)
    }

    /// 按ID查询节点
    pub fn find_node(&self, node_id: &str) -> RepositoryResult<Option<SupplyNode>> {
        let conn = self.get_conn()?;
        let node = conn
            .query_row(
                "SELECT node_id, name, node_type, location_code FROM supply_node WHERE node_id = ?1",
                params![node_id],
                Self::map_node,
            )
            .optional()?;
        Ok(node)
    }

    // ==========================================
    // 关系
    // ==========================================

    /// 插入关系
    pub fn insert_relationship(&self, relationship: &NodeRelationship) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO node_relationship (
                relationship_id, from_node_id, to_node_id, product_id, lead_time_days
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                relationship.relationship_id,
                relationship.from_node_id,
                relationship.to_node_id,
                relationship.product_id,
                relationship.lead_time_days,
            ],
        )?;
        Ok(())
    }

    /// 查询全部关系
    pub fn list_relationships(&self) -> RepositoryResult<Vec<NodeRelationship>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT relationship_id, from_node_id, to_node_id, product_id, lead_time_days
            FROM node_relationship
            ORDER BY from_node_id, to_node_id
            "#,
        )?;
        let relationships = stmt
            .query_map([], Self::map_relationship)?
            .collect::<SqliteResult<Vec<NodeRelationship>>>()?;
        Ok(relationships)
    }

    /// 删除关系
    ///
    /// # 返回
    /// - Err(NotFound): 关系不存在
    pub fn delete_relationship(&self, relationship_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM node_relationship WHERE relationship_id = ?1",
            params![relationship_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "NodeRelationship".to_string(),
                id: relationship_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询直接下游节点
    pub fn find_downstream(&self, node_id: &str) -> RepositoryResult<Vec<SupplyNode>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT n.node_id, n.name, n.node_type, n.location_code
            FROM node_relationship r
            JOIN supply_node n ON n.node_id = r.to_node_id
            WHERE r.from_node_id = ?1
            ORDER BY n.node_id
            "#,
        )?;
        let nodes = stmt
            .query_map(params![node_id], Self::map_node)?
            .collect::<SqliteResult<Vec<SupplyNode>>>()?;
        Ok(nodes)
    }
}
