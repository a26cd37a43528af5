// ==========================================
// 供应链需求计划看板 - 供应网络 API
// ==========================================
// 职责: 节点维护 / 关系维护 / 下游查询
// 校验: 自环拒绝、端点必须存在、(from, to, product) 不重复、提前期非负
// ==========================================

use std::sync::Arc;

use crate::api::error::{require_non_empty, ApiError, ApiResult};
use crate::domain::{NewNodeRelationship, NodeRelationship, SupplyNode};
use crate::repository::{NetworkRepository, RepositoryError};
use tracing::info;
use uuid::Uuid;

pub struct NetworkApi {
    network_repo: Arc<NetworkRepository>,
}

impl NetworkApi {
    pub fn new(network_repo: Arc<NetworkRepository>) -> Self {
        Self { network_repo }
    }

    // ===== 节点 =====

    pub fn list_nodes(&self) -> ApiResult<Vec<SupplyNode>> {
        Ok(self.network_repo.list_nodes()?)
    }

    /// 新增或更新节点
    pub fn upsert_node(&self, node: &SupplyNode) -> ApiResult<SupplyNode> {
        require_non_empty(&node.node_id, "节点ID")?;
        require_non_empty(&node.name, "节点名称")?;

        self.network_repo.upsert_node(node)?;
        info!(node_id = %node.node_id, node_type = node.node_type.as_str(), "网络节点已保存");
        Ok(node.clone())
    }

    /// 直接下游节点
    pub fn get_downstream_nodes(&self, node_id: &str) -> ApiResult<Vec<SupplyNode>> {
        self.require_node(node_id)?;
        Ok(self.network_repo.find_downstream(node_id)?)
    }

    // ===== 关系 =====

    pub fn list_relationships(&self) -> ApiResult<Vec<NodeRelationship>> {
        Ok(self.network_repo.list_relationships()?)
    }

    /// 新建关系
    ///
    /// # 返回
    /// - Ok(NodeRelationship): 含新生成的 relationship_id
    /// - Err(BusinessRuleViolation): 自环 / 重复关系
    /// - Err(NotFound): 端点节点不存在
    pub fn create_relationship(&self, request: &NewNodeRelationship) -> ApiResult<NodeRelationship> {
        require_non_empty(&request.from_node_id, "起点节点ID")?;
        require_non_empty(&request.to_node_id, "终点节点ID")?;

        if request.from_node_id == request.to_node_id {
            return Err(ApiError::BusinessRuleViolation(format!(
                "节点不能与自身建立关系: {}",
                request.from_node_id
            )));
        }
        if request.lead_time_days < 0 {
            return Err(ApiError::InvalidInput(format!(
                "提前期不能为负: {}",
                request.lead_time_days
            )));
        }

        self.require_node(&request.from_node_id)?;
        self.require_node(&request.to_node_id)?;

        let product_id = request
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let relationship = NodeRelationship {
            relationship_id: Uuid::new_v4().to_string(),
            from_node_id: request.from_node_id.clone(),
            to_node_id: request.to_node_id.clone(),
            product_id,
            lead_time_days: request.lead_time_days,
        };

        // 唯一索引保证并发创建时只有一条成功
        match self.network_repo.insert_relationship(&relationship) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "关系已存在: {} → {}",
                    relationship.from_node_id, relationship.to_node_id
                )));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            relationship_id = %relationship.relationship_id,
            from = %relationship.from_node_id,
            to = %relationship.to_node_id,
            "网络关系已创建"
        );
        Ok(relationship)
    }

    pub fn delete_relationship(&self, relationship_id: &str) -> ApiResult<()> {
        require_non_empty(relationship_id, "关系ID")?;
        self.network_repo.delete_relationship(relationship_id)?;
        info!(relationship_id, "网络关系已删除");
        Ok(())
    }

    fn require_node(&self, node_id: &str) -> ApiResult<SupplyNode> {
        require_non_empty(node_id, "节点ID")?;
        self.network_repo
            .find_node(node_id)?
            .ok_or_else(|| ApiError::NotFound(format!("网络节点(id={})不存在", node_id)))
    }
}
