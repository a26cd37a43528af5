// ==========================================
// 供应链需求计划看板 - 供应网络
// ==========================================

use crate::domain::types::NodeType;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplyNode - 供应网络节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyNode {
    #[serde(alias = "nodeId")]
    pub node_id: String,
    pub name: String,
    #[serde(alias = "nodeType")]
    pub node_type: NodeType,
    #[serde(default, alias = "locationCode")]
    pub location_code: Option<String>,
}

// ==========================================
// NodeRelationship - 节点关系（有向: from 供给 to）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRelationship {
    pub relationship_id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    /// 限定产品（None = 所有产品）
    pub product_id: Option<String>,
    pub lead_time_days: i32,
}

/// 新建关系请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNodeRelationship {
    #[serde(alias = "fromNodeId")]
    pub from_node_id: String,
    #[serde(alias = "toNodeId")]
    pub to_node_id: String,
    #[serde(default, alias = "productId")]
    pub product_id: Option<String>,
    #[serde(default, alias = "leadTimeDays")]
    pub lead_time_days: i32,
}
