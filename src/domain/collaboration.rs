// ==========================================
// 供应链需求计划看板 - 商务协同记录
// ==========================================

use crate::domain::types::CollaborationStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// CollaborationRecord - 商务协同记录
// ==========================================
// 商务团队对某客户/产品/期间提出的数量建议,经需求计划审核后采纳或驳回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRecord {
    pub record_id: String,
    pub product_id: String,
    pub customer_id: String,
    pub period: NaiveDate,
    pub proposed_quantity: f64,
    pub comment: String,
    pub status: CollaborationStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 新建协同记录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCollaborationRecord {
    #[serde(alias = "productId")]
    pub product_id: String,
    #[serde(alias = "customerId")]
    pub customer_id: String,
    pub period: NaiveDate,
    #[serde(alias = "proposedQuantity")]
    pub proposed_quantity: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default, alias = "createdBy")]
    pub created_by: String,
}
