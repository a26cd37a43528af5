// ==========================================
// 供应链需求计划看板 - 商务协同 API
// ==========================================
// 状态机: DRAFT → SUBMITTED → ACCEPTED | REJECTED
//         REJECTED → DRAFT（退回修改）
// ==========================================

use std::sync::Arc;

use crate::api::error::{require_non_empty, ApiError, ApiResult};
use crate::domain::{CollaborationRecord, CollaborationStatus, NewCollaborationRecord};
use crate::repository::CollaborationRepository;
use chrono::{Local, NaiveDateTime, Timelike};
use tracing::info;
use uuid::Uuid;

/// 当前时间（截断到秒,与存储精度一致）
fn now_to_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub struct CollaborationApi {
    collaboration_repo: Arc<CollaborationRepository>,
}

impl CollaborationApi {
    pub fn new(collaboration_repo: Arc<CollaborationRepository>) -> Self {
        Self { collaboration_repo }
    }

    /// 新建协同记录（初始状态 DRAFT）
    pub fn create_record(&self, request: &NewCollaborationRecord) -> ApiResult<CollaborationRecord> {
        require_non_empty(&request.product_id, "产品ID")?;
        require_non_empty(&request.customer_id, "客户ID")?;
        if !request.proposed_quantity.is_finite() || request.proposed_quantity < 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "建议数量无效: {}",
                request.proposed_quantity
            )));
        }

        let now = now_to_seconds();
        let created_by = if request.created_by.trim().is_empty() {
            "system".to_string()
        } else {
            request.created_by.trim().to_string()
        };

        let record = CollaborationRecord {
            record_id: Uuid::new_v4().to_string(),
            product_id: request.product_id.clone(),
            customer_id: request.customer_id.clone(),
            period: request.period,
            proposed_quantity: request.proposed_quantity,
            comment: request.comment.clone(),
            status: CollaborationStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.collaboration_repo.insert(&record)?;

        info!(record_id = %record.record_id, product_id = %record.product_id, "协同记录已创建");
        Ok(record)
    }

    /// 查询协同记录（可按产品/客户过滤）
    pub fn list_records(
        &self,
        product_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> ApiResult<Vec<CollaborationRecord>> {
        Ok(self.collaboration_repo.list(product_id, customer_id)?)
    }

    pub fn get_record(&self, record_id: &str) -> ApiResult<CollaborationRecord> {
        require_non_empty(record_id, "记录ID")?;
        self.collaboration_repo
            .find_by_id(record_id)?
            .ok_or_else(|| ApiError::NotFound(format!("协同记录(id={})不存在", record_id)))
    }

    /// 状态流转
    ///
    /// # 返回
    /// - Ok(CollaborationRecord): 更新后的记录
    /// - Err(InvalidStateTransition): 不允许的流转
    /// - Err(OptimisticLockFailure): 读取后状态已被并发请求改动
    pub fn transition_status(
        &self,
        record_id: &str,
        next: CollaborationStatus,
    ) -> ApiResult<CollaborationRecord> {
        let mut record = self.get_record(record_id)?;

        if !record.status.can_transition_to(next) {
            return Err(ApiError::InvalidStateTransition {
                from: record.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let now = now_to_seconds();
        self.collaboration_repo
            .update_status(record_id, record.status, next, now)?;

        info!(
            record_id,
            from = record.status.as_str(),
            to = next.as_str(),
            "协同记录状态已变更"
        );
        record.status = next;
        record.updated_at = now;
        Ok(record)
    }
}
