// ==========================================
// 供应链需求计划看板 - HTTP 请求/响应模型
// ==========================================
// 统一响应体: { success, data, error: { code, message }, meta }
// ==========================================

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, DateRange, ForecastFilter, ForecastSeriesRequest};
use crate::domain::CollaborationStatus;

/// 统一响应包装
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Meta::now(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            meta: Meta::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// 响应元数据
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// ==========================================
// ApiError → HTTP 响应
// ==========================================
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::ValidationError(_)
            | ApiError::FieldNotEditable(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BusinessRuleViolation(_)
            | ApiError::InvalidStateTransition { .. }
            | ApiError::OptimisticLockFailure(_) => StatusCode::CONFLICT,
            ApiError::ImportError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DatabaseConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_)
            | ApiError::ExportError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
        }
        HttpResponse::build(status).json(ApiResponse::<()>::error(self.code(), self.to_string()))
    }
}

// ==========================================
// 查询参数
// ==========================================

/// 日期区间查询参数
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    pub fn into_range(self) -> DateRange {
        DateRange::new(non_blank(self.from), non_blank(self.to))
    }
}

/// 预测原始行查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ForecastRowsQuery {
    pub location_id: Option<String>,
    pub customer_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ForecastRowsQuery {
    pub fn into_filter(self) -> ForecastFilter {
        ForecastFilter {
            location_id: non_blank(self.location_id),
            customer_id: non_blank(self.customer_id),
            range: DateRange::new(non_blank(self.from), non_blank(self.to)),
        }
    }
}

/// 预测序列查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ForecastSeriesQuery {
    pub node_key: Option<String>,
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    pub customer_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ForecastSeriesQuery {
    pub fn into_request(self) -> ForecastSeriesRequest {
        ForecastSeriesRequest {
            node_key: non_blank(self.node_key),
            product_id: non_blank(self.product_id),
            location_id: non_blank(self.location_id),
            customer_id: non_blank(self.customer_id),
            range: DateRange::new(non_blank(self.from), non_blank(self.to)),
        }
    }
}

/// 协同记录查询参数
#[derive(Debug, Default, Deserialize)]
pub struct CollaborationQuery {
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
}

/// 状态流转请求体
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: CollaborationStatus,
}

/// 文件导入请求体
#[derive(Debug, Deserialize)]
pub struct ImportFileRequest {
    pub kind: String,
    pub file_path: String,
}

/// CSV 文本导入查询参数
#[derive(Debug, Deserialize)]
pub struct ImportKindQuery {
    pub kind: String,
}

/// 空串视为未提供
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
