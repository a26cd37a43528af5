// ==========================================
// 供应链需求计划看板 - HTTP 处理函数
// ==========================================
// 业务 API 为同步调用（持有 SQLite 连接锁）,统一放到 blocking 线程池执行
// ==========================================

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};

use crate::api::{ApiError, ApiResult, RawRowsRequest};
use crate::app::http::models::*;
use crate::app::state::AppState;
use crate::domain::{
    FilterSelection, ForecastRecord, ForecastValueUpdate, NewCollaborationRecord,
    NewNodeRelationship, Product, SupplyNode, SupplyPlanRow,
};

type HandlerResult = Result<HttpResponse, ApiError>;

/// 在 blocking 线程池执行同步业务调用
async fn blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("后台任务失败: {}", e)))?
}

fn ok<T: serde::Serialize>(data: T) -> HandlerResult {
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

fn created<T: serde::Serialize>(data: T) -> HandlerResult {
    Ok(HttpResponse::Created().json(ApiResponse::success(data)))
}

/// 下载文件名: 仅保留 ASCII 字母数字与 - _ . ,其余替换为 _
pub(crate) fn export_file_name(product_id: &str, location_id: &str) -> String {
    let sanitize = |value: &str| -> String {
        value
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!(
        "supply_plan_{}_{}.csv",
        sanitize(product_id),
        sanitize(location_id)
    )
}

// ==========================================
// 健康检查
// ==========================================

pub async fn health_check(state: web::Data<AppState>) -> HandlerResult {
    let state = state.into_inner();
    let health = blocking(move || state.health()).await?;
    ok(health)
}

// ==========================================
// 产品 / 品类树
// ==========================================

pub async fn list_products(state: web::Data<AppState>) -> HandlerResult {
    let api = state.product_api.clone();
    ok(blocking(move || api.list_products()).await?)
}

pub async fn upsert_products(
    state: web::Data<AppState>,
    payload: web::Json<Vec<Product>>,
) -> HandlerResult {
    let api = state.product_api.clone();
    let products = payload.into_inner();
    ok(blocking(move || api.upsert_products(&products)).await?)
}

pub async fn get_product(state: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let api = state.product_api.clone();
    let product_id = path.into_inner();
    ok(blocking(move || api.get_product(&product_id)).await?)
}

pub async fn get_category_tree(state: web::Data<AppState>) -> HandlerResult {
    let api = state.product_api.clone();
    ok(blocking(move || api.get_category_tree()).await?)
}

pub async fn collect_tree_product_ids(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let api = state.product_api.clone();
    let key = path.into_inner();
    ok(blocking(move || api.collect_product_ids(&key)).await?)
}

// ==========================================
// 需求预测
// ==========================================

pub async fn get_forecast_rows(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ForecastRowsQuery>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let product_id = path.into_inner();
    let filter = query.into_inner().into_filter();
    ok(blocking(move || api.get_forecast_rows(&product_id, &filter)).await?)
}

pub async fn get_forecast_series(
    state: web::Data<AppState>,
    query: web::Query<ForecastSeriesQuery>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let request = query.into_inner().into_request();
    ok(blocking(move || api.get_forecast_series(&request)).await?)
}

pub async fn update_forecast_value(
    state: web::Data<AppState>,
    payload: web::Json<ForecastValueUpdate>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let update = payload.into_inner();
    tracing::info!(
        product_id = %update.product_id,
        field = update.field.as_str(),
        "预测单元格编辑请求"
    );
    blocking(move || api.update_forecast_value(&update)).await?;
    ok(serde_json::json!({ "updated": true }))
}

pub async fn upsert_forecasts(
    state: web::Data<AppState>,
    payload: web::Json<Vec<ForecastRecord>>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let records = payload.into_inner();
    ok(blocking(move || api.upsert_forecasts(&records)).await?)
}

// ==========================================
// 供应计划
// ==========================================

pub async fn upsert_supply_plan(
    state: web::Data<AppState>,
    payload: web::Json<Vec<SupplyPlanRow>>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let rows = payload.into_inner();
    ok(blocking(move || api.upsert_supply_plan(&rows)).await?)
}

pub async fn list_supply_locations(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let product_id = path.into_inner();
    ok(blocking(move || api.list_supply_locations(&product_id)).await?)
}

pub async fn get_supply_pivot(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<RangeQuery>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let (product_id, location_id) = path.into_inner();
    let range = query.into_inner().into_range();
    ok(blocking(move || api.get_supply_pivot(&product_id, &location_id, &range)).await?)
}

pub async fn get_inventory_metrics(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<RangeQuery>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let (product_id, location_id) = path.into_inner();
    let range = query.into_inner().into_range();
    ok(blocking(move || api.get_inventory_metrics(&product_id, &location_id, &range)).await?)
}

pub async fn export_supply_pivot(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<RangeQuery>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let (product_id, location_id) = path.into_inner();
    let file_name = export_file_name(&product_id, &location_id);
    let range = query.into_inner().into_range();

    let csv = blocking(move || api.export_supply_pivot_csv(&product_id, &location_id, &range))
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(csv))
}

// ==========================================
// 通用行变换
// ==========================================

pub async fn aggregate_rows(
    state: web::Data<AppState>,
    payload: web::Json<RawRowsRequest>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let request = payload.into_inner();
    ok(blocking(move || api.aggregate_raw_rows(&request)).await?)
}

pub async fn pivot_rows(
    state: web::Data<AppState>,
    payload: web::Json<RawRowsRequest>,
) -> HandlerResult {
    let api = state.dashboard_api.clone();
    let request = payload.into_inner();
    ok(blocking(move || api.pivot_raw_rows(&request)).await?)
}

// ==========================================
// 供应网络
// ==========================================

pub async fn list_nodes(state: web::Data<AppState>) -> HandlerResult {
    let api = state.network_api.clone();
    ok(blocking(move || api.list_nodes()).await?)
}

pub async fn upsert_node(
    state: web::Data<AppState>,
    payload: web::Json<SupplyNode>,
) -> HandlerResult {
    let api = state.network_api.clone();
    let node = payload.into_inner();
    ok(blocking(move || api.upsert_node(&node)).await?)
}

pub async fn get_downstream_nodes(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let api = state.network_api.clone();
    let node_id = path.into_inner();
    ok(blocking(move || api.get_downstream_nodes(&node_id)).await?)
}

pub async fn list_relationships(state: web::Data<AppState>) -> HandlerResult {
    let api = state.network_api.clone();
    ok(blocking(move || api.list_relationships()).await?)
}

pub async fn create_relationship(
    state: web::Data<AppState>,
    payload: web::Json<NewNodeRelationship>,
) -> HandlerResult {
    let api = state.network_api.clone();
    let request = payload.into_inner();
    created(blocking(move || api.create_relationship(&request)).await?)
}

pub async fn delete_relationship(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let api = state.network_api.clone();
    let relationship_id = path.into_inner();
    blocking(move || api.delete_relationship(&relationship_id)).await?;
    ok(serde_json::json!({ "deleted": true }))
}

// ==========================================
// 商务协同
// ==========================================

pub async fn list_collaboration_records(
    state: web::Data<AppState>,
    query: web::Query<CollaborationQuery>,
) -> HandlerResult {
    let api = state.collaboration_api.clone();
    let query = query.into_inner();
    ok(blocking(move || {
        api.list_records(query.product_id.as_deref(), query.customer_id.as_deref())
    })
    .await?)
}

pub async fn create_collaboration_record(
    state: web::Data<AppState>,
    payload: web::Json<NewCollaborationRecord>,
) -> HandlerResult {
    let api = state.collaboration_api.clone();
    let request = payload.into_inner();
    created(blocking(move || api.create_record(&request)).await?)
}

pub async fn change_collaboration_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> HandlerResult {
    let api = state.collaboration_api.clone();
    let record_id = path.into_inner();
    let next = payload.status;
    ok(blocking(move || api.transition_status(&record_id, next)).await?)
}

// ==========================================
// 筛选状态
// ==========================================

pub async fn get_selection(state: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let config = state.config_manager.clone();
    let view = path.into_inner();
    ok(blocking(move || Ok(config.load_filter_selection(&view)?)).await?)
}

pub async fn save_selection(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<FilterSelection>,
) -> HandlerResult {
    let config = state.config_manager.clone();
    let view = path.into_inner();
    let selection = payload.into_inner();
    ok(blocking(move || {
        config.save_filter_selection(&view, &selection)?;
        Ok(selection)
    })
    .await?)
}

// ==========================================
// 导入
// ==========================================

pub async fn import_file(
    state: web::Data<AppState>,
    payload: web::Json<ImportFileRequest>,
) -> HandlerResult {
    let api = state.import_api.clone();
    let request = payload.into_inner();
    ok(blocking(move || api.import_file(&request.kind, &request.file_path)).await?)
}

pub async fn import_csv_text(
    state: web::Data<AppState>,
    query: web::Query<ImportKindQuery>,
    body: String,
) -> HandlerResult {
    let api = state.import_api.clone();
    let kind = query.into_inner().kind;
    ok(blocking(move || api.import_csv_text(&kind, &body)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name_strips_header_breaking_chars() {
        assert_eq!(
            export_file_name("P\"1", "L 1\r\n"),
            "supply_plan_P_1_L_1__.csv"
        );
        assert_eq!(export_file_name("SKU-01", "WH.A"), "supply_plan_SKU-01_WH.A.csv");
        assert_eq!(export_file_name("产品", "L1"), "supply_plan____L1.csv");
    }
}
