// ==========================================
// 供应链需求计划看板 - 看板 API
// ==========================================
// 职责:
// - 需求预测: 原始行 / 按日期聚合序列 / 单元格编辑
// - 供应计划: 指标透视 / 库存指标 / CSV 导出
// - 通用行: 调用方声明指标后聚合 / 透视
// 架构: API 层 → Engine（纯函数）+ Repository
// ==========================================

use std::sync::Arc;

use crate::api::dto::{
    DateRange, ForecastFilter, ForecastSeriesRequest, InventoryReport, RawRowsRequest,
};
use crate::api::error::{require_non_empty, ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::{
    DateKey, ForecastQuery, ForecastRecord, ForecastSeriesPoint, ForecastValueUpdate,
    RawMetricRow, SupplyPlanRow,
};
use crate::engine::{
    aggregate_by_date, aggregate_forecast_series, build_category_tree,
    collect_product_ids_by_key, compute_inventory_metrics, pivot_metrics, summarize_inventory,
    DateAggregate, MetricPivot,
};
use crate::export::pivot_to_csv;
use crate::repository::{ForecastRepository, ProductRepository, SupplyPlanRepository};
use chrono::Duration;
use tracing::{info, instrument, warn};

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    forecast_repo: Arc<ForecastRepository>,
    supply_plan_repo: Arc<SupplyPlanRepository>,
    product_repo: Arc<ProductRepository>,
    config_manager: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(
        forecast_repo: Arc<ForecastRepository>,
        supply_plan_repo: Arc<SupplyPlanRepository>,
        product_repo: Arc<ProductRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            forecast_repo,
            supply_plan_repo,
            product_repo,
            config_manager,
        }
    }

    // ==========================================
    // 需求预测
    // ==========================================

    /// 查询单个产品的预测原始行
    pub fn get_forecast_rows(
        &self,
        product_id: &str,
        filter: &ForecastFilter,
    ) -> ApiResult<Vec<ForecastRecord>> {
        require_non_empty(product_id, "产品ID")?;

        let query = ForecastQuery {
            product_ids: vec![product_id.to_string()],
            location_id: filter.location_id.clone(),
            customer_id: filter.customer_id.clone(),
            date_from: filter.range.from.clone(),
            date_to: filter.range.to.clone(),
        };
        Ok(self.forecast_repo.find(&query)?)
    }

    /// 查询按日期聚合后的预测序列
    ///
    /// # 参数
    /// - request.node_key: 品类/子品类节点时,汇总其下全部产品
    /// - request.product_id: 未给 node_key 时使用
    ///
    /// # 返回
    /// - Ok(points): 日期升序,同日各字段求和,空值按 0
    /// - Err(InvalidInput): node_key 与 product_id 均为空
    /// - Err(NotFound): node_key 不在品类树中
    /// - Err(InvalidInput): node_key 为裸键且命中多个节点
    #[instrument(skip(self, request), fields(node_key = ?request.node_key, product_id = ?request.product_id))]
    pub fn get_forecast_series(
        &self,
        request: &ForecastSeriesRequest,
    ) -> ApiResult<Vec<ForecastSeriesPoint>> {
        let product_ids = self.resolve_product_ids(request)?;
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let range = self.with_horizon(&request.range)?;
        let query = ForecastQuery {
            product_ids,
            location_id: request.location_id.clone(),
            customer_id: request.customer_id.clone(),
            date_from: range.from,
            date_to: range.to,
        };

        let records = self.forecast_repo.find(&query)?;
        let series = aggregate_forecast_series(&records);
        info!(rows = records.len(), points = series.len(), "预测序列已生成");
        Ok(series)
    }

    /// 编辑预测单元格
    ///
    /// 仅 sales_plan / demand_planner / commercial_input 可编辑
    pub fn update_forecast_value(&self, update: &ForecastValueUpdate) -> ApiResult<()> {
        require_non_empty(&update.date, "日期")?;
        require_non_empty(&update.product_id, "产品ID")?;

        if !update.field.is_editable() {
            return Err(ApiError::FieldNotEditable(update.field.as_str().to_string()));
        }
        if let Some(value) = update.value {
            if !value.is_finite() {
                return Err(ApiError::InvalidInput(format!(
                    "字段{}的值无效: {}",
                    update.field.as_str(),
                    value
                )));
            }
        }

        self.forecast_repo.update_field(update)?;
        info!(
            product_id = %update.product_id,
            date = %update.date,
            field = update.field.as_str(),
            value = ?update.value,
            "预测单元格已更新"
        );
        Ok(())
    }

    /// 批量写入预测行
    pub fn upsert_forecasts(&self, records: &[ForecastRecord]) -> ApiResult<usize> {
        for record in records {
            require_non_empty(&record.date, "日期")?;
            require_non_empty(&record.product_id, "产品ID")?;
        }
        Ok(self.forecast_repo.upsert_batch(records)?)
    }

    // ==========================================
    // 供应计划
    // ==========================================

    /// 查询供应计划原始行
    pub fn get_supply_plan_rows(
        &self,
        product_id: &str,
        location_id: &str,
        range: &DateRange,
    ) -> ApiResult<Vec<SupplyPlanRow>> {
        require_non_empty(product_id, "产品ID")?;
        require_non_empty(location_id, "地点ID")?;
        Ok(self.supply_plan_repo.find_by_product_location(
            product_id,
            location_id,
            range.from.as_deref(),
            range.to.as_deref(),
        )?)
    }

    /// 供应计划指标透视（行=指标, 列=日期）
    pub fn get_supply_pivot(
        &self,
        product_id: &str,
        location_id: &str,
        range: &DateRange,
    ) -> ApiResult<MetricPivot> {
        let rows = self.get_supply_plan_rows(product_id, location_id, range)?;
        let policy = self.config_manager.get_pivot_duplicate_policy()?;
        Ok(pivot_metrics(&rows, policy)?)
    }

    /// 库存指标（满足率 / DDH / 安全库存击穿）
    pub fn get_inventory_metrics(
        &self,
        product_id: &str,
        location_id: &str,
        range: &DateRange,
    ) -> ApiResult<InventoryReport> {
        let rows = self.get_supply_plan_rows(product_id, location_id, range)?;
        let window_days = self.config_manager.get_doi_window_days()?;
        let points = compute_inventory_metrics(&rows, window_days);
        let summary = summarize_inventory(&points);

        Ok(InventoryReport {
            product_id: product_id.to_string(),
            location_id: location_id.to_string(),
            window_days,
            points,
            summary,
        })
    }

    /// 导出透视表 CSV
    pub fn export_supply_pivot_csv(
        &self,
        product_id: &str,
        location_id: &str,
        range: &DateRange,
    ) -> ApiResult<String> {
        let pivot = self.get_supply_pivot(product_id, location_id, range)?;
        let csv = pivot_to_csv(&pivot)?;
        info!(
            product_id,
            location_id,
            columns = pivot.dates.len(),
            "透视表已导出"
        );
        Ok(csv)
    }

    /// 产品有计划的地点
    pub fn list_supply_locations(&self, product_id: &str) -> ApiResult<Vec<String>> {
        require_non_empty(product_id, "产品ID")?;
        Ok(self.supply_plan_repo.list_locations_for_product(product_id)?)
    }

    /// 批量写入供应计划行
    pub fn upsert_supply_plan(&self, rows: &[SupplyPlanRow]) -> ApiResult<usize> {
        for row in rows {
            require_non_empty(&row.product_id, "产品ID")?;
            require_non_empty(&row.location_id, "地点ID")?;
            require_non_empty(&row.date, "日期")?;
        }
        Ok(self.supply_plan_repo.upsert_batch(rows)?)
    }

    // ==========================================
    // 通用行变换
    // ==========================================

    /// 通用行按日期聚合
    pub fn aggregate_raw_rows(&self, request: &RawRowsRequest) -> ApiResult<Vec<DateAggregate>> {
        let rows = Self::decode_raw_rows(request)?;
        Ok(aggregate_by_date(&rows))
    }

    /// 通用行指标透视（使用配置的重复单元格策略）
    pub fn pivot_raw_rows(&self, request: &RawRowsRequest) -> ApiResult<MetricPivot> {
        let rows = Self::decode_raw_rows(request)?;
        let policy = self.config_manager.get_pivot_duplicate_policy()?;
        Ok(pivot_metrics(&rows, policy)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 缺少日期字段的行跳过
    fn decode_raw_rows(request: &RawRowsRequest) -> ApiResult<Vec<RawMetricRow>> {
        require_non_empty(&request.date_field, "日期字段")?;
        if request.metrics.iter().all(|m| m.trim().is_empty()) {
            return Err(ApiError::InvalidInput("至少声明一个指标字段".to_string()));
        }

        let rows: Vec<RawMetricRow> = request
            .rows
            .iter()
            .filter_map(|value| {
                RawMetricRow::from_json(value, &request.date_field, &request.metrics)
            })
            .collect();

        let skipped = request.rows.len() - rows.len();
        if skipped > 0 {
            warn!(skipped, date_field = %request.date_field, "缺少日期的行已跳过");
        }
        Ok(rows)
    }

    fn resolve_product_ids(&self, request: &ForecastSeriesRequest) -> ApiResult<Vec<String>> {
        let node_key = request
            .node_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        if let Some(key) = node_key {
            let products = self.product_repo.list_all()?;
            let tree = build_category_tree(&products);
            return Ok(collect_product_ids_by_key(&tree, key)?);
        }

        match request.product_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(vec![id.to_string()]),
            _ => Err(ApiError::InvalidInput(
                "node_key 与 product_id 至少提供一个".to_string(),
            )),
        }
    }

    /// 只给起始日期时,按展示天数补齐结束日期
    ///
    /// 起始日期按 DateKey 规则解析（含 RFC 3339）;结束日期越界时保持开区间
    fn with_horizon(&self, range: &DateRange) -> ApiResult<DateRange> {
        let from_date = match (&range.from, &range.to) {
            (Some(from), None) => DateKey::parse(from).as_date(),
            _ => None,
        };

        let Some(from_date) = from_date else {
            return Ok(range.clone());
        };

        let horizon = self.config_manager.get_forecast_horizon_days()?;
        let to = Duration::try_days(horizon - 1).and_then(|d| from_date.checked_add_signed(d));
        match to {
            Some(to) => Ok(DateRange::new(
                range.from.clone(),
                Some(to.format("%Y-%m-%d").to_string()),
            )),
            None => {
                warn!(from = %from_date, horizon, "展示区间结束日期越界, 不设上限");
                Ok(range.clone())
            }
        }
    }
}
