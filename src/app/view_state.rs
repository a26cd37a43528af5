// ==========================================
// 供应链需求计划看板 - 视图会话
// ==========================================
// 每个视图一次刷新 = 一张 RefreshTicket
// - 结果仅在 ticket 仍为最新时生效
// - 关闭视图推进代数,在途结果全部丢弃
// - 拉取失败: 推送 Notice,保留上一次数据,不重试
// ==========================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{ApiError, ApiResult, DashboardApi, DateRange, ForecastSeriesRequest};
use crate::domain::{FilterSelection, ForecastSeriesPoint};
use crate::engine::MetricPivot;

// ==========================================
// RequestTracker - 请求代数
// ==========================================

/// 一次刷新的凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: AtomicU64,
    closed: AtomicBool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始新请求,之前的 ticket 全部失效
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// 关闭视图
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// ==========================================
// Notice - 瞬时提示
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            created_at: Local::now().naive_local(),
        }
    }
}

// ==========================================
// PlanningDataSource - 视图数据来源
// ==========================================
#[async_trait]
pub trait PlanningDataSource: Send + Sync {
    async fn forecast_series(
        &self,
        request: ForecastSeriesRequest,
    ) -> ApiResult<Vec<ForecastSeriesPoint>>;

    async fn supply_pivot(
        &self,
        product_id: String,
        location_id: String,
        range: DateRange,
    ) -> ApiResult<MetricPivot>;
}

/// 基于 DashboardApi 的数据来源（阻塞调用放到 blocking 线程）
pub struct ApiDataSource {
    dashboard_api: Arc<DashboardApi>,
}

impl ApiDataSource {
    pub fn new(dashboard_api: Arc<DashboardApi>) -> Self {
        Self { dashboard_api }
    }
}

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::InternalError(format!("后台任务失败: {}", err))
}

#[async_trait]
impl PlanningDataSource for ApiDataSource {
    async fn forecast_series(
        &self,
        request: ForecastSeriesRequest,
    ) -> ApiResult<Vec<ForecastSeriesPoint>> {
        let api = self.dashboard_api.clone();
        tokio::task::spawn_blocking(move || api.get_forecast_series(&request))
            .await
            .map_err(join_error)?
    }

    async fn supply_pivot(
        &self,
        product_id: String,
        location_id: String,
        range: DateRange,
    ) -> ApiResult<MetricPivot> {
        let api = self.dashboard_api.clone();
        tokio::task::spawn_blocking(move || api.get_supply_pivot(&product_id, &location_id, &range))
            .await
            .map_err(join_error)?
    }
}

// ==========================================
// ForecastViewSession - 预测视图会话
// ==========================================

/// 一次拉取的结果（尚未应用）
#[derive(Debug)]
pub struct RefreshOutcome {
    pub ticket: RefreshTicket,
    pub series: ApiResult<Vec<ForecastSeriesPoint>>,
    /// 选中产品与地点时才拉取
    pub pivot: Option<ApiResult<MetricPivot>>,
}

pub struct ForecastViewSession<S: PlanningDataSource> {
    view: String,
    source: Arc<S>,
    tracker: Arc<RequestTracker>,
    selection: FilterSelection,
    node_key: Option<String>,
    range: DateRange,
    series: Vec<ForecastSeriesPoint>,
    pivot: Option<MetricPivot>,
    notices: Vec<Notice>,
}

impl<S: PlanningDataSource> ForecastViewSession<S> {
    pub fn new(view: impl Into<String>, source: Arc<S>, selection: FilterSelection) -> Self {
        Self {
            view: view.into(),
            source,
            tracker: Arc::new(RequestTracker::new()),
            selection,
            node_key: None,
            range: DateRange::default(),
            series: Vec::new(),
            pivot: None,
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    /// 选中品类树节点（优先于 selection.product_id）
    pub fn set_node_key(&mut self, node_key: Option<String>) {
        self.node_key = node_key;
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    pub fn series(&self) -> &[ForecastSeriesPoint] {
        &self.series
    }

    pub fn pivot(&self) -> Option<&MetricPivot> {
        self.pivot.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 取走全部提示（展示后清空）
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn tracker(&self) -> Arc<RequestTracker> {
        self.tracker.clone()
    }

    /// 拉取当前筛选下的数据（序列与透视并发）
    pub async fn fetch(&self) -> RefreshOutcome {
        let ticket = self.tracker.begin();
        let source = self.source.clone();

        let node_key = self.node_key.clone();
        let product_id = self.selection.product_id.clone();
        let location_id = self.selection.location_id.clone();

        let series_request = ForecastSeriesRequest {
            node_key: node_key.clone(),
            product_id: product_id.clone(),
            location_id: location_id.clone(),
            customer_id: self.selection.customer_id.clone(),
            range: self.range.clone(),
        };

        let series_fut = async {
            if node_key.is_none() && product_id.is_none() {
                return Ok(Vec::new());
            }
            source.forecast_series(series_request).await
        };

        let pivot_fut = async {
            match (product_id.clone(), location_id.clone()) {
                (Some(product), Some(location)) => Some(
                    source
                        .supply_pivot(product, location, self.range.clone())
                        .await,
                ),
                _ => None,
            }
        };

        let (series, pivot) = futures::join!(series_fut, pivot_fut);
        RefreshOutcome {
            ticket,
            series,
            pivot,
        }
    }

    /// 应用拉取结果
    ///
    /// # 返回
    /// - true: 已应用
    /// - false: ticket 过期或视图已关闭,结果被丢弃
    pub fn apply(&mut self, outcome: RefreshOutcome) -> bool {
        if !self.tracker.is_current(&outcome.ticket) {
            debug!(
                view = %self.view,
                generation = outcome.ticket.generation(),
                "丢弃过期的刷新结果"
            );
            return false;
        }

        match outcome.series {
            Ok(series) => self.series = series,
            Err(e) => self.push_failure("预测序列加载失败", &e),
        }

        match outcome.pivot {
            Some(Ok(pivot)) => self.pivot = Some(pivot),
            Some(Err(e)) => self.push_failure("供应计划加载失败", &e),
            None => self.pivot = None,
        }

        true
    }

    /// 拉取并应用
    pub async fn refresh(&mut self) -> bool {
        let outcome = self.fetch().await;
        self.apply(outcome)
    }

    /// 关闭视图（卸载）
    pub fn close(&self) {
        self.tracker.close();
    }

    fn push_failure(&mut self, context: &str, err: &ApiError) {
        warn!(view = %self.view, error = %err, "{}", context);
        self.notices
            .push(Notice::error(format!("{}: {}", context, err)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateKey;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicUsize;

    /// 可切换成功/失败的假数据源
    struct FakeSource {
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }
    }

    fn point(day: u32, forecast: f64) -> ForecastSeriesPoint {
        ForecastSeriesPoint {
            date: DateKey::from(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
            forecast,
            actual: 0.0,
            sales_plan: 0.0,
            demand_planner: 0.0,
            commercial_input: 0.0,
        }
    }

    #[async_trait]
    impl PlanningDataSource for FakeSource {
        async fn forecast_series(
            &self,
            _request: ForecastSeriesRequest,
        ) -> ApiResult<Vec<ForecastSeriesPoint>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::DatabaseError("connection reset".to_string()));
            }
            Ok(vec![point(1, n as f64)])
        }

        async fn supply_pivot(
            &self,
            _product_id: String,
            _location_id: String,
            _range: DateRange,
        ) -> ApiResult<MetricPivot> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::DatabaseError("connection reset".to_string()));
            }
            Ok(MetricPivot::default())
        }
    }

    fn session(source: Arc<FakeSource>) -> ForecastViewSession<FakeSource> {
        ForecastViewSession::new(
            "forecast",
            source,
            FilterSelection::default().with_product("P1"),
        )
    }

    #[test]
    fn test_tracker_generations() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(&first));

        let second = tracker.begin();
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));

        tracker.close();
        assert!(!tracker.is_current(&second));
        assert!(tracker.is_closed());
    }

    #[tokio::test]
    async fn test_refresh_applies_latest_result() {
        let source = Arc::new(FakeSource::new());
        let mut view = session(source.clone());

        assert!(view.refresh().await);
        assert_eq!(view.series().len(), 1);
        assert_eq!(view.series()[0].forecast, 1.0);
        assert!(view.pivot().is_none());
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let source = Arc::new(FakeSource::new());
        let mut view = session(source);

        let older = view.fetch().await;
        let newer = view.fetch().await;

        assert!(!view.apply(older));
        assert!(view.series().is_empty());

        assert!(view.apply(newer));
        assert_eq!(view.series()[0].forecast, 2.0);
    }

    #[tokio::test]
    async fn test_closed_view_discards_in_flight_result() {
        let source = Arc::new(FakeSource::new());
        let mut view = session(source);

        let outcome = view.fetch().await;
        view.close();

        assert!(!view.apply(outcome));
        assert!(view.series().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data_and_pushes_notice() {
        let source = Arc::new(FakeSource::new());
        let mut view = session(source.clone());
        view.refresh().await;

        source.fail.store(true, Ordering::SeqCst);
        assert!(view.refresh().await);

        assert_eq!(view.series()[0].forecast, 1.0);
        let notices = view.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(view.notices().is_empty());
        // 不重试
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pivot_fetched_when_location_selected() {
        let source = Arc::new(FakeSource::new());
        let mut view = session(source);
        view.set_selection(
            FilterSelection::default()
                .with_product("P1")
                .with_location("L1"),
        );

        view.refresh().await;
        assert!(view.pivot().is_some());
    }

    #[tokio::test]
    async fn test_empty_selection_skips_source() {
        let source = Arc::new(FakeSource::new());
        let mut view = ForecastViewSession::new("forecast", source.clone(), FilterSelection::default());

        view.refresh().await;
        assert!(view.series().is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
