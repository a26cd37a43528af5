// ==========================================
// DashboardApi / ProductApi 集成测试
// ==========================================
// 测试范围:
// 1. 品类树: 构建 / 节点下产品收集
// 2. 预测序列: 按节点汇总 / 同日求和 / 日期区间
// 3. 单元格编辑: 可编辑字段 / 不可编辑字段
// 4. 供应计划: 透视 / 重复策略 / 库存指标 / CSV 导出
// ==========================================

mod helpers;

use helpers::test_data_builder::{
    sample_products, ForecastBuilder, ProductBuilder, SupplyPlanBuilder,
};
use supply_planning::api::{ApiError, DateRange, ForecastFilter, ForecastSeriesRequest};
use supply_planning::config::config_keys;
use supply_planning::domain::{ForecastField, ForecastValueUpdate};
use test_helpers::create_test_state;

fn seed_forecasts(state: &supply_planning::app::AppState) {
    state
        .product_api
        .upsert_products(&sample_products())
        .expect("写入产品失败");

    let records = vec![
        ForecastBuilder::new("P1", "2024-01-01").forecast(10.0).actual(8.0).build(),
        ForecastBuilder::new("P2", "2024-01-01").forecast(5.0).build(),
        ForecastBuilder::new("P3", "2024-01-01").forecast(2.0).build(),
        ForecastBuilder::new("P1", "2024-01-02").forecast(7.0).build(),
        ForecastBuilder::new("P1", "2024-01-02")
            .customer("C2")
            .forecast(1.0)
            .sales_plan(4.0)
            .build(),
        ForecastBuilder::new("P4", "2024-01-02").forecast(100.0).build(),
    ];
    state
        .dashboard_api
        .upsert_forecasts(&records)
        .expect("写入预测失败");
}

// ==========================================
// 品类树
// ==========================================

#[test]
fn test_category_tree_同名子品类不合并() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    state
        .product_api
        .upsert_products(&sample_products())
        .expect("写入产品失败");

    let tree = state.product_api.get_category_tree().expect("构建品类树失败");
    assert_eq!(tree.categories.len(), 3);
    assert!(tree.find("BEV/TEA").is_some());
    assert!(tree.find("SNK/TEA").is_some());
    assert_eq!(tree.product_count(), 5);

    let ids = state
        .product_api
        .collect_product_ids("BEV")
        .expect("收集产品失败");
    assert_eq!(ids, vec!["P1", "P2", "P3"]);
}

#[test]
fn test_collect_product_ids_节点不存在() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let result = state.product_api.collect_product_ids("NOPE");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// ==========================================
// 预测序列
// ==========================================

#[test]
fn test_forecast_series_按子品类同日求和() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);

    let request = ForecastSeriesRequest {
        node_key: Some("BEV/TEA".to_string()),
        ..Default::default()
    };
    let series = state
        .dashboard_api
        .get_forecast_series(&request)
        .expect("查询序列失败");

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date.to_string(), "2024-01-01");
    assert_eq!(series[0].forecast, 15.0);
    assert_eq!(series[0].actual, 8.0);
    assert_eq!(series[1].forecast, 8.0);
    assert_eq!(series[1].sales_plan, 4.0);
}

#[test]
fn test_forecast_series_需要节点或产品() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let result = state
        .dashboard_api
        .get_forecast_series(&ForecastSeriesRequest::default());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_forecast_series_起始日期按展示天数截断() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);
    state
        .config_manager
        .set_global_config_value(config_keys::FORECAST_HORIZON_DAYS, "1")
        .expect("写配置失败");

    let request = ForecastSeriesRequest {
        product_id: Some("P1".to_string()),
        range: DateRange::new(Some("2024-01-01".to_string()), None),
        ..Default::default()
    };
    let series = state
        .dashboard_api
        .get_forecast_series(&request)
        .expect("查询序列失败");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].forecast, 10.0);
}

#[test]
fn test_forecast_series_超大展示天数不崩溃() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);
    state
        .config_manager
        .set_global_config_value(config_keys::FORECAST_HORIZON_DAYS, "100000000")
        .expect("写配置失败");

    let request = ForecastSeriesRequest {
        product_id: Some("P1".to_string()),
        range: DateRange::new(Some("2024-01-01".to_string()), None),
        ..Default::default()
    };
    let series = state
        .dashboard_api
        .get_forecast_series(&request)
        .expect("查询序列失败");
    assert_eq!(series.len(), 2);
}

#[test]
fn test_forecast_series_rfc3339起始日期同样截断() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);
    state
        .config_manager
        .set_global_config_value(config_keys::FORECAST_HORIZON_DAYS, "1")
        .expect("写配置失败");

    let request = ForecastSeriesRequest {
        product_id: Some("P1".to_string()),
        range: DateRange::new(Some("2024-01-01T00:00:00.000Z".to_string()), None),
        ..Default::default()
    };
    let series = state
        .dashboard_api
        .get_forecast_series(&request)
        .expect("查询序列失败");
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].date.to_string(), "2024-01-01");
}

#[test]
fn test_forecast_series_产品与品类同键() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    state
        .product_api
        .upsert_products(&[
            ProductBuilder::new("100").category("100", "饮料").build(),
            ProductBuilder::new("200").category("100", "饮料").build(),
        ])
        .expect("写入产品失败");
    state
        .dashboard_api
        .upsert_forecasts(&[
            ForecastBuilder::new("100", "2024-01-01").forecast(1.0).build(),
            ForecastBuilder::new("200", "2024-01-01").forecast(2.0).build(),
        ])
        .expect("写入预测失败");

    let ambiguous = state.product_api.collect_product_ids("100");
    assert!(matches!(ambiguous, Err(ApiError::InvalidInput(_))));

    let request = |key: &str| ForecastSeriesRequest {
        node_key: Some(key.to_string()),
        ..Default::default()
    };
    let product_only = state
        .dashboard_api
        .get_forecast_series(&request("product:100"))
        .expect("查询序列失败");
    assert_eq!(product_only[0].forecast, 1.0);

    let whole_category = state
        .dashboard_api
        .get_forecast_series(&request("category:100"))
        .expect("查询序列失败");
    assert_eq!(whole_category[0].forecast, 3.0);
}

#[test]
fn test_forecast_rows_按客户过滤() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);

    let filter = ForecastFilter {
        customer_id: Some("C2".to_string()),
        ..Default::default()
    };
    let rows = state
        .dashboard_api
        .get_forecast_rows("P1", &filter)
        .expect("查询失败");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sales_plan, Some(4.0));
}

// ==========================================
// 单元格编辑
// ==========================================

#[test]
fn test_update_forecast_value_可编辑字段() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);

    let update = ForecastValueUpdate {
        date: "2024-01-01".to_string(),
        product_id: "P1".to_string(),
        location_id: "L1".to_string(),
        customer_id: "C1".to_string(),
        field: ForecastField::DemandPlanner,
        value: Some(12.0),
    };
    state
        .dashboard_api
        .update_forecast_value(&update)
        .expect("更新失败");

    let rows = state
        .dashboard_api
        .get_forecast_rows("P1", &ForecastFilter::default())
        .expect("查询失败");
    let edited = rows
        .iter()
        .find(|r| r.date == "2024-01-01")
        .expect("记录缺失");
    assert_eq!(edited.demand_planner, Some(12.0));
}

#[test]
fn test_update_forecast_value_不可编辑字段() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_forecasts(&state);

    let update = ForecastValueUpdate {
        date: "2024-01-01".to_string(),
        product_id: "P1".to_string(),
        location_id: "L1".to_string(),
        customer_id: "C1".to_string(),
        field: ForecastField::Actual,
        value: Some(1.0),
    };
    let result = state.dashboard_api.update_forecast_value(&update);
    assert!(matches!(result, Err(ApiError::FieldNotEditable(_))));
}

#[test]
fn test_update_forecast_value_记录不存在() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");

    let update = ForecastValueUpdate {
        date: "2024-01-01".to_string(),
        product_id: "P404".to_string(),
        location_id: "L1".to_string(),
        customer_id: "C1".to_string(),
        field: ForecastField::SalesPlan,
        value: None,
    };
    let result = state.dashboard_api.update_forecast_value(&update);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// ==========================================
// 供应计划
// ==========================================

fn seed_supply_plan(state: &supply_planning::app::AppState) {
    let rows = vec![
        SupplyPlanBuilder::new("P1", "L1", "2024-01-03")
            .demand(10.0, 10.0)
            .inventory(5.0, 8.0)
            .build(),
        SupplyPlanBuilder::new("P1", "L1", "2024-01-01")
            .demand(10.0, 6.0)
            .inventory(40.0, 8.0)
            .build(),
        SupplyPlanBuilder::new("P1", "L1", "2024-01-02")
            .demand(10.0, 10.0)
            .inventory(20.0, 8.0)
            .planned_arrivals(30.0)
            .build(),
        SupplyPlanBuilder::new("P1", "L2", "2024-01-01")
            .demand(99.0, 99.0)
            .build(),
    ];
    state
        .dashboard_api
        .upsert_supply_plan(&rows)
        .expect("写入供应计划失败");
}

#[test]
fn test_supply_pivot_日期升序且补零() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_supply_plan(&state);

    let pivot = state
        .dashboard_api
        .get_supply_pivot("P1", "L1", &DateRange::default())
        .expect("透视失败");

    let dates: Vec<String> = pivot.dates.iter().map(|d| d.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    assert_eq!(pivot.metrics.len(), 7);
    assert_eq!(pivot.metric_names()[0], "forecast");
    assert_eq!(pivot.value("planned_arrivals", &pivot.dates[0]), 0.0);
    assert_eq!(pivot.value("planned_arrivals", &pivot.dates[1]), 30.0);
}

#[test]
fn test_inventory_metrics_满足率与安全库存() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_supply_plan(&state);

    let report = state
        .dashboard_api
        .get_inventory_metrics("P1", "L1", &DateRange::default())
        .expect("库存指标计算失败");

    assert_eq!(report.window_days, 7);
    assert_eq!(report.points.len(), 3);
    assert_eq!(report.points[0].fill_rate, Some(0.6));
    assert_eq!(report.points[0].days_of_inventory, Some(4.0));
    assert!(report.points[2].below_safety_stock);
    assert_eq!(report.summary.safety_stock_breach_days, 1);
    assert_eq!(
        report.summary.first_breach_date.map(|d| d.to_string()),
        Some("2024-01-03".to_string())
    );
}

#[test]
fn test_export_supply_pivot_csv() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_supply_plan(&state);

    let csv = state
        .dashboard_api
        .export_supply_pivot_csv("P1", "L1", &DateRange::default())
        .expect("导出失败");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("metric,2024-01-01,2024-01-02,2024-01-03")
    );
    assert!(csv.contains("total_demand,10,10,10"));
}

#[test]
fn test_supply_plan_日期区间过滤() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_supply_plan(&state);

    let range = DateRange::new(Some("2024-01-02".to_string()), None);
    let rows = state
        .dashboard_api
        .get_supply_plan_rows("P1", "L1", &range)
        .expect("查询失败");
    assert_eq!(rows.len(), 2);

    let locations = state
        .dashboard_api
        .list_supply_locations("P1")
        .expect("查询地点失败");
    assert_eq!(locations, vec!["L1", "L2"]);
}
