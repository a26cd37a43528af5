// ==========================================
// 供应链需求计划看板 - HTTP 路由
// ==========================================
// 注册顺序即匹配顺序: 固定段路由先于同前缀的参数路由
// ==========================================

use crate::app::http::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/api")
                // 产品 / 品类树（子品类键含 "/",用尾部匹配）
                .route("/products", web::get().to(handlers::list_products))
                .route("/products", web::post().to(handlers::upsert_products))
                .route("/products/tree", web::get().to(handlers::get_category_tree))
                .route(
                    "/products/tree/{key:.+}/ids",
                    web::get().to(handlers::collect_tree_product_ids),
                )
                .route("/products/{product_id}", web::get().to(handlers::get_product))
                // 需求预测
                .route(
                    "/forecast-data/product/{product_id}",
                    web::get().to(handlers::get_forecast_rows),
                )
                .route(
                    "/forecast-data/series",
                    web::get().to(handlers::get_forecast_series),
                )
                .route("/forecast-data", web::put().to(handlers::update_forecast_value))
                .route("/forecast-data", web::post().to(handlers::upsert_forecasts))
                // 供应计划
                .route("/supply-plan", web::post().to(handlers::upsert_supply_plan))
                .route(
                    "/supply-plan/{product_id}/locations",
                    web::get().to(handlers::list_supply_locations),
                )
                .route(
                    "/supply-plan/{product_id}/{location_id}",
                    web::get().to(handlers::get_supply_pivot),
                )
                .route(
                    "/supply-plan/{product_id}/{location_id}/metrics",
                    web::get().to(handlers::get_inventory_metrics),
                )
                .route(
                    "/supply-plan/{product_id}/{location_id}/export",
                    web::get().to(handlers::export_supply_pivot),
                )
                // 通用行变换
                .route("/transforms/aggregate", web::post().to(handlers::aggregate_rows))
                .route("/transforms/pivot", web::post().to(handlers::pivot_rows))
                // 供应网络
                .route("/network/nodes", web::get().to(handlers::list_nodes))
                .route("/network/nodes", web::post().to(handlers::upsert_node))
                .route(
                    "/network/nodes/{node_id}/downstream",
                    web::get().to(handlers::get_downstream_nodes),
                )
                .route(
                    "/network/relationships",
                    web::get().to(handlers::list_relationships),
                )
                .route(
                    "/network/relationships",
                    web::post().to(handlers::create_relationship),
                )
                .route(
                    "/network/relationships/{relationship_id}",
                    web::delete().to(handlers::delete_relationship),
                )
                // 商务协同
                .route(
                    "/collaboration",
                    web::get().to(handlers::list_collaboration_records),
                )
                .route(
                    "/collaboration",
                    web::post().to(handlers::create_collaboration_record),
                )
                .route(
                    "/collaboration/{record_id}/status",
                    web::patch().to(handlers::change_collaboration_status),
                )
                // 筛选状态
                .route("/selection/{view}", web::get().to(handlers::get_selection))
                .route("/selection/{view}", web::put().to(handlers::save_selection))
                // 导入
                .route("/import", web::post().to(handlers::import_file))
                .route("/import/csv", web::post().to(handlers::import_csv_text)),
        );
}
