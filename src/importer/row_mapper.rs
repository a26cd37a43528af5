// ==========================================
// 供应链需求计划看板 - 行映射
// ==========================================
// 列名匹配: 忽略大小写、下划线、空格、连字符
//   productId / product_id / Product ID → productid
// 数值: 无法解析 → None（聚合时按 0 计）
// 主键缺失 → None（由调用方跳过并计数）
// ==========================================

use crate::domain::types::DateKey;
use crate::domain::{ForecastRecord, Product, SupplyPlanRow};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// 列名归一化
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-' | '\u{feff}'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ==========================================
// FieldLookup - 按别名取值
// ==========================================
pub struct FieldLookup<'a> {
    cells: HashMap<String, &'a str>,
}

impl<'a> FieldLookup<'a> {
    pub fn new(row: &'a HashMap<String, String>) -> Self {
        let cells = row
            .iter()
            .map(|(k, v)| (normalize_header(k), v.as_str()))
            .collect();
        Self { cells }
    }

    /// 按别名顺序取第一个非空字符串
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| self.cells.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 数值字段,解析失败视为空
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        let raw = self.text(aliases)?;
        raw.replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// 日期字段,Excel 序列号换算为 YYYY-MM-DD
    pub fn date(&self, aliases: &[&str]) -> Option<String> {
        self.text(aliases).map(|raw| normalize_date_cell(&raw))
    }
}

/// Excel 1900 日期系统的最大序列号（9999-12-31）
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// 单元格日期归一化
///
/// 可解析日期 → YYYY-MM-DD；纯数字按 Excel 序列号换算；其余原样保留
pub fn normalize_date_cell(raw: &str) -> String {
    let key = DateKey::parse(raw);
    if key.as_date().is_some() {
        return key.to_string();
    }

    if let Ok(serial) = raw.trim().parse::<f64>() {
        if serial >= 1.0 && serial <= EXCEL_MAX_SERIAL {
            if let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) {
                let date = epoch + Duration::days(serial.floor() as i64);
                return date.format("%Y-%m-%d").to_string();
            }
        }
    }

    key.to_string()
}

// ===== 列别名（均为归一化形式） =====
const DATE: &[&str] = &["date", "period", "日期"];
const PRODUCT_ID: &[&str] = &["productid", "sku", "product", "产品id", "产品编码"];
const LOCATION_ID: &[&str] = &["locationid", "location", "site", "地点id", "地点"];
const CUSTOMER_ID: &[&str] = &["customerid", "customer", "客户id", "客户"];

const FORECAST: &[&str] = &["forecast", "预测"];
const ACTUAL: &[&str] = &["actual", "actuals", "实际"];
const SALES_PLAN: &[&str] = &["salesplan", "销售计划"];
const DEMAND_PLANNER: &[&str] = &["demandplanner", "计划员调整"];
const COMMERCIAL_INPUT: &[&str] = &["commercialinput", "商务输入"];

const TOTAL_DEMAND: &[&str] = &["totaldemand", "总需求"];
const PLANNED_ARRIVALS: &[&str] = &["plannedarrivals", "plannedreceipts", "计划到货"];
const PLANNED_ORDERS: &[&str] = &["plannedorders", "计划订单"];
const PROJECTED_ON_HAND: &[&str] = &["projectedonhand", "onhand", "预计库存"];
const SAFETY_STOCK: &[&str] = &["safetystock", "安全库存"];

const NAME: &[&str] = &["name", "productname", "产品名称"];
const CATEGORY_ID: &[&str] = &["categoryid", "品类id"];
const CATEGORY_NAME: &[&str] = &["categoryname", "category", "品类"];
const SUBCATEGORY_ID: &[&str] = &["subcategoryid", "子品类id"];
const SUBCATEGORY_NAME: &[&str] = &["subcategoryname", "subcategory", "子品类"];

/// 预测行: 需要 date + product_id
pub fn map_forecast_row(row: &HashMap<String, String>) -> Option<ForecastRecord> {
    let f = FieldLookup::new(row);
    Some(ForecastRecord {
        date: f.date(DATE)?,
        product_id: f.text(PRODUCT_ID)?,
        location_id: f.text(LOCATION_ID).unwrap_or_default(),
        customer_id: f.text(CUSTOMER_ID).unwrap_or_default(),
        forecast: f.number(FORECAST),
        actual: f.number(ACTUAL),
        sales_plan: f.number(SALES_PLAN),
        demand_planner: f.number(DEMAND_PLANNER),
        commercial_input: f.number(COMMERCIAL_INPUT),
    })
}

/// 供应计划行: 需要 product_id + location_id + date
pub fn map_supply_plan_row(row: &HashMap<String, String>) -> Option<SupplyPlanRow> {
    let f = FieldLookup::new(row);
    Some(SupplyPlanRow {
        product_id: f.text(PRODUCT_ID)?,
        location_id: f.text(LOCATION_ID)?,
        date: f.date(DATE)?,
        forecast: f.number(FORECAST),
        actual: f.number(ACTUAL),
        total_demand: f.number(TOTAL_DEMAND),
        planned_arrivals: f.number(PLANNED_ARRIVALS),
        planned_orders: f.number(PLANNED_ORDERS),
        projected_on_hand: f.number(PROJECTED_ON_HAND),
        safety_stock: f.number(SAFETY_STOCK),
    })
}

/// 产品行: 需要 product_id
pub fn map_product_row(row: &HashMap<String, String>) -> Option<Product> {
    let f = FieldLookup::new(row);
    Some(Product {
        product_id: f.text(PRODUCT_ID)?,
        name: f.text(NAME).unwrap_or_default(),
        category_id: f.text(CATEGORY_ID),
        category_name: f.text(CATEGORY_NAME),
        subcategory_id: f.text(SUBCATEGORY_ID),
        subcategory_name: f.text(SUBCATEGORY_NAME),
    })
}
