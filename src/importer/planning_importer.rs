// ==========================================
// 供应链需求计划看板 - 计划数据导入器
// ==========================================
// 流程: 解析 → 映射 → 跳过缺主键行 → 落库（事务化）
// 输出: ImportSummary（批次号 / 总行数 / 成功 / 跳过）
// ==========================================

use crate::domain::{ForecastRecord, Product, SupplyPlanRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::importer::row_mapper::{map_forecast_row, map_product_row, map_supply_plan_row};
use crate::repository::{ForecastRepository, ProductRepository, SupplyPlanRepository};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportKind - 导入数据类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportKind {
    Forecast,
    SupplyPlan,
    Product,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Forecast => "FORECAST",
            ImportKind::SupplyPlan => "SUPPLY_PLAN",
            ImportKind::Product => "PRODUCT",
        }
    }

    pub fn parse(value: &str) -> ImportResult<Self> {
        match value.trim().to_uppercase().replace('-', "_").as_str() {
            "FORECAST" => Ok(ImportKind::Forecast),
            "SUPPLY_PLAN" => Ok(ImportKind::SupplyPlan),
            "PRODUCT" | "PRODUCTS" => Ok(ImportKind::Product),
            _ => Err(ImportError::UnknownKind(value.to_string())),
        }
    }
}

// ==========================================
// ImportSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub kind: ImportKind,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    /// 被跳过的数据行号（从 1 开始,不含表头）
    pub skipped_rows: Vec<usize>,
    pub elapsed_ms: u128,
}

// ==========================================
// PlanningImporter
// ==========================================
pub struct PlanningImporter {
    forecast_repo: ForecastRepository,
    supply_plan_repo: SupplyPlanRepository,
    product_repo: ProductRepository,
    parser: UniversalFileParser,
}

/// 按映射函数拆分成功行与跳过行号
fn map_rows<T>(rows: &[RawRecord], mapper: fn(&RawRecord) -> Option<T>) -> (Vec<T>, Vec<usize>) {
    let mut mapped = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        match mapper(row) {
            Some(record) => mapped.push(record),
            None => skipped.push(idx + 1),
        }
    }
    (mapped, skipped)
}

impl PlanningImporter {
    /// 基于共享连接创建导入器
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            forecast_repo: ForecastRepository::from_connection(conn.clone()),
            supply_plan_repo: SupplyPlanRepository::from_connection(conn.clone()),
            product_repo: ProductRepository::from_connection(conn),
            parser: UniversalFileParser,
        }
    }

    /// 从文件导入
    ///
    /// # 参数
    /// - kind: 数据类型
    /// - file_path: .csv / .xlsx / .xls
    #[instrument(skip_all, fields(kind = kind.as_str()))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        kind: ImportKind,
        file_path: P,
    ) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "开始导入文件");

        let rows = self.parser.parse(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        self.import_records(kind, &rows)
    }

    /// 导入已解析的原始行
    pub fn import_records(&self, kind: ImportKind, rows: &[RawRecord]) -> ImportResult<ImportSummary> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let total_rows = rows.len();

        let (imported, skipped_rows) = match kind {
            ImportKind::Forecast => {
                let (records, skipped) = map_rows(rows, map_forecast_row);
                (self.store_forecasts(&records)?, skipped)
            }
            ImportKind::SupplyPlan => {
                let (records, skipped) = map_rows(rows, map_supply_plan_row);
                (self.store_supply_plan(&records)?, skipped)
            }
            ImportKind::Product => {
                let (records, skipped) = map_rows(rows, map_product_row);
                (self.store_products(&records)?, skipped)
            }
        };

        if !skipped_rows.is_empty() {
            warn!(
                batch_id = %batch_id,
                skipped = skipped_rows.len(),
                "部分行缺少主键字段,已跳过"
            );
        }

        let summary = ImportSummary {
            batch_id,
            kind,
            total_rows,
            imported,
            skipped: skipped_rows.len(),
            skipped_rows,
            elapsed_ms: start.elapsed().as_millis(),
        };

        info!(
            batch_id = %summary.batch_id,
            total = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed_ms,
            "导入完成"
        );

        Ok(summary)
    }

    fn store_forecasts(&self, records: &[ForecastRecord]) -> ImportResult<usize> {
        Ok(self.forecast_repo.upsert_batch(records)?)
    }

    fn store_supply_plan(&self, rows: &[SupplyPlanRow]) -> ImportResult<usize> {
        Ok(self.supply_plan_repo.upsert_batch(rows)?)
    }

    fn store_products(&self, products: &[Product]) -> ImportResult<usize> {
        Ok(self.product_repo.upsert_batch(products)?)
    }
}
