// ==========================================
// 供应链需求计划看板 - 导入 API
// ==========================================

use std::path::Path;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::importer::{CsvParser, ImportKind, ImportSummary, PlanningImporter};

pub struct ImportApi {
    importer: Arc<PlanningImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<PlanningImporter>) -> Self {
        Self { importer }
    }

    /// 从服务器本地文件导入
    ///
    /// # 参数
    /// - kind: FORECAST / SUPPLY_PLAN / PRODUCT
    /// - file_path: .csv / .xlsx / .xls
    pub fn import_file(&self, kind: &str, file_path: &str) -> ApiResult<ImportSummary> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        let kind = ImportKind::parse(kind)?;
        Ok(self.importer.import_file(kind, Path::new(file_path))?)
    }

    /// 导入请求体中的 CSV 文本
    pub fn import_csv_text(&self, kind: &str, content: &str) -> ApiResult<ImportSummary> {
        let kind = ImportKind::parse(kind)?;
        let rows = CsvParser.parse_reader(content.as_bytes())?;
        Ok(self.importer.import_records(kind, &rows)?)
    }
}
