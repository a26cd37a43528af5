// ==========================================
// 供应链需求计划看板 - 导入层
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 数据: 需求预测 / 供应计划 / 产品主数据
// ==========================================

pub mod error;
pub mod file_parser;
pub mod planning_importer;
pub mod row_mapper;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use planning_importer::{ImportKind, ImportSummary, PlanningImporter};
