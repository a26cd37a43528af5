// ==========================================
// 供应链需求计划看板 - 导出层
// ==========================================

pub mod pivot_csv;

pub use pivot_csv::{pivot_to_csv, write_pivot_csv, ExportError};
