// ==========================================
// 供应链需求计划看板 - 透视表 CSV 导出
// ==========================================
// 格式: 表头 metric,<日期...>;每个指标一行
// 说明: 看板 "导出 Excel" 按钮使用此格式（Excel 可直接打开）
// ==========================================

use crate::engine::MetricPivot;
use csv::Writer;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("输出编码失败: {0}")]
    Encoding(String),
}

/// 写入任意 Writer
pub fn write_pivot_csv<W: Write>(pivot: &MetricPivot, out: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);

    let mut header = Vec::with_capacity(pivot.dates.len() + 1);
    header.push("metric".to_string());
    header.extend(pivot.dates.iter().map(|d| d.to_string()));
    writer.write_record(&header)?;

    for series in &pivot.metrics {
        let mut record = Vec::with_capacity(header.len());
        record.push(series.metric.clone());
        for date in &pivot.dates {
            record.push(format_value(pivot.value(&series.metric, date)));
        }
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 导出为字符串
pub fn pivot_to_csv(pivot: &MetricPivot) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_pivot_csv(pivot, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ExportError::Encoding(e.to_string()))
}

// 整数不带小数点
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
