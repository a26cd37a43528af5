// ==========================================
// 供应链需求计划看板 - 行数据接口
// ==========================================
// 职责: 聚合器/透视器的统一输入接口
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==========================================
// Trait: DatedMetrics
// ==========================================
// 用途: 带日期 + 一组可空数值字段的行
pub trait DatedMetrics {
    /// 原始日期字符串
    fn date_str(&self) -> &str;

    /// 指标名 → 可空数值,顺序即输出顺序
    fn metric_values(&self) -> Vec<(&str, Option<f64>)>;
}

// ==========================================
// RawMetricRow - 通用 JSON 行
// ==========================================
// 用于结构未知的行数据: 只读取调用方声明的指标字段,其余字段一律视为维度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawMetricRow {
    pub date: String,
    /// 按声明顺序排列的指标值
    pub values: Vec<(String, Option<f64>)>,
}

impl RawMetricRow {
    /// 从 JSON 对象构建
    ///
    /// # 参数
    /// - value: JSON 对象
    /// - date_field: 日期字段名
    /// - metrics: 指标字段白名单（决定输出顺序）
    ///
    /// # 返回
    /// - Some(RawMetricRow): 对象且日期字段为字符串
    /// - None: 非对象或缺少日期
    ///
    /// # 说明
    /// - 数值 → Some, 数字字符串 → 解析
    /// - 缺失 / null / 无法解析 → None（聚合时按 0 计）
    pub fn from_json(value: &Value, date_field: &str, metrics: &[String]) -> Option<Self> {
        let obj = value.as_object()?;
        let date = obj.get(date_field)?.as_str()?.to_string();

        let values = metrics
            .iter()
            .map(|metric| {
                let parsed = match obj.get(metric) {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                (metric.clone(), parsed)
            })
            .collect();

        Some(Self { date, values })
    }
}

impl DatedMetrics for RawMetricRow {
    fn date_str(&self) -> &str {
        &self.date
    }

    fn metric_values(&self) -> Vec<(&str, Option<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}
