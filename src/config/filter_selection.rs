// ==========================================
// 供应链需求计划看板 - 筛选状态加载/保存
// ==========================================
// 纯函数: 不读写任何全局状态,持久化由调用方负责
// ==========================================

use crate::domain::selection::FilterSelection;

/// 配置键前缀
const SELECTION_KEY_PREFIX: &str = "filter_selection";

/// 视图对应的配置键
pub fn selection_key(view: &str) -> String {
    format!("{}/{}", SELECTION_KEY_PREFIX, view.trim())
}

/// 从持久化文本加载筛选状态
///
/// 不存在/损坏/空白字段都回退为未选择,不报错
pub fn load_selection(raw: Option<&str>) -> FilterSelection {
    let parsed = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| match serde_json::from_str::<FilterSelection>(s) {
            Ok(selection) => Some(selection),
            Err(e) => {
                tracing::warn!(error = %e, "筛选状态损坏, 使用空筛选");
                None
            }
        })
        .unwrap_or_default();

    FilterSelection {
        product_id: normalize(parsed.product_id),
        location_id: normalize(parsed.location_id),
        customer_id: normalize(parsed.customer_id),
    }
}

/// 序列化筛选状态
pub fn save_selection(selection: &FilterSelection) -> String {
    serde_json::json!({
        "product_id": selection.product_id,
        "location_id": selection.location_id,
        "customer_id": selection.customer_id,
    })
    .to_string()
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
