// ==========================================
// 供应链需求计划看板 - 产品主数据
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品
// ==========================================
// 品类/子品类均可空,建树时按 id → 名称 → "uncategorized" 回退
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Product {
    #[serde(alias = "productId")]
    pub product_id: String,
    pub name: String,

    // ===== 品类 =====
    #[serde(alias = "categoryId")]
    pub category_id: Option<String>,
    #[serde(alias = "categoryName")]
    pub category_name: Option<String>,

    // ===== 子品类 =====
    #[serde(alias = "subcategoryId")]
    pub subcategory_id: Option<String>,
    #[serde(alias = "subcategoryName")]
    pub subcategory_name: Option<String>,
}

impl Product {
    /// 展示名称（名称为空时用产品ID）
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.product_id
        } else {
            &self.name
        }
    }
}
