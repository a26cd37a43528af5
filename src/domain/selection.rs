// ==========================================
// 供应链需求计划看板 - 筛选状态
// ==========================================
// 显式的持久化配置对象,由调用方传入视图
// 加载/保存见 config::filter_selection
// ==========================================

use serde::{Deserialize, Serialize};

/// 视图筛选条件（产品/地点/客户）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterSelection {
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
    #[serde(alias = "locationId")]
    pub location_id: Option<String>,
    #[serde(alias = "customerId")]
    pub customer_id: Option<String>,
}

impl FilterSelection {
    /// 选中一个产品,返回新的筛选对象
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.location_id.is_none() && self.customer_id.is_none()
    }
}
