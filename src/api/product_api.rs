// ==========================================
// 供应链需求计划看板 - 产品 API
// ==========================================
// 职责: 产品列表 / 品类树 / 节点下产品ID收集
// 说明: 品类树每次从产品列表重新构建,不缓存
// ==========================================

use std::sync::Arc;

use crate::api::error::{require_non_empty, ApiError, ApiResult};
use crate::domain::{CategoryTree, Product};
use crate::engine::{build_category_tree, collect_product_ids_by_key};
use crate::repository::ProductRepository;
use tracing::info;

pub struct ProductApi {
    product_repo: Arc<ProductRepository>,
}

impl ProductApi {
    pub fn new(product_repo: Arc<ProductRepository>) -> Self {
        Self { product_repo }
    }

    /// 查询全部产品
    pub fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.product_repo.list_all()?)
    }

    /// 产品总数（健康检查使用）
    pub fn count_products(&self) -> ApiResult<i64> {
        Ok(self.product_repo.count()?)
    }

    /// 查询单个产品
    pub fn get_product(&self, product_id: &str) -> ApiResult<Product> {
        require_non_empty(product_id, "产品ID")?;
        self.product_repo
            .find_by_id(product_id)?
            .ok_or_else(|| ApiError::NotFound(format!("产品(id={})不存在", product_id)))
    }

    /// 构建品类树
    pub fn get_category_tree(&self) -> ApiResult<CategoryTree> {
        let products = self.product_repo.list_all()?;
        Ok(build_category_tree(&products))
    }

    /// 收集节点下的全部产品ID
    ///
    /// # 参数
    /// - node_key: "category:键" / "subcategory:键" / "product:ID",或唯一匹配的裸键
    ///
    /// # 返回
    /// - Ok(ids): 深度优先顺序的产品ID
    /// - Err(NotFound): 节点不存在
    /// - Err(InvalidInput): 裸键命中多个节点
    pub fn collect_product_ids(&self, node_key: &str) -> ApiResult<Vec<String>> {
        require_non_empty(node_key, "节点键")?;
        let tree = self.get_category_tree()?;
        Ok(collect_product_ids_by_key(&tree, node_key.trim())?)
    }

    /// 批量写入产品
    pub fn upsert_products(&self, products: &[Product]) -> ApiResult<usize> {
        for product in products {
            require_non_empty(&product.product_id, "产品ID")?;
        }
        let count = self.product_repo.upsert_batch(products)?;
        info!(count, "产品主数据已写入");
        Ok(count)
    }
}
