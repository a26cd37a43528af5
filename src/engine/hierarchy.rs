// ==========================================
// 供应链需求计划看板 - 品类层级构建
// ==========================================
// 输入: 扁平产品列表
// 输出: 品类 → 子品类 → 产品 的不可变树
// 约束:
// - 品类键: category_id → category_name → "uncategorized"
// - 子品类键: 父品类键 + 自身 id/名称,同名子品类在不同品类下是不同节点
// - 同一键只产生一个节点
// ==========================================

use crate::domain::category_tree::{
    CategoryNode, CategoryTree, NodeLookupError, ProductLeaf, SubcategoryNode, TreeNodeRef,
};
use crate::domain::product::Product;
use std::collections::{HashMap, HashSet};

/// 未分类哨兵键
pub const UNCATEGORIZED_KEY: &str = "uncategorized";

/// 未分类展示名
pub const UNCATEGORIZED_LABEL: &str = "未分类";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn category_key(product: &Product) -> String {
    non_blank(&product.category_id)
        .or_else(|| non_blank(&product.category_name))
        .unwrap_or(UNCATEGORIZED_KEY)
        .to_string()
}

fn category_label(product: &Product) -> String {
    non_blank(&product.category_name)
        .or_else(|| non_blank(&product.category_id))
        .unwrap_or(UNCATEGORIZED_LABEL)
        .to_string()
}

fn subcategory_key(category_key: &str, product: &Product) -> String {
    let own = non_blank(&product.subcategory_id)
        .or_else(|| non_blank(&product.subcategory_name))
        .unwrap_or(UNCATEGORIZED_KEY);
    format!("{}/{}", category_key, own)
}

fn subcategory_label(product: &Product) -> String {
    non_blank(&product.subcategory_name)
        .or_else(|| non_blank(&product.subcategory_id))
        .unwrap_or(UNCATEGORIZED_LABEL)
        .to_string()
}

// ==========================================
// 折叠累加器
// ==========================================
// 仅在 fold 内部持有,完成后冻结为 CategoryTree
#[derive(Default)]
struct TreeAccumulator {
    categories: Vec<CategoryNode>,
    category_index: HashMap<String, usize>,
    subcategory_index: HashMap<String, (usize, usize)>,
    seen_leaves: HashSet<(String, String)>,
}

impl TreeAccumulator {
    fn push(mut self, product: &Product) -> Self {
        let product_id = product.product_id.trim();
        if product_id.is_empty() {
            tracing::debug!(name = %product.name, "产品ID为空, 跳过建树");
            return self;
        }

        let cat_key = category_key(product);
        let cat_idx = match self.category_index.get(&cat_key) {
            Some(idx) => *idx,
            None => {
                self.categories.push(CategoryNode {
                    key: cat_key.clone(),
                    name: category_label(product),
                    subcategories: Vec::new(),
                });
                let idx = self.categories.len() - 1;
                self.category_index.insert(cat_key.clone(), idx);
                idx
            }
        };

        let sub_key = subcategory_key(&cat_key, product);
        let (cat_idx, sub_idx) = match self.subcategory_index.get(&sub_key) {
            Some(pos) => *pos,
            None => {
                let subcategories = &mut self.categories[cat_idx].subcategories;
                subcategories.push(SubcategoryNode {
                    key: sub_key.clone(),
                    name: subcategory_label(product),
                    category_key: cat_key,
                    products: Vec::new(),
                });
                let pos = (cat_idx, subcategories.len() - 1);
                self.subcategory_index.insert(sub_key.clone(), pos);
                pos
            }
        };

        // 同一子品类下重复的产品只保留一次
        if self
            .seen_leaves
            .insert((sub_key, product_id.to_string()))
        {
            self.categories[cat_idx].subcategories[sub_idx]
                .products
                .push(ProductLeaf {
                    product_id: product_id.to_string(),
                    name: product.display_name().to_string(),
                });
        }

        self
    }

    fn finish(self) -> CategoryTree {
        CategoryTree {
            categories: self.categories,
        }
    }
}

/// 构建品类树
///
/// 纯折叠: 同一输入得到同一棵树,节点顺序为首次出现顺序
pub fn build_category_tree(products: &[Product]) -> CategoryTree {
    let tree = products
        .iter()
        .fold(TreeAccumulator::default(), TreeAccumulator::push)
        .finish();

    tracing::debug!(
        products = products.len(),
        categories = tree.categories.len(),
        leaves = tree.product_count(),
        "品类树构建完成"
    );

    tree
}

/// 收集节点下全部叶子产品ID（深度优先,先序）
///
/// 产品节点返回自身ID
pub fn collect_product_ids(node: TreeNodeRef<'_>) -> Vec<String> {
    let mut ids = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        match current {
            TreeNodeRef::Product(leaf) => ids.push(leaf.product_id.clone()),
            branch => {
                let mut children = branch.children();
                children.reverse();
                stack.extend(children);
            }
        }
    }

    ids
}

/// 按节点键收集叶子产品ID
///
/// key 可带类型前缀（category: / subcategory: / product:）,裸键须唯一匹配
pub fn collect_product_ids_by_key(
    tree: &CategoryTree,
    key: &str,
) -> Result<Vec<String>, NodeLookupError> {
    tree.resolve(key).map(collect_product_ids)
}
