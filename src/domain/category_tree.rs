// ==========================================
// 供应链需求计划看板 - 品类树
// ==========================================
// 三级结构: 品类 → 子品类 → 产品(叶子)
// 每次拉取产品列表后重新构建,不持久化
// 节点定位: "kind:key" 限定类型;裸键仅在唯一匹配时生效
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 品类树（构建后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryTree {
    pub categories: Vec<CategoryNode>,
}

/// 品类节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// 唯一键: category_id → category_name → "uncategorized"
    pub key: String,
    pub name: String,
    pub subcategories: Vec<SubcategoryNode>,
}

/// 子品类节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryNode {
    /// 唯一键: "{category_key}/{subcategory_id | subcategory_name | uncategorized}"
    pub key: String,
    pub name: String,
    pub category_key: String,
    pub products: Vec<ProductLeaf>,
}

/// 产品叶子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLeaf {
    pub product_id: String,
    pub name: String,
}

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeNodeKind {
    Category,
    Subcategory,
    Product,
}

impl TreeNodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeNodeKind::Category => "category",
            TreeNodeKind::Subcategory => "subcategory",
            TreeNodeKind::Product => "product",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "category" => Some(TreeNodeKind::Category),
            "subcategory" => Some(TreeNodeKind::Subcategory),
            "product" => Some(TreeNodeKind::Product),
            _ => None,
        }
    }

    /// 拆分 "kind:key";前缀不是已知类型时返回 None
    pub fn split_qualified(selector: &str) -> Option<(Self, &str)> {
        let (prefix, key) = selector.split_once(':')?;
        Self::from_str(prefix).map(|kind| (kind, key))
    }
}

/// 节点定位失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeLookupError {
    #[error("品类树节点不存在: {0}")]
    NotFound(String),

    #[error("品类树节点键有歧义: {key} 可指 {candidates:?}")]
    Ambiguous { key: String, candidates: Vec<String> },
}

/// 树节点引用（用于选择与遍历）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNodeRef<'a> {
    Category(&'a CategoryNode),
    Subcategory(&'a SubcategoryNode),
    Product(&'a ProductLeaf),
}

impl<'a> TreeNodeRef<'a> {
    /// 节点键（产品节点为产品ID）
    pub fn key(&self) -> &'a str {
        match self {
            TreeNodeRef::Category(node) => &node.key,
            TreeNodeRef::Subcategory(node) => &node.key,
            TreeNodeRef::Product(leaf) => &leaf.product_id,
        }
    }

    pub fn label(&self) -> &'a str {
        match self {
            TreeNodeRef::Category(node) => &node.name,
            TreeNodeRef::Subcategory(node) => &node.name,
            TreeNodeRef::Product(leaf) => &leaf.name,
        }
    }

    pub fn kind(&self) -> TreeNodeKind {
        match self {
            TreeNodeRef::Category(_) => TreeNodeKind::Category,
            TreeNodeRef::Subcategory(_) => TreeNodeKind::Subcategory,
            TreeNodeRef::Product(_) => TreeNodeKind::Product,
        }
    }

    /// 带类型前缀的键,任意节点都可据此无歧义定位
    pub fn qualified_key(&self) -> String {
        format!("{}:{}", self.kind().as_str(), self.key())
    }

    /// 直接子节点
    pub fn children(&self) -> Vec<TreeNodeRef<'a>> {
        match self {
            TreeNodeRef::Category(node) => node
                .subcategories
                .iter()
                .map(TreeNodeRef::Subcategory)
                .collect(),
            TreeNodeRef::Subcategory(node) => {
                node.products.iter().map(TreeNodeRef::Product).collect()
            }
            TreeNodeRef::Product(_) => Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNodeRef::Product(_))
    }
}

impl CategoryTree {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 顶层节点
    pub fn roots(&self) -> Vec<TreeNodeRef<'_>> {
        self.categories.iter().map(TreeNodeRef::Category).collect()
    }

    /// 按类型 + 键查找节点
    pub fn find_by_kind(&self, kind: TreeNodeKind, key: &str) -> Option<TreeNodeRef<'_>> {
        let mut subcategories = self.categories.iter().flat_map(|c| c.subcategories.iter());
        match kind {
            TreeNodeKind::Category => self
                .categories
                .iter()
                .find(|c| c.key == key)
                .map(TreeNodeRef::Category),
            TreeNodeKind::Subcategory => subcategories
                .find(|s| s.key == key)
                .map(TreeNodeRef::Subcategory),
            TreeNodeKind::Product => subcategories
                .flat_map(|s| s.products.iter())
                .find(|p| p.product_id == key)
                .map(TreeNodeRef::Product),
        }
    }

    /// 定位节点
    ///
    /// # 参数
    /// - selector: "category:KEY" / "subcategory:KEY" / "product:ID" 或裸键
    ///
    /// # 返回
    /// - Err(NotFound): 无匹配
    /// - Err(Ambiguous): 裸键同时命中多种类型的节点
    pub fn resolve(&self, selector: &str) -> Result<TreeNodeRef<'_>, NodeLookupError> {
        if let Some((kind, key)) = TreeNodeKind::split_qualified(selector) {
            return self
                .find_by_kind(kind, key)
                .ok_or_else(|| NodeLookupError::NotFound(selector.to_string()));
        }

        let matches: Vec<TreeNodeRef<'_>> = [
            TreeNodeKind::Category,
            TreeNodeKind::Subcategory,
            TreeNodeKind::Product,
        ]
        .into_iter()
        .filter_map(|kind| self.find_by_kind(kind, selector))
        .collect();

        match matches.as_slice() {
            [] => Err(NodeLookupError::NotFound(selector.to_string())),
            [only] => Ok(*only),
            _ => Err(NodeLookupError::Ambiguous {
                key: selector.to_string(),
                candidates: matches.iter().map(TreeNodeRef::qualified_key).collect(),
            }),
        }
    }

    /// 按键查找节点,找不到或有歧义时返回 None
    pub fn find(&self, selector: &str) -> Option<TreeNodeRef<'_>> {
        self.resolve(selector).ok()
    }

    /// 叶子产品总数
    pub fn product_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.subcategories.iter())
            .map(|s| s.products.len())
            .sum()
    }
}
