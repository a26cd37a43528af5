// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use supply_planning::domain::{ForecastRecord, Product, SupplyPlanRow};

// ==========================================
// Product 构建器
// ==========================================

pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    pub fn new(product_id: &str) -> Self {
        Self {
            product: Product {
                product_id: product_id.to_string(),
                name: format!("产品{}", product_id),
                ..Default::default()
            },
        }
    }

    pub fn category(mut self, id: &str, name: &str) -> Self {
        self.product.category_id = Some(id.to_string());
        self.product.category_name = Some(name.to_string());
        self
    }

    pub fn subcategory(mut self, id: &str, name: &str) -> Self {
        self.product.subcategory_id = Some(id.to_string());
        self.product.subcategory_name = Some(name.to_string());
        self
    }

    pub fn build(self) -> Product {
        self.product
    }
}

// ==========================================
// ForecastRecord 构建器
// ==========================================

pub struct ForecastBuilder {
    record: ForecastRecord,
}

impl ForecastBuilder {
    pub fn new(product_id: &str, date: &str) -> Self {
        Self {
            record: ForecastRecord {
                date: date.to_string(),
                product_id: product_id.to_string(),
                location_id: "L1".to_string(),
                customer_id: "C1".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn location(mut self, location_id: &str) -> Self {
        self.record.location_id = location_id.to_string();
        self
    }

    pub fn customer(mut self, customer_id: &str) -> Self {
        self.record.customer_id = customer_id.to_string();
        self
    }

    pub fn forecast(mut self, value: f64) -> Self {
        self.record.forecast = Some(value);
        self
    }

    pub fn actual(mut self, value: f64) -> Self {
        self.record.actual = Some(value);
        self
    }

    pub fn sales_plan(mut self, value: f64) -> Self {
        self.record.sales_plan = Some(value);
        self
    }

    pub fn build(self) -> ForecastRecord {
        self.record
    }
}

// ==========================================
// SupplyPlanRow 构建器
// ==========================================

pub struct SupplyPlanBuilder {
    row: SupplyPlanRow,
}

impl SupplyPlanBuilder {
    pub fn new(product_id: &str, location_id: &str, date: &str) -> Self {
        Self {
            row: SupplyPlanRow {
                product_id: product_id.to_string(),
                location_id: location_id.to_string(),
                date: date.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn demand(mut self, total_demand: f64, actual: f64) -> Self {
        self.row.total_demand = Some(total_demand);
        self.row.actual = Some(actual);
        self
    }

    pub fn inventory(mut self, projected_on_hand: f64, safety_stock: f64) -> Self {
        self.row.projected_on_hand = Some(projected_on_hand);
        self.row.safety_stock = Some(safety_stock);
        self
    }

    pub fn planned_arrivals(mut self, value: f64) -> Self {
        self.row.planned_arrivals = Some(value);
        self
    }

    pub fn build(self) -> SupplyPlanRow {
        self.row
    }
}

/// 两个品类、三个子品类的标准产品集
pub fn sample_products() -> Vec<Product> {
    vec![
        ProductBuilder::new("P1").category("BEV", "饮料").subcategory("TEA", "茶饮").build(),
        ProductBuilder::new("P2").category("BEV", "饮料").subcategory("TEA", "茶饮").build(),
        ProductBuilder::new("P3").category("BEV", "饮料").subcategory("JUICE", "果汁").build(),
        ProductBuilder::new("P4").category("SNK", "零食").subcategory("TEA", "茶点").build(),
        ProductBuilder::new("P5").build(),
    ]
}
