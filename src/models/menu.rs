use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct MenuItem {
    pub id: i64,
    pub store_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MenuItem {
    pub fn discounted_price(&self) -> f64 {
        discounted_price(self.price, self.discount_percentage)
    }
}

/// One recipe line, joined against its backing inventory item.
pub struct IngredientCost {
    pub amount: f64,
    pub item_type: String,
    pub price_per_unit: Option<f64>,
}

pub fn discounted_price(price: f64, discount_percentage: f64) -> f64 {
    if discount_percentage > 0.0 {
        price - (price * discount_percentage) / 100.0
    } else {
        price
    }
}

/// Per-unit cost of goods sold: ingredient amounts priced at the backing
/// stock item's per-unit price. Equipment-backed lines contribute nothing.
pub fn recipe_cogs(lines: &[IngredientCost]) -> f64 {
    lines
        .iter()
        .filter(|l| l.item_type == "stock")
        .map(|l| l.amount * l.price_per_unit.unwrap_or(0.0))
        .sum()
}

pub fn margin_percentage(discounted_price: f64, cogs: f64) -> f64 {
    if discounted_price == 0.0 {
        return 0.0;
    }
    (discounted_price - cogs) / discounted_price * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item_type: &str, amount: f64, ppu: f64) -> IngredientCost {
        IngredientCost {
            amount,
            item_type: item_type.into(),
            price_per_unit: Some(ppu),
        }
    }

    #[test]
    fn cogs_sums_stock_lines_only() {
        let lines = vec![
            line("stock", 20.0, 100.0),   // 2000
            line("stock", 0.5, 4_000.0),  // 2000
            line("equipment", 1.0, 9_999.0),
        ];
        assert_eq!(recipe_cogs(&lines), 4_000.0);
    }

    #[test]
    fn cogs_of_empty_recipe_is_zero() {
        assert_eq!(recipe_cogs(&[]), 0.0);
    }

    #[test]
    fn discount_applies_only_when_positive() {
        assert_eq!(discounted_price(20_000.0, 10.0), 18_000.0);
        assert_eq!(discounted_price(20_000.0, 0.0), 20_000.0);
        assert_eq!(discounted_price(20_000.0, 100.0), 0.0);
    }

    #[test]
    fn margin_formula() {
        // (18000 - 4500) / 18000 * 100 = 75%
        assert_eq!(margin_percentage(18_000.0, 4_500.0), 75.0);
    }

    #[test]
    fn margin_of_free_item_is_zero() {
        assert_eq!(margin_percentage(0.0, 4_500.0), 0.0);
    }
}
