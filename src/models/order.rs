use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct Order {
    pub id: i64,
    pub store_id: Option<i64>,
    pub user_id: i64,
    pub customer_name: Option<String>,
    pub total: f64,
    pub cogs: f64,
    pub profit: f64,
    pub payment_method: String,
    pub order_type: String,
    pub paid_amount: Option<f64>,
    pub change_amount: Option<f64>,
    pub daily_number: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One checkout line after price/cost resolution: the menu item's discounted
/// price and per-unit COGS, both frozen at sale time.
pub struct CheckoutLine {
    pub price: f64,
    pub unit_cogs: f64,
    pub quantity: i32,
}

pub struct OrderTotals {
    pub total: f64,
    pub cogs: f64,
    pub profit: f64,
}

pub fn order_totals(lines: &[CheckoutLine]) -> OrderTotals {
    let total: f64 = lines.iter().map(|l| l.price * l.quantity as f64).sum();
    let cogs: f64 = lines.iter().map(|l| l.unit_cogs * l.quantity as f64).sum();
    OrderTotals { total, cogs, profit: total - cogs }
}

/// Change due on a cash payment that covers the total. A short or missing
/// paid amount yields no change (the order still records what was paid).
pub fn change_due(paid_amount: Option<f64>, total: f64) -> Option<f64> {
    match paid_amount {
        Some(paid) if paid >= total => Some(paid - total),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_the_line_items() {
        let lines = vec![
            CheckoutLine { price: 18_000.0, unit_cogs: 4_000.0, quantity: 2 },
            CheckoutLine { price: 10_000.0, unit_cogs: 2_500.0, quantity: 1 },
        ];
        let t = order_totals(&lines);
        assert_eq!(t.total, 46_000.0);
        assert_eq!(t.cogs, 10_500.0);
        assert_eq!(t.profit, 35_500.0);
    }

    #[test]
    fn empty_order_totals_are_zero() {
        let t = order_totals(&[]);
        assert_eq!(t.total, 0.0);
        assert_eq!(t.cogs, 0.0);
        assert_eq!(t.profit, 0.0);
    }

    #[test]
    fn change_only_when_payment_covers_total() {
        assert_eq!(change_due(Some(50_000.0), 46_000.0), Some(4_000.0));
        assert_eq!(change_due(Some(46_000.0), 46_000.0), Some(0.0));
        assert_eq!(change_due(Some(40_000.0), 46_000.0), None);
        assert_eq!(change_due(None, 46_000.0), None);
    }
}
