use serde::Serialize;
use chrono::{DateTime, Utc};

/// A stock (consumable) or equipment (fixed asset) record. Stock items carry
/// quantity/unit/per-unit pricing; equipment carries a flat total_price and a
/// condition status (Baik, Rusak, Maintenance, Tidak Digunakan).
#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct InventoryItem {
    pub id: i64,
    pub store_id: Option<i64>,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: String,
    pub current_stock: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub min_stock: Option<f64>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_stock(&self) -> bool {
        self.item_type == "stock"
    }

    /// Stock value is quantity × per-unit price; equipment value is its
    /// flat total_price.
    pub fn value(&self) -> f64 {
        if self.is_stock() {
            self.current_stock.unwrap_or(0.0) * self.price_per_unit.unwrap_or(0.0)
        } else {
            self.total_price.unwrap_or(0.0)
        }
    }

    pub fn stock_status(&self) -> &'static str {
        if !self.is_stock() {
            return "N/A";
        }
        let current = self.current_stock.unwrap_or(0.0);
        if current <= 0.0 {
            "critical"
        } else if current <= self.min_stock.unwrap_or(0.0) {
            "warning"
        } else {
            "good"
        }
    }

    pub fn is_low_stock(&self) -> bool {
        if !self.is_stock() {
            return false;
        }
        self.current_stock.unwrap_or(0.0) <= self.min_stock.unwrap_or(0.0)
    }

    /// Equipment marked Rusak counts as a loss in the profit/loss report,
    /// not an asset.
    pub fn is_damaged(&self) -> bool {
        !self.is_stock() && self.status.as_deref() == Some("Rusak")
    }

    /// Equipment counted as an asset in the profit/loss report. The status
    /// column is free-form, so this is a closed set: Baik, Maintenance,
    /// Tidak Digunakan or no status at all. Anything else (including Rusak)
    /// is excluded.
    pub fn is_good_asset(&self) -> bool {
        !self.is_stock()
            && matches!(
                self.status.as_deref(),
                Some("Baik") | Some("Maintenance") | Some("Tidak Digunakan") | None
            )
    }
}

/// Per-unit price derived from a total purchase price spread over the
/// quantity on hand. None when the stock count cannot divide the price.
pub fn derive_price_per_unit(total_price: Option<f64>, current_stock: Option<f64>) -> Option<f64> {
    match (total_price, current_stock) {
        (Some(total), Some(stock)) if total > 0.0 && stock > 0.0 => Some(total / stock),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock_item(current: f64, ppu: f64, min: f64) -> InventoryItem {
        InventoryItem {
            id: 1,
            store_id: None,
            name: "Kopi Arabika".into(),
            item_type: "stock".into(),
            current_stock: Some(current),
            unit: Some("gram".into()),
            price_per_unit: Some(ppu),
            min_stock: Some(min),
            total_price: None,
            status: None,
            description: None,
            category: "Bahan Baku".into(),
            created_at: Utc::now(),
        }
    }

    fn equipment_item(total: f64, status: Option<&str>) -> InventoryItem {
        InventoryItem {
            id: 2,
            store_id: None,
            name: "Mesin Espresso".into(),
            item_type: "equipment".into(),
            current_stock: None,
            unit: None,
            price_per_unit: None,
            min_stock: None,
            total_price: Some(total),
            status: status.map(|s| s.into()),
            description: None,
            category: "Alat".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stock_value_is_quantity_times_unit_price() {
        assert_eq!(stock_item(50.0, 2_000.0, 10.0).value(), 100_000.0);
    }

    #[test]
    fn equipment_value_is_total_price() {
        assert_eq!(equipment_item(500_000.0, Some("Baik")).value(), 500_000.0);
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(stock_item(0.0, 100.0, 5.0).stock_status(), "critical");
        assert_eq!(stock_item(-1.0, 100.0, 5.0).stock_status(), "critical");
        assert_eq!(stock_item(5.0, 100.0, 5.0).stock_status(), "warning");
        assert_eq!(stock_item(6.0, 100.0, 5.0).stock_status(), "good");
        assert_eq!(equipment_item(1.0, None).stock_status(), "N/A");
    }

    #[test]
    fn low_stock_flag_only_applies_to_stock() {
        assert!(stock_item(5.0, 100.0, 5.0).is_low_stock());
        assert!(!stock_item(6.0, 100.0, 5.0).is_low_stock());
        assert!(!equipment_item(1.0, None).is_low_stock());
    }

    #[test]
    fn damaged_detection() {
        assert!(equipment_item(100_000.0, Some("Rusak")).is_damaged());
        assert!(!equipment_item(100_000.0, Some("Maintenance")).is_damaged());
        assert!(!equipment_item(100_000.0, None).is_damaged());
    }

    #[test]
    fn asset_statuses_are_a_closed_set() {
        assert!(equipment_item(1.0, Some("Baik")).is_good_asset());
        assert!(equipment_item(1.0, Some("Maintenance")).is_good_asset());
        assert!(equipment_item(1.0, Some("Tidak Digunakan")).is_good_asset());
        assert!(equipment_item(1.0, None).is_good_asset());
        assert!(!equipment_item(1.0, Some("Rusak")).is_good_asset());
        // A free-form status outside the set is neither asset nor loss.
        let odd = equipment_item(1.0, Some("Perlu Servis"));
        assert!(!odd.is_good_asset());
        assert!(!odd.is_damaged());
        assert!(!stock_item(1.0, 1.0, 1.0).is_good_asset());
    }

    #[test]
    fn price_per_unit_round_trip() {
        assert_eq!(derive_price_per_unit(Some(100_000.0), Some(50.0)), Some(2_000.0));
        assert_eq!(derive_price_per_unit(Some(150_000.0), Some(50.0)), Some(3_000.0));
        assert_eq!(derive_price_per_unit(Some(100_000.0), Some(0.0)), None);
        assert_eq!(derive_price_per_unit(None, Some(50.0)), None);
    }
}
