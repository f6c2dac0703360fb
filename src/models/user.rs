use serde::Serialize;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;

/// Fixed daily rate for auto-calculated salaries, in rupiah.
pub const AUTO_DAILY_RATE: f64 = 50_000.0;

#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub store_id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub positions: Option<Json<Vec<String>>>,
    pub salary_type: String,
    pub base_salary: Option<f64>,
    pub bonus: f64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Monthly salary: manual = base + bonus; auto = calendar days in the
    /// target month × the fixed daily rate, + bonus.
    pub fn monthly_salary(&self, year: i32, month: u32) -> f64 {
        if self.salary_type == "manual" {
            return self.base_salary.unwrap_or(0.0) + self.bonus;
        }
        let days = days_in_month(year, month).unwrap_or(0) as f64;
        days * AUTO_DAILY_RATE + self.bonus
    }
}

/// Number of calendar days in a Gregorian month (28-31), None for an
/// invalid month number.
pub fn days_in_month(year: i32, month: u32) -> Option<i64> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(salary_type: &str, base: Option<f64>, bonus: f64) -> User {
        User {
            id: 1,
            store_id: None,
            name: "Budi".into(),
            email: "budi@kedai.test".into(),
            password_hash: String::new(),
            role: "karyawan".into(),
            positions: Some(Json(vec!["Kasir".into()])),
            salary_type: salary_type.into(),
            base_salary: base,
            bonus,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn calendar_days() {
        assert_eq!(days_in_month(2026, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2026, 3), Some(31));
        assert_eq!(days_in_month(2026, 4), Some(30));
        assert_eq!(days_in_month(2026, 12), Some(31));
        assert_eq!(days_in_month(2026, 13), None);
    }

    #[test]
    fn auto_salary_tracks_the_month_length() {
        let budi = employee("auto", None, 0.0);
        assert_eq!(budi.monthly_salary(2026, 2), 1_400_000.0);
        assert_eq!(budi.monthly_salary(2026, 3), 1_550_000.0);
    }

    #[test]
    fn auto_salary_includes_bonus() {
        let budi = employee("auto", None, 100_000.0);
        assert_eq!(budi.monthly_salary(2026, 2), 1_500_000.0);
    }

    #[test]
    fn manual_salary_is_base_plus_bonus() {
        let siti = employee("manual", Some(2_000_000.0), 250_000.0);
        assert_eq!(siti.monthly_salary(2026, 2), 2_250_000.0);
        // Month is irrelevant for manual salaries
        assert_eq!(siti.monthly_salary(2026, 7), 2_250_000.0);
    }
}
