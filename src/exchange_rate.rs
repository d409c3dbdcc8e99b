use chrono::NaiveDate;
use uuid::Uuid;

/// Rate for a specific currency on a specific date.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ExchangeRate {
    pub id: Uuid,
    pub currency: String,
    pub date: NaiveDate,
    pub rate: f64,
}

impl ExchangeRate {
    pub fn new(currency: impl Into<String>, date: NaiveDate, rate: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency: currency.into(),
            date,
            rate,
        }
    }
}
