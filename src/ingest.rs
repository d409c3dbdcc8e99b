use anyhow::Result;
use chrono::{Days, NaiveDate};

use crate::exchange_rate::ExchangeRate;
use crate::provider::RateProvider;
use crate::rate_store::RateStore;

/// Number of days before today that every run tries to fill.
pub const INGESTION_WINDOW_DAYS: u64 = 10;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    pub attempted: usize,
    pub inserted: u64,
    pub failed_dates: Vec<NaiveDate>,
}

/// The `INGESTION_WINDOW_DAYS` dates before `today`, most recent first. `today` is excluded.
pub fn ingestion_window(today: NaiveDate) -> Result<Vec<NaiveDate>> {
    (1..=INGESTION_WINDOW_DAYS)
        .map(|offset| {
            today
                .checked_sub_days(Days::new(offset))
                .ok_or(anyhow::anyhow!("Can't get date {} days before {}", offset, today))
        })
        .collect()
}

/// Fetches every day of the window and stores rates not yet present.
///
/// A failed fetch only skips its own day. Storage errors abort the run.
/// New rows are written in a single transaction once all days were attempted.
pub async fn ingest_rates(
    store: &RateStore,
    provider: &RateProvider,
    today: NaiveDate,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let mut pending = Vec::new();

    for date in ingestion_window(today)? {
        report.attempted += 1;

        let rates = match provider.fetch_rates(date).await {
            Ok(rates) => rates,
            Err(e) => {
                log::warn!("Request for date {} failed, moving on: {}", date, e);
                report.failed_dates.push(date);
                continue;
            }
        };

        for (currency, rate) in rates {
            if !store.exists(&currency, date).await? {
                pending.push(ExchangeRate::new(currency, date, rate));
            }
        }
    }

    report.inserted = store.insert_batch(&pending).await?;
    log::info!(
        "Ingested {} new rates over {} days, {} days failed",
        report.inserted,
        report.attempted,
        report.failed_dates.len()
    );

    Ok(report)
}
