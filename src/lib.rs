pub mod api;
pub mod config;
pub mod exchange_rate;
pub mod ingest;
pub mod provider;
pub mod rate_store;

pub use exchange_rate::ExchangeRate;
pub use rate_store::{RateStore, StoreError};
