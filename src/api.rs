use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::rate_store::{RateStore, StoreError};

pub const INVALID_DATE_MESSAGE: &str =
    "Invalid date - please provide a date in the past, in the format YYYY-MM-DD";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_DATE_MESSAGE)]
    InvalidDate,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidDate => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::InvalidDate => INVALID_DATE_MESSAGE.to_string(),
            ApiError::Store(e) => {
                log::error!("Can't read rates: {}", e);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

#[derive(Debug, Serialize)]
pub struct DailyRates {
    pub date: String,
    pub currency_rates: BTreeMap<String, f64>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rates/{date}/", web::get().to(rates_for_date));
}

async fn rates_for_date(
    store: web::Data<RateStore>,
    date: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let date = date.into_inner();
    let rates_date = parse_rates_date(&date, Utc::now().date_naive()).inspect_err(|_| {
        log::debug!("Rejected rates date {:?}", date);
    })?;

    let rates = store.find_by_date(rates_date).await?;
    let body = DailyRates {
        currency_rates: rates.into_iter().map(|r| (r.currency, r.rate)).collect(),
        date,
    };

    if body.currency_rates.is_empty() {
        Ok(HttpResponse::NotFound().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

/// Accepts `YYYY-MM-DD` naming a real calendar day no later than `today`.
pub fn parse_rates_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    if !has_iso_date_shape(input) {
        return Err(ApiError::InvalidDate);
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate)?;
    if date > today {
        return Err(ApiError::InvalidDate);
    }

    Ok(date)
}

fn has_iso_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
