use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Days, NaiveDate, Utc};
use fxrates::api::{self, INVALID_DATE_MESSAGE};
use fxrates::{ExchangeRate, RateStore};
use serde_json::{Value, json};

async fn get(store: &RateStore, uri: &str) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(store.clone()))
            .configure(api::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;

    (status, body)
}

fn yesterday() -> NaiveDate {
    Utc::now().date_naive().checked_sub_days(Days::new(1)).unwrap()
}

#[actix_web::test]
async fn rejects_non_date_input() {
    let store = RateStore::in_memory().await.unwrap();

    let (status, body) = get(&store, "/rates/not_a_date/").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": INVALID_DATE_MESSAGE }));
}

#[actix_web::test]
async fn rejects_invalid_calendar_date() {
    let store = RateStore::in_memory().await.unwrap();

    let (status, body) = get(&store, "/rates/2020-99-99/").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Invalid date - please provide a date in the past, in the format YYYY-MM-DD" })
    );
}

#[actix_web::test]
async fn rejects_future_date() {
    let store = RateStore::in_memory().await.unwrap();
    let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();

    let (status, body) = get(&store, &format!("/rates/{}/", tomorrow)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": INVALID_DATE_MESSAGE }));
}

#[actix_web::test]
async fn returns_404_with_empty_rates_for_missing_date() {
    let store = RateStore::in_memory().await.unwrap();

    let (status, body) = get(&store, "/rates/2020-01-01/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "date": "2020-01-01", "currency_rates": {} }));
}

#[actix_web::test]
async fn returns_stored_rates_for_date() {
    let store = RateStore::in_memory().await.unwrap();
    let date = yesterday();
    store.insert(&ExchangeRate::new("GBP", date, 1.2)).await.unwrap();
    store.insert(&ExchangeRate::new("AUD", date, 0.9)).await.unwrap();
    // Another day must not leak into the response.
    let before = date.checked_sub_days(Days::new(1)).unwrap();
    store.insert(&ExchangeRate::new("USD", before, 1.1)).await.unwrap();

    let (status, body) = get(&store, &format!("/rates/{}/", date)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "date": date.to_string(),
            "currency_rates": { "GBP": 1.2, "AUD": 0.9 }
        })
    );
}

#[actix_web::test]
async fn todays_date_is_accepted() {
    let store = RateStore::in_memory().await.unwrap();
    let today = Utc::now().date_naive();

    let (status, _) = get(&store, &format!("/rates/{}/", today)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
