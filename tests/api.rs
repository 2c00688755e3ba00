use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use futures_util::future::BoxFuture;
use quant_desk::config::AppConfig;
use quant_desk::feeds::{HistoricalQuoteProvider, HistoryRequest, PriceBar, PriceHistory, QuoteSummary};
use quant_desk::state::AppState;
use quant_desk::{db, server, AppError, AppResult};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Canned daily bars: 300 sessions ending today, close = 100 + i.
struct StubQuotes;

impl StubQuotes {
    fn bars() -> Vec<PriceBar> {
        let today = Utc::now().date_naive();
        (0..300)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar {
                    date: today - Duration::days(299 - i),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: Some(1_000 + i as u64),
                }
            })
            .collect()
    }
}

impl HistoricalQuoteProvider for StubQuotes {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn fetch_history<'a>(&'a self, req: &'a HistoryRequest) -> BoxFuture<'a, AppResult<PriceHistory>> {
        Box::pin(async move {
            if req.symbol == "NOPE" {
                return Err(AppError::NotFound(format!("No data for symbol {}", req.symbol)));
            }
            let bars = Self::bars();
            Ok(PriceHistory {
                symbol: req.symbol.clone(),
                summary: QuoteSummary::from_bars(&bars),
                bars,
            })
        })
    }
}

fn app() -> (Router, Arc<AppState>) {
    let config = AppConfig {
        static_dir: "does-not-exist".into(),
        password_hash_cost: 4,
        ..AppConfig::default()
    };
    let state = AppState::new(config, db::open_in_memory().unwrap(), Arc::new(StubQuotes));
    (server::create_router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(app, post_json("/api/register", json!({"username": username, "password": "pw"}))).await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_option_price_endpoint() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/option/price",
            json!({
                "spot": 100.0, "strike": 100.0,
                "valuation_date": "2024-01-01", "maturity_date": "2025-01-01",
                "risk_free_rate": 0.0, "volatility": 0.2, "payout_rate": 0.0
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["computable"], true);
    let call = body["result"]["call_price"].as_f64().unwrap();
    let put = body["result"]["put_price"].as_f64().unwrap();
    assert!((call - put).abs() < 1e-9, "ATM zero-carry call={call} put={put}");
    assert!(body["result"]["gamma"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_option_price_not_computable() {
    let (app, state) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/option/price",
            json!({
                "spot": 100.0, "strike": 100.0,
                "valuation_date": "2024-06-01", "maturity_date": "2024-06-01",
                "risk_free_rate": 0.05, "volatility": 0.2
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["computable"], false);
    assert_eq!(body["years"], 0.0);
    assert!(body["result"].is_null());
    assert_eq!(state.counters.snapshot().options_not_computable, 1);
}

#[tokio::test]
async fn test_option_price_subnormal_volatility() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/option/price",
            json!({
                "spot": 100.0, "strike": 100.0,
                "valuation_date": "2024-06-01", "maturity_date": "2024-06-02",
                "risk_free_rate": 0.0, "volatility": 5e-324
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["computable"], false);
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_payoff_endpoint() {
    let (app, _) = app();
    let (status, body) = send(&app, post_json("/api/option/payoff", json!({"spot": 100.0, "strike": 100.0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spot_grid"].as_array().unwrap().len(), 61);
    assert_eq!(body["call_payoff"][60].as_f64().unwrap().round(), 60.0);
    assert_eq!(body["put_payoff"][0].as_f64().unwrap().round(), 40.0);

    let (status, body) = send(&app, post_json("/api/option/payoff", json!({"spot": -1.0, "strike": 100.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Spot and strike must be positive");

    let (status, body) = send(&app, post_json("/api/option/payoff", json!({"spot": 1.5e308, "strike": 100.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Spot or strike out of range");
}

#[tokio::test]
async fn test_stock_requires_token() {
    let (app, state) = app();
    let resp = app
        .clone()
        .oneshot(Request::get("/api/stock/AAPL").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let (status, body) = send(&app, get_with_token("/api/stock/AAPL", "bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
    assert_eq!(state.counters.snapshot().auth_failures, 2);
}

#[tokio::test]
async fn test_register_and_fetch_history() {
    let (app, _) = app();
    let token = register(&app, "alice").await;

    let (status, body) = send(&app, get_with_token("/api/stock/aapl?period=1y&interval=1d", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let bars = body.as_array().unwrap();
    assert_eq!(bars.len(), 300);
    assert_eq!(bars[0]["Close"], 100.0);
    assert!(bars[0]["Date"].as_str().unwrap().parse::<NaiveDate>().is_ok());

    let (status, body) = send(&app, get_with_token("/api/stock/AAPL?interval=1h", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid interval; allowed: 1d, 1wk");

    let (status, _) = send(&app, get_with_token("/api/stock/NOPE", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_summary() {
    let (app, _) = app();
    let token = register(&app, "carol").await;
    let (status, body) = send(&app, get_with_token("/api/stock/MSFT/summary", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "MSFT");
    assert_eq!(body["last_close"], 399.0);
    assert_eq!(body["summary"]["day_high"], 400.0);
    assert_eq!(body["summary"]["fifty_two_week_low"], 99.0);
}

#[tokio::test]
async fn test_duplicate_register_and_login() {
    let (app, state) = app();
    register(&app, "bob").await;

    let (status, body) = send(&app, post_json("/api/register", json!({"username": "bob", "password": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists");

    let login = |password: &str| {
        Request::post("/api/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=bob&password={password}")))
            .unwrap()
    };

    let (status, body) = send(&app, login("pw")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["username"], "bob");

    let (status, body) = send(&app, login("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid credentials");

    let counters = state.counters.snapshot();
    assert_eq!(counters.registrations, 1);
    assert_eq!(counters.logins, 1);
}

#[tokio::test]
async fn test_invest_endpoint() {
    let (app, _) = app();
    let token = register(&app, "dave").await;
    let purchase = Utc::now().date_naive() - Duration::days(99);

    let req = Request::post("/api/invest")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({"symbol": "acme", "amount": 1000.0, "purchase_date": purchase.to_string()}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["symbol"], "ACME");
    // bar index 200 closes at 300, last bar at 399
    assert_eq!(body["purchase_price"], 300.0);
    assert_eq!(body["series"].as_array().unwrap().len(), 100);
    let value_now = body["value_now"].as_f64().unwrap();
    assert!((value_now - 1000.0 * 399.0 / 300.0).abs() < 1e-9);

    let future = Utc::now().date_naive() + Duration::days(10);
    let req = Request::post("/api/invest")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({"symbol": "acme", "amount": 1000.0, "purchase_date": future.to_string()}).to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
