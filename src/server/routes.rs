use super::auth::AuthUser;
use super::run_blocking;
use crate::auth::{self, TokenResponse};
use crate::errors::{AppError, AppResult};
use crate::feeds::{HistoryRequest, Interval, Period, PriceBar};
use crate::models::{grid_in_range, payoff_curve, PayoffSeries, PricingInput, PricingResult, DEFAULT_PAYOFF_POINTS};
use crate::portfolio::{simulate_growth, GrowthReport};
use crate::state::{AppState, CounterSnapshot, PerfCounters};
use axum::extract::{Form, Path, Query, State};
use axum::response::Json;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Upper bound on payoff grid size accepted over HTTP.
const MAX_PAYOFF_POINTS: usize = 2_001;

#[derive(serde::Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
    pub interval: Option<String>,
}

impl HistoryQuery {
    fn to_request(&self, symbol: &str) -> AppResult<HistoryRequest> {
        let period = match self.period.as_deref() {
            Some(p) => p.parse::<Period>()?,
            None => Period::default(),
        };
        let interval = match self.interval.as_deref() {
            Some(i) => i.parse::<Interval>()?,
            None => Interval::default(),
        };
        HistoryRequest::new(symbol, period, interval)
    }
}

#[derive(serde::Deserialize)]
pub struct InvestBody {
    pub symbol: String,
    pub amount: f64,
    pub purchase_date: NaiveDate,
}

#[derive(serde::Deserialize)]
pub struct PayoffBody {
    pub spot: f64,
    pub strike: f64,
    pub points: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub struct OptionPriceResponse {
    pub years: f64,
    pub computable: bool,
    pub result: Option<PricingResult>,
}

/// POST /api/register -- JSON {username, password}
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> AppResult<Json<TokenResponse>> {
    let st = state.clone();
    let token = run_blocking(move || {
        auth::register(&st.db, &body.username, &body.password, st.config.auth_settings(), Utc::now())
    })
    .await?;

    PerfCounters::bump(&state.counters.registrations);
    Ok(Json(token))
}

/// POST /api/login -- form-encoded username/password
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Credentials>,
) -> AppResult<Json<TokenResponse>> {
    let st = state.clone();
    let result = run_blocking(move || {
        auth::login(&st.db, &form.username, &form.password, st.config.auth_settings(), Utc::now())
    })
    .await;

    match result {
        Ok(token) => {
            PerfCounters::bump(&state.counters.logins);
            Ok(Json(token))
        }
        Err(e) => {
            PerfCounters::bump(&state.counters.auth_failures);
            Err(e)
        }
    }
}

/// GET /api/stock/{symbol}?period=6mo&interval=1d -- OHLCV bars
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PriceBar>>> {
    let req = query.to_request(&symbol)?;
    tracing::debug!(user = %user, symbol = %req.symbol, provider = state.quotes.name(), "history requested");

    let history = state.quotes.fetch_history(&req).await?;
    PerfCounters::bump(&state.counters.quotes_served);
    Ok(Json(history.bars))
}

/// GET /api/stock/{symbol}/summary -- headline statistics
pub async fn get_stock_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let req = query.to_request(&symbol)?;
    let history = state.quotes.fetch_history(&req).await?;
    PerfCounters::bump(&state.counters.quotes_served);

    Ok(Json(serde_json::json!({
        "symbol": history.symbol,
        "bars": history.bars.len(),
        "last_close": history.bars.last().map(|b| b.close),
        "summary": history.summary,
    })))
}

/// POST /api/invest -- {symbol, amount, purchase_date}
pub async fn invest(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<InvestBody>,
) -> AppResult<Json<GrowthReport>> {
    let today = Utc::now().date_naive();
    if body.purchase_date > today {
        return Err(AppError::InvalidRequest("Purchase date cannot be in the future".into()));
    }

    let period = Period::covering(body.purchase_date, today);
    let req = HistoryRequest::new(&body.symbol, period, Interval::Daily)?;
    let history = state.quotes.fetch_history(&req).await?;
    let report = simulate_growth(&history.symbol, &history.bars, body.amount, body.purchase_date)?;

    tracing::info!(
        user = %user,
        symbol = %report.symbol,
        amount = body.amount,
        gain_pct = report.gain_pct,
        "growth simulated"
    );
    PerfCounters::bump(&state.counters.growth_simulations);
    Ok(Json(report))
}

/// POST /api/option/price -- Black-Scholes prices and Greeks
pub async fn price_option(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PricingInput>,
) -> Json<OptionPriceResponse> {
    let result = state.pricer.price(&input);
    if result.is_some() {
        PerfCounters::bump(&state.counters.options_priced);
    } else {
        PerfCounters::bump(&state.counters.options_not_computable);
    }

    Json(OptionPriceResponse {
        years: input.years(),
        computable: result.is_some(),
        result,
    })
}

/// POST /api/option/payoff -- intrinsic value at maturity
pub async fn payoff(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PayoffBody>,
) -> AppResult<Json<PayoffSeries>> {
    if !(body.spot > 0.0 && body.strike > 0.0) {
        return Err(AppError::InvalidRequest("Spot and strike must be positive".into()));
    }
    if !(grid_in_range(body.spot) && body.strike.is_finite()) {
        return Err(AppError::InvalidRequest("Spot or strike out of range".into()));
    }
    let points = body.points.unwrap_or(DEFAULT_PAYOFF_POINTS);
    if points > MAX_PAYOFF_POINTS {
        return Err(AppError::InvalidRequest(format!("At most {MAX_PAYOFF_POINTS} points")));
    }

    PerfCounters::bump(&state.counters.payoffs_generated);
    Ok(Json(payoff_curve(body.spot, body.strike, points)))
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CounterSnapshot> {
    Json(state.counters.snapshot())
}
