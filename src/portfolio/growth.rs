use crate::errors::{AppError, AppResult};
use crate::feeds::PriceBar;
use chrono::NaiveDate;

/// One point of the position value over time.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// What `amount` invested at the close of the first session on/after the
/// purchase date would be worth across the following bars.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GrowthReport {
    pub symbol: String,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub shares: f64,
    pub value_now: f64,
    pub gain_pct: f64,
    pub series: Vec<ValuePoint>,
}

/// Simulate buying `amount` of `symbol` at `purchase_date`.
/// Bars must be in ascending date order. Fractional shares are allowed.
pub fn simulate_growth(
    symbol: &str,
    bars: &[PriceBar],
    amount: f64,
    purchase_date: NaiveDate,
) -> AppResult<GrowthReport> {
    if !(amount > 0.0 && amount.is_finite()) {
        return Err(AppError::InvalidRequest("Amount must be a positive number".into()));
    }

    let start = bars
        .iter()
        .position(|b| b.date >= purchase_date)
        .ok_or_else(|| {
            AppError::InvalidRequest(format!("No price data for {symbol} on or after {purchase_date}"))
        })?;

    let entry = &bars[start];
    if entry.close <= 0.0 {
        return Err(AppError::InvalidRequest(format!(
            "Invalid purchase price {} for {symbol} on {}",
            entry.close, entry.date
        )));
    }

    let shares = amount / entry.close;
    let series: Vec<ValuePoint> = bars[start..]
        .iter()
        .map(|b| ValuePoint {
            date: b.date,
            value: shares * b.close,
        })
        .collect();

    // series always holds at least the entry bar
    let value_now = series.last().map(|p| p.value).unwrap_or(amount);
    let gain_pct = (value_now / amount - 1.0) * 100.0;

    Ok(GrowthReport {
        symbol: symbol.to_string(),
        purchase_price: entry.close,
        purchase_date: entry.date,
        shares,
        value_now,
        gain_pct,
        series,
    })
}
