pub mod yahoo;

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use std::fmt;
use std::str::FromStr;

/// Lookback windows accepted by the quote endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }

    /// Shortest fixed window that reaches back to `since` from `today`,
    /// with a week of slack for weekends and holidays.
    pub fn covering(since: NaiveDate, today: NaiveDate) -> Self {
        const WINDOWS: [(i64, Period); 7] = [
            (30, Period::OneMonth),
            (90, Period::ThreeMonths),
            (182, Period::SixMonths),
            (365, Period::OneYear),
            (730, Period::TwoYears),
            (1826, Period::FiveYears),
            (3652, Period::TenYears),
        ];
        let needed = (today - since).num_days() + 7;
        WINDOWS
            .iter()
            .find(|(days, _)| needed <= *days)
            .map(|(_, p)| *p)
            .unwrap_or(Period::Max)
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Ok(match s {
            "1d" => Self::OneDay,
            "5d" => Self::FiveDays,
            "1mo" => Self::OneMonth,
            "3mo" => Self::ThreeMonths,
            "6mo" => Self::SixMonths,
            "1y" => Self::OneYear,
            "2y" => Self::TwoYears,
            "5y" => Self::FiveYears,
            "10y" => Self::TenYears,
            "ytd" => Self::YearToDate,
            "max" => Self::Max,
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "Invalid period '{other}'; allowed: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"
                )))
            }
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bar sampling interval. Only daily and weekly bars are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
        }
    }
}

impl FromStr for Interval {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "1d" => Ok(Self::Daily),
            "1wk" => Ok(Self::Weekly),
            _ => Err(AppError::InvalidRequest("Invalid interval; allowed: 1d, 1wk".into())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
}

impl HistoryRequest {
    /// Normalizes the ticker (trimmed, upper case) and rejects empty or odd symbols.
    pub fn new(symbol: &str, period: Period, interval: Interval) -> AppResult<Self> {
        let symbol = symbol.trim().to_uppercase();
        let valid = !symbol.is_empty()
            && symbol.len() <= 16
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
        if !valid {
            return Err(AppError::InvalidRequest(format!("Invalid symbol '{symbol}'")));
        }
        Ok(Self {
            symbol,
            period,
            interval,
        })
    }
}

/// One OHLCV bar. Serialized with capitalized keys for the charting frontend.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PriceBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
}

/// Headline statistics shown next to the chart. Any field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct QuoteSummary {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub volume: Option<u64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl QuoteSummary {
    /// Derive what the bars can tell: last session range and volume, and the
    /// high/low over the 365 days ending at the last bar.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let Some(last) = bars.last() else {
            return Self::default();
        };
        let cutoff = last.date - chrono::Duration::days(365);
        let window = bars.iter().filter(|b| b.date > cutoff);

        let (hi, lo) = window.fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), b| {
            (hi.max(b.high), lo.min(b.low))
        });

        Self {
            volume: last.volume,
            day_high: Some(last.high),
            day_low: Some(last.low),
            fifty_two_week_high: Some(hi),
            fifty_two_week_low: Some(lo),
            ..Self::default()
        }
    }

    /// Fill unknown fields from `fallback`.
    pub fn or(self, fallback: QuoteSummary) -> Self {
        Self {
            market_cap: self.market_cap.or(fallback.market_cap),
            pe_ratio: self.pe_ratio.or(fallback.pe_ratio),
            dividend_yield: self.dividend_yield.or(fallback.dividend_yield),
            volume: self.volume.or(fallback.volume),
            day_high: self.day_high.or(fallback.day_high),
            day_low: self.day_low.or(fallback.day_low),
            fifty_two_week_high: self.fifty_two_week_high.or(fallback.fifty_two_week_high),
            fifty_two_week_low: self.fifty_two_week_low.or(fallback.fifty_two_week_low),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub summary: QuoteSummary,
}

/// Source of historical bars. Implementations own their transport; handlers
/// only see this trait, so tests can swap in a canned provider.
pub trait HistoricalQuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bars in ascending date order for the request window.
    fn fetch_history<'a>(&'a self, req: &'a HistoryRequest) -> BoxFuture<'a, AppResult<PriceHistory>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bar(date: NaiveDate, high: f64, low: f64) -> PriceBar {
        PriceBar { date, open: low, high, low, close: high, volume: Some(1_000) }
    }

    #[test]
    fn test_interval_whitelist() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weekly);
        let err = "1h".parse::<Interval>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid interval; allowed: 1d, 1wk");
    }

    #[test]
    fn test_period_round_trip_names() {
        for name in ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"] {
            assert_eq!(name.parse::<Period>().unwrap().as_str(), name);
        }
        assert!("7w".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::SixMonths);
    }

    #[test]
    fn test_period_covering() {
        let today = d(2024, 6, 30);
        assert_eq!(Period::covering(d(2024, 6, 20), today), Period::OneMonth);
        assert_eq!(Period::covering(d(2024, 3, 1), today), Period::SixMonths);
        assert_eq!(Period::covering(d(2023, 7, 10), today), Period::OneYear);
        assert_eq!(Period::covering(d(2020, 1, 1), today), Period::FiveYears);
        assert_eq!(Period::covering(d(1990, 1, 1), today), Period::Max);
    }

    #[test]
    fn test_symbol_normalized() {
        let req = HistoryRequest::new(" aapl ", Period::default(), Interval::Daily).unwrap();
        assert_eq!(req.symbol, "AAPL");
        assert!(HistoryRequest::new("BRK-B", Period::default(), Interval::Daily).is_ok());
        assert!(HistoryRequest::new("", Period::default(), Interval::Daily).is_err());
        assert!(HistoryRequest::new("AA/PL", Period::default(), Interval::Daily).is_err());
    }

    #[test]
    fn test_summary_from_bars() {
        let bars = vec![
            bar(d(2023, 1, 3), 500.0, 1.0), // outside the 52-week window
            bar(d(2023, 9, 1), 120.0, 90.0),
            bar(d(2024, 3, 1), 140.0, 95.0),
            bar(d(2024, 6, 28), 130.0, 125.0),
        ];
        let s = QuoteSummary::from_bars(&bars);
        assert_eq!(s.day_high, Some(130.0));
        assert_eq!(s.day_low, Some(125.0));
        assert_eq!(s.fifty_two_week_high, Some(140.0));
        assert_eq!(s.fifty_two_week_low, Some(90.0));
        assert_eq!(s.volume, Some(1_000));
        assert_eq!(s.market_cap, None);

        assert_eq!(QuoteSummary::from_bars(&[]), QuoteSummary::default());
    }

    #[test]
    fn test_summary_or_prefers_provider() {
        let provider = QuoteSummary { day_high: Some(1.0), market_cap: Some(3e12), ..Default::default() };
        let derived = QuoteSummary { day_high: Some(2.0), day_low: Some(0.5), ..Default::default() };
        let merged = provider.or(derived);
        assert_eq!(merged.day_high, Some(1.0));
        assert_eq!(merged.day_low, Some(0.5));
        assert_eq!(merged.market_cap, Some(3e12));
    }

    #[test]
    fn test_bar_serializes_with_chart_keys() {
        let json = serde_json::to_value(bar(d(2024, 1, 2), 10.0, 9.0)).unwrap();
        assert_eq!(json["Date"], "2024-01-02");
        assert_eq!(json["High"], 10.0);
        assert_eq!(json["Volume"], 1000);
    }
}
