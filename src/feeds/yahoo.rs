use super::{HistoricalQuoteProvider, HistoryRequest, PriceBar, PriceHistory, QuoteSummary};
use crate::errors::{AppError, AppResult};
use chrono::DateTime;
use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; quant_desk/0.1)";

/// Historical bars from the Yahoo Finance chart API.
/// One GET per request, no caching. All methods return Result, never panic.
#[derive(Clone)]
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .pool_max_idle_per_host(4)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, req: &HistoryRequest) -> AppResult<PriceHistory> {
        let mut parts: smallvec::SmallVec<[String; 4]> = smallvec::SmallVec::new();
        parts.push(format!("range={}", req.period));
        parts.push(format!("interval={}", req.interval));
        parts.push("includeAdjustedClose=true".to_string());
        parts.push("includePrePost=false".to_string());
        let url = format!("{}/v8/finance/chart/{}?{}", self.base_url, req.symbol, parts.join("&"));

        tracing::debug!(symbol = %req.symbol, period = %req.period, interval = %req.interval, "fetching chart");

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("No data for symbol {}", req.symbol)));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::QuoteProvider(format!("HTTP {status}: {body}")));
        }

        let body = resp.text().await?;
        let history = parse_chart(&req.symbol, &body)?;
        tracing::info!(symbol = %history.symbol, bars = history.bars.len(), "chart fetched");
        Ok(history)
    }
}

impl HistoricalQuoteProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo-chart"
    }

    fn fetch_history<'a>(&'a self, req: &'a HistoryRequest) -> BoxFuture<'a, AppResult<PriceHistory>> {
        Box::pin(self.fetch(req))
    }
}

// Chart response shape (trimmed):
// {
//   "chart": {
//     "result": [{
//       "meta": { "symbol": "AAPL", "gmtoffset": -14400, "regularMarketVolume": 123,
//                 "regularMarketDayHigh": 1.0, "fiftyTwoWeekHigh": 2.0, ... },
//       "timestamp": [1704205800, ...],
//       "indicators": {
//         "quote": [{ "open": [..], "high": [..], "low": [..], "close": [..], "volume": [..] }],
//         "adjclose": [{ "adjclose": [..] }]
//       }
//     }],
//     "error": null
//   }
// }
// Individual entries inside the arrays are null on halted sessions.

#[derive(serde::Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(serde::Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(serde::Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    gmtoffset: Option<i64>,
    regular_market_volume: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
}

#[derive(serde::Deserialize)]
struct Indicators {
    quote: Option<Vec<QuoteBlock>>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(serde::Deserialize)]
struct QuoteBlock {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(serde::Deserialize)]
struct AdjCloseBlock {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Transport failures surface as `Network`, malformed JSON as `Parse`.
fn parse_chart(symbol: &str, body: &str) -> AppResult<PriceHistory> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    history_from_envelope(symbol, envelope)
}

fn history_from_envelope(symbol: &str, envelope: ChartEnvelope) -> AppResult<PriceHistory> {
    if let Some(err) = envelope.chart.error {
        let code = err.code.unwrap_or_default();
        let description = err.description.unwrap_or_default();
        if code.eq_ignore_ascii_case("not found") {
            return Err(AppError::NotFound(format!("No data for symbol {symbol}")));
        }
        return Err(AppError::QuoteProvider(format!("{code}: {description}")));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| AppError::NotFound(format!("No data for symbol {symbol}")))?;

    let bars = bars_from_result(&result);
    let derived = QuoteSummary::from_bars(&bars);
    let summary = result.meta.as_ref().map(summary_from_meta).unwrap_or_default().or(derived);
    let symbol = result
        .meta
        .and_then(|m| m.symbol)
        .unwrap_or_else(|| symbol.to_string());

    Ok(PriceHistory {
        symbol,
        bars,
        summary,
    })
}

/// Zip the column arrays into bars. Rows missing any OHLC value are dropped,
/// prices are split/dividend adjusted when an adjusted close is present.
fn bars_from_result(result: &ChartResult) -> Vec<PriceBar> {
    let empty: Vec<Option<f64>> = Vec::new();
    let Some(timestamps) = result.timestamp.as_ref() else {
        return Vec::new();
    };
    let Some(quote) = result
        .indicators
        .as_ref()
        .and_then(|i| i.quote.as_ref())
        .and_then(|q| q.first())
    else {
        return Vec::new();
    };
    let adjclose = result
        .indicators
        .as_ref()
        .and_then(|i| i.adjclose.as_ref())
        .and_then(|a| a.first())
        .and_then(|a| a.adjclose.as_ref())
        .unwrap_or(&empty);

    let offset = result.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
    let column = |col: &Option<Vec<Option<f64>>>, i: usize| -> Option<f64> {
        col.as_ref().and_then(|v| v.get(i).copied().flatten()).filter(|x| x.is_finite())
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open, i),
            column(&quote.high, i),
            column(&quote.low, i),
            column(&quote.close, i),
        ) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        let factor = match adjclose.get(i).copied().flatten() {
            Some(adj) if close > 0.0 && adj.is_finite() => adj / close,
            _ => 1.0,
        };

        bars.push(PriceBar {
            date,
            open: open * factor,
            high: high * factor,
            low: low * factor,
            close: close * factor,
            volume: column(&quote.volume, i).map(|v| v.max(0.0) as u64),
        });
    }

    bars.sort_by_key(|b| b.date);
    // weekly ranges can repeat the last partial week with the same date
    bars.dedup_by_key(|b| b.date);
    bars
}

fn summary_from_meta(meta: &ChartMeta) -> QuoteSummary {
    QuoteSummary {
        volume: meta.regular_market_volume.map(|v| v.max(0.0) as u64),
        day_high: meta.regular_market_day_high,
        day_low: meta.regular_market_day_low,
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
        ..QuoteSummary::default()
    }
}
