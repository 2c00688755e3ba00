use crate::config::AppConfig;
use crate::db::DbPool;
use crate::feeds::HistoricalQuoteProvider;
use crate::models::BlackScholes;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub quotes_served: AtomicU64,
    pub options_priced: AtomicU64,
    pub options_not_computable: AtomicU64,
    pub payoffs_generated: AtomicU64,
    pub growth_simulations: AtomicU64,
    pub registrations: AtomicU64,
    pub logins: AtomicU64,
    pub auth_failures: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            quotes_served: AtomicU64::new(0),
            options_priced: AtomicU64::new(0),
            options_not_computable: AtomicU64::new(0),
            payoffs_generated: AtomicU64::new(0),
            growth_simulations: AtomicU64::new(0),
            registrations: AtomicU64::new(0),
            logins: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        use Ordering::Relaxed;
        CounterSnapshot {
            quotes_served: self.quotes_served.load(Relaxed),
            options_priced: self.options_priced.load(Relaxed),
            options_not_computable: self.options_not_computable.load(Relaxed),
            payoffs_generated: self.payoffs_generated.load(Relaxed),
            growth_simulations: self.growth_simulations.load(Relaxed),
            registrations: self.registrations.load(Relaxed),
            logins: self.logins.load(Relaxed),
            auth_failures: self.auth_failures.load(Relaxed),
        }
    }
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CounterSnapshot {
    pub quotes_served: u64,
    pub options_priced: u64,
    pub options_not_computable: u64,
    pub payoffs_generated: u64,
    pub growth_simulations: u64,
    pub registrations: u64,
    pub logins: u64,
    pub auth_failures: u64,
}

// ── Shared Application State ──

/// Shared by every handler behind an Arc. The valuator is stateless and the
/// counters are atomics; only the database sits behind a mutex.
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub quotes: Arc<dyn HistoricalQuoteProvider>,
    pub pricer: BlackScholes,
    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, quotes: Arc<dyn HistoricalQuoteProvider>) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            quotes,
            pricer: BlackScholes::new(),
            counters: PerfCounters::new(),
        })
    }
}
