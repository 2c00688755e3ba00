pub mod black_scholes;
pub mod normal;
pub mod payoff;
pub mod time;

pub use black_scholes::{BlackScholes, PricingInput, PricingResult};
pub use normal::{AbramowitzStegun, ExactNormal};
pub use payoff::{grid_in_range, payoff_curve, PayoffSeries, DEFAULT_PAYOFF_POINTS};
pub use time::{years_between, years_between_dates};

/// Standard normal distribution used by the valuator.
/// Both functions must be pure. Send + Sync so a valuator can be shared
/// across tokio tasks without wrapping.
///
/// Any implementation must keep cdf(0) = 0.5, cdf(-x) = 1 - cdf(x),
/// stay within [0, 1] and be monotone non-decreasing.
pub trait StandardNormal: Send + Sync {
    fn name(&self) -> &'static str;

    /// Probability density phi(x).
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative distribution N(x).
    fn cdf(&self, x: f64) -> f64;
}
