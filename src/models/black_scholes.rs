use crate::models::normal::AbramowitzStegun;
use crate::models::time::years_between_dates;
use crate::models::StandardNormal;
use chrono::NaiveDate;

/// European option inputs as entered by the user.
/// Rates, payout and volatility are annualized decimals (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PricingInput {
    pub spot: f64,
    pub strike: f64,
    pub valuation_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub risk_free_rate: f64,
    pub volatility: f64,
    #[serde(default)]
    pub payout_rate: f64,
}

impl PricingInput {
    /// Time to maturity in years, never negative.
    #[inline]
    pub fn years(&self) -> f64 {
        years_between_dates(self.valuation_date, self.maturity_date)
    }
}

/// Prices and sensitivities for the call and the put on the same terms.
/// Theta is per year, vega per unit volatility, rho per unit rate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricingResult {
    pub call_price: f64,
    pub put_price: f64,
    pub delta_call: f64,
    pub delta_put: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta_call: f64,
    pub theta_put: f64,
    pub rho_call: f64,
    pub rho_put: f64,
}

impl PricingResult {
    /// (call, put) theta rescaled to one day, e.g. 365.0 calendar or 252.0 trading days.
    #[inline]
    pub fn theta_per_day(&self, days_per_year: f64) -> (f64, f64) {
        (self.theta_call / days_per_year, self.theta_put / days_per_year)
    }

    fn is_finite(&self) -> bool {
        [
            self.call_price,
            self.put_price,
            self.delta_call,
            self.delta_put,
            self.gamma,
            self.vega,
            self.theta_call,
            self.theta_put,
            self.rho_call,
            self.rho_put,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Closed-form Black-Scholes valuator with a continuous payout rate q.
///
/// d1 = (ln(S/K) + (r - q + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
/// C  = S*e^(-qT)*N(d1) - K*e^(-rT)*N(d2)
/// P  = K*e^(-rT)*N(-d2) - S*e^(-qT)*N(-d1)
///
/// Stateless apart from the normal distribution it evaluates with, so one
/// instance can serve every request.
pub struct BlackScholes<N: StandardNormal = AbramowitzStegun> {
    normal: N,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: AbramowitzStegun,
        }
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: StandardNormal> BlackScholes<N> {
    pub fn with_normal(normal: N) -> Self {
        Self { normal }
    }

    pub fn normal_name(&self) -> &'static str {
        self.normal.name()
    }

    /// Value an option from calendar dates.
    /// Returns None when the inputs are not computable yet (see `value`).
    #[inline]
    pub fn price(&self, input: &PricingInput) -> Option<PricingResult> {
        self.value(
            input.spot,
            input.strike,
            input.risk_free_rate,
            input.payout_rate,
            input.volatility,
            input.years(),
        )
    }

    /// Value an option from a year fraction.
    ///
    /// Returns None, never NaN or infinities, when any of `years`, `spot`,
    /// `strike` or `vol` is not strictly positive (NaN included), and when
    /// inputs at the edge of f64 range would overflow or underflow a field.
    pub fn value(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        payout: f64,
        vol: f64,
        years: f64,
    ) -> Option<PricingResult> {
        if !(years > 0.0 && spot > 0.0 && strike > 0.0 && vol > 0.0) {
            return None;
        }

        let sqrt_t = years.sqrt();
        let sigma_sqrt_t = vol * sqrt_t;
        if !(sigma_sqrt_t > 0.0 && sigma_sqrt_t.is_finite()) {
            return None;
        }
        let d1 = ((spot / strike).ln() + (rate - payout + 0.5 * vol * vol) * years) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        let payout_df = (-payout * years).exp();
        let rate_df = (-rate * years).exp();

        let n_d1 = self.normal.cdf(d1);
        let n_d2 = self.normal.cdf(d2);
        let n_neg_d1 = self.normal.cdf(-d1);
        let n_neg_d2 = self.normal.cdf(-d2);
        let phi_d1 = self.normal.pdf(d1);

        let fwd_spot = spot * payout_df;
        let pv_strike = strike * rate_df;

        let call_price = fwd_spot * n_d1 - pv_strike * n_d2;
        let put_price = pv_strike * n_neg_d2 - fwd_spot * n_neg_d1;

        // time decay shared by call and put
        let decay = -spot * phi_d1 * vol * payout_df / (2.0 * sqrt_t);

        let result = PricingResult {
            call_price,
            put_price,
            delta_call: payout_df * n_d1,
            delta_put: payout_df * (n_d1 - 1.0),
            gamma: payout_df * phi_d1 / (spot * sigma_sqrt_t),
            vega: fwd_spot * phi_d1 * sqrt_t,
            theta_call: decay - rate * pv_strike * n_d2 + payout * fwd_spot * n_d1,
            theta_put: decay + rate * pv_strike * n_neg_d2 - payout * fwd_spot * n_neg_d1,
            rho_call: years * pv_strike * n_d2,
            rho_put: -years * pv_strike * n_neg_d2,
        };
        result.is_finite().then_some(result)
    }
}
