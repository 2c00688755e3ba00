/// Grid resolution used when the caller does not ask for one.
pub const DEFAULT_PAYOFF_POINTS: usize = 61;

/// Lower/upper grid bounds as multiples of spot.
const GRID_LOW: f64 = 0.6;
const GRID_HIGH: f64 = 1.6;

/// Intrinsic value at maturity of a call and a put over a spot grid.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PayoffSeries {
    pub spot_grid: Vec<f64>,
    pub call_payoff: Vec<f64>,
    pub put_payoff: Vec<f64>,
}

impl PayoffSeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.spot_grid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spot_grid.is_empty()
    }
}

/// True when the grid for `spot` stays finite. Spots near f64::MAX overflow
/// the upper bound and would put NaN on the grid.
#[inline]
pub fn grid_in_range(spot: f64) -> bool {
    spot > 0.0 && (GRID_HIGH * spot).is_finite()
}

/// Payoff curve over [max(0, 0.6*spot), 1.6*spot].
///
/// Grid point i is `min + i*step`, computed from the index so the last point
/// lands on the upper bound without accumulated drift. Independent of rate,
/// volatility and time: this is value at maturity, not present value.
///
/// `points == 0` gives an empty series, `points == 1` the lower bound only.
pub fn payoff_curve(spot: f64, strike: f64, points: usize) -> PayoffSeries {
    let min = (GRID_LOW * spot).max(0.0);
    let max = GRID_HIGH * spot;
    let step = if points > 1 {
        (max - min) / (points - 1) as f64
    } else {
        0.0
    };

    let mut spot_grid = Vec::with_capacity(points);
    let mut call_payoff = Vec::with_capacity(points);
    let mut put_payoff = Vec::with_capacity(points);

    for i in 0..points {
        let x = min + i as f64 * step;
        spot_grid.push(x);
        call_payoff.push((x - strike).max(0.0));
        put_payoff.push((strike - x).max(0.0));
    }

    PayoffSeries {
        spot_grid,
        call_payoff,
        put_payoff,
    }
}
