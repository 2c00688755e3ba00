use crate::models::StandardNormal;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use std::f64::consts::{PI, SQRT_2};

/// Abramowitz-Stegun 7.1.26 coefficients for erf(a), a >= 0.
const AS_P: f64 = 0.3275911;
const AS_A1: f64 = 0.254829592;
const AS_A2: f64 = -0.284496736;
const AS_A3: f64 = 1.421413741;
const AS_A4: f64 = -1.453152027;
const AS_A5: f64 = 1.061405429;

/// Exact standard normal density.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF through the Abramowitz-Stegun erf approximation.
///
/// N(x) = 0.5 * (1 + sign(x) * erf(|x| / sqrt(2)))
///
/// Max absolute error of the erf approximation is about 1.5e-7. The sign is
/// applied after the approximation, so N(-x) + N(x) = 1 up to rounding.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    // erf(0) from the polynomial is 1e-9, not 0
    if x == 0.0 {
        return 0.5;
    }

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let a = x.abs() / SQRT_2;
    let t = 1.0 / (1.0 + AS_P * a);
    let poly = ((((AS_A5 * t + AS_A4) * t + AS_A3) * t + AS_A2) * t + AS_A1) * t;
    let erf = 1.0 - poly * (-a * a).exp();

    0.5 * (1.0 + sign * erf)
}

/// Default normal: closed-form pdf, Abramowitz-Stegun cdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbramowitzStegun;

impl StandardNormal for AbramowitzStegun {
    #[inline]
    fn name(&self) -> &'static str {
        "abramowitz-stegun"
    }

    #[inline]
    fn pdf(&self, x: f64) -> f64 {
        norm_pdf(x)
    }

    #[inline]
    fn cdf(&self, x: f64) -> f64 {
        norm_cdf(x)
    }
}

/// Library-grade normal backed by statrs (erfc based).
pub struct ExactNormal {
    normal: Normal,
}

impl ExactNormal {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }
}

impl Default for ExactNormal {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardNormal for ExactNormal {
    #[inline]
    fn name(&self) -> &'static str {
        "statrs"
    }

    #[inline]
    fn pdf(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }

    #[inline]
    fn cdf(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }
}
