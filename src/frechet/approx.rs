use crate::error::Error;
use crate::error::Result;
use crate::frechet::decider::FrechetDecider;
use crate::frechet::discrete::DiscreteFrechet;
use crate::measure::Measure;
use crate::polyline::Polyline;

/// The continuous Fréchet distance, approximated to a configurable
/// precision.
///
/// The exact continuous distance is never computed; instead the decision
/// procedure ([`FrechetDecider`]) is bisected between a lower and an upper
/// bound derived from the discrete Fréchet distance. The returned value
/// differs from the true continuous distance by at most the configured
/// precision.
#[derive(Debug, Clone)]
pub struct ApproxFrechet {
  precision: f64,
  tabular_decider: bool,
}

impl Default for ApproxFrechet {
  /// Path-searching decider at [`ApproxFrechet::DEFAULT_PRECISION`].
  fn default() -> Self {
    Self {
      precision: Self::DEFAULT_PRECISION,
      tabular_decider: false,
    }
  }
}

impl ApproxFrechet {
  /// The precision used when none is configured.
  pub const DEFAULT_PRECISION: f64 = 1e-4;

  /// An approximator with the given precision, using the path-searching
  /// decider.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidInput`] if the precision is not positive.
  pub fn with_precision(precision: f64) -> Result<Self> {
    Self::with_decider(precision, false)
  }

  /// An approximator with the given precision and decider strategy.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidInput`] if the precision is not positive.
  pub fn with_decider(precision: f64, tabular_decider: bool) -> Result<Self> {
    let mut approx = Self {
      precision: Self::DEFAULT_PRECISION,
      tabular_decider,
    };
    approx.set_precision(precision)?;
    Ok(approx)
  }

  /// The current precision.
  pub fn precision(&self) -> f64 {
    self.precision
  }

  /// Change the precision of future distance computations.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidInput`] if the precision is not positive.
  pub fn set_precision(&mut self, precision: f64) -> Result<()> {
    if precision <= 0.0 {
      return Err(Error::invalid(format!(
        "precision must be positive, got {precision}"
      )));
    }
    self.precision = precision;
    Ok(())
  }

  /// Bisect the interval `[lo, hi]` with the decider until the midpoint is
  /// within the configured precision of the true distance.
  fn approximate(&self, mut lo: f64, mut hi: f64, decider: &FrechetDecider) -> f64 {
    let mut distance = (lo + hi) / 2.0;
    while (hi - lo) / 2.0 > self.precision {
      if decider.decide(distance) {
        hi = distance;
      } else {
        lo = distance;
      }
      distance = (lo + hi) / 2.0;
    }
    distance
  }

  /// Lower and upper bounds on the continuous Fréchet distance, built from
  /// the discrete distance and the longest segment of either polyline: the
  /// continuous distance can undershoot the discrete one by at most half the
  /// longest segment, and never exceeds it.
  fn bounds(p: &Polyline, q: &Polyline) -> (f64, f64) {
    let longest_segment = p.longest_segment().max(q.longest_segment());
    let discrete = DiscreteFrechet.distance(p, q);
    ((discrete - longest_segment / 2.0).max(0.0), discrete)
  }

  fn decider<'a>(&self, p: &'a Polyline, q: &'a Polyline) -> FrechetDecider<'a> {
    if self.tabular_decider {
      FrechetDecider::tabular(p, q)
    } else {
      FrechetDecider::path(p, q)
    }
  }
}

impl Measure<Polyline> for ApproxFrechet {
  /// Approximate the Fréchet distance if it does not exceed `max`.
  ///
  /// The cap is checked against the bounds before any bisection happens, so
  /// clearly-too-distant pairs cost one discrete distance computation and at
  /// most one decision.
  ///
  /// # Panics
  ///
  /// Panics if the polylines have different dimensions.
  fn distance_capped(&self, p: &Polyline, q: &Polyline, max: f64) -> f64 {
    let (lo, mut hi) = Self::bounds(p, q);

    if max < lo {
      return f64::INFINITY;
    }

    let decider = self.decider(p, q);
    if max < hi {
      if decider.decide(max) {
        hi = max;
      } else {
        return f64::INFINITY;
      }
    }

    self.approximate(lo, hi, &decider)
  }
}
