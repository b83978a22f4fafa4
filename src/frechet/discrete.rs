use crate::measure::Measure;
use crate::polyline::Polyline;

/// The classic discrete Fréchet distance: the minimum over all monotone
/// couplings of the maximum vertex pair distance.
///
/// Stateless; use the unit value directly wherever a [`Measure`] is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteFrechet;

impl Measure<Polyline> for DiscreteFrechet {
  /// # Panics
  ///
  /// Panics if the polylines have different dimensions.
  fn distance_capped(&self, p: &Polyline, q: &Polyline, max: f64) -> f64 {
    accumulate_coupling(p, q, max, f64::max)
  }
}

/// The integral discrete Fréchet distance: the minimum over all monotone
/// couplings of the *sum* of vertex pair distances.
///
/// Compared to [`DiscreteFrechet`] this rewards couplings that stay close
/// everywhere instead of only bounding the worst pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegralDiscreteFrechet;

impl Measure<Polyline> for IntegralDiscreteFrechet {
  /// # Panics
  ///
  /// Panics if the polylines have different dimensions.
  fn distance_capped(&self, p: &Polyline, q: &Polyline, max: f64) -> f64 {
    accumulate_coupling(p, q, max, |a, b| a + b)
  }
}

/// Dynamic program over the vertex pairing grid, shared by both discrete
/// variants.
///
/// `accumulate` combines the minimal cost of a preceding pair with the
/// distance of the current pair; it must be monotone in both arguments
/// (`accumulate(a, b) >= a` and `accumulate(a, b) >= b`), which is what makes
/// the row-minimum early exit sound: once every entry of a row exceeds `max`,
/// no later cell can fall below it again.
///
/// Only two rows are kept, so memory is linear in the shorter polyline.
fn accumulate_coupling(
  p: &Polyline,
  q: &Polyline,
  max: f64,
  accumulate: impl Fn(f64, f64) -> f64,
) -> f64 {
  assert_eq!(
    p.dimension(),
    q.dimension(),
    "cannot compare polylines of different dimension"
  );

  // Normalize so the outer loop runs over the longer polyline and the rows
  // span the shorter one.
  let (p, q) = if q.len() > p.len() { (q, p) } else { (p, q) };
  let width = q.len();

  let mut current = vec![0.0f64; width];
  let mut last = vec![0.0f64; width];

  let mut row_min = f64::INFINITY;
  current[0] = p.corner_distance(q, 0, 0);
  for j in 1..width {
    current[j] = accumulate(current[j - 1], p.corner_distance(q, 0, j));
    row_min = row_min.min(current[j]);
  }
  if row_min > max {
    return f64::INFINITY;
  }

  for i in 1..p.len() {
    std::mem::swap(&mut current, &mut last);

    current[0] = accumulate(last[0], p.corner_distance(q, i, 0));
    row_min = current[0];
    for j in 1..width {
      let predecessor = last[j].min(last[j - 1]).min(current[j - 1]);
      current[j] = accumulate(predecessor, p.corner_distance(q, i, j));
      row_min = row_min.min(current[j]);
    }
    if row_min > max {
      return f64::INFINITY;
    }
  }

  current[width - 1]
}

#[cfg(test)]
mod tests {
  use super::*;

  fn polyline(values: &[f64]) -> Polyline {
    Polyline::new(values.iter().map(|&v| vec![v]).collect()).unwrap()
  }

  #[test]
  fn discrete_distance_on_one_dimensional_curves() {
    let p = polyline(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let skipping = polyline(&[1.0, 2.0, 4.0, 5.0]);
    let dense = polyline(&[1.0, 1.5, 2.5, 3.5, 4.5, 5.0]);
    let zigzag = polyline(&[1.0, 5.0, 1.0, 5.0]);

    assert_eq!(DiscreteFrechet.distance(&p, &skipping), 1.0);
    assert_eq!(DiscreteFrechet.distance(&p, &dense), 0.5);
    assert_eq!(DiscreteFrechet.distance(&p, &zigzag), 2.0);
  }

  #[test]
  fn integral_distance_on_one_dimensional_curves() {
    let p = polyline(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let skipping = polyline(&[1.0, 2.0, 4.0, 5.0]);
    let dense = polyline(&[1.0, 1.5, 2.5, 3.5, 4.5, 5.0]);
    let zigzag = polyline(&[1.0, 5.0, 1.0, 5.0]);

    assert_eq!(IntegralDiscreteFrechet.distance(&p, &skipping), 1.0);
    assert_eq!(IntegralDiscreteFrechet.distance(&p, &dense), 2.0);
    assert_eq!(IntegralDiscreteFrechet.distance(&p, &zigzag), 6.0);
  }

  #[test]
  fn distance_is_symmetric_and_zero_on_self() {
    let p = polyline(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let q = polyline(&[1.0, 5.0, 1.0, 5.0]);
    assert_eq!(DiscreteFrechet.distance(&p, &p), 0.0);
    assert_eq!(
      DiscreteFrechet.distance(&p, &q),
      DiscreteFrechet.distance(&q, &p)
    );
    assert_eq!(
      IntegralDiscreteFrechet.distance(&p, &q),
      IntegralDiscreteFrechet.distance(&q, &p)
    );
  }

  #[test]
  fn cap_interrupts_with_infinity() {
    let p = polyline(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let zigzag = polyline(&[1.0, 5.0, 1.0, 5.0]);
    assert_eq!(DiscreteFrechet.distance_capped(&p, &zigzag, 2.0), 2.0);
    assert_eq!(
      DiscreteFrechet.distance_capped(&p, &zigzag, 1.9),
      f64::INFINITY
    );
  }

  #[test]
  #[should_panic(expected = "different dimension")]
  fn rejects_dimension_mismatch() {
    let p = polyline(&[1.0, 2.0]);
    let q = Polyline::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    DiscreteFrechet.distance(&p, &q);
  }

  /// The identity pairing of two equal-length polylines is one valid
  /// coupling, so its worst pair bounds the distance from above; the
  /// endpoint pairs take part in every coupling and bound it from below.
  #[test]
  fn distance_is_bracketed_by_couplings() {
    use crate::synthetic::RandomWalks;

    let a = RandomWalks::builder()
      .amount(15)
      .min_length(8)
      .max_length(9)
      .build()
      .generate();
    let b = RandomWalks::builder()
      .amount(15)
      .min_length(8)
      .max_length(9)
      .build()
      .generate();

    for (p, q) in a.iter().zip(b.iter()) {
      let identity_coupling_cost = (0..p.len())
        .map(|i| p.corner_distance(q, i, i))
        .fold(0.0f64, f64::max);
      let endpoint_cost = p
        .corner_distance(q, 0, 0)
        .max(p.corner_distance(q, p.len() - 1, q.len() - 1));

      let distance = DiscreteFrechet.distance(p, q);
      assert!(distance <= identity_coupling_cost + 1e-12);
      assert!(distance >= endpoint_cost - 1e-12);
    }
  }
}
