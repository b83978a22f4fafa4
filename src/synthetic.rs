//! Synthetic datasets for exercising the embedding pipeline: point clouds
//! with known manifold structure and parameterized polyline families.

use crate::polyline::Polyline;
use rand::Rng;
use typed_builder::TypedBuilder;

/// Uniform random points on a swiss roll: a 2-d sheet spiraled through 3-d
/// space. The classic benchmark for geodesic embeddings, since direct MDS
/// cannot flatten it but Isomap can.
pub fn random_swiss_roll(n: usize) -> Vec<Vec<f64>> {
  let mut rng = rand::rng();
  (0..n)
    .map(|_| {
      let phi = 1.0 + rng.random::<f64>() * 4.0;
      vec![
        phi * phi.cos(),
        phi * phi.sin(),
        rng.random::<f64>() * 20.0,
      ]
    })
    .collect()
}

/// Generator for random-walk polylines starting at the origin, with each
/// coordinate advancing by a uniform step per vertex.
///
/// ```ignore
/// let polylines = RandomWalks::builder().amount(100).build().generate();
/// ```
#[derive(TypedBuilder, Debug)]
pub struct RandomWalks {
  /// Number of polylines to generate.
  amount: usize,
  /// Smallest vertex count (inclusive).
  #[builder(default = 3)]
  min_length: usize,
  /// Largest vertex count (exclusive bound for the random draw).
  #[builder(default = 15)]
  max_length: usize,
  /// Dimension of the polyline space.
  #[builder(default = 4)]
  dimensions: usize,
}

impl RandomWalks {
  /// Generate the polylines.
  pub fn generate(self) -> Vec<Polyline> {
    let mut rng = rand::rng();
    (0..self.amount)
      .map(|_| {
        let length = self.min_length
          + (rng.random::<f64>() * (self.max_length - self.min_length) as f64).floor() as usize;
        let mut point = vec![0.0f64; self.dimensions];
        let mut vertices = Vec::with_capacity(length);
        for _ in 0..length {
          for coordinate in point.iter_mut() {
            *coordinate += rng.random::<f64>();
          }
          vertices.push(point.clone());
        }
        Polyline::new(vertices).expect("random walk vertices are well-formed")
      })
      .collect()
  }
}

/// A two-parameter family of five-vertex spike polylines lying on a 2-d
/// manifold in the plane.
///
/// Both parameters sweep the closed interval `[-range, range]` in `step`
/// increments. The boundary is included: the member count is exactly the
/// squared count of accumulated parameter values that stay `<= range`.
pub fn shifted_spikes(range: f64, step: f64) -> Vec<Polyline> {
  let mut polylines = Vec::new();
  let mut a = -range;
  while a <= range {
    let mut b = -range;
    while b <= range {
      let vertices = vec![
        vec![0.0, 0.0],
        vec![0.4, a / 2.0],
        vec![b + 0.5, a],
        vec![0.6, a / 2.0],
        vec![1.0, 0.0],
      ];
      polylines.push(Polyline::new(vertices).expect("spike vertices are well-formed"));
      b += step;
    }
    a += step;
  }
  polylines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn swiss_roll_points_are_three_dimensional() {
    let points = random_swiss_roll(50);
    assert_eq!(points.len(), 50);
    for point in &points {
      assert_eq!(point.len(), 3);
      let radius = (point[0] * point[0] + point[1] * point[1]).sqrt();
      assert!((1.0..=5.0).contains(&radius));
      assert!((0.0..=20.0).contains(&point[2]));
    }
  }

  #[test]
  fn random_walks_respect_the_requested_shape() {
    let polylines = RandomWalks::builder()
      .amount(25)
      .min_length(4)
      .max_length(8)
      .dimensions(2)
      .build()
      .generate();
    assert_eq!(polylines.len(), 25);
    for polyline in &polylines {
      assert!((4..8).contains(&polyline.len()));
      assert_eq!(polyline.dimension(), 2);
    }
  }

  #[test]
  fn shifted_spikes_count_includes_the_range_boundary() {
    let polylines = shifted_spikes(1.99, 0.05);
    assert_eq!(polylines.len(), 6400);
    for polyline in &polylines {
      assert_eq!(polyline.len(), 5);
      assert_eq!(polyline.dimension(), 2);
    }
  }

  #[test]
  fn shifted_spikes_small_family() {
    // Parameters -1, 0, 1 in both directions: nine polylines.
    let polylines = shifted_spikes(1.0, 1.0);
    assert_eq!(polylines.len(), 9);
  }
}
