//! Cross-module integration tests: embedders on known geometries and the
//! full polyline pipeline.

use approx::assert_abs_diff_eq;
use crate::measure::capped;
use crate::measure::Euclidean;
use crate::measure::Measure;
use crate::synthetic;
use crate::synthetic::RandomWalks;
use crate::AdjacencyList;
use crate::ApproxFrechet;
use crate::DirectEmbedder;
use crate::Isomap;
use crate::Polyline;
use std::sync::Arc;

/// δ(a, b) = |a − b| over integers: an exactly embeddable line.
fn integer_measure() -> Arc<dyn Measure<i64>> {
  Arc::new(|a: &i64, b: &i64, max: f64| capped((a - b).abs() as f64, max))
}

#[test]
fn direct_embedder_recovers_the_integer_line() {
  let mut embedder = DirectEmbedder::new(vec![0, 1, 2, 3, 4, 5, 6], integer_measure()).unwrap();
  let embedding = embedder.embed(1).unwrap();

  assert_eq!(embedding.shape(), &[1, 7]);
  let sign = embedding[(0, 0)].signum();
  for (i, expected) in [3.0, 2.0, 1.0, 0.0, -1.0, -2.0, -3.0].iter().enumerate() {
    assert_abs_diff_eq!(embedding[(0, i)], sign * expected, epsilon = 0.01);
  }
}

#[test]
fn direct_embedder_reuses_distances_across_landmark_changes() {
  let mut embedder = DirectEmbedder::new(vec![0, 1, 2, 3, 4, 5, 6], integer_measure()).unwrap();

  embedder.use_landmarks(true);
  embedder.set_landmark_count(5).unwrap();
  assert!(embedder.embedding_quality(1).unwrap() < 0.1);

  // Shrink: a slice of the previous matrix.
  embedder.set_landmark_count(3).unwrap();
  assert!(embedder.embedding_quality(1).unwrap() < 0.1);

  // Back up: the cache already covers this width.
  embedder.set_landmark_count(5).unwrap();
  assert!(embedder.embedding_quality(1).unwrap() < 0.1);

  // Full matrix: only the missing columns are computed.
  embedder.use_landmarks(false);
  assert!(embedder.embedding_quality(1).unwrap() < 0.1);
}

#[test]
fn embedding_dimension_is_validated() {
  let mut embedder = DirectEmbedder::new(vec![1, 2, 3], integer_measure()).unwrap();
  assert!(embedder.embed(0).is_err());
  assert!(embedder.embed(1).is_ok());
}

#[test]
fn direct_landmark_count_is_validated() {
  let mut embedder =
    DirectEmbedder::with_landmarks(vec![1, 2, 3], integer_measure(), 3).unwrap();
  embedder.set_landmark_count(2).unwrap();
  assert_eq!(embedder.landmark_count(), 2);
  assert!(embedder.set_landmark_count(4).is_err());
  assert!(embedder.set_landmark_count(1).is_err());
}

#[test]
fn isomap_recovers_the_integer_line() {
  // With k = n − 1 the neighborhood graph is complete, so the geodesic
  // distances equal the direct ones and the embedding is exact.
  let mut isomap = Isomap::new(vec![0, 1, 2, 3, 4, 5, 6], integer_measure(), 6).unwrap();
  let embedding = isomap.embed(1).unwrap();

  let sign = embedding[(0, 0)].signum();
  for (i, expected) in [3.0, 2.0, 1.0, 0.0, -1.0, -2.0, -3.0].iter().enumerate() {
    assert_abs_diff_eq!(embedding[(0, i)], sign * expected, epsilon = 0.01);
  }
}

#[test]
fn isomap_nearest_neighbor_count_is_validated() {
  let points = synthetic::random_swiss_roll(100);
  let mut isomap = Isomap::with_landmarks(points, Arc::new(Euclidean), 5, 10).unwrap();

  isomap.set_nearest_neighbor_count(7).unwrap();
  assert_eq!(isomap.nearest_neighbor_count(), 7);
  isomap.set_nearest_neighbor_count(7).unwrap();
  assert!(isomap.set_nearest_neighbor_count(0).is_err());
  assert!(isomap.set_nearest_neighbor_count(100).is_err());
  isomap.set_nearest_neighbor_count(2).unwrap();
}

#[test]
fn isomap_flattens_the_swiss_roll() {
  let points = synthetic::random_swiss_roll(1000);
  let mut isomap = Isomap::with_landmarks(points, Arc::new(Euclidean), 5, 50).unwrap();

  assert!(isomap.embedding_quality(2).unwrap() < 0.05);

  isomap.use_landmarks(false);
  assert!(isomap.embedding_quality(2).unwrap() < 0.05);
}

#[test]
fn direct_embedder_handles_frechet_measures() {
  let spikes = synthetic::shifted_spikes(0.5, 0.25);
  assert_eq!(spikes.len(), 25);

  let measure = Arc::new(ApproxFrechet::with_precision(1e-3).unwrap());
  let mut embedder = DirectEmbedder::new(spikes, measure).unwrap();
  let embedding = embedder.embed(2).unwrap();
  assert_eq!(embedding.shape(), &[2, 25]);
  assert!(embedding.iter().all(|c| c.is_finite()));

  let quality = embedder.embedding_quality(2).unwrap();
  assert!((0.0..=1.0).contains(&quality));
}

#[test]
fn isomap_handles_frechet_measures() {
  let walks = RandomWalks::builder().amount(40).build().generate();
  let measure = Arc::new(ApproxFrechet::with_precision(1e-3).unwrap());
  let mut isomap = Isomap::new(walks, measure, 5).unwrap();

  let embedding = isomap.embed(2).unwrap();
  assert_eq!(embedding.shape(), &[2, 40]);
  assert!(embedding.iter().all(|c| c.is_finite()));

  // The stitched neighborhood graph leaves no infinite geodesics.
  let geodesic = isomap.geodesic_distances().unwrap();
  assert!(geodesic.iter().all(|d| d.is_finite()));
}

#[test]
fn value_types_serialize_round_trip() {
  let polyline = Polyline::new(vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]]).unwrap();
  let bytes = bincode::serialize(&polyline).unwrap();
  let restored: Polyline = bincode::deserialize(&bytes).unwrap();
  assert_eq!(restored, polyline);

  let mut graph = AdjacencyList::new(3);
  graph.add_edge(0, 1, 1.5).unwrap();
  graph.add_edge(1, 2, 2.5).unwrap();
  let bytes = bincode::serialize(&graph).unwrap();
  let restored: AdjacencyList = bincode::deserialize(&bytes).unwrap();
  for i in 0..3 {
    for j in 0..3 {
      assert_eq!(restored.distance(i, j), graph.distance(i, j));
    }
  }
}
