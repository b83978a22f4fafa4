use crate::error::Result;
use crate::graph::adjacency::AdjacencyList;
use crate::knn::check_neighborhood_size;
use crate::knn::NearestNeighbors;
use crate::measure::Measure;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Exact k-nearest-neighbor graph construction by exhaustive comparison.
///
/// For every element a bounded max-heap of size k tracks the best
/// candidates seen so far, evicting the currently-worst one (ties broken
/// toward the larger index) whenever a closer element appears. Quadratic in
/// the element count and fully deterministic; it serves as the reference
/// that [`NnDescent`] is measured against.
///
/// [`NnDescent`]: crate::knn::NnDescent
pub struct BruteForceKnn<T> {
  k: usize,
  nodes: Arc<Vec<T>>,
  measure: Arc<dyn Measure<T>>,
}

impl<T> BruteForceKnn<T> {
  /// A builder over the given elements and measure.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if `k` is zero or not
  /// below the element count.
  pub fn new(k: usize, nodes: Arc<Vec<T>>, measure: Arc<dyn Measure<T>>) -> Result<Self> {
    check_neighborhood_size(k, nodes.len())?;
    Ok(Self { k, nodes, measure })
  }
}

impl<T> NearestNeighbors for BruteForceKnn<T> {
  fn neighborhood_size(&self) -> usize {
    self.k
  }

  fn set_neighborhood_size(&mut self, k: usize) -> Result<()> {
    check_neighborhood_size(k, self.nodes.len())?;
    self.k = k;
    Ok(())
  }

  fn nn_graph(&mut self) -> Result<AdjacencyList> {
    let n = self.nodes.len();
    let mut adjacency = AdjacencyList::new(n);

    for i in 0..n {
      let mut nearest: BinaryHeap<(OrderedFloat<f64>, usize)> =
        BinaryHeap::with_capacity(self.k + 1);
      for j in 0..n {
        if i == j {
          continue;
        }
        let worst = nearest
          .peek()
          .map_or(f64::INFINITY, |(weight, _)| weight.into_inner());
        let cap = if nearest.len() < self.k {
          f64::INFINITY
        } else {
          worst
        };
        let distance = self.measure.distance_capped(&self.nodes[i], &self.nodes[j], cap);
        if distance.is_infinite() {
          continue;
        }
        nearest.push((OrderedFloat(distance), j));
        if nearest.len() > self.k {
          nearest.pop();
        }
      }
      for (weight, j) in nearest {
        adjacency.add_edge(i, j, weight.into_inner())?;
      }
    }
    Ok(adjacency)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::measure::capped;
  use crate::measure::Euclidean;

  #[test]
  fn finds_the_exact_neighborhoods() {
    let values: Arc<Vec<i64>> = Arc::new(vec![0, 1, 2, 10, 11, 12]);
    let measure = Arc::new(|a: &i64, b: &i64, max: f64| capped((a - b).abs() as f64, max));
    let mut knn = BruteForceKnn::new(2, values, measure).unwrap();
    let graph = knn.nn_graph().unwrap();

    // Two tight clusters; the 2-NN edges stay within each cluster.
    assert_eq!(graph.distance(0, 1), 1.0);
    assert_eq!(graph.distance(0, 2), 2.0);
    assert_eq!(graph.distance(1, 2), 1.0);
    assert_eq!(graph.distance(3, 4), 1.0);
    assert_eq!(graph.distance(4, 5), 1.0);
    assert_eq!(graph.distance(3, 5), 2.0);
    assert_eq!(graph.distance(2, 3), f64::INFINITY);
  }

  #[test]
  fn ties_break_toward_smaller_indices() {
    // Vertex 0 is equidistant to everyone; with k=2 it must keep 1 and 2.
    let points: Arc<Vec<Vec<f64>>> = Arc::new(vec![
      vec![0.0, 0.0],
      vec![1.0, 0.0],
      vec![-1.0, 0.0],
      vec![0.0, 1.0],
    ]);
    let mut knn = BruteForceKnn::new(2, points, Arc::new(Euclidean)).unwrap();
    let graph = knn.nn_graph().unwrap();
    assert_eq!(graph.distance(0, 1), 1.0);
    assert_eq!(graph.distance(0, 2), 1.0);
    // Vertex 3 still reaches 0 through its own neighborhood.
    assert_eq!(graph.distance(0, 3), 1.0);
  }

  #[test]
  fn neighborhood_size_is_validated() {
    let values: Arc<Vec<i64>> = Arc::new(vec![1, 2, 3]);
    let measure = Arc::new(|a: &i64, b: &i64, max: f64| capped((a - b).abs() as f64, max));
    assert!(BruteForceKnn::new(0, values.clone(), measure.clone()).is_err());
    assert!(BruteForceKnn::new(3, values.clone(), measure.clone()).is_err());
    let mut knn = BruteForceKnn::new(2, values, measure).unwrap();
    assert!(knn.set_neighborhood_size(0).is_err());
    knn.set_neighborhood_size(1).unwrap();
    assert_eq!(knn.neighborhood_size(), 1);
  }
}
