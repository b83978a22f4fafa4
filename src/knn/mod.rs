//! k-nearest-neighbor graph construction.
//!
//! Both builders produce an undirected [`AdjacencyList`] in which every
//! vertex carries edges to (at most) its k most similar peers under a
//! [`Measure`](crate::measure::Measure); because the storage is undirected, a vertex referenced by
//! many neighborhoods can end up with degree above k. [`BruteForceKnn`] is
//! exact and quadratic; [`NnDescent`] approximates the same graph in far
//! fewer distance evaluations and reuses its state across k changes.

pub mod brute_force;
pub mod descent;

pub use brute_force::BruteForceKnn;
pub use descent::NnDescent;

use crate::error::Result;
use crate::graph::adjacency::AdjacencyList;

/// A builder for k-nearest-neighbor graphs over a fixed element array.
///
/// Implementations should reuse previous work where they can, so that
/// rebuilding the graph after a neighborhood-size change is cheaper than
/// starting from scratch.
pub trait NearestNeighbors {
  /// The current neighborhood size k.
  fn neighborhood_size(&self) -> usize;

  /// Change the neighborhood size.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if `k` is zero or leaves
  /// no room for k distinct neighbors (`k >= n`).
  fn set_neighborhood_size(&mut self, k: usize) -> Result<()>;

  /// Build the k-nearest-neighbor graph.
  fn nn_graph(&mut self) -> Result<AdjacencyList>;
}

/// Validate a neighborhood size against the element count.
pub(crate) fn check_neighborhood_size(k: usize, n: usize) -> Result<()> {
  if k < 1 {
    return Err(crate::error::Error::invalid(
      "the neighborhood size must be at least 1",
    ));
  }
  if k >= n {
    return Err(crate::error::Error::invalid(format!(
      "cannot have k={k} using only {n} elements"
    )));
  }
  Ok(())
}
