use crate::error::Error;
use crate::error::Result;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// A weighted undirected graph over the vertices `0..n`, stored as one
/// neighbor-to-weight mapping per vertex. Suited to sparse graphs.
///
/// Missing edges read as `f64::INFINITY`, and storing an infinite weight
/// removes the edge; the distance of a vertex to itself is always 0. All
/// updates are applied symmetrically.
///
/// Writers need external synchronization while readers run; the parallel
/// consumers in this crate only ever read a finished graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacencyList {
  data: Vec<HashMap<usize, f64>>,
}

impl AdjacencyList {
  /// A graph with `vertices` vertices and no edges.
  pub fn new(vertices: usize) -> Self {
    Self {
      data: vec![HashMap::new(); vertices],
    }
  }

  /// Number of vertices.
  pub fn len(&self) -> usize {
    self.data.len()
  }

  /// Whether the graph has no vertices.
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Insert or update the edge between `from` and `to`.
  ///
  /// Setting the weight of an existing edge overwrites it; a weight of
  /// `f64::INFINITY` removes the edge. Self-loops are accepted only with
  /// weight 0 and are not stored.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidInput`] for a negative weight or a non-zero
  /// self-loop.
  ///
  /// # Panics
  ///
  /// Panics if either vertex is out of range.
  pub fn add_edge(&mut self, from: usize, to: usize, distance: f64) -> Result<()> {
    if distance < 0.0 {
      return Err(Error::invalid(format!(
        "edge weights cannot be negative, got {distance}"
      )));
    }
    if from == to {
      if distance != 0.0 {
        return Err(Error::invalid(format!(
          "the distance from a vertex to itself must be 0, got {distance}"
        )));
      }
      return Ok(());
    }
    if distance.is_infinite() {
      self.remove_edge(from, to);
      return Ok(());
    }
    self.data[from].insert(to, distance);
    self.data[to].insert(from, distance);
    Ok(())
  }

  /// Remove the edge between `from` and `to` if present.
  ///
  /// # Panics
  ///
  /// Panics if either vertex is out of range.
  pub fn remove_edge(&mut self, from: usize, to: usize) {
    self.data[from].remove(&to);
    self.data[to].remove(&from);
  }

  /// The weight of the edge between `from` and `to`: 0 for a vertex and
  /// itself, the stored weight, or `f64::INFINITY` when no edge exists.
  ///
  /// # Panics
  ///
  /// Panics if either vertex is out of range.
  pub fn distance(&self, from: usize, to: usize) -> f64 {
    if from == to {
      return 0.0;
    }
    self.data[from].get(&to).copied().unwrap_or(f64::INFINITY)
  }

  /// The vertices incident to `vertex`, in no particular order.
  ///
  /// # Panics
  ///
  /// Panics if the vertex is out of range.
  pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
    self.data[vertex].keys().copied()
  }

  /// Number of edges incident to `vertex`.
  pub fn degree(&self, vertex: usize) -> usize {
    self.data[vertex].len()
  }

  /// The dense n×n distance matrix: symmetric, zero diagonal, missing edges
  /// as `f64::INFINITY`.
  pub fn to_matrix(&self) -> Array2<f64> {
    let n = self.len();
    Array2::from_shape_fn((n, n), |(from, to)| self.distance(from, to))
  }
}
