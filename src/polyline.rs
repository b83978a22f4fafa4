use crate::error::Error;
use crate::error::Result;
use crate::measure::euclidean_distance;
use serde::Deserialize;
use serde::Serialize;

/// A polygonal curve: an ordered sequence of vertices in d-dimensional
/// euclidean space, joined by straight line segments. Not closed.
///
/// The vertex count and dimension are fixed at construction. Vertices are
/// stored flat in row-major order (`data[i * dimension + c]` is the c-th
/// coordinate of the i-th vertex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
  dimension: usize,
  data: Vec<f64>,
}

impl Polyline {
  /// Create a polyline from per-vertex coordinate rows.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidInput`] if fewer than two vertices are given,
  /// a vertex is empty, or the vertices do not all share one dimension.
  pub fn new(vertices: Vec<Vec<f64>>) -> Result<Self> {
    if vertices.len() < 2 {
      return Err(Error::invalid(format!(
        "a polyline needs at least 2 vertices, got {}",
        vertices.len()
      )));
    }
    let dimension = vertices[0].len();
    if dimension == 0 {
      return Err(Error::invalid("polyline vertices cannot be empty"));
    }
    for vertex in &vertices {
      if vertex.len() != dimension {
        return Err(Error::invalid(format!(
          "all vertices must share one dimension, got {} and {}",
          dimension,
          vertex.len()
        )));
      }
    }
    let mut data = Vec::with_capacity(vertices.len() * dimension);
    for vertex in &vertices {
      data.extend_from_slice(vertex);
    }
    Ok(Self { dimension, data })
  }

  /// Number of vertices.
  pub fn len(&self) -> usize {
    self.data.len() / self.dimension
  }

  /// Always false; construction guarantees at least two vertices.
  pub fn is_empty(&self) -> bool {
    false
  }

  /// Dimension of every vertex.
  pub fn dimension(&self) -> usize {
    self.dimension
  }

  /// An independent copy of the i-th vertex. Mutating the returned vector
  /// does not affect the polyline.
  ///
  /// # Panics
  ///
  /// Panics if `i >= self.len()`. Use [`Polyline::try_vertex`] for a checked
  /// variant.
  pub fn vertex(&self, i: usize) -> Vec<f64> {
    self.point(i).to_vec()
  }

  /// Checked variant of [`Polyline::vertex`].
  ///
  /// # Errors
  ///
  /// Returns [`Error::OutOfRange`] if `i >= self.len()`.
  pub fn try_vertex(&self, i: usize) -> Result<Vec<f64>> {
    if i >= self.len() {
      return Err(Error::OutOfRange {
        index: i,
        len: self.len(),
      });
    }
    Ok(self.vertex(i))
  }

  /// Borrow the i-th vertex without copying.
  pub(crate) fn point(&self, i: usize) -> &[f64] {
    &self.data[i * self.dimension..(i + 1) * self.dimension]
  }

  /// Euclidean distance between vertex `own_index` of `self` and vertex
  /// `other_index` of `other`.
  ///
  /// # Panics
  ///
  /// Panics if the polylines have different dimensions or an index is out
  /// of range.
  pub fn corner_distance(&self, other: &Polyline, own_index: usize, other_index: usize) -> f64 {
    assert_eq!(
      self.dimension, other.dimension,
      "cannot compare polylines of different dimension"
    );
    euclidean_distance(self.point(own_index), other.point(other_index))
  }

  /// Length of the longest segment between two consecutive vertices.
  pub fn longest_segment(&self) -> f64 {
    let mut longest = 0.0f64;
    for i in 1..self.len() {
      longest = longest.max(euclidean_distance(self.point(i - 1), self.point(i)));
    }
    longest
  }
}
