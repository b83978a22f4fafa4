//! Embedding orchestration: turn an element array and a [`Measure`] into
//! low-dimensional euclidean coordinates.
//!
//! Two embedders share one core. [`DirectEmbedder`] preserves the measure's
//! distances as they are (classical or landmark MDS on the direct distance
//! matrix). [`Isomap`] preserves geodesic distances along the k-nearest-
//! neighbor graph instead, which unrolls curved manifolds that direct MDS
//! would flatten poorly. Both cache their expensive intermediates and reuse
//! them across parameter changes wherever the previous results still apply.

pub mod correlation;
pub mod direct;
pub mod isomap;
pub mod mds;

pub use direct::DirectEmbedder;
pub use isomap::Isomap;

use crate::error::Error;
use crate::error::Result;
use crate::measure::Measure;
use ndarray::Array2;
use ndarray::ArrayView2;
use rand::Rng;
use std::sync::Arc;

/// Smallest landmark count assigned by default, element count permitting.
pub const MIN_DEFAULT_LANDMARKS: usize = 5;

/// State shared by every embedder: the element array (held in a fixed random
/// permutation), the measure, and the landmark configuration.
///
/// Landmark MDS needs the landmarks to be a random subset of the elements.
/// Instead of sampling per call, the elements are shuffled once at
/// construction and the *first L* shuffled elements serve as landmarks; the
/// permutation is remembered so results can be restored to input order.
/// Growing L therefore strictly extends the landmark sample, which is what
/// makes cached distance columns reusable.
pub(crate) struct EmbedderBase<T> {
  pub elements: Arc<Vec<T>>,
  pub measure: Arc<dyn Measure<T>>,
  landmarks: usize,
  use_landmarks: bool,
  shuffle: Vec<usize>,
}

impl<T> EmbedderBase<T> {
  /// Shuffle the elements with a fresh random permutation and derive the
  /// default landmark count `min(n, max(5, ⌊2·√n⌋))`.
  pub fn new(elements: Vec<T>, measure: Arc<dyn Measure<T>>) -> Result<Self> {
    if elements.is_empty() {
      return Err(Error::invalid("cannot embed an empty element array"));
    }
    let n = elements.len();
    let landmarks = n.min(MIN_DEFAULT_LANDMARKS.max((2.0 * (n as f64).sqrt()) as usize));

    let mut rng = rand::rng();
    let mut elements = elements;
    let mut shuffle = vec![0usize; n];
    for i in 0..n {
      shuffle[i] = rng.random_range(i..n);
      elements.swap(i, shuffle[i]);
    }

    Ok(Self {
      elements: Arc::new(elements),
      measure,
      landmarks,
      use_landmarks: false,
      shuffle,
    })
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  /// Number of starting points for the required-distance matrix: the
  /// landmark count when landmarks are in use, otherwise every element.
  pub fn starting_points(&self) -> usize {
    if self.use_landmarks {
      self.landmarks
    } else {
      self.len()
    }
  }

  pub fn landmark_count(&self) -> usize {
    self.landmarks
  }

  /// Set the landmark count used whenever landmarks are enabled.
  pub fn set_landmark_count(&mut self, landmarks: usize) -> Result<()> {
    if landmarks > self.len() {
      return Err(Error::invalid(format!(
        "cannot have {landmarks} landmarks using only {} elements",
        self.len()
      )));
    }
    if landmarks < 2 {
      return Err(Error::invalid(format!(
        "the landmark count must be at least 2, got {landmarks}"
      )));
    }
    self.landmarks = landmarks;
    Ok(())
  }

  pub fn use_landmarks(&mut self, use_landmarks: bool) {
    self.use_landmarks = use_landmarks;
  }

  /// Run the MDS stage appropriate for the landmark setting. The result is
  /// in internal (shuffled) element order.
  pub fn embed_distances(
    &self,
    distances: ArrayView2<'_, f64>,
    dimension: usize,
  ) -> Result<Array2<f64>> {
    if dimension < 1 {
      return Err(Error::invalid("the embedding dimension must be at least 1"));
    }
    if self.use_landmarks {
      mds::landmark(distances, dimension)
    } else {
      mds::classical(distances, dimension)
    }
  }

  /// Restore an embedding from internal order to input order by replaying
  /// the construction-time swaps backwards.
  pub fn unshuffle(&self, mut embedding: Array2<f64>) -> Array2<f64> {
    let dimensions = embedding.nrows();
    for i in (0..self.len()).rev() {
      for d in 0..dimensions {
        let tmp = embedding[(d, i)];
        embedding[(d, i)] = embedding[(d, self.shuffle[i])];
        embedding[(d, self.shuffle[i])] = tmp;
      }
    }
    embedding
  }
}
