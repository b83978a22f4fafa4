use crate::embedding::correlation;
use crate::embedding::EmbedderBase;
use crate::error::Result;
use crate::measure::Measure;
use ndarray::s;
use ndarray::Array2;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// An embedder that preserves the measure's distances directly: classical
/// (or landmark) MDS over the pairwise distance matrix.
///
/// Every distance that was ever computed is cached. Growing the landmark
/// count extends the cached matrix by the missing columns only, and the
/// square landmark block is completed by symmetry, so repeated embeddings
/// with varying parameters pay for each distance once.
pub struct DirectEmbedder<T> {
  base: EmbedderBase<T>,
  saved: Option<Array2<f64>>,
}

impl<T: Send + Sync> DirectEmbedder<T> {
  /// An embedder over the given elements and measure, not using landmarks.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if the element array is
  /// empty.
  pub fn new(elements: Vec<T>, measure: Arc<dyn Measure<T>>) -> Result<Self> {
    Ok(Self {
      base: EmbedderBase::new(elements, measure)?,
      saved: None,
    })
  }

  /// An embedder with landmarks enabled at the given count.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if the element array is
  /// empty or the landmark count is out of range.
  pub fn with_landmarks(
    elements: Vec<T>,
    measure: Arc<dyn Measure<T>>,
    landmarks: usize,
  ) -> Result<Self> {
    let mut embedder = Self::new(elements, measure)?;
    embedder.set_landmark_count(landmarks)?;
    embedder.use_landmarks(true);
    Ok(embedder)
  }

  /// The configured landmark count (used only while landmarks are enabled).
  pub fn landmark_count(&self) -> usize {
    self.base.landmark_count()
  }

  /// Change the landmark count.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if the count is below 2
  /// or above the element count.
  pub fn set_landmark_count(&mut self, landmarks: usize) -> Result<()> {
    self.base.set_landmark_count(landmarks)
  }

  /// Switch between classical MDS (false) and landmark MDS (true).
  pub fn use_landmarks(&mut self, use_landmarks: bool) {
    self.base.use_landmarks(use_landmarks);
  }

  /// Embed all elements into `dimension`-dimensional euclidean space.
  ///
  /// The result is dimension-major in input element order:
  /// `result[(i, v)]` is the i-th coordinate of element v.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if the dimension is 0 or
  /// exceeds what the distance matrix supports.
  pub fn embed(&mut self, dimension: usize) -> Result<Array2<f64>> {
    let started = Instant::now();
    let starting_points = self.base.starting_points();
    self.ensure_distances(starting_points);
    let saved = self.saved.as_ref().unwrap();

    let embedding = self
      .base
      .embed_distances(saved.slice(s![.., ..starting_points]), dimension)?;
    let embedding = self.base.unshuffle(embedding);

    info!(
      duration_ms = started.elapsed().as_millis() as u64,
      elements = self.base.len(),
      dimension,
      "direct embedding complete"
    );
    Ok(embedding)
  }

  /// Embedding quality at the given dimension: the residual variance
  /// between the direct distances and their euclidean counterparts in the
  /// embedding. 0 is perfect, 1 is uncorrelated.
  ///
  /// # Errors
  ///
  /// Same conditions as [`DirectEmbedder::embed`].
  pub fn embedding_quality(&mut self, dimension: usize) -> Result<f64> {
    let starting_points = self.base.starting_points();
    self.ensure_distances(starting_points);
    let saved = self.saved.as_ref().unwrap();
    let distances = saved.slice(s![.., ..starting_points]);

    let embedding = self.base.embed_distances(distances, dimension)?;
    Ok(correlation::embedding_quality(distances, embedding.view()))
  }

  /// Make sure the cached distance matrix covers `starting_points` columns,
  /// computing only the missing ones.
  ///
  /// New entries strictly below the diagonal are measured in parallel per
  /// row; the upper triangle of the leading square block follows by
  /// symmetry, and the diagonal stays 0.
  fn ensure_distances(&mut self, starting_points: usize) {
    let precalculated = self.saved.as_ref().map_or(0, |m| m.ncols());
    if precalculated >= starting_points {
      return;
    }
    let n = self.base.len();
    let elements = &self.base.elements;
    let measure = &self.base.measure;
    let saved = self.saved.as_ref();

    let rows: Vec<Vec<f64>> = (0..n)
      .into_par_iter()
      .map(|i| {
        let mut row = vec![0.0f64; starting_points];
        if let Some(saved) = saved {
          let keep = precalculated.min(i);
          for j in 0..keep {
            row[j] = saved[(i, j)];
          }
        }
        for j in precalculated..starting_points.min(i) {
          row[j] = measure.distance(&elements[i], &elements[j]);
        }
        row
      })
      .collect();

    let mut distances = Array2::zeros((n, starting_points));
    for (i, row) in rows.into_iter().enumerate() {
      for (j, value) in row.into_iter().enumerate() {
        distances[(i, j)] = value;
      }
    }
    for i in 0..starting_points {
      for j in i + 1..starting_points {
        distances[(i, j)] = distances[(j, i)];
      }
    }
    self.saved = Some(distances);
  }
}
