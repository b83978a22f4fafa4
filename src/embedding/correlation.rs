use ndarray::Array2;
use ndarray::ArrayView2;

/// Euclidean distances between embedding vectors.
///
/// `embedding` is dimension-major (`embedding[(d, v)]`). Only the distances
/// from the first `required_width` vectors to all others are computed,
/// mirroring the shape of a (possibly rectangular) required-distance matrix:
/// the result has one row per element and `required_width` columns, with the
/// leading square block filled symmetrically.
pub fn embedding_distances(
  embedding: ArrayView2<'_, f64>,
  required_width: usize,
) -> Array2<f64> {
  let total = embedding.ncols();
  let dimensions = embedding.nrows();
  let mut distances = Array2::zeros((total, required_width));

  let distance = |a: usize, b: usize| {
    let mut sum = 0.0;
    for d in 0..dimensions {
      let diff = embedding[(d, a)] - embedding[(d, b)];
      sum += diff * diff;
    }
    sum.sqrt()
  };

  for i in 0..required_width {
    for j in 0..i {
      let d = distance(i, j);
      distances[(i, j)] = d;
      distances[(j, i)] = d;
    }
    for j in required_width..total {
      distances[(j, i)] = distance(i, j);
    }
  }
  distances
}

/// Residual variance `1 − r²` of two equally-shaped matrices, where `r` is
/// the Pearson correlation of their flattened entries. 0 means perfectly
/// (linearly) related, 1 means uncorrelated.
///
/// # Panics
///
/// Panics if the matrices differ in shape.
pub fn residual_variance(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> f64 {
  assert_eq!(a.shape(), b.shape(), "matrices must have equal shapes");

  let mean_a = a.mean().unwrap();
  let mean_b = b.mean().unwrap();

  let mut covariance = 0.0;
  let mut variance_a = 0.0;
  let mut variance_b = 0.0;
  for (&x, &y) in a.iter().zip(b.iter()) {
    covariance += (x - mean_a) * (y - mean_b);
    variance_a += (x - mean_a) * (x - mean_a);
    variance_b += (y - mean_b) * (y - mean_b);
  }

  let r = covariance / (variance_a * variance_b).sqrt();
  1.0 - r * r
}

/// Embedding quality against a required-distance matrix: the residual
/// variance between the given distances and the corresponding euclidean
/// distances within the embedding. 0 is a perfect embedding.
pub fn embedding_quality(distances: ArrayView2<'_, f64>, embedding: ArrayView2<'_, f64>) -> f64 {
  let within = embedding_distances(embedding, distances.ncols());
  residual_variance(distances, within.view())
}
