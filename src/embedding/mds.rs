use crate::error::Error;
use crate::error::Result;
use nalgebra::DMatrix;
use nalgebra::SymmetricEigen;
use ndarray::s;
use ndarray::Array2;
use ndarray::ArrayView2;

/// Eigenvalues below this are treated as degenerate in landmark MDS: the
/// barycentric projection divides by the eigenvalue, and near-zero values
/// would blow up a dimension that contributes almost nothing anyway. The
/// affected output coordinates stay 0 for non-landmark rows.
const MIN_PROJECTION_EIGENVALUE: f64 = 0.01;

/// Classical multidimensional scaling.
///
/// Takes a symmetric nonnegative n×n distance matrix with zero diagonal and
/// produces coordinates in `dimensions`-dimensional euclidean space whose
/// pairwise distances approximate the input. The coordinates are returned
/// dimension-major: `result[(i, v)]` is the i-th coordinate of element v.
///
/// The embedding is found by eigendecomposing the double-centered squared
/// distance matrix; each output dimension is an eigenvector scaled by the
/// square root of its (clamped-nonnegative) eigenvalue. The sign of every
/// dimension is arbitrary.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the matrix is not square, has negative
/// entries or a non-zero diagonal, or if `dimensions` exceeds the matrix
/// size.
pub fn classical(distances: ArrayView2<'_, f64>, dimensions: usize) -> Result<Array2<f64>> {
  check_input(distances, dimensions)?;
  if distances.nrows() != distances.ncols() {
    return Err(Error::invalid(format!(
      "classical MDS needs a square distance matrix, got {}x{}",
      distances.nrows(),
      distances.ncols()
    )));
  }

  let n = distances.nrows();
  let squared = distances.mapv(|d| d * d);

  // Double centering: B = -1/2 * J * D² * J with J = I - 11ᵀ/n.
  let row_means: Vec<f64> = (0..n).map(|i| squared.row(i).mean().unwrap()).collect();
  let column_means: Vec<f64> = (0..n).map(|j| squared.column(j).mean().unwrap()).collect();
  let grand_mean = squared.mean().unwrap();

  let gram = DMatrix::from_fn(n, n, |i, j| {
    -0.5 * (squared[(i, j)] - row_means[i] - column_means[j] + grand_mean)
  });

  let eigen = SymmetricEigen::new(gram);
  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

  let mut coordinates = Array2::zeros((dimensions, n));
  for (i, &e) in order.iter().take(dimensions).enumerate() {
    let eigenvalue = eigen.eigenvalues[e].max(0.0);
    let scale = eigenvalue.sqrt();
    for v in 0..n {
      coordinates[(i, v)] = scale * eigen.eigenvectors[(v, e)];
    }
  }
  Ok(coordinates)
}

/// Landmark multidimensional scaling.
///
/// Takes a rectangular n×L matrix of distances from every element to the
/// first L elements (the landmarks; n ≥ L) and embeds all n elements using a
/// classical MDS of the landmark block plus a barycentric projection of the
/// remaining rows. Returned dimension-major like [`classical`].
///
/// Dimensions whose landmark eigenvalue falls below 0.01 are skipped as
/// numerically degenerate: their non-landmark coordinates stay 0, and the
/// landmark coordinates are copied through unchanged. This is a diagnostic
/// condition, not an error: such a dimension barely contributes to the
/// embedding.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the matrix is wider than high, has
/// negative entries or a non-zero landmark diagonal, or if `dimensions`
/// exceeds the landmark count.
pub fn landmark(distances: ArrayView2<'_, f64>, dimensions: usize) -> Result<Array2<f64>> {
  check_input(distances, dimensions)?;

  let landmarks = distances.ncols();
  let total = distances.nrows();

  let landmark_embedding = classical(distances.slice(s![..landmarks, ..]), dimensions)?;

  let mut squared = distances.mapv(|d| d * d);

  // Center the non-landmark rows on the landmark column means.
  for i in 0..landmarks {
    let mean = squared.slice(s![..landmarks, i]).mean().unwrap();
    for j in landmarks..total {
      squared[(j, i)] -= mean;
    }
  }

  let mut embedding = Array2::zeros((dimensions, total));
  for i in 0..dimensions {
    // The eigenvalue of the landmark MDS dimension is recoverable as the
    // squared norm of its coordinate row.
    let eigenvalue: f64 = (0..landmarks)
      .map(|j| landmark_embedding[(i, j)] * landmark_embedding[(i, j)])
      .sum();

    if eigenvalue >= MIN_PROJECTION_EIGENVALUE {
      for j in 0..landmarks {
        let transformation = landmark_embedding[(i, j)] / eigenvalue;
        for v in landmarks..total {
          embedding[(i, v)] -= 0.5 * transformation * squared[(v, j)];
        }
      }
    }
    for j in 0..landmarks {
      embedding[(i, j)] = landmark_embedding[(i, j)];
    }
  }
  Ok(embedding)
}

/// Shared validation for both MDS variants: the matrix must be at least as
/// high as wide, nonnegative, zero on the (landmark) diagonal, and large
/// enough for the requested dimension count.
fn check_input(distances: ArrayView2<'_, f64>, dimensions: usize) -> Result<()> {
  if dimensions > distances.nrows() {
    return Err(Error::invalid(format!(
      "embedding dimension {} cannot exceed the distance matrix size {}",
      dimensions,
      distances.nrows()
    )));
  }
  if distances.nrows() < distances.ncols() {
    return Err(Error::invalid(format!(
      "distance matrix cannot be wider than high, got {}x{}",
      distances.nrows(),
      distances.ncols()
    )));
  }
  for i in 0..distances.ncols() {
    if distances[(i, i)] != 0.0 {
      return Err(Error::invalid(format!(
        "the distance from an element to itself must be 0, got {} at {}",
        distances[(i, i)],
        i
      )));
    }
  }
  if distances.iter().any(|&d| d < 0.0) {
    return Err(Error::invalid("distance matrix entries must be nonnegative"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::measure::euclidean_distance;
  use ndarray::arr2;
  use rand::Rng;

  fn embedding_distance(embedding: &Array2<f64>, a: usize, b: usize) -> f64 {
    let mut sum = 0.0;
    for i in 0..embedding.nrows() {
      let diff = embedding[(i, a)] - embedding[(i, b)];
      sum += diff * diff;
    }
    sum.sqrt()
  }

  #[test]
  fn classical_recovers_collinear_points() {
    let distances = arr2(&[
      [0.0, 6.0, 7.0, 9.0],
      [6.0, 0.0, 1.0, 3.0],
      [7.0, 1.0, 0.0, 2.0],
      [9.0, 3.0, 2.0, 0.0],
    ]);
    let embedding = classical(distances.view(), 1).unwrap();
    for i in 0..4 {
      for j in 0..4 {
        assert!(
          (distances[(i, j)] - (embedding[(0, i)] - embedding[(0, j)]).abs()).abs() < 1e-4
        );
      }
    }
  }

  #[test]
  fn classical_recovers_random_euclidean_clouds() {
    let mut rng = rand::rng();
    for dimension in [1usize, 3, 5, 15] {
      let points = dimension + 1 + rng.random_range(0..5 * dimension);
      let coordinates: Vec<Vec<f64>> = (0..points)
        .map(|_| (0..dimension).map(|_| rng.random::<f64>()).collect())
        .collect();

      let mut distances = Array2::zeros((points, points));
      for i in 0..points {
        for j in 0..i {
          let d = euclidean_distance(&coordinates[i], &coordinates[j]);
          distances[(i, j)] = d;
          distances[(j, i)] = d;
        }
      }

      let embedding = classical(distances.view(), dimension).unwrap();
      for i in 0..points {
        for j in 0..points {
          assert!(
            (distances[(i, j)] - embedding_distance(&embedding, i, j)).abs() < 1e-4,
            "dimension {dimension}: pair ({i}, {j}) not preserved"
          );
        }
      }
    }
  }

  #[test]
  fn landmark_recovers_rectangular_distances() {
    let mut rng = rand::rng();
    let dimension = 5;
    let landmarks = 15;
    for scale in [1usize, 3, 5, 15] {
      let points = scale * 20;
      let coordinates: Vec<Vec<f64>> = (0..points)
        .map(|_| (0..dimension).map(|_| rng.random::<f64>()).collect())
        .collect();

      let mut distances = Array2::zeros((points, landmarks));
      for i in 0..points {
        for j in 0..landmarks {
          distances[(i, j)] = euclidean_distance(&coordinates[i], &coordinates[j]);
        }
      }

      let embedding = landmark(distances.view(), dimension).unwrap();
      for i in 0..points {
        for j in 0..landmarks {
          assert!(
            (distances[(i, j)] - embedding_distance(&embedding, i, j)).abs() < 1e-4,
            "scale {scale}: pair ({i}, {j}) not preserved"
          );
        }
      }
    }
  }

  #[test]
  fn invalid_inputs_are_rejected() {
    let asymmetric_diagonal = arr2(&[[0.0, 1.0, 2.0], [1.0, 5.0, 3.0], [2.0, 3.0, 0.0]]);
    assert!(classical(asymmetric_diagonal.view(), 1).is_err());

    let negative = arr2(&[[0.0, 1.0, 2.0], [1.0, 0.0, -3.0], [2.0, -3.0, 0.0]]);
    assert!(classical(negative.view(), 1).is_err());

    let rectangular = arr2(&[[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0], [4.0, 5.0, 6.0]]);
    assert!(classical(rectangular.view(), 1).is_err());

    let wide = arr2(&[[0.0, 1.0, 2.0], [1.0, 0.0, 3.0]]);
    assert!(classical(wide.view(), 1).is_err());
    assert!(landmark(wide.view(), 1).is_err());

    let square = arr2(&[[0.0, 1.0], [1.0, 0.0]]);
    assert!(classical(square.view(), 5).is_err());
    assert!(classical(square.view(), 2).is_ok());
  }
}
