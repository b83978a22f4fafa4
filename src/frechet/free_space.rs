use crate::polyline::Polyline;

/// A closed sub-interval of [0, 1] in the local coordinates of a line
/// segment, or `None` when no point of the segment qualifies.
pub type FreeInterval = Option<[f64; 2]>;

/// The section of a line segment lying within `distance` of a center vertex.
///
/// The center is vertex `center_index` of `p`; the segment runs from vertex
/// `segment_index` of `q` to the next one. The interval is expressed in local
/// segment coordinates (0 at the segment start, 1 at its end), obtained by
/// solving `‖c − (a + t·(b − a))‖ = distance` for `t` analytically and
/// clipping the root interval to [0, 1].
///
/// # Panics
///
/// Panics if the polylines have different dimensions or an index is out of
/// range.
pub fn free_interval(
  p: &Polyline,
  center_index: usize,
  q: &Polyline,
  segment_index: usize,
  distance: f64,
) -> FreeInterval {
  assert_eq!(
    p.dimension(),
    q.dimension(),
    "cannot compare polylines of different dimension"
  );

  let a = q.point(segment_index);
  let b = q.point(segment_index + 1);
  let c = p.point(center_index);

  // The quadratic in t is assembled from three recurring dot-product terms.
  let mut tmp0 = 0.0;
  let mut tmp1 = 0.0;
  let mut tmp2 = 0.0;
  for i in 0..a.len() {
    tmp0 += b[i] * c[i] + a[i] * a[i] - a[i] * c[i] - a[i] * b[i];
    tmp1 += a[i] * a[i] + b[i] * b[i] - 2.0 * a[i] * b[i];
    tmp2 += c[i] * c[i] + a[i] * a[i] - 2.0 * a[i] * c[i];
  }

  tmp0 *= 2.0;
  tmp1 *= 2.0;
  let discriminant = tmp0 * tmp0 - 2.0 * tmp1 * (tmp2 - distance * distance);

  if discriminant < 0.0 {
    // The segment's supporting line stays outside the ball entirely.
    return None;
  }
  let root = discriminant.sqrt();

  let mut t0 = (tmp0 - root) / tmp1;
  let mut t1 = (tmp0 + root) / tmp1;

  if t0 > 1.0 || t1 < 0.0 {
    // The line intersects the ball, but outside the actual segment.
    return None;
  }

  t0 = t0.max(0.0);
  t1 = t1.min(1.0);
  Some([t0, t1])
}

/// A lazily evaluated cell of the free-space diagram, used by the
/// path-searching decision procedure.
///
/// Besides its grid position and the free intervals on its right and top
/// edges, a cell carries a signed `restriction`: the tightest monotonicity
/// constraint inherited from the path that reached it. A positive value r
/// means any exit to the right must happen at segment parameter ≥ r; a
/// negative value constrains exits to the top at parameter ≥ −r; zero means
/// unconstrained (the cell was entered through its corner or from both
/// directions).
#[derive(Debug, Clone)]
pub(crate) struct ReachableCell {
  pub i: usize,
  pub j: usize,
  pub restriction: f64,
  pub right: FreeInterval,
  pub top: FreeInterval,
  /// Distance the intervals were computed at, so a revisited cell is not
  /// recomputed for the same decision radius.
  computed_for: Option<f64>,
}

impl ReachableCell {
  pub fn new(i: usize, j: usize) -> Self {
    Self {
      i,
      j,
      restriction: 0.0,
      right: None,
      top: None,
      computed_for: None,
    }
  }

  /// Compute the free intervals on the right and top edges of this cell for
  /// the given decision distance. A no-op if they were already computed for
  /// the same distance.
  pub fn compute_free_space(&mut self, p: &Polyline, q: &Polyline, distance: f64) {
    if self.computed_for != Some(distance) {
      self.right = free_interval(p, self.i + 1, q, self.j, distance);
      self.top = free_interval(q, self.j + 1, p, self.i, distance);
      self.computed_for = Some(distance);
    }
  }

  fn is_right_free(&self, p_len: usize) -> bool {
    self.i < p_len - 2 && self.right.is_some()
  }

  fn is_top_free(&self, q_len: usize) -> bool {
    self.j < q_len - 2 && self.top.is_some()
  }

  /// Can the cell to the right be entered, honoring the restriction?
  pub fn is_right_reachable(&self, p_len: usize) -> bool {
    self.is_right_free(p_len) && self.right.unwrap()[1] >= self.restriction
  }

  /// Can the cell above be entered, honoring the restriction?
  pub fn is_top_reachable(&self, q_len: usize) -> bool {
    self.is_top_free(q_len) && self.top.unwrap()[1] >= -self.restriction
  }

  /// Can the diagonal cell be entered? Requires the top-right corner of this
  /// cell to lie in free space, in which case the restriction resets.
  pub fn is_diagonal_reachable(&self, p_len: usize, q_len: usize) -> bool {
    self.is_right_free(p_len)
      && self.is_top_free(q_len)
      && self.right.unwrap()[1] == 1.0
      && self.top.unwrap()[1] == 1.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn polyline(vertices: &[[f64; 2]]) -> Polyline {
    Polyline::new(vertices.iter().map(|v| v.to_vec()).collect()).unwrap()
  }

  #[test]
  fn interval_clips_to_segment() {
    let a = polyline(&[[0.0, 0.0], [1.0, 1.0]]);
    let b = polyline(&[[0.0, 1.0], [1.0, 0.0]]);
    let c = polyline(&[[0.0, 1.0], [1.0, 1.0]]);
    let d = polyline(&[[1.0, 0.0], [0.0, 0.5]]);
    let e = polyline(&[[5.0, 2.0], [-4.0, -4.0]]);

    let interval = free_interval(&a, 0, &b, 0, 0.82462).unwrap();
    assert!((interval[0] - 0.2).abs() < 1e-4);
    assert!((interval[1] - 0.8).abs() < 1e-4);

    let interval = free_interval(&a, 0, &c, 0, 1.11803).unwrap();
    assert!((interval[0] - 0.0).abs() < 1e-4);
    assert!((interval[1] - 0.5).abs() < 1e-4);

    let interval = free_interval(&a, 0, &d, 0, 0.55902).unwrap();
    assert!((interval[0] - 0.5).abs() < 1e-4);
    assert!((interval[1] - 1.0).abs() < 1e-4);

    let interval = free_interval(&a, 0, &e, 0, 6.0).unwrap();
    assert!((interval[0] - 0.0).abs() < 1e-4);
    assert!((interval[1] - 1.0).abs() < 1e-4);
  }

  #[test]
  fn interval_is_empty_when_segment_stays_outside() {
    let a = polyline(&[[0.0, 0.0], [1.0, 1.0]]);
    let b = polyline(&[[0.0, 1.0], [1.0, 0.0]]);
    let f = polyline(&[[1.0, 0.5], [2.0, 0.5]]);
    let g = polyline(&[[2.0, 0.5], [1.0, 0.5]]);

    assert!(free_interval(&a, 0, &b, 0, 0.5).is_none());
    assert!(free_interval(&a, 0, &f, 0, 1.0).is_none());
    assert!(free_interval(&a, 0, &g, 0, 1.0).is_none());
  }

  /// Traversing the segment from the opposite end mirrors the interval.
  #[test]
  fn interval_mirrors_under_segment_reversal() {
    let center = polyline(&[[0.3, -0.2], [1.0, 1.0]]);
    let forward = polyline(&[[-0.5, 0.9], [1.2, 0.1]]);
    let backward = polyline(&[[1.2, 0.1], [-0.5, 0.9]]);

    for distance in [0.4, 0.7, 1.0, 1.4] {
      match (
        free_interval(&center, 0, &forward, 0, distance),
        free_interval(&center, 0, &backward, 0, distance),
      ) {
        (None, None) => {}
        (Some(f), Some(b)) => {
          assert!((f[0] - (1.0 - b[1])).abs() < 1e-12);
          assert!((f[1] - (1.0 - b[0])).abs() < 1e-12);
        }
        (f, b) => panic!("asymmetric intervals at {distance}: {f:?} vs {b:?}"),
      }
    }
  }

  #[test]
  #[should_panic(expected = "different dimension")]
  fn interval_rejects_dimension_mismatch() {
    let one_dimensional = Polyline::new(vec![vec![0.0], vec![1.0]]).unwrap();
    let a = polyline(&[[0.0, 0.0], [1.0, 1.0]]);
    free_interval(&one_dimensional, 0, &a, 0, 1.0);
  }

  #[test]
  fn reachability_honors_restriction() {
    let a = polyline(&[[0.0, 0.0], [1.0, 1.0]]);
    let b = polyline(&[[0.0, 1.0], [1.0, 0.0]]);
    let c = polyline(&[
      [-5.0, 3.0],
      [0.0, 0.0],
      [1.0, 1.0],
      [-5.0, 3.0],
      [5.0, 3.0],
    ]);
    let d = polyline(&[
      [3.0, 6.0],
      [-5.0, 3.0],
      [0.0, 1.0],
      [1.0, 0.0],
      [2.0, 0.0],
    ]);

    let mut cell = ReachableCell::new(0, 0);
    cell.compute_free_space(&a, &b, 0.8);
    assert!(!cell.is_right_reachable(a.len()));
    assert!(!cell.is_top_reachable(b.len()));
    assert!(!cell.is_diagonal_reachable(a.len(), b.len()));

    let mut cell = ReachableCell::new(1, 2);
    cell.compute_free_space(&c, &d, 0.8);
    assert!(cell.is_right_reachable(c.len()));
    assert!(cell.is_top_reachable(d.len()));
    assert!(!cell.is_diagonal_reachable(c.len(), d.len()));

    cell.restriction = 0.9;
    assert!(!cell.is_right_reachable(c.len()));
    assert!(cell.is_top_reachable(d.len()));

    cell.restriction = -0.9;
    assert!(cell.is_right_reachable(c.len()));
    assert!(!cell.is_top_reachable(d.len()));

    cell.restriction = -0.5;
    assert!(cell.is_top_reachable(d.len()));

    cell.restriction = 0.0;
    cell.compute_free_space(&c, &d, 1.2);
    assert!(cell.is_diagonal_reachable(c.len(), d.len()));

    cell.compute_free_space(&c, &d, 0.5);
    assert!(!cell.is_right_reachable(c.len()));
    assert!(!cell.is_top_reachable(d.len()));
    assert!(!cell.is_diagonal_reachable(c.len(), d.len()));
  }
}
