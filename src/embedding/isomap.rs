use crate::embedding::correlation;
use crate::embedding::EmbedderBase;
use crate::error::Result;
use crate::graph::adjacency::AdjacencyList;
use crate::graph::components::ConnectedComponents;
use crate::graph::shortest_paths;
use crate::knn::NearestNeighbors;
use crate::knn::NnDescent;
use crate::measure::Measure;
use ndarray::Array2;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Vertex counts up to this use Floyd–Warshall for the geodesic matrix when
/// all elements are starting points; larger graphs (or landmark subsets)
/// run per-source Dijkstra instead.
const FLOYD_WARSHALL_CUTOFF: usize = 210;

/// An embedder that preserves geodesic distances along the k-nearest-
/// neighbor graph of the elements (the Isomap algorithm).
///
/// The neighborhood graph comes from [`NnDescent`]; a fragmented graph is
/// stitched together through its closest cross-component pairs before the
/// shortest-path stage, so every geodesic distance is finite.
///
/// Intermediate results are cached aggressively: the NN-descent state
/// survives k changes, and the geodesic matrix is reused as long as k and
/// the starting-point count stay put. Sweeping k downward and, for each k,
/// the landmark count downward reuses the most work:
///
/// ```ignore
/// for k in (k_min..=k_max).rev() {
///   isomap.set_nearest_neighbor_count(k)?;
///   for l in (l_min..=l_max).rev() {
///     isomap.set_landmark_count(l)?;
///     let coordinates = isomap.embed(dimension)?;
///   }
/// }
/// ```
pub struct Isomap<T> {
  base: EmbedderBase<T>,
  knn: NnDescent<T>,
  k: usize,
  geodesic: Option<Array2<f64>>,
}

impl<T: Send + Sync + 'static> Isomap<T> {
  /// An embedder over the given elements and measure with neighborhood
  /// size `k`, not using landmarks.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if the element array is
  /// empty or `k` is zero or not below the element count.
  pub fn new(elements: Vec<T>, measure: Arc<dyn Measure<T>>, k: usize) -> Result<Self> {
    let base = EmbedderBase::new(elements, measure)?;
    let knn = NnDescent::new(k, base.elements.clone(), base.measure.clone())?;
    Ok(Self {
      base,
      knn,
      k,
      geodesic: None,
    })
  }

  /// An embedder with landmarks enabled at the given count.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] under the conditions of
  /// [`Isomap::new`], or if the landmark count is out of range.
  pub fn with_landmarks(
    elements: Vec<T>,
    measure: Arc<dyn Measure<T>>,
    k: usize,
    landmarks: usize,
  ) -> Result<Self> {
    let mut isomap = Self::new(elements, measure, k)?;
    isomap.set_landmark_count(landmarks)?;
    isomap.use_landmarks(true);
    Ok(isomap)
  }

  /// The current neighborhood size.
  pub fn nearest_neighbor_count(&self) -> usize {
    self.k
  }

  /// Change the neighborhood size.
  ///
  /// Cached geodesic distances become stale and are dropped; the NN-descent
  /// state is kept, so the next embedding refines the previous neighborhoods
  /// instead of starting over.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if `k` is zero or not
  /// below the element count.
  pub fn set_nearest_neighbor_count(&mut self, k: usize) -> Result<()> {
    if k == self.k {
      return Ok(());
    }
    self.knn.set_neighborhood_size(k)?;
    self.k = k;
    self.geodesic = None;
    Ok(())
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
  /// exceeds what the geodesic matrix supports.
  pub fn embed(&mut self, dimension: usize) -> Result<Array2<f64>> {
    let started = Instant::now();
    self.ensure_geodesics()?;
    let geodesic = self.geodesic.as_ref().unwrap();

    let embedding = self.base.embed_distances(geodesic.view(), dimension)?;
    let embedding = self.base.unshuffle(embedding);

    info!(
      duration_ms = started.elapsed().as_millis() as u64,
      elements = self.base.len(),
      k = self.k,
      dimension,
      "isomap embedding complete"
    );
    Ok(embedding)
  }

  /// Embedding quality at the given dimension: the residual variance
  /// between the geodesic distances and their euclidean counterparts in the
  /// embedding. 0 is perfect, 1 is uncorrelated.
  ///
  /// # Errors
  ///
  /// Same conditions as [`Isomap::embed`].
  pub fn embedding_quality(&mut self, dimension: usize) -> Result<f64> {
    self.ensure_geodesics()?;
    let geodesic = self.geodesic.as_ref().unwrap();

    let embedding = self.base.embed_distances(geodesic.view(), dimension)?;
    Ok(correlation::embedding_quality(
      geodesic.view(),
      embedding.view(),
    ))
  }

  /// The geodesic distance matrix for the current parameters (one row per
  /// element, one column per starting point). Exposed for diagnostics.
  ///
  /// # Errors
  ///
  /// Propagates the graph-construction conditions of [`Isomap::embed`].
  pub fn geodesic_distances(&mut self) -> Result<&Array2<f64>> {
    self.ensure_geodesics()?;
    Ok(self.geodesic.as_ref().unwrap())
  }

  /// The current k-nearest-neighbor graph, before component stitching.
  /// Exposed for diagnostics; the internal NN-descent state is reused, so
  /// this is cheap after an embedding was computed.
  ///
  /// Vertices are in internal (shuffled) element order.
  ///
  /// # Errors
  ///
  /// Propagates graph-construction failures from the measure.
  pub fn nearest_neighbor_graph(&mut self) -> Result<AdjacencyList> {
    self.knn.nn_graph()
  }

  /// Build (or reuse) the geodesic distance matrix: k-NN graph, component
  /// stitching, then shortest paths from the starting points.
  fn ensure_geodesics(&mut self) -> Result<()> {
    let starting_points = self.base.starting_points();
    if let Some(geodesic) = &self.geodesic {
      if geodesic.ncols() == starting_points {
        return Ok(());
      }
    }

    let mut adjacency = self.knn.nn_graph()?;

    let elements = self.base.elements.clone();
    let measure = self.base.measure.clone();
    let index_measure = move |a: &usize, b: &usize, max: f64| {
      measure.distance_capped(&elements[*a], &elements[*b], max)
    };
    let mut components = ConnectedComponents::find(&adjacency);
    components.connect(&mut adjacency, &index_measure)?;

    let n = self.base.len();
    let geodesic = if n > FLOYD_WARSHALL_CUTOFF || starting_points < n {
      shortest_paths::dijkstra(&adjacency, starting_points)
    } else {
      shortest_paths::floyd_warshall(&adjacency)
    };
    self.geodesic = Some(geodesic);
    Ok(())
  }
}
