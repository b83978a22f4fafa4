use crate::graph::adjacency::AdjacencyList;
use crate::graph::fibonacci_heap::FibonacciHeap;
use ndarray::Array2;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use std::time::Instant;
use tracing::debug;

/// Shortest path lengths from the first `starting_points` vertices to every
/// vertex, via Dijkstra's algorithm run independently (and in parallel) per
/// source.
///
/// The result has one row per vertex and one column per source:
/// `result[(v, s)]` is the length of the shortest path from source `s` to
/// vertex `v`, or `f64::INFINITY` if no path exists. Since the graph is
/// undirected, the leading square block of the matrix is symmetric.
///
/// The per-source work uses a [`FibonacciHeap`] holding every vertex, with
/// decrease-key on each relaxation; sources are data-parallel and the
/// scheduling has a high constant, so prefer [`floyd_warshall`] for small
/// dense problems.
pub fn dijkstra(adjacency: &AdjacencyList, starting_points: usize) -> Array2<f64> {
  let n = adjacency.len();
  let started = Instant::now();

  let columns: Vec<Vec<f64>> = (0..starting_points)
    .into_par_iter()
    .map(|source| single_source(adjacency, source))
    .collect();

  let mut distances = Array2::zeros((n, starting_points));
  for (source, column) in columns.into_iter().enumerate() {
    for (vertex, distance) in column.into_iter().enumerate() {
      distances[(vertex, source)] = distance;
    }
  }

  debug!(
    duration_ms = started.elapsed().as_millis() as u64,
    vertices = n,
    sources = starting_points,
    "dijkstra shortest paths complete"
  );
  distances
}

/// Dijkstra from one source over the whole graph.
fn single_source(adjacency: &AdjacencyList, source: usize) -> Vec<f64> {
  let n = adjacency.len();
  let mut distances = vec![f64::INFINITY; n];
  distances[source] = 0.0;

  let mut unsettled = FibonacciHeap::with_capacity(n);
  let mut settled = vec![false; n];
  let handles: Vec<_> = (0..n)
    .map(|vertex| unsettled.enqueue(vertex, distances[vertex]))
    .collect();

  while let Some((current, _)) = unsettled.dequeue_min() {
    settled[current] = true;
    for neighbor in adjacency.neighbors(current) {
      if settled[neighbor] {
        continue;
      }
      let alternative = distances[current] + adjacency.distance(current, neighbor);
      if distances[neighbor] > alternative {
        unsettled.decrease_key(handles[neighbor], alternative);
        distances[neighbor] = alternative;
      }
    }
  }
  distances
}

/// All-pairs shortest path lengths via the Floyd–Warshall algorithm.
///
/// Cubic in the vertex count but with a very small constant; the right
/// choice for graphs of a few hundred vertices when all sources are needed.
/// The result is the full symmetric n×n matrix with `f64::INFINITY` for
/// disconnected pairs.
pub fn floyd_warshall(adjacency: &AdjacencyList) -> Array2<f64> {
  let n = adjacency.len();
  let started = Instant::now();
  let mut distances = adjacency.to_matrix();

  for k in 0..n {
    for i in 0..n {
      for j in 0..n {
        let repath = distances[(i, k)] + distances[(k, j)];
        if distances[(i, j)] > repath {
          distances[(i, j)] = repath;
        }
      }
    }
  }

  debug!(
    duration_ms = started.elapsed().as_millis() as u64,
    vertices = n,
    "floyd-warshall shortest paths complete"
  );
  distances
}
