use crate::error::Result;
use crate::graph::adjacency::AdjacencyList;
use crate::measure::Measure;
use itertools::Itertools;
use std::time::Instant;
use tracing::info;

/// A candidate connection between two components: the closest vertex pair
/// found across them and its distance.
#[derive(Debug, Clone, Copy)]
struct CrossEdge {
  component_a: usize,
  component_b: usize,
  distance: f64,
  vertex_a: usize,
  vertex_b: usize,
}

/// The connected components of a graph, largest first.
///
/// Components are identified once at construction by iterative depth-first
/// search; a graph mutated afterwards needs a fresh instance. The main use
/// is [`ConnectedComponents::connect`], which stitches a fragmented
/// neighborhood graph into a single component so geodesic distances become
/// finite everywhere.
#[derive(Debug)]
pub struct ConnectedComponents {
  components: Vec<Vec<usize>>,
}

impl ConnectedComponents {
  /// Identify the connected components of `graph`, sorted by size
  /// descending.
  pub fn find(graph: &AdjacencyList) -> Self {
    let n = graph.len();
    let mut numbering = vec![0usize; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut component_number = 0;

    for start in 0..n {
      if numbering[start] != 0 {
        continue;
      }
      component_number += 1;
      let mut current = Vec::new();
      let mut stack = vec![start];
      numbering[start] = component_number;
      while let Some(vertex) = stack.pop() {
        current.push(vertex);
        for neighbor in graph.neighbors(vertex) {
          if numbering[neighbor] == 0 {
            numbering[neighbor] = component_number;
            stack.push(neighbor);
          }
        }
      }
      components.push(current);
    }

    components.sort_by_key(|component| std::cmp::Reverse(component.len()));
    Self { components }
  }

  /// The components, largest first.
  pub fn components(&self) -> &[Vec<usize>] {
    &self.components
  }

  /// The vertices of the largest component.
  pub fn main_component(&self) -> &[usize] {
    &self.components[0]
  }

  /// Whether the graph consists of a single component.
  pub fn is_connected(&self) -> bool {
    self.components.len() == 1
  }

  /// Connect all components of `graph` into one.
  ///
  /// For every pair of components the closest cross-component vertex pair is
  /// located, using the capped measure with the running best distance as the
  /// cap so hopeless candidates abort early. The candidate edges then form a
  /// minimum spanning tree over the component graph (Kruskal), and each
  /// selected edge is inserted into `graph`. Not asymptotically optimal;
  /// a neighborhood graph rarely fragments into many components.
  ///
  /// Afterwards this instance reports a single component.
  ///
  /// # Errors
  ///
  /// Propagates [`crate::error::Error::InvalidInput`] if the measure
  /// produces a negative distance.
  pub fn connect<M>(&mut self, graph: &mut AdjacencyList, measure: &M) -> Result<()>
  where
    M: Measure<usize> + ?Sized,
  {
    if self.is_connected() {
      return Ok(());
    }
    let started = Instant::now();
    let component_count = self.components.len();

    let mut edges = self.shortest_component_connections(measure);
    edges.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    // Kruskal over the component graph, tracking membership through a plain
    // renumbering array.
    let mut component_numbers: Vec<usize> = (0..self.components.len()).collect();
    let mut added = 0usize;
    for edge in edges {
      let old_number = component_numbers[edge.component_b];
      let new_number = component_numbers[edge.component_a];
      if old_number == new_number {
        continue;
      }
      graph.add_edge(edge.vertex_a, edge.vertex_b, edge.distance)?;
      added += 1;
      for number in component_numbers.iter_mut() {
        if *number == old_number {
          *number = new_number;
        }
      }
    }

    self.components = vec![(0..graph.len()).collect()];

    info!(
      duration_ms = started.elapsed().as_millis() as u64,
      components = component_count,
      edges_added = added,
      "connected graph components"
    );
    Ok(())
  }

  /// The closest vertex pair and distance for every pair of components.
  fn shortest_component_connections<M>(&self, measure: &M) -> Vec<CrossEdge>
  where
    M: Measure<usize> + ?Sized,
  {
    let mut edges = Vec::new();
    for (component_a, component_b) in (0..self.components.len()).tuple_combinations() {
      let mut best_distance = f64::INFINITY;
      let mut best_pair = (0, 0);
      for &a in &self.components[component_a] {
        for &b in &self.components[component_b] {
          let distance = measure.distance_capped(&a, &b, best_distance);
          if distance < best_distance {
            best_distance = distance;
            best_pair = (a, b);
          }
        }
      }
      edges.push(CrossEdge {
        component_a,
        component_b,
        distance: best_distance,
        vertex_a: best_pair.0,
        vertex_b: best_pair.1,
      });
    }
    edges
  }
}
