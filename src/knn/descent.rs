use crate::error::Result;
use crate::graph::adjacency::AdjacencyList;
use crate::knn::check_neighborhood_size;
use crate::knn::NearestNeighbors;
use crate::measure::Measure;
use dashmap::DashSet;
use rand::Rng;
use rayon::iter::IndexedParallelIterator;
use rayon::iter::IntoParallelIterator;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Instant;
use tracing::debug;
use tracing::info;

/// Fraction of the neighborhood used to drive each refinement round.
const SAMPLE_RATE: f64 = 0.9;

/// Refinement stops once an iteration changes at most this fraction of all
/// neighborhood slots.
const TERMINATION_QUOTA: f64 = 0.001;

/// One neighborhood candidate: a peer index, its distance, and whether it
/// joined the set since it was last sampled.
#[derive(Debug, Clone, Copy)]
struct Candidate {
  index: usize,
  weight: f64,
  fresh: bool,
}

/// The bounded candidate set of one vertex, ordered by distance (ties by
/// index).
///
/// Writes are linearizable behind the entry lock; [`NeighborSet::contains`]
/// reads the side membership set without taking it and may briefly lag a
/// concurrent insert, which the refinement loop tolerates. A stale read
/// only costs a redundant distance computation or skips one candidate until
/// the next round.
struct NeighborSet {
  entries: RwLock<Vec<Candidate>>,
  members: DashSet<usize>,
}

impl NeighborSet {
  fn new() -> Self {
    Self {
      entries: RwLock::new(Vec::new()),
      members: DashSet::new(),
    }
  }

  fn len(&self) -> usize {
    self.entries.read().unwrap().len()
  }

  /// Unlocked membership probe; may be stale within a refinement round.
  fn contains(&self, index: usize) -> bool {
    self.members.contains(&index)
  }

  /// Distance of the worst stored candidate, or infinity while the set is
  /// not full.
  fn worst_weight(&self, k: usize) -> f64 {
    let entries = self.entries.read().unwrap();
    if entries.len() < k {
      return f64::INFINITY;
    }
    entries.last().map_or(f64::INFINITY, |c| c.weight)
  }

  /// Insert a candidate if it is new and beats the current worst entry,
  /// evicting that entry when the set is full. Returns whether the set
  /// changed.
  fn try_insert(&self, index: usize, weight: f64, k: usize) -> bool {
    let mut entries = self.entries.write().unwrap();
    if self.members.contains(&index) {
      return false;
    }
    if entries.len() >= k {
      let worst = entries.last().unwrap();
      if weight >= worst.weight {
        return false;
      }
      let evicted = entries.pop().unwrap();
      self.members.remove(&evicted.index);
    }
    let position = entries.partition_point(|c| (c.weight, c.index) < (weight, index));
    entries.insert(
      position,
      Candidate {
        index,
        weight,
        fresh: true,
      },
    );
    self.members.insert(index);
    true
  }

  /// Split the set into its fresh and settled member indices, down-sample
  /// the fresh side to `sample_size`, and clear the fresh flag on the
  /// sampled entries.
  fn sample(&self, sample_size: usize, rng: &mut impl Rng) -> (Vec<usize>, Vec<usize>) {
    let mut entries = self.entries.write().unwrap();
    let fresh: Vec<usize> = entries
      .iter()
      .filter(|c| c.fresh)
      .map(|c| c.index)
      .collect();
    let settled: Vec<usize> = entries
      .iter()
      .filter(|c| !c.fresh)
      .map(|c| c.index)
      .collect();

    let sampled = random_sample(fresh, sample_size, rng);
    for candidate in entries.iter_mut() {
      if sampled.contains(&candidate.index) {
        candidate.fresh = false;
      }
    }
    (sampled, settled)
  }

  /// The k best candidates currently stored.
  fn best(&self, k: usize) -> Vec<(usize, f64)> {
    self
      .entries
      .read()
      .unwrap()
      .iter()
      .take(k)
      .map(|c| (c.index, c.weight))
      .collect()
  }
}

/// Approximate k-nearest-neighbor graph construction by NN-descent.
///
/// The neighborhoods start random and are refined by local joins: in every
/// round each vertex introduces its recently-changed neighbors to each
/// other (and to its settled ones), and any pair that turns out closer than
/// one of their current worst candidates replaces it. The process stops when
/// a round changes almost nothing.
///
/// The per-vertex state survives between calls. Rebuilding the graph for a
/// smaller k extracts the answer without any new distance computations;
/// growing k tops the candidate sets up with random entries and refines from
/// there instead of starting over.
///
/// The result is randomized: two runs return different (correctness-
/// equivalent) graphs. If the graph must be exact, use
/// [`BruteForceKnn`](crate::knn::BruteForceKnn).
pub struct NnDescent<T> {
  k: usize,
  nodes: Arc<Vec<T>>,
  measure: Arc<dyn Measure<T>>,
  neighborhood: Option<Vec<NeighborSet>>,
  updates: AtomicUsize,
}

impl<T: Send + Sync> NnDescent<T> {
  /// A builder over the given elements and measure.
  ///
  /// # Errors
  ///
  /// Returns [`crate::error::Error::InvalidInput`] if `k` is zero or not
  /// below the element count.
  pub fn new(k: usize, nodes: Arc<Vec<T>>, measure: Arc<dyn Measure<T>>) -> Result<Self> {
    check_neighborhood_size(k, nodes.len())?;
    Ok(Self {
      k,
      nodes,
      measure,
      neighborhood: None,
      updates: AtomicUsize::new(0),
    })
  }

  /// Initialize missing state, then run refinement rounds until the
  /// neighborhoods stop changing.
  fn refine(&mut self) {
    let n = self.nodes.len();
    let k = self.k;
    let sample_size = ((k as f64 * SAMPLE_RATE).ceil() as usize).max(1);
    let started = Instant::now();

    if self.neighborhood.is_none() {
      self.initialize();
    } else {
      self.top_up();
    }

    let this = &*self;
    let sets = this.neighborhood.as_ref().unwrap();
    let mut iterations = 0usize;

    loop {
      this.updates.store(0, Ordering::Relaxed);

      // Sampling: split every neighborhood into its fresh and settled
      // members. Vertices are independent here; only the own set is
      // touched.
      let samples: Vec<(Vec<usize>, Vec<usize>)> = (0..n)
        .into_par_iter()
        .map(|v| {
          let mut rng = rand::rng();
          sets[v].sample(sample_size, &mut rng)
        })
        .collect();
      let (fresh_sets, settled_sets): (Vec<_>, Vec<_>) = samples.into_iter().unzip();

      // Reverse direction: who sampled me?
      let mut fresh_reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
      let mut settled_reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
      for v in 0..n {
        for &u in &fresh_sets[v] {
          fresh_reverse[u].push(v);
        }
        for &u in &settled_sets[v] {
          settled_reverse[u].push(v);
        }
      }

      // Local joins. The candidate sets are augmented with reverse samples,
      // then every fresh-fresh and fresh-settled pair is tried against both
      // endpoint neighborhoods.
      (0..n).into_par_iter().for_each(|v| {
        let mut rng = rand::rng();
        let mut fresh = fresh_sets[v].clone();
        fresh.extend(random_sample(fresh_reverse[v].clone(), sample_size, &mut rng));
        fresh.sort_unstable();
        fresh.dedup();

        let mut settled = settled_sets[v].clone();
        settled.extend(random_sample(
          settled_reverse[v].clone(),
          sample_size,
          &mut rng,
        ));
        settled.sort_unstable();
        settled.dedup();

        for &u1 in &fresh {
          for &u2 in &fresh {
            if u2 >= u1 {
              break;
            }
            this.try_update(u1, u2);
          }
          for &u2 in &settled {
            if u2 == u1 {
              continue;
            }
            this.try_update(u1, u2);
          }
        }
      });

      iterations += 1;
      let updates = this.updates.load(Ordering::Relaxed);
      debug!(iterations, updates, "nn-descent round complete");
      if (updates as f64) <= TERMINATION_QUOTA * (n * k) as f64 {
        break;
      }
    }

    info!(
      duration_ms = started.elapsed().as_millis() as u64,
      elements = n,
      k,
      iterations,
      "nn-descent converged"
    );
  }

  /// Seed every neighborhood with k distinct random peers.
  fn initialize(&mut self) {
    let n = self.nodes.len();
    let k = self.k;
    let sets: Vec<NeighborSet> = (0..n).map(|_| NeighborSet::new()).collect();

    sets.par_iter().enumerate().for_each(|(v, set)| {
      let mut rng = rand::rng();
      let mut chosen: HashSet<usize> = HashSet::with_capacity(k);
      while chosen.len() < k {
        let candidate = rng.random_range(0..n);
        if candidate != v && chosen.insert(candidate) {
          let distance = self.measure.distance(&self.nodes[v], &self.nodes[candidate]);
          set.try_insert(candidate, distance, k);
        }
      }
    });

    self.neighborhood = Some(sets);
  }

  /// After k grew: fill every existing neighborhood up to the new k with
  /// random peers, keeping all current candidates.
  fn top_up(&mut self) {
    let n = self.nodes.len();
    let k = self.k;
    let sets = self.neighborhood.as_ref().unwrap();

    sets.par_iter().enumerate().for_each(|(v, set)| {
      let mut rng = rand::rng();
      while set.len() < k {
        let candidate = rng.random_range(0..n);
        if candidate != v && !set.contains(candidate) {
          let distance = self.measure.distance(&self.nodes[v], &self.nodes[candidate]);
          set.try_insert(candidate, distance, k);
        }
      }
    });
  }

  /// Try to place each of two elements into the other's neighborhood. The
  /// distance is computed capped at the larger of the two current worst
  /// weights, so pairs that cannot improve either set abort early.
  fn try_update(&self, u1: usize, u2: usize) {
    let sets = self.neighborhood.as_ref().unwrap();
    let missing_in_1 = !sets[u1].contains(u2);
    let missing_in_2 = !sets[u2].contains(u1);
    if !missing_in_1 && !missing_in_2 {
      return;
    }

    let mut cap = 0.0f64;
    if missing_in_1 {
      cap = sets[u1].worst_weight(self.k);
    }
    if missing_in_2 {
      cap = cap.max(sets[u2].worst_weight(self.k));
    }

    let distance = self
      .measure
      .distance_capped(&self.nodes[u1], &self.nodes[u2], cap);
    if distance.is_infinite() {
      return;
    }

    if missing_in_1 && sets[u1].try_insert(u2, distance, self.k) {
      self.updates.fetch_add(1, Ordering::Relaxed);
    }
    if missing_in_2 && sets[u2].try_insert(u1, distance, self.k) {
      self.updates.fetch_add(1, Ordering::Relaxed);
    }
  }

  /// Extract the current top-k neighborhoods as an undirected graph.
  fn adjacency(&self) -> Result<AdjacencyList> {
    let sets = self.neighborhood.as_ref().unwrap();
    let mut adjacency = AdjacencyList::new(self.nodes.len());
    for (v, set) in sets.iter().enumerate() {
      for (index, weight) in set.best(self.k) {
        adjacency.add_edge(v, index, weight)?;
      }
    }
    Ok(adjacency)
  }
}

impl<T: Send + Sync> NearestNeighbors for NnDescent<T> {
  fn neighborhood_size(&self) -> usize {
    self.k
  }

  fn set_neighborhood_size(&mut self, k: usize) -> Result<()> {
    check_neighborhood_size(k, self.nodes.len())?;
    self.k = k;
    Ok(())
  }

  fn nn_graph(&mut self) -> Result<AdjacencyList> {
    let ready = self
      .neighborhood
      .as_ref()
      .is_some_and(|sets| sets[0].len() >= self.k);
    if !ready {
      self.refine();
    }
    self.adjacency()
  }
}

/// Up to `samples` elements drawn without replacement, by partial
/// Fisher-Yates shuffle. Returns the input unchanged when it is small
/// enough.
fn random_sample(mut items: Vec<usize>, samples: usize, rng: &mut impl Rng) -> Vec<usize> {
  if samples >= items.len() {
    return items;
  }
  for i in 0..samples {
    let j = rng.random_range(i..items.len());
    items.swap(i, j);
  }
  items.truncate(samples);
  items
}
