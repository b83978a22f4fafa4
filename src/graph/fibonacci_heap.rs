/// A handle to an enqueued entry, used to decrease its priority later.
///
/// Handles are only meaningful for the heap that issued them and must not be
/// used after their entry was dequeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

struct Node<T> {
  value: Option<T>,
  priority: f64,
  parent: Option<usize>,
  child: Option<usize>,
  left: usize,
  right: usize,
  degree: usize,
  marked: bool,
}

/// A Fibonacci heap: a priority queue with amortized O(1) insertion and
/// decrease-key and amortized O(log n) minimum extraction.
///
/// This is the queue driving Dijkstra's algorithm, where decrease-key is the
/// hot operation. Nodes live in an arena indexed by [`Handle`]s; the root and
/// child lists are circular doubly-linked lists of arena indices.
pub struct FibonacciHeap<T> {
  nodes: Vec<Node<T>>,
  min: Option<usize>,
  len: usize,
}

impl<T> Default for FibonacciHeap<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> FibonacciHeap<T> {
  /// An empty heap.
  pub fn new() -> Self {
    Self {
      nodes: Vec::new(),
      min: None,
      len: 0,
    }
  }

  /// An empty heap with room for `capacity` entries before reallocating.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      nodes: Vec::with_capacity(capacity),
      min: None,
      len: 0,
    }
  }

  /// Number of entries currently enqueued.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Whether no entries are enqueued.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Add a value with the given priority and return a handle for later
  /// [`FibonacciHeap::decrease_key`] calls.
  pub fn enqueue(&mut self, value: T, priority: f64) -> Handle {
    let id = self.nodes.len();
    self.nodes.push(Node {
      value: Some(value),
      priority,
      parent: None,
      child: None,
      left: id,
      right: id,
      degree: 0,
      marked: false,
    });
    match self.min {
      None => self.min = Some(id),
      Some(min) => {
        self.splice_after(min, id);
        if priority < self.nodes[min].priority {
          self.min = Some(id);
        }
      }
    }
    self.len += 1;
    Handle(id)
  }

  /// The priority of the minimum entry, if any.
  pub fn min_priority(&self) -> Option<f64> {
    self.min.map(|id| self.nodes[id].priority)
  }

  /// Remove and return the entry with the smallest priority.
  pub fn dequeue_min(&mut self) -> Option<(T, f64)> {
    let min = self.min?;

    // Promote all children of the minimum to roots.
    let children = self.list_members(self.nodes[min].child);
    for child in children {
      self.remove_from_list(child);
      self.nodes[child].parent = None;
      self.nodes[child].marked = false;
      self.splice_after(min, child);
    }
    self.nodes[min].child = None;
    self.nodes[min].degree = 0;

    let successor = self.nodes[min].right;
    self.remove_from_list(min);
    self.len -= 1;

    if successor == min {
      // The minimum was the only root.
      self.min = None;
    } else {
      self.min = Some(successor);
      self.consolidate(successor);
    }

    let priority = self.nodes[min].priority;
    let value = self.nodes[min].value.take().unwrap();
    Some((value, priority))
  }

  /// Lower the priority of an entry.
  ///
  /// # Panics
  ///
  /// Panics if the new priority is larger than the entry's current one.
  pub fn decrease_key(&mut self, handle: Handle, priority: f64) {
    let id = handle.0;
    assert!(
      priority <= self.nodes[id].priority,
      "decrease_key cannot raise a priority ({} -> {})",
      self.nodes[id].priority,
      priority
    );
    self.nodes[id].priority = priority;

    if let Some(parent) = self.nodes[id].parent {
      if self.nodes[id].priority < self.nodes[parent].priority {
        self.cut(id, parent);
        self.cascading_cut(parent);
      }
    }
    if let Some(min) = self.min {
      if priority < self.nodes[min].priority {
        self.min = Some(id);
      }
    }
  }

  /// Merge roots of equal degree until every root degree is unique, then
  /// locate the new minimum.
  fn consolidate(&mut self, start: usize) {
    let roots = self.list_members(Some(start));
    // A Fibonacci heap of any representable size has degree below 96.
    let mut by_degree: Vec<Option<usize>> = vec![None; 96];

    for root in roots {
      let mut current = root;
      let mut degree = self.nodes[current].degree;
      while let Some(other) = by_degree[degree].take() {
        let (parent, child) = if self.nodes[other].priority < self.nodes[current].priority {
          (other, current)
        } else {
          (current, other)
        };
        self.link(child, parent);
        current = parent;
        degree = self.nodes[current].degree;
      }
      by_degree[degree] = Some(current);
    }

    let mut min = None;
    for root in by_degree.into_iter().flatten() {
      min = match min {
        None => Some(root),
        Some(best) if self.nodes[root].priority < self.nodes[best].priority => Some(root),
        keep => keep,
      };
    }
    self.min = min;
  }

  /// Make `child` a child of `parent`; both must be roots.
  fn link(&mut self, child: usize, parent: usize) {
    self.remove_from_list(child);
    self.nodes[child].parent = Some(parent);
    self.nodes[child].marked = false;
    match self.nodes[parent].child {
      None => {
        self.nodes[child].left = child;
        self.nodes[child].right = child;
        self.nodes[parent].child = Some(child);
      }
      Some(first) => self.splice_after(first, child),
    }
    self.nodes[parent].degree += 1;
  }

  /// Move `id` from its parent's child list into the root list.
  fn cut(&mut self, id: usize, parent: usize) {
    if self.nodes[parent].child == Some(id) {
      let next = self.nodes[id].right;
      self.nodes[parent].child = if next == id { None } else { Some(next) };
    }
    self.remove_from_list(id);
    self.nodes[parent].degree -= 1;

    self.nodes[id].parent = None;
    self.nodes[id].marked = false;
    let min = self.min.unwrap();
    self.splice_after(min, id);
  }

  /// Walk up from a node whose child was just cut, cutting marked ancestors.
  fn cascading_cut(&mut self, mut id: usize) {
    while let Some(parent) = self.nodes[id].parent {
      if !self.nodes[id].marked {
        self.nodes[id].marked = true;
        return;
      }
      self.cut(id, parent);
      id = parent;
    }
  }

  /// All members of the circular list containing `start`, if any.
  fn list_members(&self, start: Option<usize>) -> Vec<usize> {
    let mut members = Vec::new();
    if let Some(first) = start {
      let mut current = first;
      loop {
        members.push(current);
        current = self.nodes[current].right;
        if current == first {
          break;
        }
      }
    }
    members
  }

  /// Insert `id` directly after `anchor` in `anchor`'s circular list.
  fn splice_after(&mut self, anchor: usize, id: usize) {
    let right = self.nodes[anchor].right;
    self.nodes[anchor].right = id;
    self.nodes[id].left = anchor;
    self.nodes[id].right = right;
    self.nodes[right].left = id;
  }

  /// Unlink `id` from its circular list, leaving it self-looped.
  fn remove_from_list(&mut self, id: usize) {
    let left = self.nodes[id].left;
    let right = self.nodes[id].right;
    self.nodes[left].right = right;
    self.nodes[right].left = left;
    self.nodes[id].left = id;
    self.nodes[id].right = id;
  }
}
