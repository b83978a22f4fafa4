//! Fast, parallel embedding of polygonal curves under Fréchet-family
//! dissimilarities.
//!
//! This library computes low-dimensional euclidean coordinates for large
//! collections of polylines (or any other element type with a suitable
//! distance measure). Distances can be preserved directly (classical /
//! landmark multidimensional scaling) or along the k-nearest-neighbor graph
//! of the collection (Isomap), which scales to collections on the order of
//! 10⁵ curves when combined with landmarks.
//!
//! # Example
//!
//! ```ignore
//! use fremap::ApproxFrechet;
//! use fremap::Isomap;
//! use std::sync::Arc;
//!
//! // `curves` is a Vec<Polyline> from your data source.
//! let measure = Arc::new(ApproxFrechet::with_precision(1e-3)?);
//! let mut isomap = Isomap::with_landmarks(curves, measure, 8, 50)?;
//!
//! // 2 × n coordinate matrix in input order, plus a quality score.
//! let coordinates = isomap.embed(2)?;
//! let quality = isomap.embedding_quality(2)?;
//! ```
//!
//! # Features
//!
//! - **Fréchet-family measures**: discrete and integral discrete Fréchet
//!   distances with capped early exit, and an ε-precise approximation of
//!   the continuous Fréchet distance via free-space decision procedures.
//! - **Parallel graph construction**: NN-descent over rayon with
//!   lock-protected per-vertex candidate sets, warm-started across
//!   neighborhood-size changes.
//! - **Geodesic distances**: per-source Dijkstra on a Fibonacci heap,
//!   parallel over sources, with Floyd–Warshall for small dense cases and
//!   minimum-spanning-tree stitching of fragmented graphs.
//! - **Aggressive caching**: both embedders reuse distance matrices and
//!   graph state across parameter sweeps.
//!
//! # Public API
//!
//! * [`Polyline`] - the curve value type
//! * [`Measure`] - the dissimilarity contract (with [`Euclidean`] for raw
//!   points)
//! * [`DiscreteFrechet`], [`IntegralDiscreteFrechet`], [`ApproxFrechet`] -
//!   the Fréchet family
//! * [`DirectEmbedder`], [`Isomap`] - the embedders
//! * [`AdjacencyList`], [`ConnectedComponents`], [`BruteForceKnn`],
//!   [`NnDescent`] - the graph layer, usable on its own

pub mod embedding;
pub mod error;
pub mod frechet;
pub mod graph;
pub mod knn;
pub mod measure;
pub mod polyline;
pub mod synthetic;

pub use embedding::DirectEmbedder;
pub use embedding::Isomap;
pub use error::Error;
pub use error::Result;
pub use frechet::ApproxFrechet;
pub use frechet::DiscreteFrechet;
pub use frechet::FrechetDecider;
pub use frechet::IntegralDiscreteFrechet;
pub use graph::AdjacencyList;
pub use graph::ConnectedComponents;
pub use graph::FibonacciHeap;
pub use knn::BruteForceKnn;
pub use knn::NearestNeighbors;
pub use knn::NnDescent;
pub use measure::Euclidean;
pub use measure::Measure;
pub use polyline::Polyline;

#[cfg(test)]
mod tests;
