//! The Fréchet-distance family on polygonal curves.
//!
//! Three dissimilarities are provided:
//!
//! * [`DiscreteFrechet`]: the classic min-max coupling over vertex pairs.
//! * [`IntegralDiscreteFrechet`]: the same dynamic program with sum
//!   accumulation (total pair distance along the optimal coupling).
//! * [`ApproxFrechet`]: the continuous Fréchet distance, approximated to a
//!   configurable precision by bisecting over a decision procedure on the
//!   free-space diagram.

pub mod approx;
pub mod decider;
pub mod discrete;
pub mod free_space;

pub use approx::ApproxFrechet;
pub use decider::FrechetDecider;
pub use discrete::DiscreteFrechet;
pub use discrete::IntegralDiscreteFrechet;
pub use free_space::free_interval;
