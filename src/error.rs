use thiserror::Error;

/// Errors surfaced by validating constructors and entry points.
///
/// Invalid arguments are reported synchronously at the call site; nothing is
/// retried or swallowed. Capped distance computations deliberately use the
/// `f64::INFINITY` sentinel as a *value* ("larger than the cap / no edge /
/// unreachable") and never an error.
#[derive(Debug, Error)]
pub enum Error {
  /// A precondition on an argument was violated. The message names the
  /// precondition and, where bounded, the offending value and its allowed
  /// range.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// An index was outside the valid range of an accessor.
  #[error("index {index} out of range for length {len}")]
  OutOfRange { index: usize, len: usize },
}

impl Error {
  /// Shorthand for an [`Error::InvalidInput`] with a formatted message.
  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    Error::InvalidInput(message.into())
  }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
