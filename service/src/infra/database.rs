//! [`Database`]-related definitions.

use derive_more::{Display, Error as StdError, From};

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Underlying store failed to perform an operation.
    #[display("store error: {_0}")]
    Store(#[error(not(source))] String),
}
