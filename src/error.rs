//! Error types.

use futures_task::SpawnError;
use thiserror::Error;

/// Result type alias using this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at the edges of the merge core.
///
/// Merging itself never fails: a stream ending is not an error. Failures come
/// from handing tasks to an executor and from converting untyped values back
/// to a concrete type.
#[derive(Error, Debug)]
pub enum Error {
    /// The executor refused a task, usually because it is shutting down.
    #[error("failed to spawn {task} task: {source}")]
    Spawn {
        /// Which task could not be spawned.
        task: &'static str,
        /// The executor's error.
        #[source]
        source: SpawnError,
    },

    /// An untyped value did not hold the requested type.
    #[error("type mismatch: expected a value of type `{expected}`")]
    TypeMismatch {
        /// Name of the requested type.
        expected: &'static str,
    },
}
