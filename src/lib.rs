//! Fan-in merging for async streams.
//!
//! This crate combines any number of [`Stream`][futures_core::Stream]s into
//! one, peeks at a stream without waiting on it, and erases item types so
//! streams of different types can be combined. It is executor agnostic: the
//! poll-driven mergers run on whatever drives the consumer, and the buffered
//! merger spawns its tasks onto any [`Spawn`][futures_task::Spawn]
//! implementation.
//!
//! # Operations
//!
//! - [`peek`]: Receive the next value if there is one, without waiting.
//! - [`merge4`]: Merge up to four streams, some of which may be absent.
//! - [`merge`]: Merge any number of streams through a balanced tree of
//!   four-way merges.
//! - [`merge_buffered`]: Merge any number of streams with one forwarding task
//!   per input.
//! - [`bridge`]: Erase and restore item types.
//!
//! Every merge keeps the order of the values of each input, interleaves
//! inputs in the order their values become ready, and ends once all inputs
//! have ended. There is no cancellation besides ending the inputs: an input
//! which never ends keeps the merged stream open.
//!
//! # Examples
//!
//! ```rust
//! use fan_in::prelude::*;
//! use futures_lite::future::block_on;
//! use futures_lite::prelude::*;
//! use futures_lite::stream;
//!
//! block_on(async {
//!     let streams: Vec<_> = (0..10).map(|n| stream::iter(vec![n, n])).collect();
//!     let total: i32 = streams.merge().fold(0, |acc, n| acc + n).await;
//!     assert_eq!(total, 90);
//! })
//! ```
//!
//! # Features
//!
//! - `buffered` (default): [`merge_buffered`] and [`MergeBuffered`], built
//!   on `async-channel`.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod error;
mod peek;
mod slot;
mod stream;
mod utils;

pub mod bridge;
pub mod merge;

pub use error::{Error, Result};
pub use peek::{peek, Peek, PeekExt};
pub use slot::Slot;
pub use stream::IntoStream;

pub use merge::{merge, merge4, Merge, Merge4, MergeTree};
#[cfg(feature = "buffered")]
pub use merge::{merge_buffered, merge_buffered_with, BufferedOptions, MergeBuffered};

/// The fan-in prelude.
pub mod prelude {
    pub use super::merge::Merge as _;
    pub use super::peek::PeekExt as _;
    pub use super::stream::IntoStream as _;
}
