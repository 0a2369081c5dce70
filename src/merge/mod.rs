//! Fan-in: combining many streams into one.
//!
//! Three strategies are provided. All of them keep the order of values coming
//! from any one input, interleave different inputs by readiness, and end the
//! output exactly when every input has ended.
//!
//! | Name              | Inputs | Driven by              | Arbitration points |
//! | ---               | ---    | ---                    | ---                |
//! | [`merge4`]        | 0..=4  | the consumer's polls   | 1                  |
//! | [`merge`]         | any    | the consumer's polls   | `ceil(log4(n))`    |
//! | [`merge_buffered`]| any    | one task per input     | none               |
//!
//! A merged stream only ends once *all* of its inputs do. An input which
//! never ends keeps the merged stream open forever; pair merging with a
//! timeout when that can happen.
use futures_core::Stream;

#[cfg(feature = "buffered")]
use crate::error::Result;
use crate::stream::IntoStream;

#[cfg(feature = "buffered")]
mod buffered;
mod fixed;
mod tree;

#[cfg(feature = "buffered")]
pub use buffered::{merge_buffered, merge_buffered_with, BufferedOptions, MergeBuffered};
pub use fixed::{merge4, Merge4};
pub use tree::{merge, MergeTree};

#[cfg(feature = "buffered")]
use futures_task::Spawn;

/// Combines a collection of streams into a single stream of all their
/// values.
///
/// # Examples
///
/// ```
/// use fan_in::prelude::*;
/// use futures_lite::future::block_on;
/// use futures_lite::stream::{self, StreamExt};
///
/// block_on(async {
///     let a = stream::once(1);
///     let b = stream::once(2);
///     let c = stream::once(3);
///     let mut s = [a, b, c].merge();
///
///     let mut buf = vec![];
///     s.for_each(|n| buf.push(n)).await;
///     buf.sort_unstable();
///     assert_eq!(&buf, &[1, 2, 3]);
/// })
/// ```
pub trait Merge {
    /// The resulting output type.
    type Item;

    /// The stream type of each input.
    type Stream: Stream<Item = Self::Item>;

    /// Merge through a balanced tree of four-way merge points. See
    /// [`merge`].
    fn merge(self) -> MergeTree<Self::Stream>;

    /// Merge with one forwarding task per input. See [`merge_buffered`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`](crate::Error::Spawn) if the executor refuses
    /// a task.
    #[cfg(feature = "buffered")]
    fn merge_buffered<Sp>(self, spawner: &Sp) -> Result<MergeBuffered<Self::Stream>>
    where
        Sp: Spawn + ?Sized,
        Self::Stream: Send + 'static,
        Self::Item: Send + 'static;
}

impl<S> Merge for Vec<S>
where
    S: IntoStream,
{
    type Item = S::Item;
    type Stream = S::IntoStream;

    fn merge(self) -> MergeTree<Self::Stream> {
        merge(self)
    }

    #[cfg(feature = "buffered")]
    fn merge_buffered<Sp>(self, spawner: &Sp) -> Result<MergeBuffered<Self::Stream>>
    where
        Sp: Spawn + ?Sized,
        Self::Stream: Send + 'static,
        Self::Item: Send + 'static,
    {
        merge_buffered(spawner, self)
    }
}

impl<S, const N: usize> Merge for [S; N]
where
    S: IntoStream,
{
    type Item = S::Item;
    type Stream = S::IntoStream;

    fn merge(self) -> MergeTree<Self::Stream> {
        merge(self)
    }

    #[cfg(feature = "buffered")]
    fn merge_buffered<Sp>(self, spawner: &Sp) -> Result<MergeBuffered<Self::Stream>>
    where
        Sp: Spawn + ?Sized,
        Self::Stream: Send + 'static,
        Self::Item: Send + 'static,
    {
        merge_buffered(spawner, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;
    use futures_lite::prelude::*;
    use futures_lite::stream;

    #[test]
    fn merge_vec_2x2() {
        block_on(async {
            let a = stream::repeat(1).take(2);
            let b = stream::repeat(2).take(2);
            let mut s = vec![a, b].merge();

            let mut counter = 0;
            while let Some(n) = s.next().await {
                counter += n;
            }
            assert_eq!(counter, 6);
        })
    }

    #[cfg(feature = "buffered")]
    #[test]
    fn merge_array_buffered() {
        use futures::executor::LocalPool;

        let mut pool = LocalPool::new();
        let s = [stream::iter(vec![1, 2]), stream::iter(vec![3, 4])]
            .merge_buffered(&pool.spawner())
            .unwrap();
        let counter = pool.run_until(s.fold(0, |acc, n| acc + n));
        assert_eq!(counter, 10);
    }
}
