//! Type erasure for composing streams of different element types.
//!
//! [`merge`](crate::merge) and friends need every input to yield the same
//! type. Streams of different types can still be merged by erasing their
//! items with [`to_any`], merging, and restoring a concrete type afterwards
//! with [`from_any`] or [`try_from_any`].
//!
//! # Examples
//!
//! ```
//! use fan_in::bridge::{to_any, try_from_any};
//! use fan_in::prelude::*;
//! use futures_lite::future::block_on;
//! use futures_lite::prelude::*;
//! use futures_lite::stream;
//!
//! block_on(async {
//!     let numbers = to_any(stream::iter(vec![1u32, 2]));
//!     let words = to_any(stream::iter(vec!["three"]));
//!     let merged = vec![numbers.boxed(), words.boxed()].merge();
//!
//!     let out: Vec<_> = try_from_any::<u32, _>(merged).collect().await;
//!     assert_eq!(out.iter().filter(|r| r.is_ok()).count(), 2);
//!     assert_eq!(out.iter().filter(|r| r.is_err()).count(), 1);
//! })
//! ```

use crate::error::{Error, Result};

use core::any::{type_name, Any};
use core::fmt;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures_core::{ready, Stream};

/// An item with its type erased.
pub type AnyItem = Box<dyn Any + Send>;

/// A stream which erases the type of its items.
///
/// This `struct` is created by the [`to_any`] function.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct ToAny<S> {
    #[pin]
    stream: S,
}

impl<S: fmt::Debug> fmt::Debug for ToAny<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToAny").field(&self.stream).finish()
    }
}

impl<S> Stream for ToAny<S>
where
    S: Stream,
    S::Item: Any + Send,
{
    type Item = AnyItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = ready!(self.project().stream.poll_next(cx));
        Poll::Ready(item.map(|item| Box::new(item) as AnyItem))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// Erase the item type of a stream.
pub fn to_any<S>(stream: S) -> ToAny<S>
where
    S: Stream,
    S::Item: Any + Send,
{
    ToAny { stream }
}

/// A stream which restores a concrete type, yielding an error for items of
/// any other type.
///
/// This `struct` is created by the [`try_from_any`] function.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct TryFromAny<S, T> {
    #[pin]
    stream: S,
    _marker: PhantomData<fn() -> T>,
}

impl<S: fmt::Debug, T> fmt::Debug for TryFromAny<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFromAny")
            .field("stream", &self.stream)
            .field("target", &type_name::<T>())
            .finish()
    }
}

fn downcast<T: Any>(item: AnyItem) -> Result<T> {
    item.downcast::<T>()
        .map(|item| *item)
        .map_err(|_| Error::TypeMismatch {
            expected: type_name::<T>(),
        })
}

impl<S, T> Stream for TryFromAny<S, T>
where
    S: Stream<Item = AnyItem>,
    T: Any,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = ready!(self.project().stream.poll_next(cx));
        Poll::Ready(item.map(downcast))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// Restore a concrete item type, reporting mismatches as
/// [`Error::TypeMismatch`].
pub fn try_from_any<T, S>(stream: S) -> TryFromAny<S, T>
where
    S: Stream<Item = AnyItem>,
    T: Any,
{
    TryFromAny {
        stream,
        _marker: PhantomData,
    }
}

/// A stream which restores a concrete type and panics on items of any other
/// type.
///
/// This `struct` is created by the [`from_any`] function.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct FromAny<S, T> {
    #[pin]
    inner: TryFromAny<S, T>,
}

impl<S: fmt::Debug, T> fmt::Debug for FromAny<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromAny").field(&self.inner).finish()
    }
}

impl<S, T> Stream for FromAny<S, T>
where
    S: Stream<Item = AnyItem>,
    T: Any,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match ready!(self.project().inner.poll_next(cx)) {
            Some(Ok(item)) => Poll::Ready(Some(item)),
            Some(Err(err)) => {
                tracing::error!(%err, "untyped stream yielded a foreign value");
                panic!("{err}");
            }
            None => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Restore a concrete item type.
///
/// # Panics
///
/// Polling the returned stream panics when an item does not hold a `T`. A
/// mismatch means the producer and consumer disagree about the stream's
/// contents, which is a bug at the call site; use [`try_from_any`] to handle
/// it instead.
pub fn from_any<T, S>(stream: S) -> FromAny<S, T>
where
    S: Stream<Item = AnyItem>,
    T: Any,
{
    FromAny {
        inner: try_from_any(stream),
    }
}
