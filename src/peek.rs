use core::pin::Pin;
use core::task::{Context, Poll};
use futures_core::Stream;
use futures_task::noop_waker_ref;

/// The outcome of a single non-blocking receive attempt.
///
/// "Nothing yet" and "nothing ever again" are kept apart: [`Empty`] means the
/// stream is still open, [`Closed`] means it has ended and been drained.
///
/// [`Empty`]: Peek::Empty
/// [`Closed`]: Peek::Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peek<T> {
    /// A value was available and has been received.
    Ready(T),
    /// The stream is open but has no value right now. Nothing was consumed.
    Empty,
    /// The stream has ended and holds no more values.
    Closed,
}

impl<T> Peek<T> {
    /// Returns `true` if a value was received.
    pub fn is_ready(&self) -> bool {
        matches!(self, Peek::Ready(_))
    }

    /// Returns `true` if the stream was open without a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Peek::Empty)
    }

    /// Returns `true` if the stream has ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Peek::Closed)
    }

    /// Returns `true` unless the stream has ended.
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// The received value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Peek::Ready(value) => Some(value),
            Peek::Empty | Peek::Closed => None,
        }
    }

    /// Flatten into `(value, value_present, stream_open)`, using the default
    /// value of `T` when nothing was received.
    ///
    /// ```
    /// use fan_in::Peek;
    ///
    /// assert_eq!(Peek::Ready(3).into_parts(), (3, true, true));
    /// assert_eq!(Peek::<i32>::Empty.into_parts(), (0, false, true));
    /// assert_eq!(Peek::<i32>::Closed.into_parts(), (0, false, false));
    /// ```
    pub fn into_parts(self) -> (T, bool, bool)
    where
        T: Default,
    {
        match self {
            Peek::Ready(value) => (value, true, true),
            Peek::Empty => (T::default(), false, true),
            Peek::Closed => (T::default(), false, false),
        }
    }
}

/// Try to receive the next value of a stream without waiting for it.
///
/// The stream is polled exactly once. At most one value is consumed, and an
/// [absent slot](crate::Slot::Absent) reports [`Peek::Empty`] since it is
/// open but never produces.
///
/// # Examples
///
/// ```
/// use fan_in::{peek, Peek};
/// use futures_lite::stream;
/// use std::pin::pin;
///
/// let mut s = pin!(stream::iter(vec![1, 2]));
/// assert_eq!(peek(s.as_mut()), Peek::Ready(1));
/// assert_eq!(peek(s.as_mut()), Peek::Ready(2));
/// assert_eq!(peek(s.as_mut()), Peek::Closed);
/// ```
pub fn peek<S>(stream: Pin<&mut S>) -> Peek<S::Item>
where
    S: Stream + ?Sized,
{
    let mut cx = Context::from_waker(noop_waker_ref());
    match stream.poll_next(&mut cx) {
        Poll::Ready(Some(value)) => Peek::Ready(value),
        Poll::Ready(None) => Peek::Closed,
        Poll::Pending => Peek::Empty,
    }
}

/// Extend `Stream` with a non-blocking receive.
pub trait PeekExt: Stream {
    /// Try to receive the next value without waiting. See [`peek`].
    fn peek_next(&mut self) -> Peek<Self::Item>
    where
        Self: Unpin,
    {
        peek(Pin::new(self))
    }
}

impl<S> PeekExt for S where S: Stream + ?Sized {}
