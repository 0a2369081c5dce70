use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures_core::Stream;

/// An input position of a merger which may or may not hold a stream.
///
/// An [`Absent`][Slot::Absent] slot behaves like a stream that never yields
/// and never ends: polling it is always `Pending` and it never registers a
/// wakeup. Mergers leave absent slots out of their liveness accounting, so
/// padding a merge with absent slots never keeps it open.
///
/// # Examples
///
/// ```
/// use fan_in::{peek, Peek, Slot};
/// use futures_lite::stream;
/// use std::pin::pin;
///
/// let absent: Slot<stream::Once<u8>> = None.into();
/// assert!(absent.is_absent());
/// assert_eq!(peek(pin!(absent)), Peek::Empty);
///
/// let present = Slot::Present(stream::once(7u8));
/// assert_eq!(peek(pin!(present)), Peek::Ready(7));
/// ```
#[pin_project::pin_project(project = SlotProj)]
#[derive(Clone)]
pub enum Slot<S> {
    /// A stream occupies this slot.
    Present(#[pin] S),
    /// No stream in this slot.
    Absent,
}

impl<S> Slot<S> {
    /// Returns `true` if the slot holds a stream.
    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }

    /// Returns `true` if the slot is empty.
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    /// Converts into the held stream, if any.
    pub fn into_inner(self) -> Option<S> {
        match self {
            Slot::Present(stream) => Some(stream),
            Slot::Absent => None,
        }
    }
}

impl<S> Default for Slot<S> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<S> From<Option<S>> for Slot<S> {
    fn from(stream: Option<S>) -> Self {
        match stream {
            Some(stream) => Slot::Present(stream),
            None => Slot::Absent,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Slot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Present(stream) => f.debug_tuple("Present").field(stream).finish(),
            Slot::Absent => f.write_str("Absent"),
        }
    }
}

impl<S: Stream> Stream for Slot<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.project() {
            SlotProj::Present(stream) => stream.poll_next(cx),
            SlotProj::Absent => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Slot::Present(stream) => stream.size_hint(),
            Slot::Absent => (0, Some(0)),
        }
    }
}
