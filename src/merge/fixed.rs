use crate::utils::{self, PollState, WakerArray};
use crate::Slot;

use core::array;
use core::fmt;
use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Number of inputs a [`Merge4`] arbitrates between.
pub(crate) const ARITY: usize = 4;

/// The arbitration state of one four-way merge point.
///
/// Tracks which slots are still live and which were woken since they were
/// last polled. The slots themselves are owned by the caller and reached
/// through the closure handed to [`Merge4Core::poll_next`], so the same core
/// drives a standalone [`Merge4`] and every node of a
/// [`MergeTree`](super::MergeTree).
#[derive(Debug)]
pub(crate) struct Merge4Core {
    state: [PollState; ARITY],
    wakers: WakerArray<ARITY>,
    live: usize,
}

impl Merge4Core {
    /// A core whose slot `i` is live if `present[i]` is set.
    pub(crate) fn new(present: [bool; ARITY]) -> Self {
        let state = present.map(|present| {
            if present {
                PollState::Pending
            } else {
                PollState::None
            }
        });
        let live = present.iter().filter(|present| **present).count();

        let wakers = WakerArray::new();
        {
            let mut readiness = wakers.readiness();
            for (index, state) in state.iter().enumerate() {
                if !state.is_pending() {
                    readiness.clear_ready(index);
                }
            }
        }

        Self {
            state,
            wakers,
            live,
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn is_live(&self, index: usize) -> bool {
        self.state[index].is_pending()
    }

    /// Poll the woken slots through `poll_slot` until one yields a value.
    ///
    /// `poll_slot(index, cx)` must poll the input in slot `index` with the
    /// context it is given. Returns `Ready(None)` once every live slot has
    /// ended, and keeps doing so afterwards.
    pub(crate) fn poll_next<T, F>(
        &mut self,
        cx: &mut Context<'_>,
        mut poll_slot: F,
    ) -> Poll<Option<T>>
    where
        F: FnMut(usize, &mut Context<'_>) -> Poll<Option<T>>,
    {
        if self.live == 0 {
            return Poll::Ready(None);
        }

        let mut readiness = self.wakers.readiness();
        readiness.set_waker(cx.waker());
        if !readiness.any_ready() {
            return Poll::Pending;
        }

        // Walk the slots from a random starting point, polling only the ones
        // which were woken since we last looked at them.
        for index in utils::rotation(ARITY) {
            if !self.state[index].is_pending() || !readiness.clear_ready(index) {
                continue;
            }

            // Unlock readiness so the input can wake us while being polled.
            drop(readiness);

            let mut cx = Context::from_waker(self.wakers.get(index));
            match poll_slot(index, &mut cx) {
                Poll::Ready(Some(item)) => {
                    // The input may hold more, make sure we look at it again.
                    self.wakers.readiness().set_ready(index);
                    return Poll::Ready(Some(item));
                }
                Poll::Ready(None) => {
                    self.state[index].set_consumed();
                    self.live -= 1;
                    if self.live == 0 {
                        return Poll::Ready(None);
                    }
                }
                Poll::Pending => {}
            }

            readiness = self.wakers.readiness();
        }

        Poll::Pending
    }
}

/// A stream that merges up to four streams into one.
///
/// Values are forwarded as soon as any input has one; nothing is buffered.
/// The stream ends once every present input has ended.
///
/// This `struct` is created by the [`merge4`] function. See its documentation
/// for more.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct Merge4<S>
where
    S: Stream,
{
    #[pin]
    streams: [Slot<S>; ARITY],
    core: Merge4Core,
}

impl<S> Merge4<S>
where
    S: Stream,
{
    /// Create a merger over four slots, some of which may be absent.
    pub fn new(streams: [Slot<S>; 4]) -> Self {
        let present = array::from_fn(|index| streams[index].is_present());
        Self {
            streams,
            core: Merge4Core::new(present),
        }
    }

    /// Number of inputs which have not ended yet.
    pub fn live(&self) -> usize {
        self.core.live()
    }
}

impl<S> fmt::Debug for Merge4<S>
where
    S: Stream + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merge4")
            .field("streams", &self.streams)
            .field("live", &self.core.live())
            .finish()
    }
}

impl<S> Stream for Merge4<S>
where
    S: Stream,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let mut streams = this.streams;
        this.core.poll_next(cx, |index, cx| {
            utils::get_pin_mut(streams.as_mut(), index).poll_next(cx)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let mut lower = 0usize;
        let mut upper = Some(0usize);
        for (index, slot) in self.streams.iter().enumerate() {
            if !self.core.is_live(index) {
                continue;
            }
            let (lo, hi) = slot.size_hint();
            lower = lower.saturating_add(lo);
            upper = match (upper, hi) {
                (Some(a), Some(b)) => a.checked_add(b),
                _ => None,
            };
        }
        (lower, upper)
    }
}

/// Merge up to four streams into a single stream of all their values.
///
/// Pass [`None`] for unused inputs; they become [`Slot::Absent`]. Values from one
/// input keep their relative order; values from different inputs interleave
/// in whatever order they become ready. When several inputs are ready at
/// once, the one served first is picked at random.
///
/// With every slot absent the returned stream ends immediately.
///
/// # Examples
///
/// ```
/// use fan_in::merge4;
/// use futures_lite::future::block_on;
/// use futures_lite::prelude::*;
/// use futures_lite::stream;
///
/// block_on(async {
///     let a = stream::iter(vec![1, 2]);
///     let b = stream::iter(vec![10, 20]);
///
///     let mut out: Vec<i32> = merge4(Some(a), Some(b), None, None).collect().await;
///     out.sort_unstable();
///     assert_eq!(out, vec![1, 2, 10, 20]);
/// })
/// ```
pub fn merge4<S>(s1: Option<S>, s2: Option<S>, s3: Option<S>, s4: Option<S>) -> Merge4<S>
where
    S: Stream,
{
    Merge4::new([s1.into(), s2.into(), s3.into(), s4.into()])
}
