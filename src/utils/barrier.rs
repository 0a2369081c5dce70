use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::sync::{Arc, Mutex};

use fixedbitset::FixedBitSet;

/// A counting barrier that opens once every participant has arrived.
///
/// Participants are identified by index so a repeated arrival is not counted
/// twice.
#[derive(Debug, Clone)]
pub(crate) struct Barrier {
    inner: Arc<Mutex<BarrierState>>,
}

#[derive(Debug)]
struct BarrierState {
    arrived: FixedBitSet,
    remaining: usize,
    waker: Option<Waker>,
}

impl Barrier {
    /// Create a barrier for `count` participants.
    pub(crate) fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BarrierState {
                arrived: FixedBitSet::with_capacity(count),
                remaining: count,
                waker: None,
            })),
        }
    }

    /// Signal that participant `index` is done.
    pub(crate) fn arrive(&self, index: usize) {
        let mut state = self.inner.lock().unwrap();
        if state.arrived.put(index) {
            return;
        }
        state.remaining -= 1;
        if state.remaining == 0 {
            let waker = state.waker.take();
            drop(state);
            if let Some(waker) = waker {
                waker.wake();
            }
        }
    }

    /// Number of participants which have not arrived yet.
    pub(crate) fn remaining(&self) -> usize {
        self.inner.lock().unwrap().remaining
    }

    /// Wait until every participant has arrived.
    pub(crate) fn wait(&self) -> Wait {
        Wait {
            inner: self.inner.clone(),
        }
    }
}

/// Future returned by [`Barrier::wait`].
#[derive(Debug)]
pub(crate) struct Wait {
    inner: Arc<Mutex<BarrierState>>,
}

impl Future for Wait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.lock().unwrap();
        if state.remaining == 0 {
            return Poll::Ready(());
        }
        match &mut state.waker {
            Some(prev) => prev.clone_from(cx.waker()),
            None => state.waker = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}
