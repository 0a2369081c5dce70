use core::task::Waker;

/// Tracks which slots of a merger have been woken and should be polled.
///
/// Every slot starts out ready so the first poll visits all of them.
#[derive(Debug)]
pub(crate) struct ReadinessArray<const N: usize> {
    count: usize,
    ready: [bool; N],
    parent_waker: Option<Waker>,
}

impl<const N: usize> ReadinessArray<N> {
    pub(crate) fn new() -> Self {
        Self {
            count: N,
            ready: [true; N],
            parent_waker: None,
        }
    }

    /// Mark a slot as ready.
    ///
    /// Returns the old ready state for this slot.
    pub(crate) fn set_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            true
        } else {
            self.ready[index] = true;
            self.count += 1;
            false
        }
    }

    /// Mark a slot as not ready.
    ///
    /// Returns whether the slot was ready before, i.e. whether it should be
    /// polled now.
    pub(crate) fn clear_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            self.ready[index] = false;
            self.count -= 1;
            true
        } else {
            false
        }
    }

    /// Returns `true` if any slot is ready.
    pub(crate) fn any_ready(&self) -> bool {
        self.count > 0
    }

    #[inline]
    pub(crate) fn parent_waker(&self) -> Option<&Waker> {
        self.parent_waker.as_ref()
    }

    /// Set the `Waker` of whoever polls the merger. This needs to be called
    /// at the start of every `poll_next`.
    pub(crate) fn set_waker(&mut self, parent_waker: &Waker) {
        match &mut self.parent_waker {
            Some(prev) => prev.clone_from(parent_waker),
            None => self.parent_waker = Some(parent_waker.clone()),
        }
    }
}
