use std::sync::{Arc, Mutex};
use std::task::Wake;

use super::ReadinessArray;

/// Waker handed to the input in one slot of a merger. Waking it flags the
/// slot and, on the first wake since the last poll, wakes the merger itself.
#[derive(Debug)]
pub(crate) struct SlotWaker<const N: usize> {
    index: usize,
    readiness: Arc<Mutex<ReadinessArray<N>>>,
}

impl<const N: usize> SlotWaker<N> {
    pub(crate) fn new(index: usize, readiness: Arc<Mutex<ReadinessArray<N>>>) -> Self {
        Self { index, readiness }
    }
}

impl<const N: usize> Wake for SlotWaker<N> {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let mut readiness = self.readiness.lock().unwrap();
        if !readiness.set_ready(self.index) {
            // Wake outside the lock, the parent may poll us straight away.
            let parent = readiness.parent_waker().cloned();
            drop(readiness);
            if let Some(parent) = parent {
                parent.wake();
            }
        }
    }
}
