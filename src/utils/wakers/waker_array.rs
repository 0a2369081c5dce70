use core::array;
use core::task::Waker;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ReadinessArray, SlotWaker};

/// One waker per merger slot, all reporting into a shared `ReadinessArray`.
pub(crate) struct WakerArray<const N: usize> {
    wakers: [Waker; N],
    readiness: Arc<Mutex<ReadinessArray<N>>>,
}

impl<const N: usize> WakerArray<N> {
    pub(crate) fn new() -> Self {
        let readiness = Arc::new(Mutex::new(ReadinessArray::new()));
        Self {
            wakers: array::from_fn(|index| {
                Arc::new(SlotWaker::new(index, readiness.clone())).into()
            }),
            readiness,
        }
    }

    /// The waker for the input in slot `index`.
    pub(crate) fn get(&self, index: usize) -> &Waker {
        &self.wakers[index]
    }

    /// Access the `Readiness`.
    pub(crate) fn readiness(&self) -> MutexGuard<'_, ReadinessArray<N>> {
        self.readiness.lock().unwrap()
    }
}

impl<const N: usize> core::fmt::Debug for WakerArray<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WakerArray")
            .field("readiness", &self.readiness)
            .finish()
    }
}
