mod readiness;
mod waker;
mod waker_array;

pub(crate) use readiness::ReadinessArray;
pub(crate) use waker::SlotWaker;
pub(crate) use waker_array::WakerArray;
