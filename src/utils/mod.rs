//! Utilities shared by the merge implementations.

#[cfg(feature = "buffered")]
mod barrier;
mod pin;
mod poll_state;
mod rng;
mod wakers;

#[cfg(feature = "buffered")]
pub(crate) use barrier::Barrier;
pub(crate) use pin::{get_pin_mut, get_pin_mut_from_vec};
pub(crate) use poll_state::PollState;
pub(crate) use rng::rotation;
pub(crate) use wakers::WakerArray;
