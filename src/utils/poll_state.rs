/// Liveness of one input slot of a merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum PollState {
    /// No input in this slot. Never polled, never counted as live.
    None,
    /// The input may still yield values.
    Pending,
    /// The input has ended and must not be polled again.
    Consumed,
}

impl PollState {
    /// Returns `true` if the slot is [`Pending`][Self::Pending].
    #[must_use]
    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Sets the poll state to [`Consumed`][Self::Consumed].
    #[inline]
    pub(crate) fn set_consumed(&mut self) {
        *self = PollState::Consumed;
    }
}
