use std::time::Duration;

/// A one-shot countdown driven by the host's frame clock.
///
/// The game owns these as plain values, so dropping one cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    elapsed: Duration,
    limit: Duration,
    fired: bool,
}

impl Countdown {
    pub fn new(limit: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            limit,
            fired: false,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed)
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }

    /// Advances by `dt` and returns true when this tick reached the limit.
    /// A finished countdown never fires again.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt).min(self.limit);
        self.fired = self.elapsed >= self.limit;
        self.fired
    }
}

/// Ticks an optional countdown, clearing the slot when it fires.
pub(crate) fn tick_slot(slot: &mut Option<Countdown>, dt: Duration) -> bool {
    let fired = slot.as_mut().is_some_and(|countdown| countdown.tick(dt));
    if fired {
        *slot = None;
    }
    fired
}
