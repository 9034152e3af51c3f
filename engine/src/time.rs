use std::time::Duration;

/// Per-frame timing delivered to every update: the wall-clock total since
/// the clock started and the delta since the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Time {
    pub elapsed: Duration,
    pub total: Duration,
}

/// Derives a monotonic per-frame delta from the host's total-elapsed
/// timestamps. A frame that stalls (tab in the background, debugger pause)
/// reports a clamped delta, never a multi-second step.
pub struct FrameClock {
    last_total: Option<Duration>,
    max_delta: Duration,
}

const DEFAULT_MAX_DELTA: Duration = Duration::from_secs(1);

impl FrameClock {
    pub fn new() -> FrameClock {
        FrameClock::with_max_delta(DEFAULT_MAX_DELTA)
    }

    pub fn with_max_delta(max_delta: Duration) -> FrameClock {
        FrameClock {
            last_total: None,
            max_delta,
        }
    }

    /// Fold a host timestamp into frame time. The first tick and any
    /// backwards timestamp produce a zero delta.
    pub fn tick(&mut self, total: Duration) -> Time {
        let elapsed = match self.last_total {
            Some(last) => total.saturating_sub(last).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last_total = Some(total);
        Time { elapsed, total }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        FrameClock::new()
    }
}
