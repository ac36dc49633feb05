//! Stall counting.

/// Counts consecutive cycles without forward progress.
///
/// A cycle stalls when the progress ledger reports no progress, reports a
/// loop, or the previously dispatched turn failed. Any other cycle resets
/// the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallCounter {
    count: u32,
    max_stalls: u32,
}

impl StallCounter {
    pub fn new(max_stalls: u32) -> Self {
        Self {
            count: 0,
            max_stalls,
        }
    }

    /// Record one evaluated cycle and return the updated count.
    pub fn observe(&mut self, stalled: bool) -> u32 {
        if stalled {
            self.count += 1;
        } else {
            self.count = 0;
        }
        self.count
    }

    /// Whether the count has reached the replanning threshold.
    pub fn should_replan(&self) -> bool {
        self.count >= self.max_stalls
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max_stalls(&self) -> u32 {
        self.max_stalls
    }
}
