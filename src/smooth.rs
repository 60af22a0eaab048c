//! Majority-vote label smoothing.
//!
//! Detector-derived labels (Left/Right hand identity) flicker frame to
//! frame. Each tracked-subject slot keeps a fixed-capacity FIFO window of
//! raw labels and reports the plurality winner. Slots are allocated lazily
//! as subjects appear and never torn down; subject count is small and
//! bounded (two hands), so the staleness is acceptable.

use std::collections::VecDeque;

pub const DEFAULT_WINDOW: usize = 5;

/// Rolling per-slot label windows with majority-vote readout.
#[derive(Debug)]
pub struct LabelSmoother {
    capacity: usize,
    windows: Vec<VecDeque<String>>,
}

impl LabelSmoother {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: Vec::new(),
        }
    }

    /// Record `label` for `slot` and return the current plurality winner.
    ///
    /// Ties break toward the label seen earliest in the window, matching
    /// stable first-seen counting order.
    pub fn observe(&mut self, slot: usize, label: &str) -> String {
        while self.windows.len() <= slot {
            self.windows.push(VecDeque::with_capacity(self.capacity));
        }
        let window = &mut self.windows[slot];
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(label.to_string());

        // First-seen order, so equal counts resolve stably.
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for entry in window.iter() {
            match counts.iter_mut().find(|(seen, _)| *seen == entry.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.as_str(), 1)),
            }
        }
        let mut best = counts[0];
        for candidate in &counts[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        best.0.to_string()
    }

    pub fn slot_count(&self) -> usize {
        self.windows.len()
    }
}

impl Default for LabelSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurality_holds_through_flicker() {
        let mut smoother = LabelSmoother::new(5);
        let sequence = ["Left", "Left", "Right", "Left", "Left"];
        let mut outputs = Vec::new();
        for label in sequence {
            outputs.push(smoother.observe(0, label));
        }
        assert_eq!(outputs, vec!["Left", "Left", "Left", "Left", "Left"]);
    }

    #[test]
    fn fresh_window_follows_early_majority() {
        let mut smoother = LabelSmoother::new(5);
        assert_eq!(smoother.observe(0, "Right"), "Right");
        assert_eq!(smoother.observe(0, "Right"), "Right");
        assert_eq!(smoother.observe(0, "Left"), "Right");
    }

    #[test]
    fn tie_breaks_to_first_seen() {
        let mut smoother = LabelSmoother::new(4);
        smoother.observe(0, "Left");
        smoother.observe(0, "Right");
        smoother.observe(0, "Right");
        assert_eq!(smoother.observe(0, "Left"), "Left");
    }

    #[test]
    fn window_evicts_oldest() {
        let mut smoother = LabelSmoother::new(3);
        smoother.observe(0, "Left");
        smoother.observe(0, "Left");
        smoother.observe(0, "Right");
        smoother.observe(0, "Right");
        // Window is now [Left, Right, Right].
        assert_eq!(smoother.observe(0, "Right"), "Right");
    }

    #[test]
    fn slots_allocate_lazily_and_stay_independent() {
        let mut smoother = LabelSmoother::new(5);
        assert_eq!(smoother.slot_count(), 0);
        assert_eq!(smoother.observe(1, "Right"), "Right");
        assert_eq!(smoother.slot_count(), 2);
        assert_eq!(smoother.observe(0, "Left"), "Left");
        assert_eq!(smoother.observe(1, "Right"), "Right");
    }
}
