/// Per-frame gate deciding whether and how much of the staleness queue to flush.
///
/// Time is supplied by the caller in milliseconds; nothing here reads a clock.
#[derive(Debug, Clone)]
pub struct DrainScheduler {
    refresh_interval_ms: f64,
    drag_suppression_ms: f64,
    divisor: usize,
    drag_suppressed_until: f64,
    next_refresh_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameGate {
    /// Drag activity is recent; leave the raster alone.
    DragSuppressed,
    /// Too soon after the previous drain.
    Throttled,
    Drain,
}

impl DrainScheduler {
    pub fn new(refresh_interval_ms: f64, drag_suppression_ms: f64, divisor: usize) -> Self {
        Self {
            refresh_interval_ms,
            drag_suppression_ms,
            divisor: divisor.max(1),
            drag_suppressed_until: f64::NEG_INFINITY,
            next_refresh_at: f64::NEG_INFINITY,
        }
    }

    /// Push the drag-suppression deadline to `now + window`.
    pub fn note_drag(&mut self, now_ms: f64) {
        self.drag_suppressed_until = now_ms + self.drag_suppression_ms;
    }

    pub fn gate(&self, now_ms: f64) -> FrameGate {
        if now_ms < self.drag_suppressed_until {
            FrameGate::DragSuppressed
        } else if now_ms < self.next_refresh_at {
            FrameGate::Throttled
        } else {
            FrameGate::Drain
        }
    }

    /// Record that a drain happened at `now_ms`.
    pub fn mark_drained(&mut self, now_ms: f64) {
        self.next_refresh_at = now_ms + self.refresh_interval_ms;
    }

    /// Entries to pop this frame: a tenth of the backlog, or all of it when
    /// that rounds to zero or the game is still in its spawn phase.
    pub fn budget(&self, queued: usize, in_spawn_phase: bool) -> usize {
        let slice = queued / self.divisor;
        if slice == 0 || in_spawn_phase {
            queued
        } else {
            slice
        }
    }

    /// Forget both deadlines, as after a full repaint.
    pub fn reset(&mut self) {
        self.drag_suppressed_until = f64::NEG_INFINITY;
        self.next_refresh_at = f64::NEG_INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_drains() {
        let scheduler = DrainScheduler::new(10.0, 200.0, 10);
        assert_eq!(scheduler.gate(0.0), FrameGate::Drain);
    }

    #[test]
    fn refresh_interval_throttles() {
        let mut scheduler = DrainScheduler::new(10.0, 200.0, 10);
        scheduler.mark_drained(100.0);
        assert_eq!(scheduler.gate(105.0), FrameGate::Throttled);
        assert_eq!(scheduler.gate(110.0), FrameGate::Drain);
    }

    #[test]
    fn drag_blocks_until_window_elapses() {
        let mut scheduler = DrainScheduler::new(10.0, 200.0, 10);
        scheduler.note_drag(1_000.0);
        for t in [1_000.0, 1_100.0, 1_199.9] {
            assert_eq!(scheduler.gate(t), FrameGate::DragSuppressed, "{t}");
        }
        assert_eq!(scheduler.gate(1_200.0), FrameGate::Drain);
    }

    #[test]
    fn zero_window_disables_drag_suppression() {
        let mut scheduler = DrainScheduler::new(10.0, 0.0, 10);
        scheduler.note_drag(50.0);
        assert_eq!(scheduler.gate(50.0), FrameGate::Drain);
    }

    #[test]
    fn budget_takes_a_tenth_with_full_flush_fallback() {
        let scheduler = DrainScheduler::new(10.0, 200.0, 10);
        assert_eq!(scheduler.budget(1_000, false), 100);
        assert_eq!(scheduler.budget(25, false), 2);
        assert_eq!(scheduler.budget(9, false), 9);
        assert_eq!(scheduler.budget(0, false), 0);
        assert_eq!(scheduler.budget(1_000, true), 1_000);
    }
}
