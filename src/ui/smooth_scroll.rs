//! Document scroll with exponential ease-out.
//!
//! Wheel and key input move a target offset.  Each frame the visible offset
//! closes a fixed fraction of the remaining gap, so long jumps decelerate
//! visibly instead of snapping.

/// Closer than this (rows) counts as arrived.
const SNAP: f64 = 0.05;

/// Scroll-offset animator.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f64,
    target: f64,
    /// Largest reachable offset (document height minus viewport height).
    max: f64,
    /// Seconds to close half the gap.
    half_life: f64,
}

impl SmoothScroll {
    pub fn new(half_life: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            max: 0.0,
            half_life: half_life.clamp(0.01, 2.0),
        }
    }

    /// Update the scrollable range, pulling both offsets back inside it.
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(0.0);
        self.target = self.target.clamp(0.0, self.max);
        self.current = self.current.clamp(0.0, self.max);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.target + delta);
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.target = offset.clamp(0.0, self.max);
    }

    /// Advance toward the target.  Call once per frame.
    pub fn tick(&mut self, dt: f64) {
        let alpha = 1.0 - 0.5_f64.powf(dt.max(0.0) / self.half_life);
        self.current += (self.target - self.current) * alpha;
        if (self.target - self.current).abs() < SNAP {
            self.current = self.target;
        }
    }

    pub fn offset(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// True while the visible offset is still moving.
    pub fn is_animating(&self) -> bool {
        self.current != self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_clamped_to_range() {
        let mut s = SmoothScroll::new(0.1);
        s.set_max(50.0);
        s.scroll_by(-10.0);
        assert_eq!(s.target(), 0.0);
        s.scroll_to(500.0);
        assert_eq!(s.target(), 50.0);
    }

    #[test]
    fn decelerates_into_the_target() {
        let mut s = SmoothScroll::new(0.1);
        s.set_max(100.0);
        s.scroll_to(80.0);
        let mut prev_step = f64::INFINITY;
        let mut prev = s.offset();
        for _ in 0..10 {
            s.tick(1.0 / 60.0);
            let step = s.offset() - prev;
            assert!(step > 0.0 && step <= prev_step);
            assert!(s.offset() <= 80.0);
            prev_step = step;
            prev = s.offset();
        }
        for _ in 0..200 {
            s.tick(1.0 / 60.0);
        }
        assert_eq!(s.offset(), 80.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn shrinking_range_pulls_offset_back() {
        let mut s = SmoothScroll::new(0.1);
        s.set_max(100.0);
        s.scroll_to(100.0);
        for _ in 0..200 {
            s.tick(1.0 / 60.0);
        }
        s.set_max(40.0);
        assert_eq!(s.offset(), 40.0);
        assert_eq!(s.target(), 40.0);
    }
}
