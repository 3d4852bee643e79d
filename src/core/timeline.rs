//! Frame-driven interpolation.
//!
//! [`Tween`] is the pull-style primitive: feed it `dt` once per frame and it
//! reports the eased value, emitting [`TweenStep::Completed`] exactly once per
//! run.  [`TimelineRunner`] wraps a tween with an update callback and a
//! per-run completion callback.  Restarting or cancelling a run drops the
//! previous completion so it can never fire late, and a restart always
//! begins from the value currently on screen.

use super::easing::{lerp, Easing};
use super::scope::Liveness;

// ───────────────────────────────────────── tween ─────────────

/// Result of advancing a tween by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep {
    /// Nothing running.
    Idle,
    Running(f64),
    /// The run reached its target on this frame.
    Completed(f64),
}

#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: f64,
    easing: Easing,
    elapsed: f64,
    current: f64,
    running: bool,
}

impl Tween {
    /// A tween resting at `value` with nothing scheduled.
    pub fn at_rest(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            duration: 0.0,
            easing: Easing::Linear,
            elapsed: 0.0,
            current: value,
            running: false,
        }
    }

    pub fn new(from: f64, to: f64, duration: f64, easing: Easing) -> Self {
        let mut tween = Self::at_rest(from);
        tween.retarget(to, duration, easing);
        tween
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    /// Start a new run from the current value.  Any run in flight is
    /// abandoned without completing.
    pub fn retarget(&mut self, to: f64, duration: f64, easing: Easing) {
        self.from = self.current;
        self.to = to;
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.easing = easing;
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Stop where we are.  No completion is reported for the abandoned run.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self, dt: f64) -> TweenStep {
        self.advance(dt).0
    }

    /// Like [`tick`](Self::tick) but also returns the part of `dt` left over
    /// after the run completed (zero while still running).
    pub fn advance(&mut self, dt: f64) -> (TweenStep, f64) {
        if !self.running {
            return (TweenStep::Idle, dt.max(0.0));
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            let leftover = self.elapsed - self.duration;
            self.current = self.to;
            self.running = false;
            return (TweenStep::Completed(self.to), leftover);
        }
        let t = self.elapsed / self.duration;
        self.current = lerp(self.from, self.to, self.easing.apply(t));
        (TweenStep::Running(self.current), 0.0)
    }
}

// ───────────────────────────────────────── runner ────────────

type UpdateFn<C> = Box<dyn FnMut(f64, &mut C)>;
type CompleteFn<C> = Box<dyn FnOnce(&mut C)>;

/// A tween with callbacks.  `C` is the context handed to callbacks on every
/// tick (a write batch, a test recorder, ...).
pub struct TimelineRunner<C> {
    tween: Tween,
    on_update: UpdateFn<C>,
    on_complete: Option<CompleteFn<C>>,
    liveness: Liveness,
}

impl<C> std::fmt::Debug for TimelineRunner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineRunner")
            .field("tween", &self.tween)
            .field("pending_completion", &self.on_complete.is_some())
            .finish()
    }
}

impl<C> TimelineRunner<C> {
    pub fn new(
        initial: f64,
        liveness: Liveness,
        on_update: impl FnMut(f64, &mut C) + 'static,
    ) -> Self {
        Self {
            tween: Tween::at_rest(initial),
            on_update: Box::new(on_update),
            on_complete: None,
            liveness,
        }
    }

    pub fn value(&self) -> f64 {
        self.tween.value()
    }

    /// Start a run toward `to`.  Replaces any run in flight along with its
    /// completion callback.
    pub fn start(&mut self, to: f64, duration: f64, easing: Easing) {
        self.start_then(to, duration, easing, None);
    }

    pub fn start_then(
        &mut self,
        to: f64,
        duration: f64,
        easing: Easing,
        on_complete: Option<CompleteFn<C>>,
    ) {
        if self.on_complete.take().is_some() {
            tracing::trace!("timeline restarted; previous completion dropped");
        }
        self.tween.retarget(to, duration, easing);
        self.on_complete = on_complete;
    }

    pub fn cancel(&mut self) {
        self.tween.cancel();
        self.on_complete = None;
    }

    /// Advance one frame.  A runner whose section is gone cancels itself
    /// and does nothing.
    pub fn tick(&mut self, dt: f64, ctx: &mut C) {
        if !self.liveness.is_alive() {
            self.cancel();
            return;
        }
        match self.tween.tick(dt) {
            TweenStep::Idle => {}
            TweenStep::Running(v) => (self.on_update)(v, ctx),
            TweenStep::Completed(v) => {
                (self.on_update)(v, ctx);
                if let Some(done) = self.on_complete.take() {
                    done(ctx);
                }
            }
        }
    }
}
