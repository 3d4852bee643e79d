//! Scroll-linked animation ("scrub") with optional pinning.
//!
//! Each [`AnimationBinding`] maps a window of scroll offsets onto a value
//! range for one property of one element.  Progress is smoothed by an
//! exponential low-pass whose time constant is the binding's scrub factor,
//! so the written value trails the scroll position instead of jumping.
//!
//! A pinned binding also writes a vertical compensation equal to how far the
//! page has scrolled into the window, which holds the element still on
//! screen while its progress advances.

use super::easing::lerp;
use super::engine::FrameInput;
use super::error::EngineError;
use super::scope::Liveness;
use super::surface::{Axis, ElementId, Geometry, Write, WriteBatch};
use super::theme::ThemeMode;

/// Distance below which the smoothed progress snaps onto the raw progress.
const SNAP_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Translate(Axis),
    Rotate,
    Opacity,
    Scale,
    Position(Axis),
}

impl Property {
    fn write(self, value: f64) -> Write {
        match self {
            Property::Translate(axis) => Write::Translate(axis, value),
            Property::Rotate => Write::Rotate(value),
            Property::Opacity => Write::Opacity(value),
            Property::Scale => Write::Scale(value),
            Property::Position(axis) => Write::Position(axis, value),
        }
    }
}

// ───────────────────────────────────────── binding ───────────

/// Declarative description of one scroll-linked property.  Validated when
/// handed to [`ScrollBinder::register`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationBinding {
    pub target: ElementId,
    pub property: Property,
    /// Scroll offsets where progress is 0 and 1.
    pub progress: (f64, f64),
    pub values: (f64, f64),
    /// Replaces `values` while the light theme is active.
    pub light_values: Option<(f64, f64)>,
    pub pinned: bool,
    /// Seconds of lag; larger follows more slowly.
    pub scrub: f64,
}

impl AnimationBinding {
    pub fn new(
        target: ElementId,
        property: Property,
        progress: (f64, f64),
        values: (f64, f64),
    ) -> Self {
        Self {
            target,
            property,
            progress,
            values,
            light_values: None,
            pinned: false,
            scrub: 1.0,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn scrub(mut self, scrub: f64) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn light_values(mut self, start: f64, end: f64) -> Self {
        self.light_values = Some((start, end));
        self
    }

    fn validate(&self) -> Result<(), EngineError> {
        let (start, end) = self.progress;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(EngineError::InvalidProgressRange { start, end });
        }
        if !self.scrub.is_finite() || self.scrub <= 0.0 {
            return Err(EngineError::InvalidScrub(self.scrub));
        }
        Ok(())
    }

    /// Raw progress for a scroll offset, clamped to `[0, 1]`.
    pub fn progress_at(&self, offset: f64) -> f64 {
        let (start, end) = self.progress;
        ((offset - start) / (end - start)).clamp(0.0, 1.0)
    }

    fn values_for(&self, theme: ThemeMode) -> (f64, f64) {
        match (theme, self.light_values) {
            (ThemeMode::Light, Some(light)) => light,
            _ => self.values,
        }
    }

    /// Compensation that cancels the scroll inside the progress window.
    fn pin_offset(&self, offset: f64) -> f64 {
        let (start, end) = self.progress;
        offset.clamp(start, end) - start
    }
}

// ───────────────────────────────────────── binder ────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(usize);

#[derive(Debug)]
struct Registered {
    id: BindingId,
    binding: AnimationBinding,
    liveness: Liveness,
    /// `None` until the first frame, which starts at the raw progress.
    smoothed: Option<f64>,
}

#[derive(Debug, Default)]
pub struct ScrollBinder {
    bindings: Vec<Registered>,
    next_id: usize,
}

impl ScrollBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        binding: AnimationBinding,
        liveness: Liveness,
    ) -> Result<BindingId, EngineError> {
        binding.validate()?;
        let id = BindingId(self.next_id);
        self.next_id += 1;
        tracing::debug!(?id, element = ?binding.target, pinned = binding.pinned, "binding registered");
        self.bindings.push(Registered {
            id,
            binding,
            liveness,
            smoothed: None,
        });
        Ok(id)
    }

    pub fn unregister_all(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Compute this frame's values.  Writes go into `batch`.
    pub fn update(&mut self, input: &FrameInput, geometry: &dyn Geometry, batch: &mut WriteBatch) {
        self.bindings.retain(|b| b.liveness.is_alive());
        for reg in &mut self.bindings {
            let binding = &reg.binding;
            if geometry.layout_rect(binding.target).is_none() {
                tracing::trace!(id = ?reg.id, element = ?binding.target, "binding target missing; skipped");
                continue;
            }

            let raw = binding.progress_at(input.scroll_offset);
            let smoothed = match reg.smoothed {
                None => raw,
                Some(prev) => low_pass(prev, raw, input.dt, binding.scrub),
            };
            reg.smoothed = Some(smoothed);

            let (v0, v1) = binding.values_for(input.theme);
            batch.push(binding.target, binding.property.write(lerp(v0, v1, smoothed)));
            if binding.pinned {
                batch.push(binding.target, Write::PinOffset(binding.pin_offset(input.scroll_offset)));
            }
        }
    }
}

/// One exponential smoothing step toward `target`.
fn low_pass(current: f64, target: f64, dt: f64, time_constant: f64) -> f64 {
    let alpha = 1.0 - (-dt.max(0.0) / time_constant).exp();
    let next = current + (target - current) * alpha;
    if (target - next).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Rect;
    use crate::core::scope::SectionScope;
    use crate::core::surface::{ElementState, ElementTable};

    const DT: f64 = 1.0 / 60.0;

    fn input(offset: f64) -> FrameInput {
        FrameInput {
            dt: DT,
            scroll_offset: offset,
            ..FrameInput::default()
        }
    }

    /// Run one frame and return the last property value written for `target`.
    fn frame(binder: &mut ScrollBinder, table: &mut ElementTable, offset: f64) -> Option<f64> {
        table.set_scroll_offset(offset);
        let mut batch = WriteBatch::new();
        binder.update(&input(offset), &*table, &mut batch);
        let value = batch.iter().rev().find_map(|(_, w)| match w {
            Write::Translate(_, v) | Write::Opacity(v) => Some(*v),
            _ => None,
        });
        batch.apply(table);
        value
    }

    fn setup(binding: impl FnOnce(ElementId) -> AnimationBinding) -> (ScrollBinder, ElementTable, SectionScope) {
        let mut table = ElementTable::new();
        let el = table.insert(ElementState::new(Rect::new(0.0, 100.0, 40.0, 10.0)));
        let scope = SectionScope::new("test");
        let mut binder = ScrollBinder::new();
        binder
            .register(binding(el), scope.liveness())
            .expect("valid binding");
        (binder, table, scope)
    }

    #[test]
    fn rejects_bad_configuration() {
        let scope = SectionScope::new("test");
        let mut binder = ScrollBinder::new();
        let el = ElementId(0);
        let empty = AnimationBinding::new(el, Property::Opacity, (5.0, 5.0), (0.0, 1.0));
        assert_eq!(
            binder.register(empty, scope.liveness()),
            Err(EngineError::InvalidProgressRange { start: 5.0, end: 5.0 })
        );
        let still = AnimationBinding::new(el, Property::Opacity, (0.0, 5.0), (0.0, 1.0)).scrub(0.0);
        assert_eq!(binder.register(still, scope.liveness()), Err(EngineError::InvalidScrub(0.0)));
        assert!(binder.is_empty());
    }

    #[test]
    fn offsets_outside_the_window_clamp_to_boundary_values() {
        let (mut binder, mut table, _scope) = setup(|el| {
            AnimationBinding::new(el, Property::Translate(Axis::X), (100.0, 200.0), (0.0, -50.0)).scrub(0.5)
        });

        for offset in [-500.0, 0.0, 99.0] {
            assert_eq!(frame(&mut binder, &mut table, offset), Some(0.0));
        }

        let mut last = None;
        for _ in 0..2000 {
            last = frame(&mut binder, &mut table, 10_000.0);
            let v = last.expect("written");
            assert!((-50.0..=0.0).contains(&v), "extrapolated to {v}");
        }
        assert_eq!(last, Some(-50.0));
    }

    #[test]
    fn scrub_output_trails_and_is_monotonic() {
        let (mut binder, mut table, _scope) = setup(|el| {
            AnimationBinding::new(el, Property::Opacity, (0.0, 100.0), (0.0, 100.0)).scrub(1.0)
        });

        let mut samples = Vec::new();
        for step in 0..=60 {
            let offset = step as f64 * 100.0 / 60.0;
            samples.push(frame(&mut binder, &mut table, offset).expect("written"));
        }
        // Raw progress is 1 now, but the output is still catching up.
        assert!(*samples.last().expect("samples") < 100.0);

        let mut settled_after = None;
        for n in 0..2000 {
            let v = frame(&mut binder, &mut table, 100.0).expect("written");
            samples.push(v);
            if v == 100.0 {
                settled_after = Some(n);
                break;
            }
        }
        let settled_after = settled_after.expect("output reaches the end value");
        assert!(settled_after > 5, "jumped to the end after {settled_after} frames");
        assert!(samples.windows(2).all(|w| w[1] >= w[0]), "output went backwards");
    }

    #[test]
    fn pinned_element_holds_still_inside_the_window() {
        let (mut binder, mut table, _scope) = setup(|el| {
            AnimationBinding::new(el, Property::Translate(Axis::X), (100.0, 200.0), (0.0, -135.0))
                .pinned()
                .scrub(5.0)
        });
        let el = ElementId(0);

        frame(&mut binder, &mut table, 100.0);
        let pinned_y = table.bounding_rect(el).expect("element").y;
        for offset in (100..200).step_by(7) {
            frame(&mut binder, &mut table, offset as f64);
            let y = table.bounding_rect(el).expect("element").y;
            assert!((y - pinned_y).abs() < 1e-9, "moved to {y} at offset {offset}");
        }

        // Past the window the element scrolls away again.
        frame(&mut binder, &mut table, 260.0);
        assert!(table.bounding_rect(el).expect("element").y < pinned_y);
    }

    #[test]
    fn light_theme_uses_light_values() {
        let (mut binder, table, _scope) = setup(|el| {
            AnimationBinding::new(el, Property::Opacity, (0.0, 10.0), (0.2, 0.8)).light_values(0.5, 1.0)
        });
        let mut batch = WriteBatch::new();
        let frame_input = FrameInput {
            theme: ThemeMode::Light,
            ..input(0.0)
        };
        binder.update(&frame_input, &table, &mut batch);
        assert!(batch.iter().any(|(_, w)| *w == Write::Opacity(0.5)));
    }

    #[test]
    fn missing_targets_and_dead_sections_are_skipped() {
        let (mut binder, mut table, scope) = setup(|el| {
            AnimationBinding::new(el, Property::Opacity, (0.0, 10.0), (0.0, 1.0))
        });
        table.remove(ElementId(0));
        assert_eq!(frame(&mut binder, &mut table, 5.0), None);
        assert_eq!(binder.len(), 1);

        scope.teardown();
        frame(&mut binder, &mut table, 5.0);
        assert!(binder.is_empty());
    }

    #[test]
    fn unregister_all_clears() {
        let (mut binder, _table, _scope) = setup(|el| {
            AnimationBinding::new(el, Property::Scale, (0.0, 10.0), (1.0, 2.0))
        });
        binder.unregister_all();
        assert!(binder.is_empty());
    }
}
