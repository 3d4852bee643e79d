//! Pointer tracking: an eased custom cursor, a slower cursor-following arrow
//! and hover regions.
//!
//! The raw pointer position is sampled once per frame.  The cursor eases
//! toward it with an exponential half-life; the arrow does the same with a
//! longer half-life, in the coordinate space of the arrow zone it lives in.
//! Hover is recomputed every frame and reported as enter/leave transitions,
//! exactly once per change.

use super::easing::Easing;
use super::engine::FrameInput;
use super::error::EngineError;
use super::geometry::Vec2;
use super::scope::Liveness;
use super::surface::{Axis, ElementId, Geometry, Write, WriteBatch};
use super::timeline::TimelineRunner;

/// Distance below which a follower snaps onto its target.
const SNAP_DISTANCE: f64 = 0.01;

const CURSOR_HOVER_SCALE: f64 = 1.5;
const CURSOR_FADE: f64 = 0.3;
const ARROW_FADE: f64 = 0.5;
const ARROW_HIDDEN_SCALE: f64 = 0.8;
const ARROW_SHOWN_SCALE: f64 = 5.0;
const STRETCH_SCALE: f64 = 3.1;
const STRETCH_TIME: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerConfig {
    /// Seconds for the cursor to close half the distance to the pointer.
    pub cursor_half_life: f64,
    /// Same for the arrow.  Should be slower than the cursor.
    pub arrow_half_life: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            cursor_half_life: 0.5,
            arrow_half_life: 1.0,
        }
    }
}

// ───────────────────────────────────────── regions ───────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Links and buttons; the cursor grows while over them.
    Interactive,
    /// Shows the arrow and hides the cursor.
    ArrowZone,
    /// The element itself stretches while hovered.
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverRegion {
    pub element: ElementId,
    pub kind: RegionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEdge {
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTransition {
    pub region: RegionId,
    pub element: ElementId,
    pub edge: HoverEdge,
}

#[derive(Debug)]
struct Registered {
    id: RegionId,
    region: HoverRegion,
    liveness: Liveness,
    /// Scale tween of a `Stretch` region's own element.
    stretch: Option<TimelineRunner<WriteBatch>>,
}

// ───────────────────────────────────────── state ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub raw: Vec2,
    pub smoothed: Vec2,
    pub hovered: Option<RegionId>,
}

pub struct PointerTracker {
    state: PointerState,
    seen_pointer: bool,
    primed: bool,
    config: PointerConfig,
    cursor: ElementId,
    arrow: ElementId,
    /// Arrow position relative to its zone, and where it is heading.
    arrow_pos: Vec2,
    arrow_target: Vec2,
    regions: Vec<Registered>,
    next_region: usize,
    cursor_scale: TimelineRunner<WriteBatch>,
    cursor_opacity: TimelineRunner<WriteBatch>,
    arrow_opacity: TimelineRunner<WriteBatch>,
    arrow_scale: TimelineRunner<WriteBatch>,
}

impl std::fmt::Debug for PointerTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerTracker")
            .field("state", &self.state)
            .field("regions", &self.regions.len())
            .finish_non_exhaustive()
    }
}

impl PointerTracker {
    pub fn new(
        cursor: ElementId,
        arrow: ElementId,
        config: PointerConfig,
        liveness: Liveness,
    ) -> Result<Self, EngineError> {
        for half_life in [config.cursor_half_life, config.arrow_half_life] {
            if !half_life.is_finite() || half_life <= 0.0 {
                return Err(EngineError::InvalidHalfLife(half_life));
            }
        }
        Ok(Self {
            state: PointerState::default(),
            seen_pointer: false,
            primed: false,
            config,
            cursor,
            arrow,
            arrow_pos: Vec2::ZERO,
            arrow_target: Vec2::ZERO,
            regions: Vec::new(),
            next_region: 0,
            cursor_scale: TimelineRunner::new(1.0, liveness.clone(), move |v, batch: &mut WriteBatch| {
                batch.push(cursor, Write::Scale(v))
            }),
            cursor_opacity: TimelineRunner::new(1.0, liveness.clone(), move |v, batch: &mut WriteBatch| {
                batch.push(cursor, Write::Opacity(v))
            }),
            arrow_opacity: TimelineRunner::new(0.0, liveness.clone(), move |v, batch: &mut WriteBatch| {
                batch.push(arrow, Write::Opacity(v))
            }),
            arrow_scale: TimelineRunner::new(ARROW_HIDDEN_SCALE, liveness, move |v, batch: &mut WriteBatch| {
                batch.push(arrow, Write::Scale(v))
            }),
        })
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn cursor_opacity(&self) -> f64 {
        self.cursor_opacity.value()
    }

    pub fn cursor_scale(&self) -> f64 {
        self.cursor_scale.value()
    }

    pub fn arrow_opacity(&self) -> f64 {
        self.arrow_opacity.value()
    }

    pub fn arrow_position(&self) -> Vec2 {
        self.arrow_pos
    }

    /// Record the latest pointer position.  The first sample places the
    /// cursor directly under the pointer.
    pub fn on_pointer_move(&mut self, pos: Vec2) {
        self.state.raw = pos;
        if !self.seen_pointer {
            self.seen_pointer = true;
            self.state.smoothed = pos;
        }
    }

    pub fn register_hover_region(&mut self, region: HoverRegion, liveness: Liveness) -> RegionId {
        let id = RegionId(self.next_region);
        self.next_region += 1;
        let element = region.element;
        let stretch = (region.kind == RegionKind::Stretch).then(|| {
            TimelineRunner::new(1.0, liveness.clone(), move |v, batch: &mut WriteBatch| {
                batch.push(element, Write::Scale(v))
            })
        });
        self.regions.push(Registered {
            id,
            region,
            liveness,
            stretch,
        });
        id
    }

    pub fn unregister_all(&mut self) {
        self.regions.clear();
        if self.state.hovered.take().is_some() {
            self.restore_idle_effects();
        }
    }

    /// One frame: ease the followers, recompute hover, advance hover tweens.
    pub fn update(
        &mut self,
        input: &FrameInput,
        geometry: &dyn Geometry,
        batch: &mut WriteBatch,
    ) -> Vec<HoverTransition> {
        if !self.primed {
            self.primed = true;
            batch.push(self.cursor, Write::Opacity(self.cursor_opacity.value()));
            batch.push(self.cursor, Write::Scale(self.cursor_scale.value()));
            batch.push(self.arrow, Write::Opacity(self.arrow_opacity.value()));
            batch.push(self.arrow, Write::Scale(self.arrow_scale.value()));
        }

        let mut transitions = Vec::new();
        self.prune_dead_regions();
        if self.seen_pointer {
            self.state.smoothed = ease_toward(
                self.state.smoothed,
                self.state.raw,
                input.dt,
                self.config.cursor_half_life,
            );
            self.recompute_hover(geometry, &mut transitions);
        }

        self.arrow_pos = ease_toward(
            self.arrow_pos,
            self.arrow_target,
            input.dt,
            self.config.arrow_half_life,
        );

        self.cursor_scale.tick(input.dt, batch);
        self.cursor_opacity.tick(input.dt, batch);
        self.arrow_opacity.tick(input.dt, batch);
        self.arrow_scale.tick(input.dt, batch);
        for runner in self.regions.iter_mut().filter_map(|r| r.stretch.as_mut()) {
            runner.tick(input.dt, batch);
        }

        if self.seen_pointer {
            if let Some(rect) = geometry.layout_rect(self.cursor) {
                batch.push(self.cursor, Write::Position(Axis::X, self.state.smoothed.x - rect.width / 2.0));
                batch.push(self.cursor, Write::Position(Axis::Y, self.state.smoothed.y - rect.height / 2.0));
            }
        }
        if let Some(rect) = geometry.layout_rect(self.arrow) {
            batch.push(self.arrow, Write::Position(Axis::X, self.arrow_pos.x - rect.width / 2.0));
            batch.push(self.arrow, Write::Position(Axis::Y, self.arrow_pos.y - rect.height / 2.0));
        }

        transitions
    }

    /// Drop regions whose section is gone.  A hovered dead region loses its
    /// effects without reporting a leave.
    fn prune_dead_regions(&mut self) {
        let hovered = self.state.hovered;
        let mut lost_hovered = false;
        self.regions.retain(|r| {
            let alive = r.liveness.is_alive();
            if !alive && Some(r.id) == hovered {
                lost_hovered = true;
            }
            alive
        });
        if lost_hovered {
            self.state.hovered = None;
            self.restore_idle_effects();
        }
    }

    fn recompute_hover(&mut self, geometry: &dyn Geometry, out: &mut Vec<HoverTransition>) {
        let pointer = self.state.raw;
        // Later registrations sit on top.
        let under = self
            .regions
            .iter()
            .rev()
            .find(|r| {
                geometry
                    .bounding_rect(r.region.element)
                    .is_some_and(|rect| rect.contains(pointer))
            })
            .map(|r| (r.id, r.region));

        if let Some((_, region)) = under {
            if region.kind == RegionKind::ArrowZone {
                if let Some(rect) = geometry.bounding_rect(region.element) {
                    self.arrow_target = pointer - rect.origin();
                }
            }
        }

        let previous = self.state.hovered;
        let current = under.map(|(id, _)| id);
        if previous == current {
            return;
        }

        if let Some(prev_id) = previous {
            let prev_region = self.regions.iter().find(|r| r.id == prev_id).map(|r| r.region);
            if let Some(region) = prev_region {
                self.leave_effects(region.kind);
                self.stretch(prev_id, 1.0);
                out.push(HoverTransition {
                    region: prev_id,
                    element: region.element,
                    edge: HoverEdge::Leave,
                });
            }
        }
        if let Some((id, region)) = under {
            // A hidden arrow reappears where the pointer entered.
            if region.kind == RegionKind::ArrowZone && self.arrow_opacity.value() == 0.0 {
                self.arrow_pos = self.arrow_target;
            }
            self.enter_effects(region.kind);
            self.stretch(id, STRETCH_SCALE);
            out.push(HoverTransition {
                region: id,
                element: region.element,
                edge: HoverEdge::Enter,
            });
        }
        self.state.hovered = current;
    }

    fn enter_effects(&mut self, kind: RegionKind) {
        match kind {
            RegionKind::Interactive => {
                self.cursor_scale.start(CURSOR_HOVER_SCALE, CURSOR_FADE, Easing::Power2Out);
            }
            RegionKind::ArrowZone => {
                self.arrow_opacity.start(1.0, ARROW_FADE, Easing::Power2Out);
                self.arrow_scale.start(ARROW_SHOWN_SCALE, ARROW_FADE, Easing::Power2Out);
                self.cursor_opacity.start(0.0, CURSOR_FADE, Easing::Power2Out);
            }
            RegionKind::Stretch => {}
        }
    }

    fn leave_effects(&mut self, kind: RegionKind) {
        match kind {
            RegionKind::Interactive => {
                self.cursor_scale.start(1.0, CURSOR_FADE, Easing::Power2Out);
            }
            RegionKind::ArrowZone => {
                self.arrow_opacity.start(0.0, ARROW_FADE, Easing::Power2In);
                self.arrow_scale.start(ARROW_HIDDEN_SCALE, ARROW_FADE, Easing::Power2In);
                self.cursor_opacity.start(1.0, CURSOR_FADE, Easing::Power2Out);
            }
            RegionKind::Stretch => {}
        }
    }

    fn stretch(&mut self, id: RegionId, to: f64) {
        let runner = self
            .regions
            .iter_mut()
            .find(|r| r.id == id)
            .and_then(|r| r.stretch.as_mut());
        if let Some(runner) = runner {
            runner.start(to, STRETCH_TIME, Easing::Power2InOut);
        }
    }

    fn restore_idle_effects(&mut self) {
        self.leave_effects(RegionKind::Interactive);
        self.leave_effects(RegionKind::ArrowZone);
    }
}

/// One exponential step of `from` toward `to`.  Never overshoots.
fn ease_toward(from: Vec2, to: Vec2, dt: f64, half_life: f64) -> Vec2 {
    let alpha = 1.0 - 0.5_f64.powf(dt.max(0.0) / half_life);
    let next = from + (to - from) * alpha;
    if next.distance(to) < SNAP_DISTANCE {
        to
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

    struct Rig {
        table: ElementTable,
        tracker: PointerTracker,
        link: ElementId,
        zone: ElementId,
        scope: SectionScope,
    }

    fn rig() -> Rig {
        let mut table = ElementTable::new();
        let cursor = table.insert(ElementState::new(Rect::new(0.0, 0.0, 2.0, 2.0)).fixed());
        let link = table.insert(ElementState::new(Rect::new(10.0, 0.0, 10.0, 2.0)));
        let zone = table.insert(ElementState::new(Rect::new(0.0, 20.0, 80.0, 20.0)));
        let arrow = table.insert(ElementState::new(Rect::new(0.0, 0.0, 4.0, 2.0)).child_of(zone));
        let scope = SectionScope::new("page");
        let mut tracker =
            PointerTracker::new(cursor, arrow, PointerConfig::default(), scope.liveness()).expect("config");
        tracker.register_hover_region(
            HoverRegion {
                element: link,
                kind: RegionKind::Interactive,
            },
            scope.liveness(),
        );
        tracker.register_hover_region(
            HoverRegion {
                element: zone,
                kind: RegionKind::ArrowZone,
            },
            scope.liveness(),
        );
        Rig {
            table,
            tracker,
            link,
            zone,
            scope,
        }
    }

    fn step(rig: &mut Rig) -> Vec<HoverTransition> {
        let mut batch = WriteBatch::new();
        let input = FrameInput {
            dt: DT,
            ..FrameInput::default()
        };
        let transitions = rig.tracker.update(&input, &rig.table, &mut batch);
        batch.apply(&mut rig.table);
        transitions
    }

    #[test]
    fn rejects_non_positive_half_life() {
        let config = PointerConfig {
            cursor_half_life: 0.0,
            ..PointerConfig::default()
        };
        let err = PointerTracker::new(ElementId(0), ElementId(1), config, Liveness::forever()).unwrap_err();
        assert_eq!(err, EngineError::InvalidHalfLife(0.0));
    }

    #[test]
    fn smoothed_position_converges_monotonically_without_overshoot() {
        let mut rig = rig();
        rig.tracker.on_pointer_move(Vec2::new(0.0, 10.0));
        step(&mut rig);
        let target = Vec2::new(60.0, 15.0);
        rig.tracker.on_pointer_move(target);

        let mut last = rig.tracker.state().smoothed.distance(target);
        let mut frames = 0;
        while rig.tracker.state().smoothed != target {
            step(&mut rig);
            let smoothed = rig.tracker.state().smoothed;
            let d = smoothed.distance(target);
            assert!(d < last, "distance grew from {last} to {d}");
            assert!(smoothed.x <= target.x && smoothed.y <= target.y, "overshot to {smoothed:?}");
            last = d;
            frames += 1;
            assert!(frames < 1000, "did not converge");
        }
    }

    #[test]
    fn arrow_follows_more_slowly_than_cursor() {
        let mut rig = rig();
        rig.tracker.on_pointer_move(Vec2::new(5.0, 25.0));
        step(&mut rig);
        rig.tracker.on_pointer_move(Vec2::new(70.0, 35.0));
        for _ in 0..20 {
            step(&mut rig);
        }
        let raw = rig.tracker.state().raw;
        let cursor_gap = rig.tracker.state().smoothed.distance(raw);
        // Arrow coordinates are relative to the zone origin (0, 20).
        let arrow_gap = rig.tracker.arrow_position().distance(raw - Vec2::new(0.0, 20.0));
        assert!(arrow_gap > cursor_gap);
    }

    #[test]
    fn enter_and_leave_fire_once_per_transition() {
        let mut rig = rig();
        rig.tracker.on_pointer_move(Vec2::new(15.0, 1.0));
        let first = step(&mut rig);
        assert_eq!(first.len(), 1);
        assert_eq!((first[0].element, first[0].edge), (rig.link, HoverEdge::Enter));

        for _ in 0..30 {
            assert!(step(&mut rig).is_empty(), "repeat firing while hovered");
        }
        assert!((rig.tracker.cursor_scale() - CURSOR_HOVER_SCALE).abs() < 1e-9);

        rig.tracker.on_pointer_move(Vec2::new(15.0, 25.0));
        let moved = step(&mut rig);
        assert_eq!(
            moved.iter().map(|t| (t.element, t.edge)).collect::<Vec<_>>(),
            vec![(rig.link, HoverEdge::Leave), (rig.zone, HoverEdge::Enter)]
        );
    }

    #[test]
    fn cursor_and_arrow_are_never_both_fully_visible() {
        let mut rig = rig();
        let outside = Vec2::new(50.0, 5.0);
        let inside = Vec2::new(40.0, 30.0);
        rig.tracker.on_pointer_move(outside);
        // Flip in and out at uneven intervals, including mid-fade reversals.
        for (i, hold) in [3, 40, 5, 2, 60, 1, 45, 8].iter().enumerate() {
            rig.tracker.on_pointer_move(if i % 2 == 0 { inside } else { outside });
            for _ in 0..*hold {
                step(&mut rig);
                let both = rig.tracker.cursor_opacity() >= 1.0 && rig.tracker.arrow_opacity() >= 1.0;
                assert!(!both, "cursor and arrow both fully visible");
            }
        }
    }

    #[test]
    fn arrow_fades_in_inside_zone_and_out_after() {
        let mut rig = rig();
        rig.tracker.on_pointer_move(Vec2::new(40.0, 30.0));
        for _ in 0..40 {
            step(&mut rig);
        }
        assert_eq!(rig.tracker.arrow_opacity(), 1.0);
        assert_eq!(rig.tracker.cursor_opacity(), 0.0);

        rig.tracker.on_pointer_move(Vec2::new(50.0, 5.0));
        for _ in 0..40 {
            step(&mut rig);
        }
        assert_eq!(rig.tracker.arrow_opacity(), 0.0);
        assert_eq!(rig.tracker.cursor_opacity(), 1.0);
    }

    #[test]
    fn stretch_region_scales_its_own_element_while_hovered() {
        let mut rig = rig();
        let letter = rig.table.insert(ElementState::new(Rect::new(30.0, 0.0, 1.0, 1.0)).fixed());
        rig.tracker.register_hover_region(
            HoverRegion {
                element: letter,
                kind: RegionKind::Stretch,
            },
            rig.scope.liveness(),
        );
        let scale = |rig: &Rig| rig.table.get(letter).expect("letter").scale;

        rig.tracker.on_pointer_move(Vec2::new(30.5, 0.5));
        for _ in 0..30 {
            step(&mut rig);
        }
        assert!((scale(&rig) - STRETCH_SCALE).abs() < 1e-9);
        assert_eq!(rig.tracker.cursor_scale(), 1.0);

        rig.tracker.on_pointer_move(Vec2::new(50.0, 5.0));
        for _ in 0..30 {
            step(&mut rig);
        }
        assert!((scale(&rig) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn torn_down_regions_report_nothing() {
        let mut rig = rig();
        rig.tracker.on_pointer_move(Vec2::new(15.0, 1.0));
        assert_eq!(step(&mut rig).len(), 1);
        rig.scope.teardown();
        rig.tracker.on_pointer_move(Vec2::new(40.0, 30.0));
        assert!(step(&mut rig).is_empty());
        assert_eq!(rig.tracker.state().hovered, None);
    }
}
