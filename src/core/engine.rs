//! The per-frame tick.
//!
//! [`Engine::frame`] runs in three strictly ordered steps:
//!
//! 1. **sample**: the frame's inputs are captured into a [`FrameInput`] and
//!    handed to every component;
//! 2. **compute**: components read geometry and push [`Write`]s into one
//!    shared [`WriteBatch`], nothing touches the surface;
//! 3. **write**: the batch is applied to the surface in one go.
//!
//! No component can observe a value written in the same frame.
//!
//! [`Write`]: super::surface::Write

use super::drag::{DragConfig, DragController, DragId, PointerId};
use super::error::EngineError;
use super::geometry::Vec2;
use super::intro::{IntroSequencer, IntroStatus};
use super::pointer::{HoverTransition, PointerConfig, PointerTracker};
use super::scope::Liveness;
use super::scroll::ScrollBinder;
use super::surface::{ElementId, Geometry, Surface, WriteBatch};
use super::theme::ThemeMode;

/// Everything a frame reads from the outside world, captured once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f64,
    pub scroll_offset: f64,
    /// Latest pointer position, if it moved since the previous frame.
    pub pointer: Option<Vec2>,
    pub theme: ThemeMode,
}

#[derive(Debug, Default)]
pub struct FrameReport {
    pub transitions: Vec<HoverTransition>,
    /// The intro finished on this frame (its completion already ran).
    pub intro_finished: bool,
    pub writes_applied: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    pub pointer: PointerConfig,
    pub drag: DragConfig,
}

#[derive(Debug)]
pub struct Engine {
    pub scroll: ScrollBinder,
    pub pointer: PointerTracker,
    pub drag: DragController,
    intro: Option<IntroSequencer>,
    elapsed: f64,
}

impl Engine {
    /// `cursor` and `arrow` are the two pointer-follower elements.  They live
    /// for the whole program.
    pub fn new(cursor: ElementId, arrow: ElementId, config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            scroll: ScrollBinder::new(),
            pointer: PointerTracker::new(cursor, arrow, config.pointer, Liveness::forever())?,
            drag: DragController::new(config.drag)?,
            intro: None,
            elapsed: 0.0,
        })
    }

    pub fn play_intro(&mut self, intro: IntroSequencer) {
        if let Some(mut old) = self.intro.replace(intro) {
            old.teardown();
        }
    }

    pub fn intro(&self) -> Option<&IntroSequencer> {
        self.intro.as_ref()
    }

    /// Abandon the intro without running its completion.
    pub fn skip_intro(&mut self) {
        if let Some(mut intro) = self.intro.take() {
            intro.teardown();
        }
    }

    /// Drop every registration at once: bindings, hover regions,
    /// draggables and any intro still playing.
    pub fn unregister_all(&mut self) {
        let bindings = self.scroll.len();
        self.scroll.unregister_all();
        self.pointer.unregister_all();
        self.drag.unregister_all();
        self.skip_intro();
        tracing::debug!(bindings, "engine registrations cleared");
    }

    // ── drag input, stamped with engine time ────────────────────

    pub fn pointer_down(&mut self, pointer: PointerId, pos: Vec2, geometry: &dyn Geometry) -> Option<DragId> {
        self.drag.pointer_down(pointer, pos, self.elapsed, geometry)
    }

    pub fn pointer_drag(&mut self, pointer: PointerId, pos: Vec2, geometry: &dyn Geometry) {
        self.drag.pointer_move(pointer, pos, self.elapsed, geometry);
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        self.drag.pointer_up(pointer, self.elapsed);
    }

    // ── frame ───────────────────────────────────────────────────

    pub fn frame<S: Surface>(&mut self, input: FrameInput, surface: &mut S) -> FrameReport {
        // Sample.
        self.elapsed += input.dt.max(0.0);
        if let Some(pos) = input.pointer {
            self.pointer.on_pointer_move(pos);
        }

        // Compute.
        let mut batch = WriteBatch::new();
        let mut report = FrameReport::default();
        {
            let geometry: &dyn Geometry = &*surface;
            self.scroll.update(&input, geometry, &mut batch);
            report.transitions = self.pointer.update(&input, geometry, &mut batch);
            self.drag.update(input.dt, geometry, &mut batch);
        }
        if let Some(intro) = &mut self.intro {
            intro.tick(input.dt, &mut batch);
            if !intro.is_playing() {
                report.intro_finished = intro.status() == IntroStatus::Complete;
                self.intro = None;
            }
        }

        // Write.
        report.writes_applied = batch.apply(surface);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Rect;
    use crate::core::intro::IntroPhase;
    use crate::core::pointer::{HoverEdge, HoverRegion, RegionKind};
    use crate::core::scope::SectionScope;
    use crate::core::scroll::{AnimationBinding, Property};
    use crate::core::surface::{Axis, ElementState, ElementTable, Write};
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    /// Counts geometry reads that happen after the first write of a frame.
    struct Auditing {
        table: ElementTable,
        writing: Cell<bool>,
        late_reads: Cell<usize>,
    }

    impl Geometry for Auditing {
        fn layout_rect(&self, id: ElementId) -> Option<Rect> {
            if self.writing.get() {
                self.late_reads.set(self.late_reads.get() + 1);
            }
            self.table.layout_rect(id)
        }
    }

    impl Surface for Auditing {
        fn apply(&mut self, id: ElementId, write: Write) -> Result<(), EngineError> {
            self.writing.set(true);
            self.table.apply(id, write)
        }
    }

    struct Stage {
        surface: Auditing,
        engine: Engine,
        title: ElementId,
        link: ElementId,
        letter: ElementId,
        label: ElementId,
        scope: SectionScope,
    }

    fn stage() -> Stage {
        let mut table = ElementTable::new();
        let cursor = table.insert(ElementState::new(Rect::new(0.0, 0.0, 2.0, 2.0)).fixed());
        let arrow = table.insert(ElementState::new(Rect::new(0.0, 0.0, 4.0, 2.0)).with_opacity(0.0));
        let title = table.insert(ElementState::new(Rect::new(0.0, 100.0, 60.0, 10.0)));
        let link = table.insert(ElementState::new(Rect::new(50.0, 0.0, 10.0, 2.0)).fixed());
        let hero = table.insert(ElementState::new(Rect::new(0.0, 0.0, 100.0, 40.0)));
        let letter = table.insert(ElementState::new(Rect::new(10.0, 10.0, 5.0, 5.0)).child_of(hero));
        let label = table.insert(ElementState::new(Rect::new(40.0, 20.0, 20.0, 1.0)).fixed());

        let scope = SectionScope::new("stage");
        let mut engine = Engine::new(cursor, arrow, EngineConfig::default()).expect("defaults are valid");
        engine
            .scroll
            .register(
                AnimationBinding::new(title, Property::Translate(Axis::X), (100.0, 200.0), (0.0, -81.0))
                    .pinned()
                    .scrub(0.2),
                scope.liveness(),
            )
            .expect("valid binding");
        engine.pointer.register_hover_region(
            HoverRegion {
                element: link,
                kind: RegionKind::Interactive,
            },
            scope.liveness(),
        );
        engine.drag.make_draggable(letter, hero, scope.liveness());

        Stage {
            surface: Auditing {
                table,
                writing: Cell::new(false),
                late_reads: Cell::new(0),
            },
            engine,
            title,
            link,
            letter,
            label,
            scope,
        }
    }

    fn run(stage: &mut Stage, input: FrameInput) -> FrameReport {
        stage.surface.writing.set(false);
        stage.surface.table.set_scroll_offset(input.scroll_offset);
        stage.engine.frame(input, &mut stage.surface)
    }

    #[test]
    fn geometry_is_never_read_after_writes_begin() {
        let mut stage = stage();
        for i in 0..120 {
            let input = FrameInput {
                dt: DT,
                scroll_offset: i as f64 * 2.0,
                pointer: Some(Vec2::new(55.0, 1.0)),
                ..FrameInput::default()
            };
            let report = run(&mut stage, input);
            assert!(report.writes_applied > 0);
        }
        assert_eq!(stage.surface.late_reads.get(), 0);
    }

    #[test]
    fn one_frame_drives_every_component() {
        let mut stage = stage();
        let report = run(
            &mut stage,
            FrameInput {
                dt: DT,
                scroll_offset: 150.0,
                pointer: Some(Vec2::new(55.0, 1.0)),
                ..FrameInput::default()
            },
        );

        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions[0].element, stage.link);
        assert_eq!(report.transitions[0].edge, HoverEdge::Enter);
        let title = stage.surface.table.get(stage.title).expect("title");
        assert_eq!(title.pin_offset, 50.0);
        assert!(title.translate.x < 0.0);
    }

    #[test]
    fn drag_input_uses_engine_time() {
        let mut stage = stage();
        run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });
        let pointer = PointerId(1);
        let grabbed = stage
            .engine
            .pointer_down(pointer, Vec2::new(12.0, 12.0), &stage.surface.table);
        assert!(grabbed.is_some());
        for step in 1..=5 {
            stage
                .engine
                .pointer_drag(pointer, Vec2::new(12.0 + step as f64 * 4.0, 12.0), &stage.surface.table);
            run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });
        }
        stage.engine.pointer_up(pointer);
        for _ in 0..600 {
            run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });
        }
        let letter = stage.surface.table.get(stage.letter).expect("letter");
        assert!(letter.drag_offset.x > 0.0);
        assert!(!letter.affordance);
        assert!(!stage.engine.drag.is_active());
    }

    fn intro(stage: &Stage, fired: &Rc<Cell<u32>>) -> IntroSequencer {
        let fired = Rc::clone(fired);
        IntroSequencer::new(
            vec![IntroPhase::new("HELLO", 0.1, 0.1, 0.1), IntroPhase::new("PORTFOLIO", 0.1, 0.1, 0.1)],
            stage.label,
            stage.scope.liveness(),
            move || fired.set(fired.get() + 1),
        )
        .expect("valid phases")
    }

    #[test]
    fn intro_completion_is_reported_once() {
        let mut stage = stage();
        let fired = Rc::new(Cell::new(0));
        let seq = intro(&stage, &fired);
        stage.engine.play_intro(seq);

        let mut finished = 0;
        for _ in 0..120 {
            if run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() }).intro_finished {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(fired.get(), 1);
        assert!(stage.engine.intro().is_none());
        assert_eq!(stage.surface.table.get(stage.label).map(|e| e.opacity), Some(0.0));
    }

    #[test]
    fn skipped_intro_never_completes() {
        let mut stage = stage();
        let fired = Rc::new(Cell::new(0));
        let seq = intro(&stage, &fired);
        stage.engine.play_intro(seq);
        run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });
        stage.engine.skip_intro();
        for _ in 0..120 {
            assert!(!run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() }).intro_finished);
        }
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn unregister_all_releases_every_registration() {
        let mut stage = stage();
        let fired = Rc::new(Cell::new(0));
        let seq = intro(&stage, &fired);
        stage.engine.play_intro(seq);
        run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });

        stage.engine.unregister_all();
        assert!(stage.engine.scroll.is_empty());
        assert!(stage.engine.intro().is_none());
        let grab = stage.surface.table.layout_rect(stage.letter).expect("letter").origin() + Vec2::new(1.0, 1.0);
        assert_eq!(stage.engine.pointer_down(PointerId(0), grab, &stage.surface.table), None);

        let report = run(
            &mut stage,
            FrameInput {
                dt: DT,
                pointer: Some(Vec2::new(55.0, 1.0)),
                ..FrameInput::default()
            },
        );
        assert!(report.transitions.is_empty());
        for _ in 0..200 {
            run(&mut stage, FrameInput { dt: DT, ..FrameInput::default() });
        }
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn torn_down_section_stops_writing() {
        let mut stage = stage();
        run(&mut stage, FrameInput { dt: DT, scroll_offset: 150.0, ..FrameInput::default() });
        stage.scope.teardown();
        let before = stage.surface.table.get(stage.title).cloned();
        run(&mut stage, FrameInput { dt: DT, scroll_offset: 190.0, ..FrameInput::default() });
        assert_eq!(stage.surface.table.get(stage.title).cloned(), before);
        assert!(stage.engine.scroll.is_empty());
    }
}
