//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{AppConfig, FileStore};
use crate::core::clock::Clock;
use crate::core::engine::{Engine, FrameInput};
use crate::core::error::EngineError;
use crate::core::geometry::{Rect, Vec2};
use crate::core::intro::{IntroPhase, IntroSequencer};
use crate::core::pointer::{HoverEdge, HoverRegion, HoverTransition, RegionKind};
use crate::core::scope::SectionScope;
use crate::core::surface::{ElementId, ElementState, ElementTable};
use crate::core::theme::{ThemeMode, ThemeStore};
use crate::ui::intro_widget::letter_cells;
use crate::ui::layout::AppLayout;
use crate::ui::smooth_scroll::SmoothScroll;

use super::stage::{self, StageLayout};

const INTRO_FADE_IN: f64 = 0.4;
const INTRO_HOLD: f64 = 0.6;
const INTRO_FADE_OUT: f64 = 0.4;
const SCROLL_HALF_LIFE: f64 = 0.08;
const CLOCK_INTERVAL: f64 = 1.0;
/// Longest frame we simulate; a stalled terminal should not fling things.
const MAX_FRAME_DT: f64 = 0.25;

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Intro,
    Stage,
}

/// The intro's label element and the scope its sequencer lives in.
#[derive(Debug)]
pub struct IntroScreen {
    pub label: ElementId,
    scope: SectionScope,
    /// One element per letter of the label on screen, stretched on hover.
    letters: Vec<ElementId>,
    letters_for: Option<String>,
    letters_scope: Option<SectionScope>,
}

/// What the intro widget needs for one frame.
#[derive(Debug, Default)]
pub struct IntroView<'a> {
    pub label: Option<&'a str>,
    pub opacity: f64,
    pub stretch: Vec<f64>,
}

/// Top-level application state.
pub struct AppState {
    pub active_view: ActiveView,
    pub config: AppConfig,
    /// Elements the engine writes into and the widgets read from.
    pub table: ElementTable,
    pub engine: Engine,
    /// Present once the stage has been built.
    pub stage: Option<StageLayout>,
    pub intro: Option<IntroScreen>,
    pub theme: ThemeStore<FileStore>,
    /// Mode the palette follows, kept current by a theme subscription.
    pub palette_mode: Rc<Cell<ThemeMode>>,
    pub clock: Clock,
    pub scroll: SmoothScroll,
    /// Stage viewport size in cells.
    pub viewport: (u16, u16),
    /// Pointer position received since the last frame.
    pub pending_pointer: Option<Vec2>,
    /// Element under the pointer, for hover styling.
    pub hovered: Option<ElementId>,
    /// Set by the intro's completion callback.
    navigate: Rc<Cell<bool>>,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    /// Start on the intro, or straight on the stage when `play_intro` is off.
    pub fn new(
        config: AppConfig,
        theme: ThemeStore<FileStore>,
        terminal: (u16, u16),
        play_intro: bool,
    ) -> Result<Self, EngineError> {
        let viewport = AppLayout::viewport(terminal.0, terminal.1);
        let palette_mode = Rc::new(Cell::new(theme.mode()));
        let mut clock = Clock::new(CLOCK_INTERVAL);
        clock.refresh();

        // Placeholder pair of followers for the intro; the stage brings its own.
        let mut table = ElementTable::new();
        let cursor = table.insert(ElementState::new(Rect::new(0.0, 0.0, 1.0, 1.0)).fixed());
        let arrow = table.insert(ElementState::new(Rect::new(0.0, 0.0, 1.0, 1.0)).fixed().with_opacity(0.0));
        let engine = Engine::new(cursor, arrow, config.engine())?;

        let mut state = Self {
            active_view: ActiveView::Intro,
            config,
            table,
            engine,
            stage: None,
            intro: None,
            theme,
            palette_mode,
            clock,
            scroll: SmoothScroll::new(SCROLL_HALF_LIFE),
            viewport,
            pending_pointer: None,
            hovered: None,
            navigate: Rc::new(Cell::new(false)),
            status_message: None,
            should_quit: false,
        };

        if play_intro {
            state.start_intro()?;
        } else {
            state.enter_stage()?;
        }
        Ok(state)
    }

    fn start_intro(&mut self) -> Result<(), EngineError> {
        let (w, h) = self.viewport;
        let label = self.table.insert(
            ElementState::new(Rect::new(0.0, f64::from(h / 2), f64::from(w), 1.0))
                .fixed()
                .with_opacity(0.0),
        );
        let phases = self
            .config
            .intro
            .iter()
            .map(|text| IntroPhase::new(text.clone(), INTRO_FADE_IN, INTRO_HOLD, INTRO_FADE_OUT))
            .collect();
        let scope = SectionScope::new("intro");
        let navigate = Rc::clone(&self.navigate);
        let sequencer = IntroSequencer::new(phases, label, scope.liveness(), move || navigate.set(true))?;
        self.engine.play_intro(sequencer);
        self.intro = Some(IntroScreen {
            label,
            scope,
            letters: Vec::new(),
            letters_for: None,
            letters_scope: None,
        });
        self.active_view = ActiveView::Intro;
        self.sync_intro_letters();
        Ok(())
    }

    /// Lay out hoverable letter elements for the label currently showing.
    fn sync_intro_letters(&mut self) {
        let current = self.engine.intro().and_then(|i| i.current_label()).map(str::to_owned);
        let Some(screen) = self.intro.as_mut() else {
            return;
        };
        if screen.letters_for == current {
            return;
        }
        screen.letters_scope = None;
        for id in screen.letters.drain(..) {
            self.table.remove(id);
        }
        if let Some(label) = &current {
            let scope = SectionScope::new("intro-letters");
            let (w, h) = self.viewport;
            for (x, y) in letter_cells(label, ratatui::layout::Rect::new(0, 0, w, h)) {
                let id = self
                    .table
                    .insert(ElementState::new(Rect::new(f64::from(x), f64::from(y), 1.0, 1.0)).fixed());
                self.engine.pointer.register_hover_region(
                    HoverRegion {
                        element: id,
                        kind: RegionKind::Stretch,
                    },
                    scope.liveness(),
                );
                screen.letters.push(id);
            }
            screen.letters_scope = Some(scope);
        }
        screen.letters_for = current;
    }

    /// Build (or rebuild) the stage for the current viewport and show it.
    pub fn enter_stage(&mut self) -> Result<(), EngineError> {
        let (table, engine, layout) = stage::build(self.viewport.0, self.viewport.1, &self.config)?;
        let palette_mode = Rc::clone(&self.palette_mode);
        self.theme
            .subscribe(layout.scope.liveness(), move |mode| palette_mode.set(mode));

        self.scroll.set_max(layout.max_scroll());
        self.engine.unregister_all();
        self.table = table;
        self.engine = engine;
        // Replacing the old layout drops its scope, tearing down its
        // registrations.
        self.stage = Some(layout);
        self.intro = None;
        self.hovered = None;
        self.active_view = ActiveView::Stage;
        Ok(())
    }

    /// Abandon the intro and go straight to the stage.  The completion
    /// callback never runs.
    pub fn skip_intro(&mut self) -> Result<(), EngineError> {
        if self.active_view != ActiveView::Intro {
            return Ok(());
        }
        self.engine.skip_intro();
        if let Some(intro) = self.intro.take() {
            intro.scope.teardown();
            if let Some(letters) = &intro.letters_scope {
                letters.teardown();
            }
        }
        tracing::debug!("intro skipped");
        self.enter_stage()
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<(), EngineError> {
        self.viewport = AppLayout::viewport(width, height);
        match self.active_view {
            ActiveView::Stage => self.enter_stage(),
            ActiveView::Intro => {
                if let Some(label) = self.intro.as_ref().and_then(|i| self.table.get_mut(i.label)) {
                    label.layout = Rect::new(0.0, f64::from(self.viewport.1 / 2), f64::from(self.viewport.0), 1.0);
                }
                if let Some(screen) = self.intro.as_mut() {
                    screen.letters_for = None;
                }
                self.sync_intro_letters();
                Ok(())
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        let mode = self.theme.toggle();
        self.status_message = Some(format!("{} mode", mode.as_str()));
    }

    /// Advance everything by one frame of `dt` seconds.
    pub fn on_frame(&mut self, dt: f64) -> Result<(), EngineError> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.clock.tick(dt);
        self.scroll.tick(dt);
        let offset = self.scroll.offset();
        self.table.set_scroll_offset(offset);

        let input = FrameInput {
            dt,
            scroll_offset: offset,
            pointer: self.pending_pointer.take(),
            theme: self.theme.mode(),
        };
        let report = self.engine.frame(input, &mut self.table);
        for transition in &report.transitions {
            self.on_hover(*transition);
        }
        if report.intro_finished {
            tracing::debug!("intro finished");
        }
        if self.navigate.take() {
            self.enter_stage()?;
        } else if self.active_view == ActiveView::Intro {
            self.sync_intro_letters();
        }
        Ok(())
    }

    fn on_hover(&mut self, transition: HoverTransition) {
        match transition.edge {
            HoverEdge::Enter => {
                self.hovered = Some(transition.element);
                let stage = self.stage.as_ref();
                self.status_message = stage.and_then(|s| {
                    if let Some(link) = s.nav_link(transition.element) {
                        Some(format!("→ {}", link.label))
                    } else if s.lets_talk == transition.element {
                        Some("let's talk".to_string())
                    } else if s.theme_button == transition.element {
                        Some("click to switch theme".to_string())
                    } else {
                        None
                    }
                });
            }
            HoverEdge::Leave => {
                if self.hovered == Some(transition.element) {
                    self.hovered = None;
                }
                self.status_message = None;
            }
        }
    }

    /// Label, opacity and letter stretch for the intro screen, if it is
    /// showing.
    pub fn intro_view(&self) -> Option<IntroView<'_>> {
        let screen = self.intro.as_ref()?;
        let opacity = self.table.get(screen.label).map_or(0.0, |e| e.opacity);
        let label = self.engine.intro().and_then(|i| i.current_label());
        let stretch = screen
            .letters
            .iter()
            .map(|id| self.table.get(*id).map_or(1.0, |e| e.scale))
            .collect();
        Some(IntroView { label, opacity, stretch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(play_intro: bool) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("config.toml"));
        let config = AppConfig {
            intro: vec!["HI".into(), "THERE".into()],
            ..AppConfig::default()
        };
        let state = AppState::new(config, ThemeStore::load(store), (100, 31), play_intro).expect("valid config");
        (state, dir)
    }

    #[test]
    fn intro_hands_over_to_the_stage() {
        let (mut state, _dir) = state(true);
        assert_eq!(state.active_view, ActiveView::Intro);
        assert!(state.intro_view().is_some());

        for _ in 0..300 {
            state.on_frame(1.0 / 60.0).expect("frame");
        }
        assert_eq!(state.active_view, ActiveView::Stage);
        assert!(state.stage.is_some());
        assert!(state.intro_view().is_none());
    }

    #[test]
    fn hovering_an_intro_letter_stretches_only_that_letter() {
        let (mut state, _dir) = state(true);
        // "HI" centred in a 100x30 viewport: H at (48, 15), I at (50, 15).
        state.pending_pointer = Some(Vec2::new(48.0, 15.0));
        for _ in 0..20 {
            state.on_frame(1.0 / 60.0).expect("frame");
        }
        let view = state.intro_view().expect("intro showing");
        assert_eq!(view.label, Some("HI"));
        assert_eq!(view.stretch.len(), 2);
        assert!((view.stretch[0] - 3.1).abs() < 1e-9);
        assert_eq!(view.stretch[1], 1.0);
    }

    #[test]
    fn skipping_goes_straight_to_the_stage() {
        let (mut state, _dir) = state(true);
        state.on_frame(1.0 / 60.0).expect("frame");
        state.skip_intro().expect("stage builds");
        assert_eq!(state.active_view, ActiveView::Stage);
        assert!(!state.navigate.get());
        for _ in 0..300 {
            state.on_frame(1.0 / 60.0).expect("frame");
        }
        assert!(!state.navigate.get());
    }

    #[test]
    fn theme_toggle_reaches_the_palette_and_the_file() {
        let (mut state, dir) = state(false);
        assert_eq!(state.palette_mode.get(), ThemeMode::Dark);
        state.toggle_theme();
        assert_eq!(state.palette_mode.get(), ThemeMode::Light);
        let saved = std::fs::read_to_string(dir.path().join("config.toml")).expect("theme persisted");
        assert!(saved.contains("theme = light"));
    }

    #[test]
    fn resize_rebuilds_the_stage() {
        let (mut state, _dir) = state(false);
        let before = state.stage.as_ref().map(|s| s.height);
        state.resize(60, 21).expect("rebuild");
        let after = state.stage.as_ref().map(|s| s.height);
        assert_ne!(before, after);
        assert_eq!(state.viewport, (60, 20));
    }
}
