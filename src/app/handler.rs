//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::core::drag::PointerId;
use crate::core::geometry::Vec2;
use crate::core::surface::{ElementId, Geometry};

use super::stage::NavLink;
use super::state::{ActiveView, AppState};

const LINE_STEP: f64 = 2.0;
const WHEEL_STEP: f64 = 3.0;
/// Fraction of the viewport a page key scrolls.
const PAGE_FRACTION: f64 = 0.9;
/// The terminal has one mouse.
const MOUSE: PointerId = PointerId(0);

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Intro => handle_intro_key(state, key),
        ActiveView::Stage => handle_stage_key(state, key),
    }
}

// ── Intro ───────────────────────────────────────────────────────

fn handle_intro_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => {
            if let Err(err) = state.skip_intro() {
                tracing::error!("could not build the stage: {err}");
                state.should_quit = true;
            }
        }
        _ => {}
    }
}

// ── Stage ───────────────────────────────────────────────────────

fn handle_stage_key(state: &mut AppState, key: KeyEvent) {
    let page = f64::from(state.viewport.1) * PAGE_FRACTION;
    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => state.scroll.scroll_by(LINE_STEP),
        KeyCode::Char('k') | KeyCode::Up => state.scroll.scroll_by(-LINE_STEP),
        KeyCode::PageDown | KeyCode::Char(' ') => state.scroll.scroll_by(page),
        KeyCode::PageUp => state.scroll.scroll_by(-page),
        KeyCode::Char('g') | KeyCode::Home => state.scroll.scroll_to(0.0),
        KeyCode::Char('G') | KeyCode::End => state.scroll.scroll_to(f64::INFINITY),
        KeyCode::Char('t') => state.toggle_theme(),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            scroll_to_section(state, index);
        }
        _ => {}
    }
}

fn scroll_to_section(state: &mut AppState, index: usize) {
    let Some(link) = state.stage.as_ref().and_then(|s| s.nav.get(index)).copied() else {
        return;
    };
    jump_to(state, link);
}

fn jump_to(state: &mut AppState, link: NavLink) {
    state.scroll.scroll_to(link.target);
    state.status_message = Some(format!("→ {}", link.label));
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let pos = Vec2::new(f64::from(mouse.column), f64::from(mouse.row));
    if state.active_view == ActiveView::Intro {
        if matches!(mouse.kind, MouseEventKind::Moved) {
            state.pending_pointer = Some(pos);
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Moved => state.pending_pointer = Some(pos),
        MouseEventKind::Down(MouseButton::Left) => {
            state.pending_pointer = Some(pos);
            if state.engine.pointer_down(MOUSE, pos, &state.table).is_some() {
                return;
            }
            click(state, pos);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            state.pending_pointer = Some(pos);
            state.engine.pointer_drag(MOUSE, pos, &state.table);
        }
        MouseEventKind::Up(MouseButton::Left) => state.engine.pointer_up(MOUSE),
        MouseEventKind::ScrollDown => state.scroll.scroll_by(WHEEL_STEP),
        MouseEventKind::ScrollUp => state.scroll.scroll_by(-WHEEL_STEP),
        _ => {}
    }
}

/// A left click that did not grab a letter.
fn click(state: &mut AppState, pos: Vec2) {
    let Some(stage) = state.stage.as_ref() else {
        return;
    };
    let hit = |id: ElementId| state.table.bounding_rect(id).is_some_and(|r| r.contains(pos));

    let on_button = hit(stage.theme_button);
    let link = stage.nav.iter().find(|link| hit(link.element)).copied();
    if on_button {
        state.toggle_theme();
    } else if let Some(link) = link {
        jump_to(state, link);
    }
}
