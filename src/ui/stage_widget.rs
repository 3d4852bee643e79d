//! Paints the stage from the element table.
//!
//! Every element is drawn at its painted rect (layout plus every transform
//! the engine wrote), clipped to the viewport.  Nearly transparent elements
//! are skipped and half-transparent ones are dimmed; a terminal has no alpha.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::core::surface::{ElementId, ElementTable, ElementState, Geometry};
use crate::core::theme::ThemeMode;

use super::theme::{Role, Theme};

/// Below this opacity an element is not drawn at all.
const MIN_VISIBLE: f64 = 0.15;
/// Below this opacity an element is drawn dim.
const DIM_BELOW: f64 = 0.5;

/// How an element looks.  The table knows where it is; this knows what it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Text { text: String, role: Role },
    Link(String),
    ThemeButton,
    Clock,
    /// One draggable hero letter in a box.
    Letter(char),
    /// Oversized title; its characters are spread across the element width.
    Banner(String),
    Cursor,
    Arrow,
}

pub struct StageWidget<'a> {
    pub table: &'a ElementTable,
    /// Paint order, back to front.
    pub visuals: &'a [(ElementId, Visual)],
    pub theme: Theme,
    pub mode: ThemeMode,
    pub clock: &'a str,
    pub hovered: Option<ElementId>,
}

impl<'a> Widget for StageWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base_style());

        for (id, visual) in self.visuals {
            let Some(state) = self.table.get(*id) else {
                continue;
            };
            if state.opacity < MIN_VISIBLE {
                continue;
            }
            let Some(rect) = self.table.bounding_rect(*id) else {
                continue;
            };
            let mut painter = Painter {
                buf: &mut *buf,
                area,
                dim: state.opacity < DIM_BELOW,
            };

            match visual {
                Visual::Text { text, role } => {
                    let text = oriented(text, state);
                    painter.put(rect.x, rect.y, &text, self.theme.text_style(*role));
                }
                Visual::Link(label) => {
                    let style = if self.hovered == Some(*id) {
                        self.theme.hover_style()
                    } else {
                        self.theme.text_style(Role::Link)
                    };
                    painter.put(rect.x, rect.y, label, style);
                }
                Visual::ThemeButton => {
                    let label = match self.mode {
                        ThemeMode::Dark => " Light Mode ",
                        ThemeMode::Light => " Dark Mode ",
                    };
                    let mut style = self.theme.text_style(Role::Badge);
                    if self.hovered == Some(*id) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    painter.put(rect.x, rect.y, label, style);
                }
                Visual::Clock => {
                    painter.put(rect.x, rect.y, self.clock, self.theme.text_style(Role::Heading));
                }
                Visual::Letter(ch) => {
                    let border = if state.affordance {
                        self.theme.affordance_style()
                    } else {
                        self.theme.text_style(Role::Muted)
                    };
                    let heavy = state.scale > 1.05;
                    painter.boxed(rect, *ch, border, self.theme.text_style(Role::Badge), heavy);
                }
                Visual::Banner(text) => {
                    let text = oriented(text, state);
                    let count = text.chars().count().max(1);
                    let step = rect.width / count as f64;
                    let style = self.theme.text_style(Role::Heading);
                    for (i, ch) in text.chars().enumerate() {
                        painter.put_char(rect.x + i as f64 * step, rect.y, ch, style);
                    }
                }
                Visual::Cursor => {
                    let cx = rect.x + rect.width / 2.0;
                    let style = self.theme.cursor_style();
                    if state.scale >= 1.25 {
                        painter.put(cx - 1.0, rect.y, "(●)", style);
                    } else {
                        painter.put_char(cx, rect.y, '●', style);
                    }
                }
                Visual::Arrow => {
                    let len = (3.0 * state.scale).round().max(2.0) as usize;
                    let mut arrow = "━".repeat(len - 1);
                    arrow.push('▶');
                    let cx = rect.x + rect.width / 2.0;
                    painter.put(cx - len as f64 / 2.0, rect.y, &arrow, self.theme.arrow_style());
                }
            }
        }
    }
}

/// Text as it reads after the element's rotation; upside down reads reversed.
fn oriented(text: &str, state: &ElementState) -> String {
    let turned = (state.rotate.rem_euclid(360.0) - 180.0).abs() < 90.0;
    if turned {
        text.chars().rev().collect()
    } else {
        text.to_string()
    }
}

// ───────────────────────────────────────── painter ───────────

/// Writes into the buffer in viewport coordinates, clipping per cell.
struct Painter<'b> {
    buf: &'b mut Buffer,
    area: Rect,
    dim: bool,
}

impl Painter<'_> {
    fn put_char(&mut self, x: f64, y: f64, ch: char, style: Style) {
        let cx = i32::from(self.area.x) + x.round() as i32;
        let cy = i32::from(self.area.y) + y.round() as i32;
        let inside = cx >= i32::from(self.area.x)
            && cx < i32::from(self.area.right())
            && cy >= i32::from(self.area.y)
            && cy < i32::from(self.area.bottom());
        if !inside {
            return;
        }
        let style = if self.dim { style.add_modifier(Modifier::DIM) } else { style };
        if let Some(cell) = self.buf.cell_mut(Position::new(cx as u16, cy as u16)) {
            cell.set_char(ch).set_style(style);
        }
    }

    fn put(&mut self, x: f64, y: f64, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put_char(x + i as f64, y, ch, style);
        }
    }

    /// A bordered box with `ch` in the middle.
    fn boxed(&mut self, rect: crate::core::geometry::Rect, ch: char, border: Style, fill: Style, heavy: bool) {
        let w = rect.width.round().max(3.0) as usize;
        let h = rect.height.round().max(3.0) as usize;
        let (tl, tr, bl, br, hz, vt) = if heavy {
            ('┏', '┓', '┗', '┛', '━', '┃')
        } else {
            ('┌', '┐', '└', '┘', '─', '│')
        };
        for row in 0..h {
            let y = rect.y + row as f64;
            for col in 0..w {
                let x = rect.x + col as f64;
                let (c, style) = match (row, col) {
                    (0, 0) => (tl, border),
                    (0, c) if c == w - 1 => (tr, border),
                    (r, 0) if r == h - 1 => (bl, border),
                    (r, c) if r == h - 1 && c == w - 1 => (br, border),
                    (0, _) => (hz, border),
                    (r, _) if r == h - 1 => (hz, border),
                    (_, 0) => (vt, border),
                    (_, c) if c == w - 1 => (vt, border),
                    (r, c) if r == h / 2 && c == w / 2 => (ch, fill),
                    _ => (' ', fill),
                };
                self.put_char(x, y, c, style);
            }
        }
    }
}
