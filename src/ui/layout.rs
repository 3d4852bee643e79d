//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: the stage viewport above a one-line status bar.
pub struct AppLayout {
    pub stage_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // stage (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            stage_area: chunks[0],
            status_area: chunks[1],
        }
    }

    /// Viewport size in cells for a terminal of `width` x `height`.
    pub fn viewport(width: u16, height: u16) -> (u16, u16) {
        let layout = Self::from_area(Rect::new(0, 0, width, height));
        (layout.stage_area.width, layout.stage_area.height)
    }
}
