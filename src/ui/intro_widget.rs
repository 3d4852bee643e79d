//! The intro screen: one spaced-out label on black, faded by the engine.
//! Hovered letters stretch vertically.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::theme::Theme;

pub struct IntroWidget<'a> {
    pub label: Option<&'a str>,
    /// Label opacity as written by the intro sequencer.
    pub opacity: f64,
    /// Vertical scale per letter; missing entries mean 1.
    pub stretch: &'a [f64],
}

impl<'a> Widget for IntroWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::intro_style());
        let Some(label) = self.label else {
            return;
        };
        let Some(style) = fade_style(self.opacity) else {
            return;
        };

        for (i, (ch, (x, y))) in label.chars().zip(letter_cells(label, area)).enumerate() {
            let reach = self
                .stretch
                .get(i)
                .map_or(0, |s| ((s - 1.0) / 2.0).round().max(0.0) as u16);
            let top = y.saturating_sub(reach).max(area.y);
            let bottom = y.saturating_add(reach).min(area.bottom().saturating_sub(1));
            for row in top..=bottom {
                if let Some(cell) = buf.cell_mut((x, row)) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }
    }
}

/// Cell of each letter of `label` centred in `area`, one blank between
/// letters.  Letters past the right edge are dropped.
pub fn letter_cells(label: &str, area: Rect) -> Vec<(u16, u16)> {
    if area.height == 0 {
        return Vec::new();
    }
    let count = label.chars().count() as u16;
    let width = (count * 2).saturating_sub(1);
    let x0 = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height / 2;
    (0..count)
        .map(|i| (x0 + i * 2, y))
        .take_while(|&(x, _)| x < area.right())
        .collect()
}

/// Terminal approximation of an opacity level.
fn fade_style(opacity: f64) -> Option<Style> {
    let base = Theme::intro_style();
    match opacity {
        o if o < 0.15 => None,
        o if o < 0.4 => Some(base.fg(Color::DarkGray)),
        o if o < 0.75 => Some(base.fg(Color::Gray)),
        _ => Some(base.fg(Color::White).add_modifier(Modifier::BOLD)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(label: Option<&str>, opacity: f64, stretch: &[f64]) -> Buffer {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        IntroWidget { label, opacity, stretch }.render(area, &mut buf);
        buf
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn centres_the_spaced_label() {
        let buf = render(Some("HELLO"), 1.0, &[]);
        assert_eq!(line(&buf, 1), "     H E L L O      ");
    }

    #[test]
    fn faded_out_label_is_not_drawn() {
        let buf = render(Some("HELLO"), 0.05, &[]);
        assert_eq!(line(&buf, 1).trim(), "");
        assert_eq!(line(&render(None, 1.0, &[]), 1).trim(), "");
    }

    #[test]
    fn stretched_letter_spans_three_rows() {
        let buf = render(Some("HELLO"), 1.0, &[1.0, 3.1]);
        assert_eq!(line(&buf, 0), "       E            ");
        assert_eq!(line(&buf, 1), "     H E L L O      ");
        assert_eq!(line(&buf, 2), "       E            ");
    }

    #[test]
    fn letter_cells_match_the_drawn_letters() {
        let cells = letter_cells("HELLO", Rect::new(0, 0, 20, 3));
        assert_eq!(cells, vec![(5, 1), (7, 1), (9, 1), (11, 1), (13, 1)]);
    }
}
