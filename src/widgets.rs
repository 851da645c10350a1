//! Clickable UI components.
//!
//! Each component renders its text and registers the matching click
//! targets in one place, so a button's hit area always follows where its
//! label was drawn.
//!
//! - [`ButtonBar`]: one row of buttons (top bar, modal footers).
//! - [`ClickableList`]: vertical list where some lines are buttons.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── ButtonBar ──────────────────────────────────────────────────

/// A single row of `[X] label` buttons separated by a fixed gap.
///
/// ```ignore
/// ButtonBar::new(2)
///     .button("[B] Build", style, OPEN_BUILD)
///     .button("[S] Stats", style, OPEN_STATS)
///     .render(f, area, &mut cs);
/// ```
pub struct ButtonBar {
    buttons: Vec<(String, Style, u16)>,
    gap: u16,
}

impl ButtonBar {
    pub fn new(gap: u16) -> Self {
        Self {
            buttons: Vec::new(),
            gap,
        }
    }

    pub fn button(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.buttons.push((label.into(), style, action_id));
        self
    }

    /// Display width and action of each button, in order.
    fn label_widths(&self) -> Vec<(u16, u16)> {
        self.buttons
            .iter()
            .map(|(label, _, id)| (Line::from(label.as_str()).width() as u16, *id))
            .collect()
    }

    /// Draw the bar on the first row of `area` and register its targets.
    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let widths = self.label_widths();
        let gap = " ".repeat(self.gap as usize);
        let mut spans = Vec::new();
        for (i, (label, style, _)) in self.buttons.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(gap.clone(), Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(label, style));
        }
        let row = Rect::new(area.x, area.y, area.width, area.height.min(1));
        f.render_widget(Paragraph::new(Line::from(spans)), row);
        cs.add_bar_targets(&widths, self.gap, row);
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a [`Paragraph`] where some lines carry an action ID.
///
/// Targets are bound to line positions, so inserting a line above a button
/// moves its hit area along with it.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Lobby"));
/// cl.push_clickable(Line::from("[H] Hire"), HIRE);
/// cl.register_targets(inner, &mut cs, scroll, None);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
#[derive(Default)]
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`.
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Visual rows each line takes when wrapped at `wrap_width`
    /// (one row per line when `None`).
    fn row_heights(&self, wrap_width: Option<u16>) -> Vec<u16> {
        self.lines
            .iter()
            .map(|line| match wrap_width {
                Some(w) if w > 0 => (line.width().max(1)).div_ceil(w as usize) as u16,
                _ => 1,
            })
            .collect()
    }

    /// Total visual rows, for sizing the scroll range.
    pub fn visual_rows(&self, wrap_width: Option<u16>) -> u16 {
        self.row_heights(wrap_width).iter().sum()
    }

    /// Register a target on every visible row of every clickable line.
    ///
    /// `inner` is the content area (inside any borders) and `scroll` the
    /// number of visual rows scrolled past.
    pub fn register_targets(
        &self,
        inner: Rect,
        cs: &mut ClickState,
        scroll: u16,
        wrap_width: Option<u16>,
    ) {
        let heights = self.row_heights(wrap_width);
        let mut starts = Vec::with_capacity(heights.len());
        let mut acc = 0u16;
        for h in &heights {
            starts.push(acc);
            acc = acc.saturating_add(*h);
        }
        for &(line, action_id) in &self.actions {
            for r in 0..heights[line] {
                let visual = starts[line] + r;
                if visual < scroll {
                    continue;
                }
                let row = inner.y + (visual - scroll);
                cs.add_row_target(inner, row, action_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_targets_follow_line_positions() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("Fiction"));
        cl.push(Line::from("Stock 4/10"));
        cl.push_clickable(Line::from("[1] Restock"), 10);
        cl.push_clickable(Line::from("[U] Upgrade"), 11);
        assert_eq!(cl.len(), 4);

        let inner = Rect::new(1, 5, 30, 8);
        let mut cs = ClickState::new();
        cl.register_targets(inner, &mut cs, 0, None);
        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(3, 7), Some(10));
        assert_eq!(cs.hit_test(3, 8), Some(11));
        assert_eq!(cs.hit_test(3, 6), None);
    }

    #[test]
    fn scrolled_lines_do_not_register() {
        let mut cl = ClickableList::new();
        for i in 0..6 {
            cl.push_clickable(Line::from(format!("floor {}", i)), 300 + i);
        }
        let inner = Rect::new(0, 10, 20, 3);
        let mut cs = ClickState::new();
        cl.register_targets(inner, &mut cs, 2, None);
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 10), Some(302));
        assert_eq!(cs.hit_test(0, 12), Some(304));
        assert_eq!(cs.hit_test(0, 13), None);
    }

    #[test]
    fn wrapped_button_is_tappable_on_every_row() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("0123456789abcdefghij"));
        cl.push_clickable(Line::from("0123456789012345"), 42);
        assert_eq!(cl.visual_rows(Some(10)), 4);

        let inner = Rect::new(0, 0, 10, 10);
        let mut cs = ClickState::new();
        cl.register_targets(inner, &mut cs, 0, Some(10));
        assert_eq!(cs.hit_test(1, 1), None);
        assert_eq!(cs.hit_test(1, 2), Some(42));
        assert_eq!(cs.hit_test(1, 3), Some(42));
        assert_eq!(cs.hit_test(1, 4), None);
    }

    #[test]
    fn empty_list_registers_nothing() {
        let cl = ClickableList::new();
        assert!(cl.is_empty());
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 10, 10), &mut cs, 0, None);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn button_bar_widths() {
        let bar = ButtonBar::new(2)
            .button("[B] Build", Style::default(), 1)
            .button("[S] Stats", Style::default(), 2);
        assert_eq!(bar.label_widths(), vec![(9, 1), (9, 2)]);
    }
}
