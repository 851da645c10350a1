//! Input plumbing: normalized events, button hit regions and pixel → cell
//! conversion.
//!
//! Two kinds of hit-testing coexist. Buttons drawn by panels and modals are
//! registered here as [`ClickTarget`]s while their lines are laid out. The
//! tower itself is hit-tested against `tower::layout::TowerLayout`, which is
//! computed before drawing. `main.rs` asks the button map first (overlays
//! sit on top of the tower) and forwards misses as [`InputEvent::Tap`].

use ratzilla::ratatui::layout::Rect;

/// Input normalized from keyboard, mouse and touch.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press. Arrow keys arrive as `'k'` (up) and `'j'` (down).
    Key(char),
    /// A tap on a registered button, carrying its action ID.
    Click(u16),
    /// A tap that missed every button, in terminal cell coordinates.
    Tap { col: u16, row: u16 },
    /// Scroll the tower by a number of rows (positive = towards the lobby).
    Scroll(f64),
    /// Long press recognized at a cell: pick up the floor under it.
    ReorderStart { col: u16, row: u16 },
    /// The held floor moved to a new screen row.
    ReorderMove { row: u16 },
    /// The held floor was released at a screen row.
    ReorderDrop { row: u16 },
}

/// A tappable screen region.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Button map rebuilt every frame by the renderer.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        if rect.width > 0 && rect.height > 0 {
            self.targets.push(ClickTarget { rect, action_id });
        }
    }

    /// Register a full-width row of `area`; rows outside the area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Split a horizontal bar into one target per label.
    ///
    /// `labels` holds `(display_width, action_id)` per label, laid out left to
    /// right with `gap` columns between them. Each gap is split in half between
    /// its neighbours and the outer labels stretch to the bar edges, so the
    /// whole bar is tappable.
    pub fn add_bar_targets(&mut self, labels: &[(u16, u16)], gap: u16, bar: Rect) {
        if labels.is_empty() || bar.width == 0 {
            return;
        }
        let mut left = 0u16;
        let mut cursor = 0u16;
        for (i, &(width, action_id)) in labels.iter().enumerate() {
            let label_end = cursor + width;
            let right = if i + 1 == labels.len() {
                bar.width
            } else {
                (label_end + gap / 2).min(bar.width)
            };
            if right > left {
                self.add_click_target(
                    Rect::new(bar.x + left, bar.y, right - left, bar.height.max(1)),
                    action_id,
                );
            }
            left = right;
            cursor = label_end + gap;
        }
    }

    /// Topmost (last registered) target covering the cell.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            let inside = col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then_some(t.action_id)
        })
    }
}

/// Pixel geometry of the ratzilla grid container for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub cols: u16,
    pub rows: u16,
}

impl GridMetrics {
    pub fn cell_height(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.height / self.rows as f64
        }
    }

    /// Convert client pixel coordinates to a cell, `None` outside the grid.
    pub fn cell_at(&self, client_x: f64, client_y: f64) -> Option<(u16, u16)> {
        let col = axis_to_cell(client_x - self.left, self.width, self.cols)?;
        let row = axis_to_cell(client_y - self.top, self.height, self.rows)?;
        Some((col, row))
    }

    /// Client pixel coordinates of the middle of a cell.
    pub fn cell_center(&self, col: u16, row: u16) -> (f64, f64) {
        let cell_w = if self.cols == 0 { 0.0 } else { self.width / self.cols as f64 };
        (
            self.left + (col as f64 + 0.5) * cell_w,
            self.top + (row as f64 + 0.5) * self.cell_height(),
        )
    }

    /// Row under a client Y coordinate, clamped into the grid.
    pub fn row_clamped(&self, client_y: f64) -> u16 {
        if self.rows == 0 || self.height <= 0.0 {
            return 0;
        }
        let rel = (client_y - self.top).clamp(0.0, self.height - f64::EPSILON);
        ((rel / self.cell_height()) as u16).min(self.rows - 1)
    }
}

fn axis_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

/// Narrow screens stack the side panel under the tower.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}
