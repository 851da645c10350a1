//! Tower geometry for one frame.
//!
//! [`TowerLayout`] is computed once from the state, the viewport and the
//! scroll position. The renderer draws exactly these rects and taps are
//! resolved against them, so what you see is what you hit.

use ratzilla::ratatui::layout::Rect;

use super::elevator;
use super::state::{FloorId, TowerState, CATEGORY_COUNT, STAFF_SLOTS};

/// Rows per floor: title, shelves, staff.
pub const FLOOR_ROWS: u16 = 3;
/// Columns taken by the elevator shaft on the left.
pub const SHAFT_COLS: u16 = 4;

/// Scroll position over a content taller than its viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    pub offset: u16,
    pub max: u16,
    pub initialized: bool,
}

impl ScrollState {
    /// Recompute the scroll range. The first time the content overflows the
    /// view jumps to the top; afterwards the offset is only clamped.
    pub fn sync(&mut self, content_rows: u16, viewport_rows: u16) {
        self.max = content_rows.saturating_sub(viewport_rows);
        if !self.initialized && content_rows > viewport_rows {
            self.offset = 0;
            self.initialized = true;
        }
        self.offset = self.offset.min(self.max);
    }

    /// Scroll by `rows` (positive = down).
    pub fn scroll_by(&mut self, rows: i32) {
        let next = (self.offset as i32 + rows).clamp(0, self.max as i32);
        self.offset = next as u16;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What a tap on the tower landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Floor(FloorId),
    Shelf { floor: FloorId, category: usize },
    StaffSlot { floor: FloorId, slot: usize },
    Elevator,
    Applicant,
    Vip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorLayout {
    pub id: FloorId,
    /// Height index in the tower (not the preview slot).
    pub index: usize,
    pub rect: Rect,
    pub title: Rect,
    pub shelves: [Rect; CATEGORY_COUNT],
    pub slots: [Rect; STAFF_SLOTS],
    /// Picked up by a reorder gesture.
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LobbyLayout {
    pub rect: Rect,
    pub title: Rect,
    pub applicant: Rect,
    pub vip: Rect,
    pub queue: Rect,
}

/// A floor being dragged from height `from` towards slot `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPreview {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TowerLayout {
    pub viewport: Rect,
    pub offset: u16,
    pub floor_count: usize,
    /// Visible floors only, top to bottom.
    pub floors: Vec<FloorLayout>,
    pub lobby: Option<LobbyLayout>,
    pub shaft: Rect,
    pub car: Option<Rect>,
}

/// Total content height for `floor_count` floors plus the lobby.
pub fn content_rows(floor_count: usize) -> u16 {
    ((floor_count as u16).saturating_add(1)).saturating_mul(FLOOR_ROWS)
}

/// Display order of floor heights after previewing a move `from → to`:
/// entry `slot` is the height index of the floor drawn in that slot.
pub fn preview_order(len: usize, drag: Option<DragPreview>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if let Some(DragPreview { from, to }) = drag {
        if from < len && to < len && from != to {
            let held = order.remove(from);
            order.insert(to, held);
        }
    }
    order
}

fn contains(r: &Rect, col: u16, row: u16) -> bool {
    r.width > 0 && r.height > 0 && col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
}

/// Split a one-row rect into `N` columns; the last absorbs the remainder.
fn columns<const N: usize>(r: Rect) -> [Rect; N] {
    let w = r.width / N as u16;
    std::array::from_fn(|i| {
        let x = r.x + w * i as u16;
        let width = if i + 1 == N { r.width - w * (N as u16 - 1) } else { w };
        Rect::new(x, r.y, width, r.height)
    })
}

impl TowerLayout {
    /// Compute the frame geometry. `scroll` must already be synced to the
    /// current floor count; `now` is ticks plus the clock alpha.
    pub fn compute(
        state: &TowerState,
        viewport: Rect,
        scroll: &ScrollState,
        drag: Option<DragPreview>,
        now: f64,
    ) -> Self {
        let n = state.floors.len();
        let mut layout = Self {
            viewport,
            offset: scroll.offset,
            floor_count: n,
            floors: Vec::new(),
            lobby: None,
            shaft: Rect::default(),
            car: None,
        };
        if viewport.width <= SHAFT_COLS + 1 || viewport.height == 0 {
            return layout;
        }
        let body_x = viewport.x + SHAFT_COLS + 1;
        let body_w = viewport.width - SHAFT_COLS - 1;

        let order = preview_order(n, drag);
        for (slot, &index) in order.iter().enumerate().rev() {
            let top = ((n - 1 - slot) as u16) * FLOOR_ROWS;
            let rect = layout.band(top, FLOOR_ROWS, body_x, body_w);
            if rect.height == 0 {
                continue;
            }
            let floor = &state.floors[index];
            let title = layout.band(top, 1, body_x, body_w);
            let (shelves, slots): ([Rect; CATEGORY_COUNT], [Rect; STAFF_SLOTS]) = if floor.is_ready() {
                (
                    columns(layout.band(top + 1, 1, body_x, body_w)),
                    columns(layout.band(top + 2, 1, body_x, body_w)),
                )
            } else {
                Default::default()
            };
            layout.floors.push(FloorLayout {
                id: floor.id,
                index,
                rect,
                title,
                shelves,
                slots,
                held: drag.is_some_and(|d| d.from == index),
            });
        }

        let lobby_top = n as u16 * FLOOR_ROWS;
        let lobby = layout.band(lobby_top, FLOOR_ROWS, body_x, body_w);
        if lobby.height > 0 {
            let [applicant, vip] = columns::<2>(layout.band(lobby_top + 1, 1, body_x, body_w));
            layout.lobby = Some(LobbyLayout {
                rect: lobby,
                title: layout.band(lobby_top, 1, body_x, body_w),
                applicant,
                vip,
                queue: layout.band(lobby_top + 2, 1, body_x, body_w),
            });
        }

        layout.shaft = layout.band(0, content_rows(n), viewport.x, SHAFT_COLS);
        let level = elevator::car_level(state, now);
        let car_top = ((n as f64 - level) * FLOOR_ROWS as f64).round().max(0.0) as u16;
        let car = layout.band(car_top, FLOOR_ROWS, viewport.x, SHAFT_COLS);
        layout.car = (car.height > 0).then_some(car);
        layout
    }

    /// Screen rect of content rows `[top, top + height)`, clipped to the
    /// viewport. Zero-sized when fully scrolled out.
    fn band(&self, top: u16, height: u16, x: u16, width: u16) -> Rect {
        let v = self.viewport;
        let start = top as i32 - self.offset as i32;
        let end = start + height as i32;
        let lo = start.max(0);
        let hi = end.min(v.height as i32);
        if hi <= lo {
            return Rect::default();
        }
        Rect::new(x, v.y + lo as u16, width, (hi - lo) as u16)
    }

    /// Content row under a screen row.
    fn content_row(&self, row: u16) -> i32 {
        row as i32 - self.viewport.y as i32 + self.offset as i32
    }

    /// Resolve a tap. Lobby buttons win over their row; shelves and staff
    /// slots win over the floor they belong to.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<Hit> {
        if !contains(&self.viewport, col, row) {
            return None;
        }
        if let Some(lobby) = &self.lobby {
            if contains(&lobby.applicant, col, row) {
                return Some(Hit::Applicant);
            }
            if contains(&lobby.vip, col, row) {
                return Some(Hit::Vip);
            }
        }
        for f in &self.floors {
            if !contains(&f.rect, col, row) {
                continue;
            }
            if let Some(category) = f.shelves.iter().position(|r| contains(r, col, row)) {
                return Some(Hit::Shelf {
                    floor: f.id,
                    category,
                });
            }
            if let Some(slot) = f.slots.iter().position(|r| contains(r, col, row)) {
                return Some(Hit::StaffSlot { floor: f.id, slot });
            }
            return Some(Hit::Floor(f.id));
        }
        if contains(&self.shaft, col, row) {
            return Some(Hit::Elevator);
        }
        None
    }

    /// Floor height index under a screen row, ignoring any drag preview.
    pub fn floor_index_at(&self, row: u16) -> Option<usize> {
        let r = self.content_row(row);
        let n = self.floor_count as i32;
        if r < 0 || r >= n * FLOOR_ROWS as i32 {
            return None;
        }
        Some((n - 1 - r / FLOOR_ROWS as i32) as usize)
    }

    /// Drop slot for a dragged floor: the slot whose span contains the
    /// row, clamped to the top floor above and the first floor below.
    pub fn reorder_target(&self, row: u16) -> Option<usize> {
        if self.floor_count == 0 {
            return None;
        }
        let r = self.content_row(row);
        if r < 0 {
            return Some(self.floor_count - 1);
        }
        Some(self.floor_index_at(row).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::catalog::FloorType;
    use crate::tower::state::{Floor, FloorStatus};

    fn tower(n: u32) -> TowerState {
        let mut s = TowerState::new();
        for id in 1..=n {
            let mut f = Floor::new(id, FloorType::Fiction, format!("F{}", id), 0);
            f.status = FloorStatus::Ready;
            s.floors.push(f);
        }
        s
    }

    fn layout(s: &TowerState, height: u16, offset: u16) -> TowerLayout {
        let mut scroll = ScrollState::default();
        scroll.sync(content_rows(s.floors.len()), height);
        scroll.offset = offset.min(scroll.max);
        TowerLayout::compute(s, Rect::new(0, 2, 40, height), &scroll, None, s.now as f64)
    }

    #[test]
    fn newest_floor_on_top_lobby_at_bottom() {
        let s = tower(3);
        let l = layout(&s, 30, 0);
        let ids: Vec<FloorId> = l.floors.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(l.floors[0].rect.y, 2);
        let lobby = l.lobby.unwrap();
        assert_eq!(lobby.rect.y, 2 + 3 * FLOOR_ROWS);
    }

    #[test]
    fn hit_test_matches_drawn_rects() {
        let s = tower(3);
        let l = layout(&s, 30, 0);
        for f in &l.floors {
            assert_eq!(l.hit_test(f.title.x, f.title.y), Some(Hit::Floor(f.id)));
            for (category, r) in f.shelves.iter().enumerate() {
                assert_eq!(
                    l.hit_test(r.x + r.width / 2, r.y),
                    Some(Hit::Shelf {
                        floor: f.id,
                        category
                    })
                );
            }
            for (slot, r) in f.slots.iter().enumerate() {
                assert_eq!(
                    l.hit_test(r.x, r.y),
                    Some(Hit::StaffSlot { floor: f.id, slot })
                );
            }
        }
        let lobby = l.lobby.clone().unwrap();
        assert_eq!(l.hit_test(lobby.applicant.x, lobby.applicant.y), Some(Hit::Applicant));
        assert_eq!(l.hit_test(lobby.vip.x, lobby.vip.y), Some(Hit::Vip));
        assert_eq!(l.hit_test(0, 3), Some(Hit::Elevator));
        assert_eq!(l.hit_test(0, 0), None);
    }

    #[test]
    fn building_floor_has_no_shelves() {
        let mut s = tower(1);
        s.floors.push(Floor::new(2, FloorType::Poetry, "Poetry".into(), 0));
        let l = layout(&s, 30, 0);
        let top = &l.floors[0];
        assert_eq!(top.id, 2);
        assert_eq!(l.hit_test(top.rect.x + 5, top.rect.y + 1), Some(Hit::Floor(2)));
    }

    #[test]
    fn scrolled_out_floors_are_skipped() {
        let s = tower(10);
        // 33 content rows in a 9-row view, scrolled 6 rows down.
        let l = layout(&s, 9, 6);
        let ids: Vec<FloorId> = l.floors.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![8, 7, 6]);
        assert!(l.lobby.is_none());
        assert_eq!(l.floor_index_at(2), Some(7));
    }

    #[test]
    fn partially_visible_floor_is_clipped() {
        let s = tower(4);
        let l = layout(&s, 9, 1);
        assert_eq!(l.floors[0].rect.height, 2);
        assert_eq!(l.floors[0].title, Rect::default());
    }

    #[test]
    fn reorder_target_clamps() {
        let s = tower(4);
        let l = layout(&s, 30, 0);
        assert_eq!(l.reorder_target(2), Some(3));
        assert_eq!(l.reorder_target(2 + 3 * FLOOR_ROWS), Some(0));
        assert_eq!(l.reorder_target(29), Some(0));
        assert_eq!(l.reorder_target(0), Some(3));
    }

    #[test]
    fn drag_preview_shifts_floors_between() {
        assert_eq!(
            preview_order(4, Some(DragPreview { from: 0, to: 2 })),
            vec![1, 2, 0, 3]
        );
        assert_eq!(
            preview_order(4, Some(DragPreview { from: 3, to: 1 })),
            vec![0, 3, 1, 2]
        );
        assert_eq!(preview_order(3, Some(DragPreview { from: 5, to: 0 })), vec![0, 1, 2]);

        let s = tower(3);
        let mut scroll = ScrollState::default();
        scroll.sync(content_rows(3), 30);
        let drag = Some(DragPreview { from: 0, to: 2 });
        let l = TowerLayout::compute(&s, Rect::new(0, 0, 40, 30), &scroll, drag, 0.0);
        // Floor 1 (height 0) now previews in the top slot.
        assert_eq!(l.floors[0].id, 1);
        assert!(l.floors[0].held);
        assert!(!l.floors[1].held);
    }

    #[test]
    fn car_rect_follows_elevator() {
        let mut s = tower(2);
        let l = layout(&s, 30, 0);
        assert_eq!(l.car.unwrap().y, 2 + 2 * FLOOR_ROWS);
        s.car = crate::tower::state::Car::Up {
            reader: 9,
            floor: 2,
            departed_at: 0,
            arrives_at: 4,
        };
        let l = TowerLayout::compute(&s, Rect::new(0, 2, 40, 30), &ScrollState::default(), None, 4.0);
        assert_eq!(l.car.unwrap().y, 2);
    }

    #[test]
    fn scroll_jumps_to_top_once() {
        let mut scroll = ScrollState::default();
        scroll.sync(6, 10);
        assert!(!scroll.initialized);
        assert_eq!(scroll.max, 0);
        scroll.sync(30, 10);
        assert!(scroll.initialized);
        assert_eq!(scroll.offset, 0);
        scroll.scroll_by(15);
        assert_eq!(scroll.offset, 15);
        scroll.sync(33, 10);
        assert_eq!(scroll.offset, 15);
        scroll.sync(12, 10);
        assert_eq!(scroll.offset, 2);
    }
}
