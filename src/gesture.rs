//! Pointer gesture recognition: tap vs. scroll vs. long-press reorder.
//!
//! The tracker is fed raw press/move/release samples in client pixels plus
//! a monotonic timestamp, and reports what the gesture means. It knows
//! nothing about the tower; the caller tells it on press whether the press
//! landed on something that can be picked up.

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Pressed, still within the drag threshold.
    Pending,
    /// Moved past the threshold without a long press: drag-scrolls the view.
    Scrolling,
    /// Long press recognized: dragging a floor.
    Reordering,
}

/// What a pointer sample means to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Scroll the view by this many pixels (positive = finger moved down).
    ScrollBy(f64),
    /// Long press recognized at the press position.
    ReorderStart { x: f64, y: f64 },
    /// The held item follows the pointer.
    ReorderMove { x: f64, y: f64 },
    /// Held item released.
    ReorderDrop { x: f64, y: f64 },
    /// Press and release without crossing the drag threshold.
    Tap { x: f64, y: f64 },
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    phase: Phase,
    threshold_px: f64,
    long_press_ms: f64,
    start_x: f64,
    start_y: f64,
    last_y: f64,
    pressed_at: f64,
    /// Whether the press landed on a draggable item.
    can_reorder: bool,
}

impl PointerTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Idle,
            threshold_px: config.drag_threshold_px,
            long_press_ms: config.long_press_ms,
            start_x: 0.0,
            start_y: 0.0,
            last_y: 0.0,
            pressed_at: 0.0,
            can_reorder: false,
        }
    }

    pub fn is_reordering(&self) -> bool {
        self.phase == Phase::Reordering
    }

    pub fn is_pressed(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn press(&mut self, x: f64, y: f64, now_ms: f64, can_reorder: bool) {
        self.phase = Phase::Pending;
        self.start_x = x;
        self.start_y = y;
        self.last_y = y;
        self.pressed_at = now_ms;
        self.can_reorder = can_reorder;
    }

    pub fn motion(&mut self, x: f64, y: f64) -> Option<Gesture> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pending => {
                if distance(self.start_x, self.start_y, x, y) <= self.threshold_px {
                    return None;
                }
                self.phase = Phase::Scrolling;
                // The whole movement so far counts towards the scroll.
                let dy = y - self.start_y;
                self.last_y = y;
                Some(Gesture::ScrollBy(dy))
            }
            Phase::Scrolling => {
                let dy = y - self.last_y;
                self.last_y = y;
                (dy != 0.0).then_some(Gesture::ScrollBy(dy))
            }
            Phase::Reordering => {
                self.last_y = y;
                Some(Gesture::ReorderMove { x, y })
            }
        }
    }

    /// Called every frame; turns a still press held long enough into a
    /// reorder start.
    pub fn poll(&mut self, now_ms: f64) -> Option<Gesture> {
        if self.phase == Phase::Pending
            && self.can_reorder
            && now_ms - self.pressed_at >= self.long_press_ms
        {
            self.phase = Phase::Reordering;
            return Some(Gesture::ReorderStart {
                x: self.start_x,
                y: self.start_y,
            });
        }
        None
    }

    pub fn release(&mut self, x: f64, y: f64) -> Option<Gesture> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Idle | Phase::Scrolling => None,
            Phase::Pending => {
                // A release far from the press without intermediate moves is
                // still a drag, not a tap.
                if distance(self.start_x, self.start_y, x, y) <= self.threshold_px {
                    Some(Gesture::Tap {
                        x: self.start_x,
                        y: self.start_y,
                    })
                } else {
                    None
                }
            }
            Phase::Reordering => Some(Gesture::ReorderDrop { x, y }),
        }
    }

    /// Abandon the current gesture (pointer left the grid, modal opened...).
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

fn distance(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PointerTracker {
        PointerTracker::new(&Config::default())
    }

    #[test]
    fn quick_press_release_is_tap() {
        let mut t = tracker();
        t.press(100.0, 200.0, 0.0, true);
        assert_eq!(t.motion(103.0, 204.0), None);
        assert_eq!(
            t.release(103.0, 204.0),
            Some(Gesture::Tap { x: 100.0, y: 200.0 })
        );
        assert!(!t.is_pressed());
    }

    #[test]
    fn movement_past_threshold_scrolls_and_never_taps() {
        let mut t = tracker();
        t.press(100.0, 200.0, 0.0, true);
        assert_eq!(t.motion(100.0, 230.0), Some(Gesture::ScrollBy(30.0)));
        assert_eq!(t.motion(100.0, 240.0), Some(Gesture::ScrollBy(10.0)));
        // Coming back near the origin does not turn it back into a tap.
        assert_eq!(t.motion(100.0, 201.0), Some(Gesture::ScrollBy(-39.0)));
        assert_eq!(t.release(100.0, 201.0), None);
    }

    #[test]
    fn long_press_on_floor_enters_reorder() {
        let mut t = tracker();
        t.press(50.0, 60.0, 1_000.0, true);
        assert_eq!(t.poll(1_499.0), None);
        assert_eq!(
            t.poll(1_500.0),
            Some(Gesture::ReorderStart { x: 50.0, y: 60.0 })
        );
        assert!(t.is_reordering());
        assert_eq!(t.poll(2_000.0), None);
        assert_eq!(
            t.motion(50.0, 120.0),
            Some(Gesture::ReorderMove { x: 50.0, y: 120.0 })
        );
        assert_eq!(
            t.release(50.0, 130.0),
            Some(Gesture::ReorderDrop { x: 50.0, y: 130.0 })
        );
    }

    #[test]
    fn long_press_off_floor_stays_pending() {
        let mut t = tracker();
        t.press(50.0, 60.0, 0.0, false);
        assert_eq!(t.poll(5_000.0), None);
        assert_eq!(t.release(50.0, 60.0), Some(Gesture::Tap { x: 50.0, y: 60.0 }));
    }

    #[test]
    fn scroll_started_before_long_press_never_reorders() {
        let mut t = tracker();
        t.press(0.0, 0.0, 0.0, true);
        t.motion(0.0, 40.0);
        assert_eq!(t.poll(10_000.0), None);
        assert!(!t.is_reordering());
    }

    #[test]
    fn release_far_away_without_moves_is_not_a_tap() {
        let mut t = tracker();
        t.press(0.0, 0.0, 0.0, false);
        assert_eq!(t.release(0.0, 100.0), None);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut t = tracker();
        assert_eq!(t.motion(10.0, 10.0), None);
        assert_eq!(t.release(10.0, 10.0), None);
    }

    #[test]
    fn cancel_drops_gesture() {
        let mut t = tracker();
        t.press(0.0, 0.0, 0.0, true);
        t.cancel();
        assert_eq!(t.poll(1_000.0), None);
        assert_eq!(t.release(0.0, 0.0), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_small_moves_always_tap(
            dx in -8.0f64..8.0,
            dy in -8.0f64..8.0,
            steps in 1usize..10,
        ) {
            let mut t = PointerTracker::new(&Config::default());
            t.press(200.0, 200.0, 0.0, false);
            for i in 1..=steps {
                let f = i as f64 / steps as f64;
                let g = t.motion(200.0 + dx * f, 200.0 + dy * f);
                prop_assert_eq!(g, None);
            }
            let g = t.release(200.0 + dx, 200.0 + dy);
            prop_assert!(
                matches!(g, Some(Gesture::Tap { .. })),
                "expected tap, got {:?}",
                g
            );
        }

        #[test]
        fn prop_large_moves_never_tap(
            dy in 13.0f64..500.0,
            sign in prop::bool::ANY,
            can_reorder in prop::bool::ANY,
        ) {
            let dy = if sign { dy } else { -dy };
            let mut t = PointerTracker::new(&Config::default());
            t.press(200.0, 200.0, 0.0, can_reorder);
            let g = t.motion(200.0, 200.0 + dy);
            prop_assert_eq!(g, Some(Gesture::ScrollBy(dy)));
            prop_assert_eq!(t.poll(10_000.0), None);
            prop_assert_eq!(t.release(200.0, 200.0), None);
        }
    }
}
