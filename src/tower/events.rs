//! Notifications the simulation stages for the UI.
//!
//! The simulation pushes, the controller drains once per tick and turns
//! each event into a toast. Order is push order; nothing is persisted.

use std::collections::VecDeque;

use super::catalog::ReaderKind;
use super::state::FloorId;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Checkout {
        floor: FloorId,
        kind: ReaderKind,
        coins: u64,
    },
    ReaderLeft {
        floor: FloorId,
    },
    FloorCompleted {
        floor: FloorId,
    },
    RestockCompleted {
        floor: FloorId,
        category: usize,
    },
    ApplicantArrived {
        name: String,
    },
    VipArrived,
    IncidentStarted {
        floor: FloorId,
        name: &'static str,
    },
    AchievementUnlocked {
        name: &'static str,
    },
    MissionCompleted {
        name: String,
    },
    EventStarted {
        name: &'static str,
    },
    EventEnded {
        name: &'static str,
    },
    QuestOffered,
    QuestFailed,
    ItemLost {
        item: &'static str,
    },
}

/// Single-consumer FIFO of [`GameEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<GameEvent>,
}

/// Oldest events are dropped past this size so an undrained queue (e.g.
/// during offline catch-up) stays bounded.
const MAX_PENDING: usize = 256;

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        if self.queue.len() >= MAX_PENDING {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_push_order_and_empties() {
        let mut q = EventQueue::new();
        q.push(GameEvent::VipArrived);
        q.push(GameEvent::FloorCompleted { floor: 3 });
        assert_eq!(q.len(), 2);
        let drained = q.drain();
        assert_eq!(
            drained,
            vec![GameEvent::VipArrived, GameEvent::FloorCompleted { floor: 3 }]
        );
        assert!(q.is_empty());
        assert!(q.drain().is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut q = EventQueue::new();
        for floor in 0..(MAX_PENDING as u32 + 10) {
            q.push(GameEvent::ReaderLeft { floor });
        }
        assert_eq!(q.len(), MAX_PENDING);
        assert_eq!(q.drain()[0], GameEvent::ReaderLeft { floor: 10 });
    }
}
