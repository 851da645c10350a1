//! Mini-quests, find-missions, timed events and long-term missions, plus
//! the single banner that advertises whichever one matters most.

use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::events::GameEvent;
use super::state::{FloorId, TowerState};

pub const QUEST_INTERVAL_SECS: u64 = 300;
pub const QUEST_DURATION_SECS: u64 = 120;
pub const QUEST_REWARD_PER_READER: u64 = 50;
pub const FIND_INTERVAL_SECS: u64 = 240;
pub const FIND_DURATION_SECS: u64 = 180;
pub const FIND_REWARD_BUX: u64 = 2;
pub const EVENT_DURATION_SECS: u64 = 120;
/// One in N per tick while no event runs.
pub const EVENT_CHANCE: u64 = 600;

pub const LOST_ITEMS: [&str; 4] = ["reading glasses", "library cat", "golden bookmark", "overdue notice"];

/// "Deliver N readers to floor X before time runs out."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiniQuest {
    pub floor: FloorId,
    pub target: u32,
    pub delivered: u32,
    pub expires_at: u64,
}

impl MiniQuest {
    pub fn reward(&self) -> u64 {
        QUEST_REWARD_PER_READER * self.target as u64
    }
}

/// An item hidden on one floor; tapping that floor finds it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FindMission {
    pub item: usize,
    pub floor: FloorId,
    pub expires_at: u64,
}

impl FindMission {
    pub fn item_name(&self) -> &'static str {
        LOST_ITEMS[self.item % LOST_ITEMS.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Earnings ×2.
    BookFair,
    /// Reader spawn rate ×2.
    ReadingWeek,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::BookFair => "Book Fair",
            EventKind::ReadingWeek => "Reading Week",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventKind::BookFair => "all earnings doubled",
            EventKind::ReadingWeek => "twice as many readers",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub kind: EventKind,
    pub ends_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MissionGoal {
    FloorsBuilt(u32),
    Checkouts(u64),
    StaffHired(u32),
}

pub struct MissionDef {
    pub name: &'static str,
    pub goal: MissionGoal,
    pub reward_bux: u64,
}

pub const MISSIONS: [MissionDef; 5] = [
    MissionDef {
        name: "Build 3 floors",
        goal: MissionGoal::FloorsBuilt(3),
        reward_bux: 3,
    },
    MissionDef {
        name: "Check out 25 books",
        goal: MissionGoal::Checkouts(25),
        reward_bux: 3,
    },
    MissionDef {
        name: "Hire 3 staff",
        goal: MissionGoal::StaffHired(3),
        reward_bux: 4,
    },
    MissionDef {
        name: "Build 6 floors",
        goal: MissionGoal::FloorsBuilt(6),
        reward_bux: 6,
    },
    MissionDef {
        name: "Check out 200 books",
        goal: MissionGoal::Checkouts(200),
        reward_bux: 10,
    },
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionState {
    pub quest: Option<MiniQuest>,
    pub next_quest_at: u64,
    pub find: Option<FindMission>,
    pub next_find_at: u64,
    pub event: Option<ActiveEvent>,
    /// Index into [`MISSIONS`] of the next unclaimed mission.
    pub mission_index: usize,
}

impl Default for MissionState {
    fn default() -> Self {
        Self {
            quest: None,
            next_quest_at: QUEST_INTERVAL_SECS,
            find: None,
            next_find_at: FIND_INTERVAL_SECS,
            event: None,
            mission_index: 0,
        }
    }
}

impl MissionState {
    pub fn earnings_mult(&self) -> f64 {
        match self.event {
            Some(ActiveEvent {
                kind: EventKind::BookFair,
                ..
            }) => 2.0,
            _ => 1.0,
        }
    }

    pub fn spawn_mult(&self) -> u64 {
        match self.event {
            Some(ActiveEvent {
                kind: EventKind::ReadingWeek,
                ..
            }) => 2,
            _ => 1,
        }
    }
}

/// What the banner above the tower shows. At most one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum Banner {
    MiniQuest {
        floor: FloorId,
        delivered: u32,
        target: u32,
        secs_left: u64,
    },
    FindMission {
        item: &'static str,
        secs_left: u64,
    },
    Event {
        name: &'static str,
        description: &'static str,
        secs_left: u64,
    },
    Mission {
        name: &'static str,
        progress: u64,
        target: u64,
        complete: bool,
    },
}

/// Fixed priority: mini-quest, then find-mission, then event, then mission.
pub fn banner(state: &TowerState) -> Option<Banner> {
    let m = &state.missions;
    let now = state.now;
    if let Some(q) = &m.quest {
        return Some(Banner::MiniQuest {
            floor: q.floor,
            delivered: q.delivered,
            target: q.target,
            secs_left: q.expires_at.saturating_sub(now),
        });
    }
    if let Some(f) = &m.find {
        return Some(Banner::FindMission {
            item: f.item_name(),
            secs_left: f.expires_at.saturating_sub(now),
        });
    }
    if let Some(e) = &m.event {
        return Some(Banner::Event {
            name: e.kind.name(),
            description: e.kind.description(),
            secs_left: e.ends_at.saturating_sub(now),
        });
    }
    current_mission(state).map(|(def, progress, target)| Banner::Mission {
        name: def.name,
        progress,
        target,
        complete: progress >= target,
    })
}

/// The next unclaimed mission with `(definition, progress, target)`.
pub fn current_mission(state: &TowerState) -> Option<(&'static MissionDef, u64, u64)> {
    let def = MISSIONS.get(state.missions.mission_index)?;
    let (progress, target) = match def.goal {
        MissionGoal::FloorsBuilt(n) => (state.stats.floors_built as u64, n as u64),
        MissionGoal::Checkouts(n) => (state.stats.total_checkouts, n),
        MissionGoal::StaffHired(n) => (state.stats.staff_hired as u64, n as u64),
    };
    Some((def, progress.min(target), target))
}

/// Pay out the current long-term mission.
pub fn claim_mission(state: &mut TowerState) -> Result<u64, ActionError> {
    let (def, progress, target) = current_mission(state).ok_or(ActionError::MissionNotFound)?;
    if progress < target {
        return Err(ActionError::MissionNotComplete);
    }
    state.bux += def.reward_bux;
    state.missions.mission_index += 1;
    state.events.push(GameEvent::MissionCompleted {
        name: def.name.to_string(),
    });
    log::info!("mission '{}' claimed for {} bux", def.name, def.reward_bux);
    Ok(def.reward_bux)
}

/// Tap a floor while a find-mission runs.
pub fn find_item(state: &mut TowerState, floor: FloorId) -> Result<u64, ActionError> {
    let find = state.missions.find.as_ref().ok_or(ActionError::NothingToFind)?;
    if find.floor != floor {
        return Err(ActionError::WrongFloor);
    }
    let name = find.item_name();
    state.missions.find = None;
    state.bux += FIND_REWARD_BUX;
    state.events.push(GameEvent::MissionCompleted {
        name: format!("Found the {}", name),
    });
    Ok(FIND_REWARD_BUX)
}

/// A reader reached `floor`; counts towards a running mini-quest.
pub fn record_delivery(state: &mut TowerState, floor: FloorId) {
    if let Some(q) = &mut state.missions.quest {
        if q.floor == floor {
            q.delivered += 1;
        }
    }
}

/// Per-tick bookkeeping for quests, find-missions and events.
pub fn tick(state: &mut TowerState) {
    tick_quest(state);
    tick_find(state);
    tick_event(state);
}

fn random_ready_floor(state: &mut TowerState) -> Option<FloorId> {
    let ready: Vec<FloorId> = state
        .floors
        .iter()
        .filter(|f| f.is_ready())
        .map(|f| f.id)
        .collect();
    if ready.is_empty() {
        return None;
    }
    let pick = state.roll(ready.len() as u64) as usize;
    Some(ready[pick])
}

fn tick_quest(state: &mut TowerState) {
    let now = state.now;
    if let Some(q) = state.missions.quest.clone() {
        if state.floor(q.floor).is_err() {
            state.missions.quest = None;
        } else if q.delivered >= q.target {
            state.missions.quest = None;
            state.earn_coins(q.reward());
            state.events.push(GameEvent::MissionCompleted {
                name: format!("Delivered {} readers", q.target),
            });
        } else if now >= q.expires_at {
            state.missions.quest = None;
            state.events.push(GameEvent::QuestFailed);
        }
        return;
    }
    if now < state.missions.next_quest_at || state.ready_floor_count() < 2 {
        return;
    }
    state.missions.next_quest_at = now + QUEST_INTERVAL_SECS;
    if let Some(floor) = random_ready_floor(state) {
        let target = 3 + state.roll(3) as u32;
        state.missions.quest = Some(MiniQuest {
            floor,
            target,
            delivered: 0,
            expires_at: now + QUEST_DURATION_SECS,
        });
        state.events.push(GameEvent::QuestOffered);
    }
}

fn tick_find(state: &mut TowerState) {
    let now = state.now;
    if let Some(f) = &state.missions.find {
        let gone = state.floor(f.floor).is_err();
        if gone || now >= f.expires_at {
            state.missions.find = None;
        }
        return;
    }
    if now < state.missions.next_find_at {
        return;
    }
    state.missions.next_find_at = now + FIND_INTERVAL_SECS;
    if let Some(floor) = random_ready_floor(state) {
        let item = state.roll(LOST_ITEMS.len() as u64) as usize;
        let mission = FindMission {
            item,
            floor,
            expires_at: now + FIND_DURATION_SECS,
        };
        state.events.push(GameEvent::ItemLost {
            item: mission.item_name(),
        });
        state.missions.find = Some(mission);
    }
}

fn tick_event(state: &mut TowerState) {
    let now = state.now;
    if let Some(e) = state.missions.event {
        if now >= e.ends_at {
            state.missions.event = None;
            state.events.push(GameEvent::EventEnded { name: e.kind.name() });
        }
        return;
    }
    if state.ready_floor_count() == 0 || state.roll(EVENT_CHANCE) != 0 {
        return;
    }
    let kind = if state.roll(2) == 0 {
        EventKind::BookFair
    } else {
        EventKind::ReadingWeek
    };
    state.missions.event = Some(ActiveEvent {
        kind,
        ends_at: now + EVENT_DURATION_SECS,
    });
    state.events.push(GameEvent::EventStarted { name: kind.name() });
    log::info!("event started: {}", kind.name());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::catalog::FloorType;
    use crate::tower::state::{Floor, FloorStatus};

    fn tower_with_ready_floors(n: u32) -> TowerState {
        let mut s = TowerState::new();
        for id in 1..=n {
            let mut f = Floor::new(id, FloorType::Fiction, format!("Fiction {}", id), 0);
            f.status = FloorStatus::Ready;
            s.floors.push(f);
        }
        s
    }

    fn quest(floor: FloorId) -> MiniQuest {
        MiniQuest {
            floor,
            target: 3,
            delivered: 0,
            expires_at: 100,
        }
    }

    fn find(floor: FloorId) -> FindMission {
        FindMission {
            item: 1,
            floor,
            expires_at: 100,
        }
    }

    fn event() -> ActiveEvent {
        ActiveEvent {
            kind: EventKind::BookFair,
            ends_at: 100,
        }
    }

    #[test]
    fn banner_defaults_to_first_mission() {
        let s = TowerState::new();
        assert_eq!(
            banner(&s),
            Some(Banner::Mission {
                name: "Build 3 floors",
                progress: 0,
                target: 3,
                complete: false
            })
        );
    }

    #[test]
    fn banner_priority_order() {
        let mut s = tower_with_ready_floors(2);
        s.missions.event = Some(event());
        assert!(matches!(banner(&s), Some(Banner::Event { .. })));
        s.missions.find = Some(find(1));
        assert!(matches!(banner(&s), Some(Banner::FindMission { .. })));
        s.missions.quest = Some(quest(2));
        assert!(matches!(banner(&s), Some(Banner::MiniQuest { .. })));
        s.missions.quest = None;
        s.missions.find = None;
        s.missions.event = None;
        assert!(matches!(banner(&s), Some(Banner::Mission { .. })));
    }

    #[test]
    fn banner_none_after_all_missions_claimed() {
        let mut s = TowerState::new();
        s.missions.mission_index = MISSIONS.len();
        assert_eq!(banner(&s), None);
    }

    #[test]
    fn claim_requires_completion() {
        let mut s = TowerState::new();
        assert_eq!(claim_mission(&mut s), Err(ActionError::MissionNotComplete));
        s.stats.floors_built = 3;
        let bux = s.bux;
        assert_eq!(claim_mission(&mut s), Ok(3));
        assert_eq!(s.bux, bux + 3);
        assert_eq!(s.missions.mission_index, 1);
        assert!(s
            .events
            .drain()
            .iter()
            .any(|e| matches!(e, GameEvent::MissionCompleted { .. })));
    }

    #[test]
    fn find_item_checks_floor() {
        let mut s = tower_with_ready_floors(2);
        assert_eq!(find_item(&mut s, 1), Err(ActionError::NothingToFind));
        s.missions.find = Some(find(2));
        assert_eq!(find_item(&mut s, 1), Err(ActionError::WrongFloor));
        let bux = s.bux;
        assert_eq!(find_item(&mut s, 2), Ok(FIND_REWARD_BUX));
        assert_eq!(s.bux, bux + FIND_REWARD_BUX);
        assert!(s.missions.find.is_none());
    }

    #[test]
    fn quest_completes_with_reward() {
        let mut s = tower_with_ready_floors(2);
        s.missions.quest = Some(quest(2));
        for _ in 0..3 {
            record_delivery(&mut s, 2);
        }
        record_delivery(&mut s, 1);
        assert_eq!(s.missions.quest.as_ref().map(|q| q.delivered), Some(3));
        let coins = s.coins;
        tick(&mut s);
        assert!(s.missions.quest.is_none());
        assert_eq!(s.coins, coins + 150);
    }

    #[test]
    fn quest_expires() {
        let mut s = tower_with_ready_floors(2);
        s.missions.quest = Some(quest(2));
        s.now = 100;
        tick(&mut s);
        assert!(s.missions.quest.is_none());
        assert!(s.events.drain().contains(&GameEvent::QuestFailed));
    }

    #[test]
    fn quest_offered_only_with_two_ready_floors() {
        let mut s = tower_with_ready_floors(1);
        s.now = QUEST_INTERVAL_SECS;
        tick(&mut s);
        assert!(s.missions.quest.is_none());

        let mut s = tower_with_ready_floors(2);
        s.now = QUEST_INTERVAL_SECS;
        tick(&mut s);
        let q = s.missions.quest.clone().unwrap();
        assert!((3..=5).contains(&q.target));
        assert_eq!(q.expires_at, QUEST_INTERVAL_SECS + QUEST_DURATION_SECS);
        assert_eq!(s.missions.next_quest_at, 2 * QUEST_INTERVAL_SECS);
    }

    #[test]
    fn find_mission_hides_item_on_ready_floor() {
        let mut s = tower_with_ready_floors(3);
        s.now = FIND_INTERVAL_SECS;
        tick(&mut s);
        let f = s.missions.find.clone().unwrap();
        assert!(s.floor(f.floor).is_ok());
    }

    #[test]
    fn event_ends_on_time() {
        let mut s = tower_with_ready_floors(1);
        s.missions.event = Some(event());
        assert_eq!(s.missions.earnings_mult(), 2.0);
        s.now = 100;
        tick(&mut s);
        assert!(s.missions.event.is_none());
        assert_eq!(s.missions.earnings_mult(), 1.0);
    }
}
