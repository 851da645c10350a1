//! SimLibrary tower state: floors, readers, staff, lobby and currencies.
//!
//! Times are simulation seconds (`TowerState::now`, one per tick).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::achievements::Achievement;
use super::catalog::{floor_info, restock_cost, FloorType, ReaderKind, CATEGORY_TIERS};
use super::error::ActionError;
use super::events::EventQueue;
use super::missions::MissionState;

pub type FloorId = u32;
pub type StaffId = u32;
pub type ReaderId = u32;

// ── Balance ───────────────────────────────────────────────────────────

pub const STARTING_COINS: u64 = 250;
pub const STARTING_BUX: u64 = 5;
pub const STAFF_SLOTS: usize = 3;
pub const CATEGORY_COUNT: usize = 3;
pub const MAX_UPGRADE: u8 = 3;
/// Cost growth per floor already standing.
pub const BUILD_COST_GROWTH: f64 = 1.4;
/// Upgrade cost = base build cost × this × (level + 1).
pub const UPGRADE_COST_MULT: u64 = 3;
pub const TRASH_MAX: u32 = 100;
pub const TRASH_PER_CHECKOUT: u32 = 5;
pub const ELEVATOR_SECS_PER_FLOOR: u64 = 2;
pub const BROWSE_SECS: u64 = 5;
pub const MAX_WAITING: usize = 8;
/// Per ready floor per tick, in percent.
pub const SPAWN_CHANCE_PCT: u64 = 5;
pub const APPLICANT_INTERVAL_SECS: u64 = 90;
/// One in N per tick.
pub const VIP_CHANCE: u64 = 180;
pub const INCIDENT_CHANCE: u64 = 900;
/// Each assigned staff member (dream-job staff count double).
pub const STAFF_RESTOCK_REDUCTION: f64 = 0.15;
pub const DONOR_BUX: u64 = 5;
pub const RUSH_RESTOCK_BUX: u64 = 1;

// ── Floors ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FloorStatus {
    Building { started_at: u64, ends_at: u64 },
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Restock {
    pub ends_at: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookCategory {
    pub current: u32,
    pub max: u32,
    pub restock: Option<Restock>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Incident {
    LeakyPipe,
    BrokenLight,
    JammedDoor,
}

pub const ALL_INCIDENTS: [Incident; 3] =
    [Incident::LeakyPipe, Incident::BrokenLight, Incident::JammedDoor];

impl Incident {
    pub fn name(&self) -> &'static str {
        match self {
            Incident::LeakyPipe => "Leaky pipe",
            Incident::BrokenLight => "Broken light",
            Incident::JammedDoor => "Jammed door",
        }
    }

    pub fn fix_cost(&self) -> u64 {
        match self {
            Incident::LeakyPipe => 40,
            Incident::BrokenLight => 25,
            Incident::JammedDoor => 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub type_id: FloorType,
    pub name: String,
    pub status: FloorStatus,
    pub book_stock: [BookCategory; CATEGORY_COUNT],
    pub staff: [Option<StaffId>; STAFF_SLOTS],
    pub trash: u32,
    pub incidents: BTreeSet<Incident>,
    pub upgrade_level: u8,
}

impl Floor {
    /// A new floor under construction with empty shelves.
    pub fn new(id: FloorId, type_id: FloorType, name: String, now: u64) -> Self {
        let info = floor_info(type_id);
        let book_stock = std::array::from_fn(|tier| BookCategory {
            current: 0,
            max: CATEGORY_TIERS[tier].max_stock,
            restock: None,
        });
        Self {
            id,
            type_id,
            name,
            status: FloorStatus::Building {
                started_at: now,
                ends_at: now + info.build_secs,
            },
            book_stock,
            staff: [None; STAFF_SLOTS],
            trash: 0,
            incidents: BTreeSet::new(),
            upgrade_level: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == FloorStatus::Ready
    }

    pub fn staff_count(&self) -> usize {
        self.staff.iter().filter(|s| s.is_some()).count()
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.staff.iter().position(|s| s.is_none())
    }

    pub fn has_stock(&self) -> bool {
        self.book_stock.iter().any(|c| c.current > 0)
    }

    pub fn total_stock(&self) -> u32 {
        self.book_stock.iter().map(|c| c.current).sum()
    }

    pub fn category(&self, index: usize) -> Result<&BookCategory, ActionError> {
        self.book_stock.get(index).ok_or(ActionError::InvalidCategory)
    }

    pub fn category_mut(&mut self, index: usize) -> Result<&mut BookCategory, ActionError> {
        self.book_stock.get_mut(index).ok_or(ActionError::InvalidCategory)
    }

    pub fn restock_cost(&self, index: usize) -> u64 {
        restock_cost(self.type_id, index)
    }

    /// Coins multiplier from upgrades, trash and open incidents.
    pub fn earning_mult(&self) -> f64 {
        let upgrade = 1.0 + 0.25 * self.upgrade_level as f64;
        let trash = if self.trash >= TRASH_MAX { 0.5 } else { 1.0 };
        let incidents = 0.75_f64.powi(self.incidents.len() as i32);
        upgrade * trash * incidents
    }

    /// Upgrade cost to the next level, None at max.
    pub fn upgrade_cost(&self) -> Option<u64> {
        (self.upgrade_level < MAX_UPGRADE).then(|| {
            floor_info(self.type_id).base_build_cost
                * UPGRADE_COST_MULT
                * (self.upgrade_level as u64 + 1)
        })
    }

    /// Seconds left on construction, 0 when open.
    pub fn build_remaining(&self, now: u64) -> u64 {
        match self.status {
            FloorStatus::Building { ends_at, .. } => ends_at.saturating_sub(now),
            FloorStatus::Ready => 0,
        }
    }
}

// ── Readers ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElevatorState {
    Waiting,
    Riding { departed_at: u64, arrives_at: u64 },
    Arrived { checkout_at: u64 },
}

impl ElevatorState {
    pub fn name(&self) -> &'static str {
        match self {
            ElevatorState::Waiting => "waiting",
            ElevatorState::Riding { .. } => "riding",
            ElevatorState::Arrived { .. } => "arrived",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub kind: ReaderKind,
    pub floor_id: FloorId,
    pub elevator: ElevatorState,
    /// Coins credited at checkout; set when the book is picked.
    pub earning: u64,
}

impl Reader {
    pub fn new(id: ReaderId, kind: ReaderKind, floor_id: FloorId) -> Self {
        Self {
            id,
            kind,
            floor_id,
            elevator: ElevatorState::Waiting,
            earning: 0,
        }
    }

    /// `Waiting → Riding`.
    pub fn board(&mut self, departed_at: u64, arrives_at: u64) -> Result<(), ActionError> {
        match self.elevator {
            ElevatorState::Waiting => {
                self.elevator = ElevatorState::Riding {
                    departed_at,
                    arrives_at,
                };
                Ok(())
            }
            other => Err(ActionError::InvalidTransition {
                from: other.name(),
                to: "riding",
            }),
        }
    }

    /// `Riding → Arrived`.
    pub fn arrive(&mut self, checkout_at: u64) -> Result<(), ActionError> {
        match self.elevator {
            ElevatorState::Riding { .. } => {
                self.elevator = ElevatorState::Arrived { checkout_at };
                Ok(())
            }
            other => Err(ActionError::InvalidTransition {
                from: other.name(),
                to: "arrived",
            }),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.elevator == ElevatorState::Waiting
    }
}

/// The single elevator car.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Car {
    Idle,
    Up {
        reader: ReaderId,
        floor: FloorId,
        departed_at: u64,
        arrives_at: u64,
    },
    Returning {
        from: FloorId,
        departed_at: u64,
        arrives_at: u64,
    },
}

impl Car {
    /// Length of the current trip in seconds, 0 when idle.
    pub fn trip_secs(&self) -> u64 {
        match *self {
            Car::Idle => 0,
            Car::Up {
                departed_at,
                arrives_at,
                ..
            }
            | Car::Returning {
                departed_at,
                arrives_at,
                ..
            } => arrives_at.saturating_sub(departed_at),
        }
    }

    /// A trip never arrives before it departs.
    pub fn is_consistent(&self) -> bool {
        match *self {
            Car::Idle => true,
            Car::Up {
                departed_at,
                arrives_at,
                ..
            }
            | Car::Returning {
                departed_at,
                arrives_at,
                ..
            } => arrives_at >= departed_at,
        }
    }
}

// ── Staff and lobby ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub color: String,
    pub emoji: String,
    pub dream_genre: FloorType,
    pub assignment: Option<(FloorId, usize)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub color: String,
    pub emoji: String,
    pub dream_genre: FloorType,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VipKind {
    /// Finishes the oldest construction.
    Builder,
    /// Completes every running restock on the escorted floor.
    Critic,
    /// Grants bux.
    Donor,
}

impl VipKind {
    pub fn name(&self) -> &'static str {
        match self {
            VipKind::Builder => "Master Builder",
            VipKind::Critic => "Book Critic",
            VipKind::Donor => "Generous Donor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VipKind::Builder => "finishes the oldest construction",
            VipKind::Critic => "refills every restocking shelf on a floor",
            VipKind::Donor => "donates 5 bux",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrivingVip {
    pub kind: VipKind,
    pub arrived_at: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_checkouts: u64,
    pub coins_earned: u64,
    pub floors_built: u32,
    pub staff_hired: u32,
    pub vips_escorted: u32,
    pub readers_lost: u64,
}

// ── Tower ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerState {
    pub now: u64,
    pub coins: u64,
    pub bux: u64,
    /// Bottom to top; index = height above the lobby.
    pub floors: Vec<Floor>,
    pub readers: Vec<Reader>,
    pub car: Car,
    pub staff: Vec<Staff>,
    pub applicant: Option<Applicant>,
    pub next_applicant_at: u64,
    pub vip: Option<ArrivingVip>,
    pub missions: MissionState,
    pub achievements: BTreeSet<Achievement>,
    pub stats: Stats,
    pub next_id: u32,
    pub rng_state: u64,
    #[serde(skip)]
    pub events: EventQueue,
}

impl Default for TowerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerState {
    pub fn new() -> Self {
        Self {
            now: 0,
            coins: STARTING_COINS,
            bux: STARTING_BUX,
            floors: Vec::new(),
            readers: Vec::new(),
            car: Car::Idle,
            staff: Vec::new(),
            applicant: None,
            // First applicant shows up quickly so the first floor can be staffed.
            next_applicant_at: 20,
            vip: None,
            missions: MissionState::default(),
            achievements: BTreeSet::new(),
            stats: Stats::default(),
            next_id: 1,
            rng_state: 0x5151_4c49_4252_4152,
            events: EventQueue::new(),
        }
    }

    pub fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniform-ish roll in `0..n` from the tower's LCG.
    pub fn roll(&mut self, n: u64) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        if n == 0 {
            0
        } else {
            (self.rng_state >> 33) % n
        }
    }

    pub fn floor(&self, id: FloorId) -> Result<&Floor, ActionError> {
        self.floors
            .iter()
            .find(|f| f.id == id)
            .ok_or(ActionError::FloorNotFound)
    }

    pub fn floor_mut(&mut self, id: FloorId) -> Result<&mut Floor, ActionError> {
        self.floors
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(ActionError::FloorNotFound)
    }

    /// Height index of a floor (0 = first floor above the lobby).
    pub fn floor_index(&self, id: FloorId) -> Option<usize> {
        self.floors.iter().position(|f| f.id == id)
    }

    pub fn staff_member(&self, id: StaffId) -> Result<&Staff, ActionError> {
        self.staff
            .iter()
            .find(|s| s.id == id)
            .ok_or(ActionError::StaffNotFound)
    }

    pub fn ready_floor_count(&self) -> usize {
        self.floors.iter().filter(|f| f.is_ready()).count()
    }

    pub fn waiting_count(&self) -> usize {
        self.readers.iter().filter(|r| r.is_waiting()).count()
    }

    /// Cost of the next floor of `kind`, growing with every floor standing.
    pub fn build_cost(&self, kind: FloorType) -> u64 {
        let base = floor_info(kind).base_build_cost as f64;
        (base * BUILD_COST_GROWTH.powi(self.floors.len() as i32)).round() as u64
    }

    /// Seconds for the elevator to reach floor index `index`.
    pub fn travel_secs(index: usize) -> u64 {
        ELEVATOR_SECS_PER_FLOOR * (index as u64 + 1)
    }

    pub fn spend_coins(&mut self, cost: u64) -> Result<(), ActionError> {
        if self.coins < cost {
            return Err(ActionError::NotEnoughCoins { cost });
        }
        self.coins -= cost;
        Ok(())
    }

    pub fn spend_bux(&mut self, cost: u64) -> Result<(), ActionError> {
        if self.bux < cost {
            return Err(ActionError::NotEnoughBux { cost });
        }
        self.bux -= cost;
        Ok(())
    }

    pub fn earn_coins(&mut self, amount: u64) {
        self.coins += amount;
        self.stats.coins_earned += amount;
    }
}
