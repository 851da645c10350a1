use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::{TowerState, STAFF_SLOTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    FirstCheckout,
    Checkouts100,
    Checkouts1000,
    Floors5,
    Floors10,
    FullStaff,
    FirstVip,
    Coins10k,
}

pub const ALL_ACHIEVEMENTS: [Achievement; 8] = [
    Achievement::FirstCheckout,
    Achievement::Checkouts100,
    Achievement::Checkouts1000,
    Achievement::Floors5,
    Achievement::Floors10,
    Achievement::FullStaff,
    Achievement::FirstVip,
    Achievement::Coins10k,
];

impl Achievement {
    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstCheckout => "First Checkout",
            Achievement::Checkouts100 => "Bookworm",
            Achievement::Checkouts1000 => "Lending Legend",
            Achievement::Floors5 => "Five Stories",
            Achievement::Floors10 => "Skyscraper Stacks",
            Achievement::FullStaff => "Fully Staffed",
            Achievement::FirstVip => "Red Carpet",
            Achievement::Coins10k => "Well Funded",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstCheckout => "Check out your first book",
            Achievement::Checkouts100 => "Check out 100 books",
            Achievement::Checkouts1000 => "Check out 1,000 books",
            Achievement::Floors5 => "Build 5 floors",
            Achievement::Floors10 => "Build 10 floors",
            Achievement::FullStaff => "Fill every staff slot on a floor",
            Achievement::FirstVip => "Escort a VIP",
            Achievement::Coins10k => "Earn 10,000 coins in total",
        }
    }

    fn is_met(&self, state: &TowerState) -> bool {
        let stats = &state.stats;
        match self {
            Achievement::FirstCheckout => stats.total_checkouts >= 1,
            Achievement::Checkouts100 => stats.total_checkouts >= 100,
            Achievement::Checkouts1000 => stats.total_checkouts >= 1000,
            Achievement::Floors5 => stats.floors_built >= 5,
            Achievement::Floors10 => stats.floors_built >= 10,
            Achievement::FullStaff => state.floors.iter().any(|f| f.staff_count() == STAFF_SLOTS),
            Achievement::FirstVip => stats.vips_escorted >= 1,
            Achievement::Coins10k => stats.coins_earned >= 10_000,
        }
    }
}

/// Unlock every newly met achievement. Each unlocks once.
pub fn check(state: &mut TowerState) {
    for a in ALL_ACHIEVEMENTS {
        if !state.achievements.contains(&a) && a.is_met(state) {
            state.achievements.insert(a);
            state.events.push(GameEvent::AchievementUnlocked { name: a.name() });
            log::info!("achievement unlocked: {}", a.name());
        }
    }
}
