//! Static game data: floor types, their book categories, reader kinds and
//! the applicant name pool.

use serde::{Deserialize, Serialize};

/// Floor types in build-list order. Each one is also a staff "dream genre".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FloorType {
    PictureBooks,
    Fiction,
    Mystery,
    Science,
    History,
    Comics,
    Poetry,
    Cookbooks,
}

pub const ALL_FLOOR_TYPES: [FloorType; 8] = [
    FloorType::PictureBooks,
    FloorType::Fiction,
    FloorType::Mystery,
    FloorType::Science,
    FloorType::History,
    FloorType::Comics,
    FloorType::Poetry,
    FloorType::Cookbooks,
];

pub struct FloorTypeInfo {
    pub name: &'static str,
    pub emoji: &'static str,
    pub categories: [&'static str; 3],
    pub base_build_cost: u64,
    pub build_secs: u64,
    /// Scales restock cost and sale value of every category.
    pub value_mult: f64,
}

pub fn floor_info(kind: FloorType) -> FloorTypeInfo {
    match kind {
        FloorType::PictureBooks => FloorTypeInfo {
            name: "Picture Books",
            emoji: "🧸",
            categories: ["Board Books", "Fairy Tales", "Pop-ups"],
            base_build_cost: 100,
            build_secs: 30,
            value_mult: 1.0,
        },
        FloorType::Fiction => FloorTypeInfo {
            name: "Fiction",
            emoji: "📖",
            categories: ["Classics", "Romance", "Adventure"],
            base_build_cost: 150,
            build_secs: 45,
            value_mult: 1.2,
        },
        FloorType::Mystery => FloorTypeInfo {
            name: "Mystery",
            emoji: "🔍",
            categories: ["Detective", "Thriller", "Cozy"],
            base_build_cost: 200,
            build_secs: 60,
            value_mult: 1.4,
        },
        FloorType::Science => FloorTypeInfo {
            name: "Science",
            emoji: "🔬",
            categories: ["Physics", "Biology", "Astronomy"],
            base_build_cost: 250,
            build_secs: 75,
            value_mult: 1.6,
        },
        FloorType::History => FloorTypeInfo {
            name: "History",
            emoji: "🏛",
            categories: ["Ancient", "Medieval", "Modern"],
            base_build_cost: 300,
            build_secs: 90,
            value_mult: 1.8,
        },
        FloorType::Comics => FloorTypeInfo {
            name: "Comics",
            emoji: "💥",
            categories: ["Superheroes", "Manga", "Strips"],
            base_build_cost: 350,
            build_secs: 105,
            value_mult: 2.0,
        },
        FloorType::Poetry => FloorTypeInfo {
            name: "Poetry",
            emoji: "🪶",
            categories: ["Sonnets", "Haiku", "Epics"],
            base_build_cost: 400,
            build_secs: 120,
            value_mult: 2.2,
        },
        FloorType::Cookbooks => FloorTypeInfo {
            name: "Cookbooks",
            emoji: "🍳",
            categories: ["Baking", "Vegetarian", "World Cuisine"],
            base_build_cost: 450,
            build_secs: 135,
            value_mult: 2.4,
        },
    }
}

/// Per-tier category numbers before the floor-type multiplier.
pub struct CategoryTier {
    pub max_stock: u32,
    pub restock_cost: u64,
    pub restock_secs: u64,
    pub sale_value: u64,
}

pub const CATEGORY_TIERS: [CategoryTier; 3] = [
    CategoryTier {
        max_stock: 10,
        restock_cost: 20,
        restock_secs: 30,
        sale_value: 3,
    },
    CategoryTier {
        max_stock: 15,
        restock_cost: 45,
        restock_secs: 60,
        sale_value: 5,
    },
    CategoryTier {
        max_stock: 20,
        restock_cost: 90,
        restock_secs: 120,
        sale_value: 8,
    },
];

/// Restock cost of category `tier` on a floor of `kind`.
pub fn restock_cost(kind: FloorType, tier: usize) -> u64 {
    let t = &CATEGORY_TIERS[tier.min(2)];
    (t.restock_cost as f64 * floor_info(kind).value_mult).round() as u64
}

/// Coins per book of category `tier` on a floor of `kind`, before bonuses.
pub fn sale_value(kind: FloorType, tier: usize) -> f64 {
    CATEGORY_TIERS[tier.min(2)].sale_value as f64 * floor_info(kind).value_mult
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReaderKind {
    Kid,
    Teen,
    Adult,
    Senior,
    Student,
    Vip,
}

impl ReaderKind {
    pub fn emoji(&self) -> &'static str {
        match self {
            ReaderKind::Kid => "🧒",
            ReaderKind::Teen => "🧑",
            ReaderKind::Adult => "🧔",
            ReaderKind::Senior => "👵",
            ReaderKind::Student => "🎓",
            ReaderKind::Vip => "🎩",
        }
    }

    /// Category tier this reader looks for first.
    pub fn preferred_tier(&self) -> usize {
        match self {
            ReaderKind::Kid | ReaderKind::Teen => 0,
            ReaderKind::Adult | ReaderKind::Student => 1,
            ReaderKind::Senior | ReaderKind::Vip => 2,
        }
    }

    pub fn earning_mult(&self) -> f64 {
        match self {
            ReaderKind::Vip => 3.0,
            _ => 1.0,
        }
    }

    /// Pick a regular (non-VIP) reader kind from a roll in `0..100`.
    pub fn from_roll(roll: u64) -> Self {
        match roll {
            0..=19 => ReaderKind::Kid,
            20..=39 => ReaderKind::Teen,
            40..=64 => ReaderKind::Adult,
            65..=79 => ReaderKind::Senior,
            80..=97 => ReaderKind::Student,
            _ => ReaderKind::Vip,
        }
    }
}

pub const STAFF_NAMES: [&str; 16] = [
    "Ada", "Basil", "Clara", "Dewey", "Edith", "Felix", "Greta", "Hugo", "Iris", "Jasper",
    "Kit", "Lena", "Milo", "Nora", "Otto", "Pearl",
];

pub const STAFF_EMOJI: [&str; 6] = ["🤓", "😊", "🧐", "😎", "🙂", "🤗"];

pub const STAFF_COLORS: [&str; 6] = ["red", "green", "yellow", "blue", "magenta", "cyan"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_floor_type_has_three_named_categories() {
        for kind in ALL_FLOOR_TYPES {
            let info = floor_info(kind);
            assert!(info.categories.iter().all(|c| !c.is_empty()));
            assert!(info.base_build_cost > 0);
            assert!(info.build_secs > 0);
        }
    }

    #[test]
    fn later_floor_types_cost_more() {
        let costs: Vec<u64> = ALL_FLOOR_TYPES
            .iter()
            .map(|k| floor_info(*k).base_build_cost)
            .collect();
        assert!(costs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn higher_tiers_sell_for_more() {
        for kind in ALL_FLOOR_TYPES {
            assert!(sale_value(kind, 0) < sale_value(kind, 1));
            assert!(sale_value(kind, 1) < sale_value(kind, 2));
            assert!(restock_cost(kind, 0) < restock_cost(kind, 2));
        }
    }

    #[test]
    fn tier_index_is_clamped() {
        assert_eq!(
            restock_cost(FloorType::Fiction, 9),
            restock_cost(FloorType::Fiction, 2)
        );
    }

    #[test]
    fn reader_roll_covers_all_regular_kinds() {
        assert_eq!(ReaderKind::from_roll(0), ReaderKind::Kid);
        assert_eq!(ReaderKind::from_roll(30), ReaderKind::Teen);
        assert_eq!(ReaderKind::from_roll(50), ReaderKind::Adult);
        assert_eq!(ReaderKind::from_roll(70), ReaderKind::Senior);
        assert_eq!(ReaderKind::from_roll(90), ReaderKind::Student);
        assert_eq!(ReaderKind::from_roll(99), ReaderKind::Vip);
    }
}
