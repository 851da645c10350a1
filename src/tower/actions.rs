//! Action IDs for SimLibrary click targets.

// Top bar
pub const OPEN_BUILD: u16 = 1;
pub const OPEN_STATS: u16 = 2;
pub const OPEN_ACHIEVEMENTS: u16 = 3;
pub const EXPORT_SAVE: u16 = 4;
pub const IMPORT_SAVE: u16 = 5;
/// Tap on the mission/quest/event banner.
pub const BANNER: u16 = 6;
pub const OPEN_APPLICANT: u16 = 7;
pub const OPEN_VIP: u16 = 8;
pub const CLOSE_MODAL: u16 = 9;
pub const SCROLL_UP: u16 = 10;
pub const SCROLL_DOWN: u16 = 11;

// Build list: BUILD_BASE + index into ALL_FLOOR_TYPES
pub const BUILD_BASE: u16 = 100;

// Floor detail
pub const RESTOCK_BASE: u16 = 200;
pub const RUSH_RESTOCK_BASE: u16 = 210;
pub const RUSH_BUILD: u16 = 220;
pub const UPGRADE: u16 = 221;
pub const CLEAN: u16 = 222;
pub const DELETE_FLOOR: u16 = 223;
/// FIX_BASE + index into ALL_INCIDENTS
pub const FIX_BASE: u16 = 230;
/// FIRE_BASE + staff slot
pub const FIRE_BASE: u16 = 240;
/// MOVE_BASE + staff slot
pub const MOVE_BASE: u16 = 250;

// Lobby applicant: HIRE_BASE + index into the hire choices
pub const HIRE_BASE: u16 = 300;
pub const DISMISS_APPLICANT: u16 = 299;

// VIP: ESCORT_BASE + index into the ready floors
pub const ESCORT_BASE: u16 = 400;
pub const DISMISS_VIP: u16 = 399;

// Confirm dialog
pub const CONFIRM_YES: u16 = 500;
pub const CONFIRM_NO: u16 = 501;

/// Longest hire or escort list.
pub const LIST_RANGE: u16 = 90;
