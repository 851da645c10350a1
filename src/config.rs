//! Runtime tunables shared by the clock, gesture recognizer and save layer.
//!
//! Balance numbers (costs, durations, probabilities) live next to the state
//! they describe in `tower::state`; this struct only holds values that shape
//! how the app runs around the simulation.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulation ticks per real second.
    pub ticks_per_sec: u32,
    /// Largest frame delta fed to the clock, in ms.
    pub max_frame_ms: f64,
    /// Pointer travel (px) before a press stops being a tap.
    pub drag_threshold_px: f64,
    /// Hold time (ms) before a press on a floor enters reorder mode.
    pub long_press_ms: f64,
    /// Ticks between autosaves.
    pub autosave_ticks: u32,
    /// Upper bound on replayed offline seconds.
    pub offline_cap_secs: u64,
    /// localStorage key holding the save.
    pub storage_key: String,
    /// Toast lifetime in ticks.
    pub toast_ticks: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticks_per_sec: 1,
            max_frame_ms: 2_000.0,
            drag_threshold_px: 12.0,
            long_press_ms: 500.0,
            autosave_ticks: 30,
            offline_cap_secs: 7_200,
            storage_key: "simLibrarySave".to_string(),
            toast_ticks: 4,
        }
    }
}
