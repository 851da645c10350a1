//! Where the elevator car is drawn between ticks.

use super::state::{Car, TowerState};

/// Fraction of a trip completed at `now`, clamped to `[0, 1]`.
/// A zero-length trip is always complete.
pub fn progress(now: f64, arrives_at: f64, travel: f64) -> f64 {
    if travel <= 0.0 {
        return 1.0;
    }
    let p = (now - (arrives_at - travel)) / travel;
    if p.is_nan() {
        return 1.0;
    }
    p.clamp(0.0, 1.0)
}

/// Car height in levels: 0.0 is the lobby, `i + 1` is floor index `i`.
/// `now` is the tick counter plus the clock's fractional alpha.
pub fn car_level(state: &TowerState, now: f64) -> f64 {
    match state.car {
        Car::Idle => 0.0,
        Car::Up { floor, arrives_at, .. } => {
            let Some(index) = state.floor_index(floor) else {
                return 0.0;
            };
            let travel = state.car.trip_secs() as f64;
            let target = index as f64 + 1.0;
            target * progress(now, arrives_at as f64, travel)
        }
        Car::Returning { from, arrives_at, .. } => {
            let Some(index) = state.floor_index(from) else {
                return 0.0;
            };
            let travel = state.car.trip_secs() as f64;
            let start = index as f64 + 1.0;
            start * (1.0 - progress(now, arrives_at as f64, travel))
        }
    }
}
