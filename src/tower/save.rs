//! Save, load, export and import.
//!
//! The whole [`TowerState`] is stored as JSON next to a format version and
//! the wall-clock time of the save (for offline catch-up).
//!
//! Versioning:
//! - `SAVE_VERSION` is bumped whenever fields are added. Missing fields are
//!   filled from `TowerState::new()` through `#[serde(default)]`.
//! - `MIN_COMPATIBLE_VERSION` is bumped only for breaking changes. Older
//!   saves are discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logic::{self, OfflineReport};
use super::state::TowerState;

pub const SAVE_VERSION: u32 = 1;
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("save version {found} is too old (oldest supported is {min})")]
    IncompatibleVersion { found: u32, min: u32 },
    #[error("save is damaged: {0}")]
    Damaged(&'static str),
    #[error("browser storage: {0}")]
    Storage(String),
}

#[derive(Debug, Deserialize)]
pub struct SaveData {
    pub version: u32,
    #[serde(default)]
    pub saved_at_ms: f64,
    pub game: TowerState,
}

#[derive(Serialize)]
struct SaveRef<'a> {
    version: u32,
    saved_at_ms: f64,
    game: &'a TowerState,
}

pub fn to_json(state: &TowerState, saved_at_ms: f64) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&SaveRef {
        version: SAVE_VERSION,
        saved_at_ms,
        game: state,
    })?)
}

/// Parse and validate a save. Anything this returns `Ok` for is safe to
/// write to storage.
pub fn parse_save(json: &str) -> Result<SaveData, SaveError> {
    let data: SaveData = serde_json::from_str(json)?;
    if data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::IncompatibleVersion {
            found: data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if !data.game.car.is_consistent() {
        return Err(SaveError::Damaged("elevator arrives before it departs"));
    }
    if data.version < SAVE_VERSION {
        log::info!("migrating save from version {} to {}", data.version, SAVE_VERSION);
    }
    Ok(data)
}

/// Restore a parsed save, replaying the time the page was closed.
pub fn restore(data: SaveData, now_ms: f64, offline_cap_secs: u64) -> (TowerState, OfflineReport) {
    let mut state = data.game;
    let elapsed = if data.saved_at_ms > 0.0 && now_ms > data.saved_at_ms {
        ((now_ms - data.saved_at_ms) / 1000.0) as u64
    } else {
        0
    };
    let report = logic::catch_up(&mut state, elapsed, offline_cap_secs);
    (state, report)
}

/// Download name for an export taken at the given local time.
pub fn export_filename(year: u32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> String {
    format!(
        "simlibrary-save-{:04}{:02}{:02}-{:02}{:02}{:02}.json",
        year, month, day, hour, min, sec
    )
}

/// Storage slot holding the save. Writes go through [`SaveStore::import`]
/// so a bad payload never replaces a good save.
pub trait SaveStore {
    fn read(&self) -> Result<Option<String>, SaveError>;
    fn write(&mut self, json: &str) -> Result<(), SaveError>;
    fn remove(&mut self) -> Result<(), SaveError>;

    /// Validate `json` and only then overwrite the stored save.
    fn import(&mut self, json: &str) -> Result<(), SaveError> {
        parse_save(json)?;
        self.write(json)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{export_save, load_game, now_ms, save_game, start_import};
#[cfg(not(target_arch = "wasm32"))]
pub use native::{export_save, load_game, save_game, start_import};

/// Outside the browser there is nowhere to save to.
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::SaveError;
    use crate::tower::logic::OfflineReport;
    use crate::tower::state::TowerState;

    fn unavailable() -> SaveError {
        SaveError::Storage("not running in a browser".into())
    }

    pub fn save_game(_state: &TowerState, _key: &str) -> Result<(), SaveError> {
        Err(unavailable())
    }

    pub fn load_game(_key: &str, _offline_cap_secs: u64) -> Option<(TowerState, OfflineReport)> {
        None
    }

    pub fn export_save(_key: &str) -> Result<(), SaveError> {
        Err(unavailable())
    }

    pub fn start_import(_key: &str, _errors: Rc<RefCell<Vec<String>>>) -> Result<(), SaveError> {
        Err(unavailable())
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{parse_save, restore, to_json, SaveData, SaveError, SaveStore};
    use crate::tower::logic::OfflineReport;
    use crate::tower::state::TowerState;

    /// `localStorage` under one key.
    pub struct LocalStore {
        storage: web_sys::Storage,
        key: String,
    }

    impl LocalStore {
        pub fn open(key: &str) -> Result<Self, SaveError> {
            let storage = web_sys::window()
                .ok_or_else(|| SaveError::Storage("no window".into()))?
                .local_storage()
                .map_err(|e| SaveError::Storage(format!("{e:?}")))?
                .ok_or_else(|| SaveError::Storage("localStorage disabled".into()))?;
            Ok(Self {
                storage,
                key: key.to_string(),
            })
        }
    }

    impl SaveStore for LocalStore {
        fn read(&self) -> Result<Option<String>, SaveError> {
            self.storage
                .get_item(&self.key)
                .map_err(|e| SaveError::Storage(format!("{e:?}")))
        }

        fn write(&mut self, json: &str) -> Result<(), SaveError> {
            self.storage
                .set_item(&self.key, json)
                .map_err(|e| SaveError::Storage(format!("{e:?}")))
        }

        fn remove(&mut self) -> Result<(), SaveError> {
            self.storage
                .remove_item(&self.key)
                .map_err(|e| SaveError::Storage(format!("{e:?}")))
        }
    }

    pub fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    pub fn save_game(state: &TowerState, key: &str) -> Result<(), SaveError> {
        let json = to_json(state, now_ms())?;
        LocalStore::open(key)?.write(&json)
    }

    /// Load and catch up the stored tower. A corrupt or incompatible save
    /// is dropped and a new tower starts.
    pub fn load_game(key: &str, offline_cap_secs: u64) -> Option<(TowerState, OfflineReport)> {
        let mut store = match LocalStore::open(key) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("{}", e);
                return None;
            }
        };
        let json = store.read().ok().flatten()?;
        let data: SaveData = match parse_save(&json) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("discarding save: {}", e);
                let _ = store.remove();
                return None;
            }
        };
        Some(restore(data, now_ms(), offline_cap_secs))
    }

    /// Download the stored save verbatim as a timestamped `.json` file.
    pub fn export_save(key: &str) -> Result<(), SaveError> {
        let js = |e: wasm_bindgen::JsValue| SaveError::Storage(format!("{e:?}"));
        let json = LocalStore::open(key)?
            .read()?
            .ok_or_else(|| SaveError::Storage("nothing saved yet".into()))?;

        let parts = js_sys::Array::of1(&json.into());
        let opts = web_sys::BlobPropertyBag::new();
        opts.set_type("application/json");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts).map_err(js)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js)?;

        let d = js_sys::Date::new_0();
        let name = super::export_filename(
            d.get_full_year(),
            d.get_month() + 1,
            d.get_date(),
            d.get_hours(),
            d.get_minutes(),
            d.get_seconds(),
        );
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SaveError::Storage("no document".into()))?;
        let a: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js)?
            .dyn_into()
            .map_err(|_| SaveError::Storage("anchor element".into()))?;
        a.set_href(&url);
        a.set_download(&name);
        a.click();
        let _ = web_sys::Url::revoke_object_url(&url);
        log::info!("exported save as {}", name);
        Ok(())
    }

    /// Ask the player for a save file. A valid file replaces the stored
    /// save and reloads the page; any failure is pushed to `errors` and
    /// the current save is left alone.
    pub fn start_import(key: &str, errors: Rc<RefCell<Vec<String>>>) -> Result<(), SaveError> {
        let js = |e: wasm_bindgen::JsValue| SaveError::Storage(format!("{e:?}"));
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SaveError::Storage("no document".into()))?;
        let input: web_sys::HtmlInputElement = document
            .create_element("input")
            .map_err(js)?
            .dyn_into()
            .map_err(|_| SaveError::Storage("input element".into()))?;
        input.set_type("file");
        input.set_accept(".json,application/json");

        let key = key.to_string();
        let picker = input.clone();
        let onchange = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(file) = picker.files().and_then(|list| list.get(0)) else {
                return;
            };
            let reader = match web_sys::FileReader::new() {
                Ok(r) => r,
                Err(e) => {
                    errors.borrow_mut().push(format!("cannot read file: {e:?}"));
                    return;
                }
            };
            let key = key.clone();
            let errors = errors.clone();
            let source = reader.clone();
            let onload = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let text = source.result().ok().and_then(|v| v.as_string());
                let outcome = text
                    .ok_or_else(|| SaveError::Storage("file is not text".into()))
                    .and_then(|text| LocalStore::open(&key)?.import(&text));
                match outcome {
                    Ok(()) => {
                        log::info!("save imported, reloading");
                        if let Some(w) = web_sys::window() {
                            let _ = w.location().reload();
                        }
                    }
                    Err(e) => {
                        log::warn!("import rejected: {}", e);
                        errors.borrow_mut().push(format!("Import failed: {}", e));
                    }
                }
            });
            reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
            if let Err(e) = reader.read_as_text(&file) {
                errors.borrow_mut().push(format!("cannot read file: {e:?}"));
            }
        });
        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
        input.click();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::catalog::FloorType;

    /// In-memory stand-in for `localStorage`.
    #[derive(Default)]
    struct MemStore(Option<String>);

    impl SaveStore for MemStore {
        fn read(&self) -> Result<Option<String>, SaveError> {
            Ok(self.0.clone())
        }
        fn write(&mut self, json: &str) -> Result<(), SaveError> {
            self.0 = Some(json.to_string());
            Ok(())
        }
        fn remove(&mut self) -> Result<(), SaveError> {
            self.0 = None;
            Ok(())
        }
    }

    fn sample_tower() -> TowerState {
        let mut s = TowerState::new();
        let id = logic::build_floor(&mut s, FloorType::Mystery).unwrap();
        logic::tick(&mut s, 5);
        s.floor_mut(id).unwrap().trash = 35;
        s.stats.total_checkouts = 12;
        s
    }

    #[test]
    fn save_and_parse_keeps_state() {
        let s = sample_tower();
        let json = to_json(&s, 1_000.0).unwrap();
        let data = parse_save(&json).unwrap();
        assert_eq!(data.version, SAVE_VERSION);
        assert_eq!(data.saved_at_ms, 1_000.0);
        assert_eq!(data.game.now, s.now);
        assert_eq!(data.game.coins, s.coins);
        assert_eq!(data.game.floors, s.floors);
        assert_eq!(data.game.stats, s.stats);
        assert_eq!(data.game.rng_state, s.rng_state);
        assert!(data.game.events.is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let data = parse_save(r#"{"version":1,"game":{"coins":7}}"#).unwrap();
        assert_eq!(data.game.coins, 7);
        assert_eq!(data.game.bux, crate::tower::state::STARTING_BUX);
        assert!(data.game.floors.is_empty());
        assert_eq!(data.saved_at_ms, 0.0);
    }

    #[test]
    fn old_version_rejected() {
        let err = parse_save(r#"{"version":0,"game":{}}"#).unwrap_err();
        assert!(matches!(
            err,
            SaveError::IncompatibleVersion {
                found: 0,
                min: MIN_COMPATIBLE_VERSION
            }
        ));
    }

    #[test]
    fn import_garbage_leaves_existing_save() {
        let good = to_json(&sample_tower(), 0.0).unwrap();
        let mut store = MemStore(Some(good.clone()));
        assert!(matches!(store.import("not json at all"), Err(SaveError::Parse(_))));
        assert!(matches!(
            store.import(r#"{"version":0,"game":{}}"#),
            Err(SaveError::IncompatibleVersion { .. })
        ));
        assert!(store.import(r#"{"hello":"world"}"#).is_err());
        assert_eq!(store.read().unwrap(), Some(good));
    }

    #[test]
    fn import_with_inverted_car_times_rejected() {
        let mut bad = TowerState::new();
        bad.car = crate::tower::state::Car::Returning {
            from: 1,
            departed_at: 90,
            arrives_at: 40,
        };
        let json = to_json(&bad, 0.0).unwrap();
        assert!(matches!(parse_save(&json), Err(SaveError::Damaged(_))));

        let good = to_json(&sample_tower(), 0.0).unwrap();
        let mut store = MemStore(Some(good.clone()));
        assert!(store.import(&json).is_err());
        assert_eq!(store.read().unwrap(), Some(good));
    }

    #[test]
    fn import_valid_overwrites() {
        let mut store = MemStore(Some("old".into()));
        let json = to_json(&TowerState::new(), 5.0).unwrap();
        store.import(&json).unwrap();
        assert_eq!(store.read().unwrap(), Some(json));
    }

    #[test]
    fn restore_catches_up_capped() {
        let s = sample_tower();
        let before = s.now;
        let json = to_json(&s, 1_000.0).unwrap();
        let data = parse_save(&json).unwrap();
        let (restored, report) = restore(data, 1_000.0 + 60_000.0, 7200);
        assert_eq!(report.secs, 60);
        assert_eq!(restored.now, before + 60);

        let data = parse_save(&json).unwrap();
        let (_, report) = restore(data, 1_000.0 + 1e9, 7200);
        assert_eq!(report.secs, 7200);
    }

    #[test]
    fn restore_ignores_clock_going_backwards() {
        let json = to_json(&TowerState::new(), 50_000.0).unwrap();
        let data = parse_save(&json).unwrap();
        let (s, report) = restore(data, 10.0, 7200);
        assert_eq!(report.secs, 0);
        assert_eq!(s.now, 0);
    }

    #[test]
    fn export_filename_is_zero_padded() {
        assert_eq!(
            export_filename(2024, 3, 7, 9, 5, 0),
            "simlibrary-save-20240307-090500.json"
        );
    }

    #[test]
    fn error_messages() {
        let e = SaveError::IncompatibleVersion { found: 0, min: 1 };
        assert_eq!(e.to_string(), "save version 0 is too old (oldest supported is 1)");
    }
}
