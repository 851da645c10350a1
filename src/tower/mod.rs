//! SimLibrary: build a library tower, staff it, keep the shelves stocked.
//!
//! [`TowerGame`] is the controller. It owns the simulation state plus the
//! UI-only state around it (modals, toasts, scroll, drag) and turns input
//! into calls to the mutators in [`logic`].

pub mod achievements;
pub mod actions;
pub mod catalog;
pub mod elevator;
pub mod error;
pub mod events;
pub mod layout;
pub mod logic;
pub mod missions;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::config::Config;
use crate::input::{ClickState, InputEvent};

use actions::*;
use catalog::ALL_FLOOR_TYPES;
use error::ActionError;
use events::GameEvent;
use layout::{DragPreview, Hit, ScrollState, TowerLayout};
use missions::Banner;
use state::{FloorId, StaffId, TowerState, ALL_INCIDENTS, STAFF_SLOTS};

const MAX_TOASTS: usize = 3;

/// Actions that need a yes/no first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirm {
    DeleteFloor(FloorId),
    FireStaff(StaffId),
    DismissVip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modal {
    None,
    Build,
    FloorDetail(FloorId),
    Applicant,
    Vip,
    Stats,
    Achievements,
    Confirm(Confirm),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub ticks_left: u32,
}

pub struct TowerGame {
    pub state: TowerState,
    pub config: Config,
    pub modal: Modal,
    /// Where to go back to when a confirm dialog is answered.
    confirm_return: Modal,
    pub toasts: VecDeque<Toast>,
    /// Bumped on every new toast so the renderer can restart its effect.
    pub toast_serial: u64,
    pub scroll: ScrollState,
    pub detail_scroll: ScrollState,
    /// Geometry of the last drawn frame; taps are resolved against it.
    pub layout: TowerLayout,
    pub drag: Option<DragPreview>,
    /// Staff member waiting for a target slot.
    pub moving_staff: Option<StaffId>,
    ticks_since_save: u32,
    save_pending: bool,
    /// Errors reported by browser callbacks (file import).
    import_errors: Rc<RefCell<Vec<String>>>,
    pub fx: render::ToastFx,
}

impl TowerGame {
    pub fn new(config: Config) -> Self {
        Self::with_state(TowerState::new(), config)
    }

    pub fn with_state(state: TowerState, config: Config) -> Self {
        Self {
            state,
            config,
            modal: Modal::None,
            confirm_return: Modal::None,
            toasts: VecDeque::new(),
            toast_serial: 0,
            scroll: ScrollState::default(),
            detail_scroll: ScrollState::default(),
            layout: TowerLayout::default(),
            drag: None,
            moving_staff: None,
            ticks_since_save: 0,
            save_pending: false,
            import_errors: Rc::new(RefCell::new(Vec::new())),
            fx: render::ToastFx::default(),
        }
    }

    /// Restore the stored tower (with offline catch-up) or start fresh.
    pub fn load(config: Config) -> Self {
        if let Some((state, report)) = save::load_game(&config.storage_key, config.offline_cap_secs) {
            log::info!("save loaded, {}s replayed", report.secs);
            let mut game = Self::with_state(state, config);
            if report.secs > 0 {
                game.toast(
                    format!(
                        "Welcome back! {} checkouts, +{} coins while away",
                        report.checkouts,
                        logic::format_number(report.coins)
                    ),
                    ToastKind::Success,
                );
            }
            return game;
        }
        Self::new(config)
    }

    pub fn toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            text: text.into(),
            kind,
            ticks_left: self.config.toast_ticks,
        });
        self.toast_serial += 1;
    }

    fn report<T>(&mut self, result: Result<T, ActionError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.toast(e.to_string(), ToastKind::Error);
                None
            }
        }
    }

    // ── Tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, delta_ticks: u32) {
        if delta_ticks > 0 {
            logic::tick(&mut self.state, delta_ticks);
            for t in &mut self.toasts {
                t.ticks_left = t.ticks_left.saturating_sub(delta_ticks);
            }
            self.toasts.retain(|t| t.ticks_left > 0);
            self.ticks_since_save += delta_ticks;
        }
        self.drain_events();
        let errors: Vec<String> = self.import_errors.borrow_mut().drain(..).collect();
        for e in errors {
            self.toast(e, ToastKind::Error);
        }
        // A modal about a floor that no longer exists closes itself.
        if let Modal::FloorDetail(id) = self.modal {
            if self.state.floor(id).is_err() {
                self.modal = Modal::None;
            }
        }
        if self.save_pending || self.ticks_since_save >= self.config.autosave_ticks {
            self.persist();
        }
    }

    fn drain_events(&mut self) {
        let mut coins = 0;
        let mut checkouts = 0;
        for event in self.state.events.drain() {
            if let GameEvent::Checkout { coins: c, .. } = event {
                coins += c;
                checkouts += 1;
                continue;
            }
            if let Some((text, kind)) = self.describe(&event) {
                self.toast(text, kind);
            }
        }
        if checkouts > 0 {
            let books = if checkouts == 1 { "book" } else { "books" };
            self.toast(
                format!("+{} coins ({} {} checked out)", coins, checkouts, books),
                ToastKind::Info,
            );
        }
    }

    fn floor_name(&self, id: FloorId) -> String {
        self.state
            .floor(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|_| "a floor".to_string())
    }

    fn describe(&self, event: &GameEvent) -> Option<(String, ToastKind)> {
        use ToastKind::*;
        let msg = match event {
            GameEvent::Checkout { .. } => return None,
            GameEvent::ReaderLeft { floor } => {
                (format!("A reader left {} empty-handed", self.floor_name(*floor)), Error)
            }
            GameEvent::FloorCompleted { floor } => {
                (format!("{} is open!", self.floor_name(*floor)), Success)
            }
            GameEvent::RestockCompleted { floor, category } => {
                let shelf = self
                    .state
                    .floor(*floor)
                    .map(|f| catalog::floor_info(f.type_id).categories[*category])
                    .unwrap_or("Shelf");
                (format!("{} restocked", shelf), Info)
            }
            GameEvent::ApplicantArrived { name } => {
                (format!("{} is looking for a job in the lobby", name), Info)
            }
            GameEvent::VipArrived => ("A VIP is waiting in the lobby!".to_string(), Success),
            GameEvent::IncidentStarted { floor, name } => {
                (format!("{} on {}", name, self.floor_name(*floor)), Error)
            }
            GameEvent::AchievementUnlocked { name } => {
                (format!("Achievement: {}", name), Success)
            }
            GameEvent::MissionCompleted { name } => (format!("Done: {}", name), Success),
            GameEvent::EventStarted { name } => (format!("{} has begun!", name), Success),
            GameEvent::EventEnded { name } => (format!("{} is over", name), Info),
            GameEvent::QuestOffered => ("New quest! Check the banner".to_string(), Info),
            GameEvent::QuestFailed => ("Quest expired".to_string(), Error),
            GameEvent::ItemLost { item } => {
                (format!("Someone lost their {}. Find it!", item), Info)
            }
        };
        Some(msg)
    }

    fn persist(&mut self) {
        self.ticks_since_save = 0;
        self.save_pending = false;
        if let Err(e) = save::save_game(&self.state, &self.config.storage_key) {
            log::debug!("autosave skipped: {}", e);
        }
    }

    // ── Input ──────────────────────────────────────────────────

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match *event {
            InputEvent::Key(c) => self.handle_key(c),
            InputEvent::Click(id) => self.handle_click(id),
            InputEvent::Tap { col, row } => self.handle_tap(col, row),
            InputEvent::Scroll(rows) => {
                let rows = rows.round() as i32;
                if self.modal == Modal::None {
                    self.scroll.scroll_by(rows);
                } else {
                    self.detail_scroll.scroll_by(rows);
                }
                rows != 0
            }
            InputEvent::ReorderStart { col, row } => self.start_reorder(col, row),
            InputEvent::ReorderMove { row } => {
                let Some(drag) = self.drag else {
                    return false;
                };
                if let Some(to) = self.layout.reorder_target(row) {
                    self.drag = Some(DragPreview { to, ..drag });
                }
                true
            }
            InputEvent::ReorderDrop { row } => {
                let Some(drag) = self.drag.take() else {
                    return false;
                };
                let to = self.layout.reorder_target(row).unwrap_or(drag.to);
                let result = logic::move_floor(&mut self.state, drag.from, to);
                self.report(result);
                true
            }
        };
        // Scrolling and dragging change nothing worth saving.
        if consumed && !matches!(event, InputEvent::Scroll(_) | InputEvent::ReorderMove { .. }) {
            self.save_pending = true;
        }
        consumed
    }

    /// Whether a press at this cell may turn into a floor drag.
    pub fn can_reorder_at(&self, col: u16, row: u16) -> bool {
        self.modal == Modal::None
            && matches!(
                self.layout.hit_test(col, row),
                Some(Hit::Floor(_) | Hit::Shelf { .. } | Hit::StaffSlot { .. })
            )
    }

    fn start_reorder(&mut self, col: u16, row: u16) -> bool {
        if !self.can_reorder_at(col, row) {
            return false;
        }
        let Some(from) = self.layout.floor_index_at(row) else {
            return false;
        };
        self.drag = Some(DragPreview { from, to: from });
        true
    }

    fn open(&mut self, modal: Modal) {
        self.modal = modal;
        self.detail_scroll.reset();
        self.drag = None;
    }

    fn ask(&mut self, confirm: Confirm) {
        self.confirm_return = self.modal;
        self.modal = Modal::Confirm(confirm);
    }

    fn close(&mut self) -> bool {
        if self.moving_staff.take().is_some() {
            return true;
        }
        match self.modal {
            Modal::None => false,
            Modal::Confirm(_) => {
                self.modal = self.confirm_return;
                true
            }
            _ => {
                self.open(Modal::None);
                true
            }
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        if key == '\x1b' || key == 'q' {
            return self.close();
        }
        match self.modal {
            Modal::None => match key {
                'b' => self.handle_click(OPEN_BUILD),
                's' => self.handle_click(OPEN_STATS),
                'a' => self.handle_click(OPEN_ACHIEVEMENTS),
                'e' => self.handle_click(EXPORT_SAVE),
                'i' => self.handle_click(IMPORT_SAVE),
                'm' => self.handle_click(BANNER),
                'l' => self.handle_click(OPEN_APPLICANT),
                'v' => self.handle_click(OPEN_VIP),
                'k' => self.handle_click(SCROLL_UP),
                'j' => self.handle_click(SCROLL_DOWN),
                _ => false,
            },
            Modal::Build => match key.to_digit(10) {
                Some(d @ 1..=8) => self.handle_click(BUILD_BASE + d as u16 - 1),
                _ => false,
            },
            Modal::FloorDetail(_) => match key {
                '1'..='3' => self.handle_click(RESTOCK_BASE + digit(key) - 1),
                '4'..='6' => self.handle_click(RUSH_RESTOCK_BASE + digit(key) - 4),
                '7'..='9' => self.handle_click(FIRE_BASE + digit(key) - 7),
                'r' => self.handle_click(RUSH_BUILD),
                'u' => self.handle_click(UPGRADE),
                'c' => self.handle_click(CLEAN),
                'x' => self.handle_click(DELETE_FLOOR),
                'f' => self.handle_click(FIX_BASE),
                'g' => self.handle_click(FIX_BASE + 1),
                'h' => self.handle_click(FIX_BASE + 2),
                'z' => self.handle_click(MOVE_BASE),
                'w' => self.handle_click(MOVE_BASE + 1),
                'o' => self.handle_click(MOVE_BASE + 2),
                'k' => self.handle_click(SCROLL_UP),
                'j' => self.handle_click(SCROLL_DOWN),
                _ => false,
            },
            Modal::Applicant => match key {
                'd' => self.handle_click(DISMISS_APPLICANT),
                '1'..='9' => self.handle_click(HIRE_BASE + digit(key) - 1),
                _ => false,
            },
            Modal::Vip => match key {
                'd' => self.handle_click(DISMISS_VIP),
                '1'..='9' => self.handle_click(ESCORT_BASE + digit(key) - 1),
                _ => false,
            },
            Modal::Confirm(_) => match key {
                'y' => self.handle_click(CONFIRM_YES),
                'n' => self.handle_click(CONFIRM_NO),
                _ => false,
            },
            Modal::Stats | Modal::Achievements => match key {
                'k' => self.handle_click(SCROLL_UP),
                'j' => self.handle_click(SCROLL_DOWN),
                _ => false,
            },
        }
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match (self.modal, id) {
            (_, CLOSE_MODAL) => self.close(),
            (Modal::None, SCROLL_UP) => {
                self.scroll.scroll_by(-(layout::FLOOR_ROWS as i32));
                true
            }
            (Modal::None, SCROLL_DOWN) => {
                self.scroll.scroll_by(layout::FLOOR_ROWS as i32);
                true
            }
            (_, SCROLL_UP) => {
                self.detail_scroll.scroll_by(-3);
                true
            }
            (_, SCROLL_DOWN) => {
                self.detail_scroll.scroll_by(3);
                true
            }
            (Modal::None, OPEN_BUILD) => {
                self.open(Modal::Build);
                true
            }
            (Modal::None, OPEN_STATS) => {
                self.open(Modal::Stats);
                true
            }
            (Modal::None, OPEN_ACHIEVEMENTS) => {
                self.open(Modal::Achievements);
                true
            }
            (Modal::None, EXPORT_SAVE) => {
                self.export();
                true
            }
            (Modal::None, IMPORT_SAVE) => {
                self.import();
                true
            }
            (Modal::None, OPEN_APPLICANT) => self.tap_hit(Hit::Applicant),
            (Modal::None, OPEN_VIP) => self.tap_hit(Hit::Vip),
            (Modal::None, BANNER) => {
                self.banner_tapped();
                true
            }
            (Modal::Build, id) if (BUILD_BASE..BUILD_BASE + ALL_FLOOR_TYPES.len() as u16).contains(&id) => {
                let kind = ALL_FLOOR_TYPES[(id - BUILD_BASE) as usize];
                let result = logic::build_floor(&mut self.state, kind);
                if let Some(floor) = self.report(result) {
                    self.toast(format!("Building {}", self.floor_name(floor)), ToastKind::Info);
                    self.open(Modal::None);
                    // Jump to the top where the new floor goes up.
                    self.scroll.offset = 0;
                }
                true
            }
            (Modal::FloorDetail(floor), id) => self.floor_action(floor, id),
            (Modal::Applicant, DISMISS_APPLICANT) => {
                let result = logic::dismiss_applicant(&mut self.state);
                self.report(result);
                self.open(Modal::None);
                true
            }
            (Modal::Applicant, id) if (HIRE_BASE..HIRE_BASE + LIST_RANGE).contains(&id) => {
                let choices = hire_choices(&self.state);
                let Some(&(floor, slot)) = choices.get((id - HIRE_BASE) as usize) else {
                    return false;
                };
                let result = logic::hire_applicant(&mut self.state, floor, slot);
                if self.report(result).is_some() {
                    self.toast(format!("Hired onto {}", self.floor_name(floor)), ToastKind::Success);
                    self.open(Modal::None);
                }
                true
            }
            (Modal::Vip, DISMISS_VIP) => {
                self.ask(Confirm::DismissVip);
                true
            }
            (Modal::Vip, id) if (ESCORT_BASE..ESCORT_BASE + LIST_RANGE).contains(&id) => {
                let floors = escort_choices(&self.state);
                let Some(&floor) = floors.get((id - ESCORT_BASE) as usize) else {
                    return false;
                };
                let result = logic::escort_vip(&mut self.state, floor);
                if let Some(kind) = self.report(result) {
                    self.toast(format!("{} {}", kind.name(), kind.description()), ToastKind::Success);
                    self.open(Modal::None);
                }
                true
            }
            (Modal::Confirm(confirm), CONFIRM_YES) => {
                self.modal = self.confirm_return;
                self.confirmed(confirm);
                true
            }
            (Modal::Confirm(_), CONFIRM_NO) => {
                self.modal = self.confirm_return;
                true
            }
            _ => false,
        }
    }

    fn floor_action(&mut self, floor: FloorId, id: u16) -> bool {
        let result = match id {
            id if (RESTOCK_BASE..RESTOCK_BASE + 3).contains(&id) => {
                logic::restock_books(&mut self.state, floor, (id - RESTOCK_BASE) as usize).map(|_| ())
            }
            id if (RUSH_RESTOCK_BASE..RUSH_RESTOCK_BASE + 3).contains(&id) => {
                logic::rush_restock(&mut self.state, floor, (id - RUSH_RESTOCK_BASE) as usize)
            }
            RUSH_BUILD => logic::rush_build(&mut self.state, floor).map(|_| ()),
            UPGRADE => match logic::upgrade_floor(&mut self.state, floor) {
                Ok(level) => {
                    self.toast(format!("Upgraded to level {}", level), ToastKind::Success);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            CLEAN => logic::clean_floor(&mut self.state, floor),
            DELETE_FLOOR => {
                self.ask(Confirm::DeleteFloor(floor));
                return true;
            }
            id if (FIX_BASE..FIX_BASE + ALL_INCIDENTS.len() as u16).contains(&id) => {
                let incident = ALL_INCIDENTS[(id - FIX_BASE) as usize];
                logic::fix_incident(&mut self.state, floor, incident).map(|_| ())
            }
            id if (FIRE_BASE..FIRE_BASE + STAFF_SLOTS as u16).contains(&id) => {
                match self.staff_in_slot(floor, (id - FIRE_BASE) as usize) {
                    Ok(staff) => {
                        self.ask(Confirm::FireStaff(staff));
                        return true;
                    }
                    Err(e) => Err(e),
                }
            }
            id if (MOVE_BASE..MOVE_BASE + STAFF_SLOTS as u16).contains(&id) => {
                match self.staff_in_slot(floor, (id - MOVE_BASE) as usize) {
                    Ok(staff) => {
                        self.moving_staff = Some(staff);
                        self.open(Modal::None);
                        self.toast("Tap a free staff slot to move them there", ToastKind::Info);
                        return true;
                    }
                    Err(e) => Err(e),
                }
            }
            _ => return false,
        };
        self.report(result);
        true
    }

    fn staff_in_slot(&self, floor: FloorId, slot: usize) -> Result<StaffId, ActionError> {
        let f = self.state.floor(floor)?;
        f.staff
            .get(slot)
            .ok_or(ActionError::InvalidSlot)?
            .ok_or(ActionError::NoStaff)
    }

    fn confirmed(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::DeleteFloor(floor) => {
                let name = self.floor_name(floor);
                let result = logic::delete_floor(&mut self.state, floor);
                if self.report(result).is_some() {
                    self.toast(format!("{} demolished", name), ToastKind::Info);
                    self.open(Modal::None);
                }
            }
            Confirm::FireStaff(staff) => {
                let result = logic::fire_staff(&mut self.state, staff);
                self.report(result);
            }
            Confirm::DismissVip => {
                let result = logic::dismiss_vip(&mut self.state);
                self.report(result);
                self.open(Modal::None);
            }
        }
    }

    fn banner_tapped(&mut self) {
        match missions::banner(&self.state) {
            Some(Banner::Mission { complete: true, .. }) => {
                let result = logic::claim_mission(&mut self.state);
                if let Some(bux) = self.report(result) {
                    self.toast(format!("Mission reward: +{} bux", bux), ToastKind::Success);
                }
            }
            Some(Banner::Mission { name, progress, target, .. }) => {
                self.toast(format!("{}: {}/{}", name, progress, target), ToastKind::Info);
            }
            Some(Banner::MiniQuest { floor, target, .. }) => {
                self.toast(
                    format!("Send {} readers to {}", target, self.floor_name(floor)),
                    ToastKind::Info,
                );
            }
            Some(Banner::FindMission { item, .. }) => {
                self.toast(format!("Tap the floor hiding the {}", item), ToastKind::Info);
            }
            Some(Banner::Event { name, description, .. }) => {
                self.toast(format!("{}: {}", name, description), ToastKind::Info);
            }
            None => {}
        }
    }

    fn handle_tap(&mut self, col: u16, row: u16) -> bool {
        if self.modal != Modal::None {
            return false;
        }
        match self.layout.hit_test(col, row) {
            Some(hit) => self.tap_hit(hit),
            None => false,
        }
    }

    fn tap_hit(&mut self, hit: Hit) -> bool {
        if let Some(staff) = self.moving_staff {
            if let Hit::StaffSlot { floor, slot } = hit {
                let result = logic::reassign_staff(&mut self.state, staff, floor, slot);
                if self.report(result).is_some() {
                    self.moving_staff = None;
                }
                return true;
            }
        }
        // Any row of the floor hiding the lost item finds it.
        let on_floor = match hit {
            Hit::Floor(floor) | Hit::Shelf { floor, .. } | Hit::StaffSlot { floor, .. } => Some(floor),
            _ => None,
        };
        if let Some(floor) = on_floor.filter(|_| self.state.missions.find.is_some()) {
            if let Ok(bux) = logic::find_item(&mut self.state, floor) {
                self.toast(format!("Found it! +{} bux", bux), ToastKind::Success);
                return true;
            }
        }
        match hit {
            Hit::Floor(floor) => self.open(Modal::FloorDetail(floor)),
            Hit::Shelf { floor, category } => {
                let result = logic::restock_books(&mut self.state, floor, category);
                if self.report(result).is_some() {
                    self.toast("Restocking...", ToastKind::Info);
                }
            }
            Hit::StaffSlot { floor, slot } => {
                let occupied = self
                    .state
                    .floor(floor)
                    .map(|f| f.staff.get(slot).copied().flatten().is_some())
                    .unwrap_or(false);
                if !occupied && self.state.applicant.is_some() {
                    let result = logic::hire_applicant(&mut self.state, floor, slot);
                    if self.report(result).is_some() {
                        self.toast(format!("Hired onto {}", self.floor_name(floor)), ToastKind::Success);
                    }
                } else {
                    self.open(Modal::FloorDetail(floor));
                }
            }
            Hit::Elevator => {
                let waiting = self.state.waiting_count();
                self.toast(format!("{} readers waiting for the elevator", waiting), ToastKind::Info);
            }
            Hit::Applicant => {
                if self.state.applicant.is_some() {
                    self.open(Modal::Applicant);
                } else {
                    self.report::<()>(Err(ActionError::NoApplicant));
                }
            }
            Hit::Vip => {
                if self.state.vip.is_some() {
                    self.open(Modal::Vip);
                } else {
                    self.report::<()>(Err(ActionError::NoVip));
                }
            }
        }
        true
    }

    fn export(&mut self) {
        self.persist();
        match save::export_save(&self.config.storage_key) {
            Ok(()) => self.toast("Save exported", ToastKind::Success),
            Err(e) => self.toast(format!("Export failed: {}", e), ToastKind::Error),
        }
    }

    fn import(&mut self) {
        if let Err(e) = save::start_import(&self.config.storage_key, self.import_errors.clone()) {
            self.toast(format!("Import failed: {}", e), ToastKind::Error);
        }
    }

    // ── Render ─────────────────────────────────────────────────

    /// Draw the frame. `alpha` is the clock's fraction towards the next tick.
    pub fn render(&mut self, f: &mut Frame, area: Rect, cs: &mut ClickState, now_ms: f64, alpha: f64) {
        render::render(self, f, area, cs, now_ms, alpha);
    }
}

fn digit(c: char) -> u16 {
    c.to_digit(10).unwrap_or(0) as u16
}

/// First free slot of every ready floor, top floor first.
pub fn hire_choices(state: &TowerState) -> Vec<(FloorId, usize)> {
    state
        .floors
        .iter()
        .rev()
        .filter(|f| f.is_ready())
        .filter_map(|f| f.free_slot().map(|slot| (f.id, slot)))
        .collect()
}

/// Ready floors a VIP can be escorted to, top floor first.
pub fn escort_choices(state: &TowerState) -> Vec<FloorId> {
    state
        .floors
        .iter()
        .rev()
        .filter(|f| f.is_ready())
        .map(|f| f.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::catalog::FloorType;
    use crate::tower::state::{Applicant, ArrivingVip, FloorStatus, VipKind};

    fn game_with_floors(n: usize) -> TowerGame {
        let mut game = TowerGame::new(Config::default());
        game.state.coins = 100_000;
        for _ in 0..n {
            let id = logic::build_floor(&mut game.state, FloorType::PictureBooks).unwrap();
            game.state.floor_mut(id).unwrap().status = FloorStatus::Ready;
        }
        game.layout = TowerLayout::compute(
            &game.state,
            Rect::new(0, 0, 60, 40),
            &game.scroll,
            None,
            0.0,
        );
        game
    }

    fn applicant() -> Applicant {
        Applicant {
            name: "Iris".into(),
            color: "magenta".into(),
            emoji: "🧐".into(),
            dream_genre: FloorType::History,
        }
    }

    #[test]
    fn build_via_keys() {
        let mut game = TowerGame::new(Config::default());
        assert!(game.handle_input(&InputEvent::Key('b')));
        assert_eq!(game.modal, Modal::Build);
        assert!(game.handle_input(&InputEvent::Key('1')));
        assert_eq!(game.state.floors.len(), 1);
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn failed_action_shows_error_toast() {
        let mut game = TowerGame::new(Config::default());
        game.state.coins = 0;
        game.handle_input(&InputEvent::Key('b'));
        game.handle_input(&InputEvent::Key('8'));
        assert!(game.state.floors.is_empty());
        let last = game.toasts.back().unwrap();
        assert_eq!(last.kind, ToastKind::Error);
        assert!(last.text.starts_with("not enough coins"));
        assert_eq!(game.modal, Modal::Build);
    }

    #[test]
    fn escape_closes_modal_but_not_top_level() {
        let mut game = TowerGame::new(Config::default());
        assert!(!game.handle_input(&InputEvent::Key('\x1b')));
        game.handle_input(&InputEvent::Key('s'));
        assert_eq!(game.modal, Modal::Stats);
        assert!(game.handle_input(&InputEvent::Key('q')));
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn delete_floor_needs_confirmation() {
        let mut game = game_with_floors(2);
        let id = game.state.floors[0].id;
        game.open(Modal::FloorDetail(id));
        game.handle_input(&InputEvent::Key('x'));
        assert_eq!(game.modal, Modal::Confirm(Confirm::DeleteFloor(id)));
        game.handle_input(&InputEvent::Key('n'));
        assert_eq!(game.modal, Modal::FloorDetail(id));
        assert_eq!(game.state.floors.len(), 2);

        game.handle_input(&InputEvent::Key('x'));
        game.handle_input(&InputEvent::Key('y'));
        assert_eq!(game.state.floors.len(), 1);
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn fire_staff_needs_confirmation() {
        let mut game = game_with_floors(1);
        let id = game.state.floors[0].id;
        game.state.applicant = Some(applicant());
        logic::hire_applicant(&mut game.state, id, 1).unwrap();
        game.open(Modal::FloorDetail(id));
        // Slot 0 is empty.
        game.handle_input(&InputEvent::Key('7'));
        assert_eq!(game.toasts.back().unwrap().kind, ToastKind::Error);
        game.handle_input(&InputEvent::Key('8'));
        assert!(matches!(game.modal, Modal::Confirm(Confirm::FireStaff(_))));
        game.handle_input(&InputEvent::Click(CONFIRM_YES));
        assert!(game.state.staff.is_empty());
    }

    #[test]
    fn tap_on_floor_opens_detail() {
        let mut game = game_with_floors(2);
        let top = game.layout.floors[0].clone();
        assert!(game.handle_input(&InputEvent::Tap {
            col: top.title.x,
            row: top.title.y
        }));
        assert_eq!(game.modal, Modal::FloorDetail(top.id));
    }

    #[test]
    fn tap_on_empty_slot_hires_applicant() {
        let mut game = game_with_floors(1);
        game.state.applicant = Some(applicant());
        let slot = game.layout.floors[0].slots[2];
        game.handle_input(&InputEvent::Tap {
            col: slot.x,
            row: slot.y,
        });
        let id = game.layout.floors[0].id;
        assert_eq!(game.state.floor(id).unwrap().staff_count(), 1);
        assert!(game.state.floor(id).unwrap().staff[2].is_some());
    }

    #[test]
    fn move_staff_then_tap_slot() {
        let mut game = game_with_floors(2);
        let top = game.layout.floors[0].clone();
        let bottom = game.layout.floors[1].clone();
        game.state.applicant = Some(applicant());
        logic::hire_applicant(&mut game.state, top.id, 0).unwrap();
        game.open(Modal::FloorDetail(top.id));
        game.handle_input(&InputEvent::Key('z'));
        assert!(game.moving_staff.is_some());
        let target = bottom.slots[1];
        game.handle_input(&InputEvent::Tap {
            col: target.x,
            row: target.y,
        });
        assert!(game.moving_staff.is_none());
        assert_eq!(game.state.floor(bottom.id).unwrap().staff_count(), 1);
        assert_eq!(game.state.floor(top.id).unwrap().staff_count(), 0);
    }

    #[test]
    fn reorder_gesture_moves_floor() {
        let mut game = game_with_floors(3);
        let top = game.layout.floors[0].clone();
        let bottom = game.layout.floors[2].clone();
        assert!(game.handle_input(&InputEvent::ReorderStart {
            col: bottom.title.x,
            row: bottom.title.y
        }));
        assert_eq!(game.drag, Some(DragPreview { from: 0, to: 0 }));
        game.handle_input(&InputEvent::ReorderMove { row: top.title.y });
        assert_eq!(game.drag, Some(DragPreview { from: 0, to: 2 }));
        game.handle_input(&InputEvent::ReorderDrop { row: top.title.y });
        assert!(game.drag.is_none());
        assert_eq!(game.state.floors[2].id, bottom.id);
    }

    #[test]
    fn reorder_refused_while_car_serves_floor() {
        let mut game = game_with_floors(3);
        let top = game.layout.floors[0].clone();
        let bottom = game.layout.floors[2].clone();
        game.state.car = state::Car::Up {
            reader: 99,
            floor: top.id,
            departed_at: 0,
            arrives_at: 6,
        };
        game.handle_input(&InputEvent::ReorderStart {
            col: bottom.title.x,
            row: bottom.title.y,
        });
        game.handle_input(&InputEvent::ReorderDrop { row: top.title.y });
        assert_eq!(game.state.floors[0].id, bottom.id);
        assert_eq!(game.state.floors[2].id, top.id);
        let last = game.toasts.back().unwrap();
        assert_eq!(last.kind, ToastKind::Error);
        assert_eq!(last.text, ActionError::ElevatorBusy.to_string());
    }

    #[test]
    fn reorder_ignored_with_modal_open() {
        let mut game = game_with_floors(2);
        game.open(Modal::Stats);
        let f = game.layout.floors[0].clone();
        assert!(!game.can_reorder_at(f.title.x, f.title.y));
        assert!(!game.handle_input(&InputEvent::ReorderStart {
            col: f.title.x,
            row: f.title.y
        }));
    }

    #[test]
    fn events_become_toasts_once() {
        let mut game = game_with_floors(1);
        game.state.events.push(GameEvent::VipArrived);
        game.state.events.push(GameEvent::Checkout {
            floor: 1,
            kind: catalog::ReaderKind::Kid,
            coins: 3,
        });
        game.state.events.push(GameEvent::Checkout {
            floor: 1,
            kind: catalog::ReaderKind::Adult,
            coins: 6,
        });
        game.tick(0);
        let texts: Vec<&str> = game.toasts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["A VIP is waiting in the lobby!", "+9 coins (2 books checked out)"]
        );
        game.tick(0);
        assert_eq!(game.toasts.len(), 2);
    }

    #[test]
    fn toasts_expire_and_are_capped() {
        let mut game = TowerGame::new(Config::default());
        for i in 0..5 {
            game.toast(format!("t{}", i), ToastKind::Info);
        }
        assert_eq!(game.toasts.len(), MAX_TOASTS);
        assert_eq!(game.toasts.front().unwrap().text, "t2");
        game.toasts.iter_mut().for_each(|t| t.ticks_left = 1);
        game.tick(1);
        assert!(game.toasts.is_empty());
    }

    #[test]
    fn escort_vip_from_modal() {
        let mut game = game_with_floors(2);
        game.state.vip = Some(ArrivingVip {
            kind: VipKind::Donor,
            arrived_at: 0,
        });
        let bux = game.state.bux;
        game.handle_input(&InputEvent::Key('v'));
        assert_eq!(game.modal, Modal::Vip);
        game.handle_input(&InputEvent::Key('1'));
        assert_eq!(game.state.bux, bux + state::DONOR_BUX);
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn dismiss_vip_needs_confirmation() {
        let mut game = game_with_floors(1);
        game.state.vip = Some(ArrivingVip {
            kind: VipKind::Critic,
            arrived_at: 0,
        });
        game.handle_input(&InputEvent::Key('v'));
        game.handle_input(&InputEvent::Key('d'));
        assert_eq!(game.modal, Modal::Confirm(Confirm::DismissVip));
        game.handle_input(&InputEvent::Key('y'));
        assert!(game.state.vip.is_none());
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn banner_claims_completed_mission() {
        let mut game = TowerGame::new(Config::default());
        game.state.stats.floors_built = 3;
        let bux = game.state.bux;
        game.handle_input(&InputEvent::Key('m'));
        assert_eq!(game.state.bux, bux + 3);
    }

    #[test]
    fn hire_choices_list_ready_floors_top_first() {
        let mut game = game_with_floors(2);
        game.state.floors.push(state::Floor::new(99, FloorType::Comics, "Comics".into(), 0));
        let ids: Vec<FloorId> = hire_choices(&game.state).iter().map(|c| c.0).collect();
        assert_eq!(ids, vec![game.state.floors[1].id, game.state.floors[0].id]);
    }

    #[test]
    fn tap_on_shelf_of_hidden_floor_finds_item() {
        let mut game = game_with_floors(2);
        let hidden = game.layout.floors[1].clone();
        game.state.missions.find = Some(missions::FindMission {
            item: 0,
            floor: hidden.id,
            expires_at: 10_000,
        });
        let bux = game.state.bux;
        let shelf = hidden.shelves[1];
        assert!(game.handle_input(&InputEvent::Tap {
            col: shelf.x,
            row: shelf.y
        }));
        assert!(game.state.missions.find.is_none());
        assert_eq!(game.state.bux, bux + missions::FIND_REWARD_BUX);
        let floor = game.state.floor(hidden.id).unwrap();
        assert!(floor.book_stock.iter().all(|c| c.restock.is_none()));
        assert_eq!(game.toasts.back().unwrap().kind, ToastKind::Success);
    }

    #[test]
    fn tap_on_staff_row_of_hidden_floor_finds_item() {
        let mut game = game_with_floors(1);
        let hidden = game.layout.floors[0].clone();
        game.state.applicant = Some(applicant());
        game.state.missions.find = Some(missions::FindMission {
            item: 1,
            floor: hidden.id,
            expires_at: 10_000,
        });
        let slot = hidden.slots[0];
        game.handle_input(&InputEvent::Tap {
            col: slot.x,
            row: slot.y,
        });
        assert!(game.state.missions.find.is_none());
        // The applicant is still in the lobby.
        assert!(game.state.applicant.is_some());
        assert_eq!(game.modal, Modal::None);
    }

    #[test]
    fn consumed_input_marks_save_pending() {
        let mut game = TowerGame::new(Config::default());
        game.handle_input(&InputEvent::Key('s'));
        assert!(game.save_pending);
        game.tick(0);
        assert!(!game.save_pending);

        let mut game = TowerGame::new(Config::default());
        assert!(game.handle_input(&InputEvent::Scroll(2.0)));
        assert!(!game.save_pending);
    }
}
