//! Why a player action was refused. The controller shows the `Display`
//! text as an error toast.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not enough coins (needs {cost})")]
    NotEnoughCoins { cost: u64 },
    #[error("not enough bux (needs {cost})")]
    NotEnoughBux { cost: u64 },
    #[error("no such floor")]
    FloorNotFound,
    #[error("floor is still under construction")]
    FloorNotReady,
    #[error("floor is already open")]
    AlreadyBuilt,
    #[error("no such book category")]
    InvalidCategory,
    #[error("shelf is already full")]
    StockFull,
    #[error("shelf is already being restocked")]
    AlreadyRestocking,
    #[error("nothing is being restocked")]
    NotRestocking,
    #[error("hire staff on this floor first")]
    NoStaff,
    #[error("no free staff slot")]
    NoFreeSlot,
    #[error("that slot is already taken")]
    SlotTaken,
    #[error("no such staff slot")]
    InvalidSlot,
    #[error("no such staff member")]
    StaffNotFound,
    #[error("nobody is waiting in the lobby")]
    NoApplicant,
    #[error("no VIP is waiting")]
    NoVip,
    #[error("floor is fully upgraded")]
    MaxUpgrade,
    #[error("floor is already clean")]
    NothingToClean,
    #[error("no such incident on this floor")]
    NoSuchIncident,
    #[error("reader cannot go from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("nothing is lost right now")]
    NothingToFind,
    #[error("not on this floor, keep looking")]
    WrongFloor,
    #[error("no such mission")]
    MissionNotFound,
    #[error("mission is not complete yet")]
    MissionNotComplete,
    #[error("position is out of range")]
    InvalidIndex,
    #[error("wait for the elevator to finish its trip")]
    ElevatorBusy,
}
