//! Error types for the roster scheduler.

use chrono::NaiveDate;
use thiserror::Error;

use crate::roster::Role;

/// Problems with the scheduling inputs, detected before any date is filled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("roster is empty")]
    EmptyRoster,

    #[error("calendar has no Sundays to schedule")]
    EmptyCalendar,

    #[error("person {0:?} appears more than once in the roster")]
    DuplicatePerson(String),

    #[error("nobody on the roster can serve as {0}")]
    RoleWithoutCandidates(Role),

    #[error("role {0} is listed more than once in the role order")]
    DuplicateRole(Role),

    #[error("rotation lists {0:?} more than once")]
    DuplicateInRotation(String),

    #[error("rotation lists {0:?}, who is not on the roster")]
    UnknownInRotation(String),

    #[error("rotation lists {0:?}, who cannot lead worship")]
    RotationMemberNotCapable(String),

    #[error("calendar is not strictly ascending at {0}")]
    CalendarNotAscending(NaiveDate),

    #[error("seed history entry on {0} is not before the first scheduled Sunday")]
    SeedOverlapsRun(NaiveDate),

    #[error("seed history has conflicting entries for {person:?} on {date}")]
    SeedConflict { date: NaiveDate, person: String },

    #[error("both {first:?} and {second:?} are preaching on {date}")]
    DoublePreacher {
        date: NaiveDate,
        first: String,
        second: String,
    },

    #[error("pairing condition names {0:?}, who is not on the roster")]
    UnknownPairingPerson(String),

    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    #[error("{field} must be at most {max}")]
    LimitTooHigh { field: String, max: u32 },

    #[error("calendar date {0} is not a Sunday")]
    NotSunday(NaiveDate),
}

/// Failures while running the engine. Anything other than `Config` means
/// a collaborator handed over inconsistent data.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0} is not on the scheduling timeline")]
    DateNotOnTimeline(NaiveDate),

    #[error("{role} on {date} was already resolved")]
    CellAlreadyResolved { date: NaiveDate, role: Role },

    #[error("{role} on {date} is already held by {holder:?}")]
    RoleTaken {
        date: NaiveDate,
        role: Role,
        holder: String,
    },

    #[error("{person:?} already serves as {role} on {date}")]
    PersonBusy {
        date: NaiveDate,
        person: String,
        role: Role,
    },

    #[error("history append on {date} is older than the latest entry {latest}")]
    OutOfOrder { date: NaiveDate, latest: NaiveDate },
}

/// Failures reading or writing collaborator files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date {value:?}: {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("schedule grid is malformed: {0}")]
    Grid(String),
}

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;
