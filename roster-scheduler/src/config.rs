//! Engine configuration: fairness limits, role scope and custom pairing conditions.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, LoadError};
use crate::roster::Role;

/// How "the last N weeks" is counted when Sundays are skipped in the calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    /// Count calendar weeks back from the target Sunday
    #[default]
    CalendarWeeks,
    /// Count scheduled Sundays (seed history plus the run's calendar)
    ScheduledSundays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingKind {
    /// The person may take the role only when this preacher preaches
    OnlyWith,
    /// The person may not take the role when this preacher preaches
    NeverWith,
}

/// A person-specific condition tied to who is preaching that Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreacherPairing {
    pub person: String,
    pub role: Role,
    pub preacher: String,
    pub kind: PairingKind,
}

/// Largest accepted streak limit, look-ahead or role window, in Sundays
pub const MAX_SUNDAYS: u32 = 52;

fn default_role_windows() -> BTreeMap<Role, u32> {
    BTreeMap::from([
        (Role::WorshipLeader, 4),
        (Role::SundaySchoolTeacher, 4),
        (Role::Emcee, 2),
    ])
}

/// Entries in the file override the defaults one role at a time; 0 disables a window
fn merge_role_windows<'de, D>(deserializer: D) -> Result<BTreeMap<Role, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<Role, u32>::deserialize(deserializer)?;
    let mut windows = default_role_windows();
    windows.extend(overrides);
    Ok(windows)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recency_mode: RecencyMode,
    /// A person may serve at most this many Sundays in a row
    pub consecutive_sunday_limit: u32,
    /// A person may hold the same role at most this many Sundays in a row
    pub same_role_streak_limit: u32,
    /// Weeks that must pass before someone repeats a role
    #[serde(deserialize_with = "merge_role_windows")]
    pub role_windows: BTreeMap<Role, u32>,
    /// Sundays (target included) a Worship Leader must be clear of preaching
    pub preaching_lookahead: u32,
    pub count_preaching_in_streak: bool,
    /// Roles to fill, in priority order
    pub roles: Vec<Role>,
    pub pairings: Vec<PreacherPairing>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recency_mode: RecencyMode::default(),
            consecutive_sunday_limit: 3,
            same_role_streak_limit: 2,
            role_windows: default_role_windows(),
            preaching_lookahead: 2,
            count_preaching_in_streak: false,
            roles: Role::priority_order(),
            pairings: Vec::new(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file; absent fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn role_window(&self, role: &Role) -> Option<u32> {
        self.role_windows.get(role).copied().filter(|weeks| *weeks > 0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consecutive_sunday_limit == 0 {
            return Err(ConfigError::ZeroLimit("consecutive_sunday_limit"));
        }
        if self.same_role_streak_limit == 0 {
            return Err(ConfigError::ZeroLimit("same_role_streak_limit"));
        }
        let limits = [
            ("consecutive_sunday_limit", self.consecutive_sunday_limit),
            ("same_role_streak_limit", self.same_role_streak_limit),
            ("preaching_lookahead", self.preaching_lookahead),
        ];
        for (field, value) in limits {
            if value > MAX_SUNDAYS {
                return Err(ConfigError::LimitTooHigh { field: field.to_string(), max: MAX_SUNDAYS });
            }
        }
        if let Some((role, _)) = self.role_windows.iter().find(|(_, weeks)| **weeks > MAX_SUNDAYS) {
            return Err(ConfigError::LimitTooHigh { field: format!("role_windows.{role}"), max: MAX_SUNDAYS });
        }
        let mut seen = HashSet::new();
        for role in &self.roles {
            if !seen.insert(role) {
                return Err(ConfigError::DuplicateRole(role.clone()));
            }
        }
        Ok(())
    }
}
