use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A ministry function filled by exactly one person per Sunday
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    WorshipLeader,
    Emcee,
    Acoustic,
    Keys,
    Drums,
    Bass,
    Audio,
    Live,
    Lyrics,
    SundaySchoolTeacher,
    Backup,
    Electric,
    /// Any role outside the standard set, keyed by its upper-cased name
    Extension(String),
}

impl Role {
    /// Fill order: earlier roles claim scarce people first
    pub fn priority_order() -> Vec<Role> {
        vec![
            Role::WorshipLeader,
            Role::Emcee,
            Role::Acoustic,
            Role::Keys,
            Role::Drums,
            Role::Bass,
            Role::Audio,
            Role::Live,
            Role::Lyrics,
            Role::SundaySchoolTeacher,
            Role::Backup,
        ]
    }

    /// Rank of a role inside the rendered schedule, independent of fill order
    pub fn display_rank(&self) -> u8 {
        match self {
            Role::Emcee => 0,
            Role::WorshipLeader => 1,
            Role::Acoustic => 2,
            Role::Keys => 3,
            Role::Drums => 4,
            Role::Bass => 5,
            Role::Audio => 6,
            Role::Live => 7,
            Role::Lyrics => 8,
            Role::Backup => 9,
            Role::Electric => 10,
            Role::Extension(_) => 11,
            Role::SundaySchoolTeacher => 12,
        }
    }

    /// Worship Leader is picked from the rotation instead of at random
    pub fn uses_rotation(&self) -> bool {
        matches!(self, Role::WorshipLeader)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::WorshipLeader => "WORSHIP LEADER",
            Role::Emcee => "EMCEE",
            Role::Acoustic => "ACOUSTIC GUITAR",
            Role::Keys => "KEYS",
            Role::Drums => "DRUMS",
            Role::Bass => "BASS",
            Role::Audio => "AUDIO",
            Role::Live => "LIVE",
            Role::Lyrics => "LYRICS",
            Role::SundaySchoolTeacher => "SUNDAY SCHOOL TEACHER",
            Role::Backup => "BACKUP",
            Role::Electric => "ELECTRIC GUITAR",
            Role::Extension(name) => name,
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    /// Accepts `WORSHIPLEADER`, `WORSHIP LEADER`, `worship_leader` and similar spellings
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("role name is empty".to_string());
        }
        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_uppercase();
        let role = match key.as_str() {
            "WORSHIPLEADER" => Role::WorshipLeader,
            "EMCEE" => Role::Emcee,
            "ACOUSTIC" | "ACOUSTICGUITAR" => Role::Acoustic,
            "KEYS" => Role::Keys,
            "DRUMS" => Role::Drums,
            "BASS" => Role::Bass,
            "AUDIO" => Role::Audio,
            "LIVE" => Role::Live,
            "LYRICS" => Role::Lyrics,
            "SUNDAYSCHOOLTEACHER" => Role::SundaySchoolTeacher,
            "BACKUP" => Role::Backup,
            "ELECTRIC" | "ELECTRICGUITAR" => Role::Electric,
            _ => Role::Extension(trimmed.to_uppercase()),
        };
        Ok(role)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::try_from(s.to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team member and their availability for the whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub blockout_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub preaching_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub teaching_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub leave_dates: BTreeSet<NaiveDate>,
    /// On leave for every date of the run
    #[serde(default)]
    pub on_leave: bool,
}

impl Person {
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
            blockout_dates: BTreeSet::new(),
            preaching_dates: BTreeSet::new(),
            teaching_dates: BTreeSet::new(),
            leave_dates: BTreeSet::new(),
            on_leave: false,
        }
    }

    pub fn with_blockout(mut self, date: NaiveDate) -> Self {
        self.blockout_dates.insert(date);
        self
    }

    pub fn with_preaching(mut self, date: NaiveDate) -> Self {
        self.preaching_dates.insert(date);
        self
    }

    pub fn with_teaching(mut self, date: NaiveDate) -> Self {
        self.teaching_dates.insert(date);
        self
    }

    pub fn with_leave(mut self, date: NaiveDate) -> Self {
        self.leave_dates.insert(date);
        self
    }

    pub fn can_serve(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_on_leave(&self, date: NaiveDate) -> bool {
        self.on_leave || self.leave_dates.contains(&date)
    }

    pub fn is_blocked_out(&self, date: NaiveDate) -> bool {
        self.blockout_dates.contains(&date)
    }

    pub fn teaches_youth(&self, date: NaiveDate) -> bool {
        self.teaching_dates.contains(&date)
    }
}

/// Preaching calendar entry as it appears in the preaching file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preacher {
    pub name: String,
    #[serde(rename = "graphics", default)]
    pub graphics_support: String,
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pulpit {
    pub preacher: String,
    pub graphics: String,
}

/// Maps each Sunday to whoever is preaching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreachingCalendar {
    by_date: BTreeMap<NaiveDate, Pulpit>,
}

impl PreachingCalendar {
    pub fn from_preachers(preachers: &[Preacher]) -> Result<Self, ConfigError> {
        let mut by_date: BTreeMap<NaiveDate, Pulpit> = BTreeMap::new();
        for preacher in preachers {
            for &date in &preacher.dates {
                if let Some(existing) = by_date.get(&date) {
                    if existing.preacher != preacher.name {
                        return Err(ConfigError::DoublePreacher {
                            date,
                            first: existing.preacher.clone(),
                            second: preacher.name.clone(),
                        });
                    }
                    continue;
                }
                by_date.insert(
                    date,
                    Pulpit {
                        preacher: preacher.name.clone(),
                        graphics: preacher.graphics_support.clone(),
                    },
                );
            }
        }
        Ok(Self { by_date })
    }

    pub fn pulpit(&self, date: NaiveDate) -> Option<&Pulpit> {
        self.by_date.get(&date)
    }

    pub fn preacher_on(&self, date: NaiveDate) -> Option<&str> {
        self.by_date.get(&date).map(|p| p.preacher.as_str())
    }

    /// Preaching dates come from the person record or from the calendar
    pub fn is_preaching(&self, person: &Person, date: NaiveDate) -> bool {
        person.preaching_dates.contains(&date) || self.preacher_on(date) == Some(person.name.as_str())
    }
}
