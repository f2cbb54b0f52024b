use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::roster::{Person, Preacher, PreachingCalendar, Role};
use super::types::Assignment;

/// Already-parsed collaborator data handed to the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub roster: Vec<Person>,
    pub calendar: Vec<NaiveDate>,
    #[serde(default)]
    pub preachers: Vec<Preacher>,
    #[serde(default)]
    pub rotation: Vec<String>,
    #[serde(default)]
    pub seed_history: Vec<Assignment>,
}

/// Checks the inputs once before scheduling and builds the preaching calendar
pub fn validate_input(input: &ScheduleInput, config: &EngineConfig) -> Result<PreachingCalendar, ConfigError> {
    config.validate()?;

    if input.roster.is_empty() {
        return Err(ConfigError::EmptyRoster);
    }
    if input.calendar.is_empty() {
        return Err(ConfigError::EmptyCalendar);
    }

    let mut names = HashSet::new();
    for person in &input.roster {
        if !names.insert(person.name.as_str()) {
            return Err(ConfigError::DuplicatePerson(person.name.clone()));
        }
    }

    for pair in input.calendar.windows(2) {
        if pair[1] <= pair[0] {
            return Err(ConfigError::CalendarNotAscending(pair[1]));
        }
    }
    if let Some(date) = input.calendar.iter().find(|d| d.weekday() != Weekday::Sun) {
        return Err(ConfigError::NotSunday(*date));
    }

    for role in &config.roles {
        if !input.roster.iter().any(|p| p.can_serve(role)) {
            return Err(ConfigError::RoleWithoutCandidates(role.clone()));
        }
    }
    let in_scope: HashSet<&Role> = config.roles.iter().collect();
    for person in &input.roster {
        for role in person.roles.iter().filter(|r| !in_scope.contains(r)) {
            warn!(person = %person.name, %role, "role is not scheduled in this run");
        }
    }

    let mut in_rotation = HashSet::new();
    for name in &input.rotation {
        if !in_rotation.insert(name.as_str()) {
            return Err(ConfigError::DuplicateInRotation(name.clone()));
        }
        let person = input
            .roster
            .iter()
            .find(|p| p.name == *name)
            .ok_or_else(|| ConfigError::UnknownInRotation(name.clone()))?;
        if !person.can_serve(&Role::WorshipLeader) {
            return Err(ConfigError::RotationMemberNotCapable(name.clone()));
        }
    }

    let first = input.calendar[0];
    if let Some(late) = input.seed_history.iter().find(|a| a.date >= first) {
        return Err(ConfigError::SeedOverlapsRun(late.date));
    }

    for pairing in &config.pairings {
        if !names.contains(pairing.person.as_str()) {
            return Err(ConfigError::UnknownPairingPerson(pairing.person.clone()));
        }
    }

    PreachingCalendar::from_preachers(&input.preachers)
}
