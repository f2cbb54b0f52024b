use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::roster::{Person, PreachingCalendar, Role};
use super::history::AssignmentHistory;
use super::timeline::Timeline;
use super::types::ScheduleOutcome;
use super::validate::ScheduleInput;

/// Where a team member stands on a given Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "role", rename_all = "snake_case")]
pub enum PersonStatus {
    OnLeave,
    BlockedOut,
    Assigned(Role),
    Preaching,
    /// Served the maximum number of Sundays in a row
    Break,
    /// Leads worship but teaches youth that day
    Teaching,
    Unassigned,
}

impl fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonStatus::OnLeave => f.write_str("ON-LEAVE"),
            PersonStatus::BlockedOut => f.write_str("BLOCKEDOUT"),
            PersonStatus::Assigned(role) => write!(f, "ASSIGNED ({role})"),
            PersonStatus::Preaching => f.write_str("PREACHING"),
            PersonStatus::Break => f.write_str("BREAK"),
            PersonStatus::Teaching => f.write_str("TEACHING"),
            PersonStatus::Unassigned => f.write_str("UNASSIGNED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub person: String,
    pub status: PersonStatus,
}

/// Per-person status lookups over a finished run
pub struct StatusBoard<'a> {
    roster: &'a [Person],
    config: &'a EngineConfig,
    history: AssignmentHistory,
    timeline: Timeline,
    preaching: PreachingCalendar,
}

impl<'a> StatusBoard<'a> {
    pub fn new(input: &'a ScheduleInput, config: &'a EngineConfig, outcome: &ScheduleOutcome) -> Result<Self> {
        let preaching = PreachingCalendar::from_preachers(&input.preachers)?;
        let mut history = AssignmentHistory::seeded(&input.seed_history)?;
        for assignment in &outcome.assignments {
            history.record(assignment.clone())?;
        }
        let timeline = Timeline::new(config.recency_mode, &input.calendar, history.dates());
        Ok(Self {
            roster: &input.roster,
            config,
            history,
            timeline,
            preaching,
        })
    }

    /// Checked in precedence order: leave, blockout, assignment, preaching, break, teaching
    pub fn status(&self, person: &Person, date: NaiveDate) -> PersonStatus {
        if person.is_on_leave(date) {
            return PersonStatus::OnLeave;
        }
        if person.is_blocked_out(date) {
            return PersonStatus::BlockedOut;
        }
        if let Some(role) = self.history.role_on(&person.name, date) {
            return PersonStatus::Assigned(role.clone());
        }
        if self.preaching.is_preaching(person, date) {
            return PersonStatus::Preaching;
        }
        let limit = self.config.consecutive_sunday_limit;
        let preceding = self.timeline.preceding(date, limit);
        let streak = self.history.streak(&person.name, &preceding, |d| {
            self.config.count_preaching_in_streak && self.preaching.is_preaching(person, d)
        });
        if streak >= limit as usize {
            return PersonStatus::Break;
        }
        if person.can_serve(&Role::WorshipLeader) && person.teaches_youth(date) {
            return PersonStatus::Teaching;
        }
        PersonStatus::Unassigned
    }

    pub fn report(&self, date: NaiveDate) -> Vec<StatusEntry> {
        self.roster
            .iter()
            .map(|p| StatusEntry { person: p.name.clone(), status: self.status(p, date) })
            .collect()
    }
}
