use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::error::{ConfigError, ScheduleError};
use crate::roster::Role;
use super::types::Assignment;

/// Append-only record of who served what, queried by the eligibility rules
#[derive(Debug, Clone, Default)]
pub struct AssignmentHistory {
    entries: Vec<Assignment>,
    by_person: HashMap<String, BTreeMap<NaiveDate, Role>>,
    by_slot: HashMap<(NaiveDate, Role), String>,
}

impl AssignmentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the history from previously persisted schedules
    pub fn seeded(prior: &[Assignment]) -> Result<Self, ConfigError> {
        let mut sorted = prior.to_vec();
        sorted.sort_by_key(|a| a.date);
        let mut history = Self::new();
        for assignment in sorted {
            let (date, person) = (assignment.date, assignment.person.clone());
            let duplicate = history.holder(date, &assignment.role) == Some(person.as_str());
            if duplicate {
                continue;
            }
            history
                .record(assignment)
                .map_err(|_| ConfigError::SeedConflict { date, person })?;
        }
        Ok(history)
    }

    /// Commits an assignment, enforcing one role per person and one person per role per date
    pub fn record(&mut self, assignment: Assignment) -> Result<(), ScheduleError> {
        if let Some(latest) = self.entries.last().map(|a| a.date) {
            if assignment.date < latest {
                return Err(ScheduleError::OutOfOrder { date: assignment.date, latest });
            }
        }
        if let Some(holder) = self.holder(assignment.date, &assignment.role) {
            return Err(ScheduleError::RoleTaken {
                date: assignment.date,
                role: assignment.role.clone(),
                holder: holder.to_string(),
            });
        }
        if let Some(role) = self.role_on(&assignment.person, assignment.date) {
            return Err(ScheduleError::PersonBusy {
                date: assignment.date,
                person: assignment.person.clone(),
                role: role.clone(),
            });
        }

        self.by_person
            .entry(assignment.person.clone())
            .or_default()
            .insert(assignment.date, assignment.role.clone());
        self.by_slot
            .insert((assignment.date, assignment.role.clone()), assignment.person.clone());
        self.entries.push(assignment);
        Ok(())
    }

    pub fn entries(&self) -> &[Assignment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.entries.iter().map(|a| a.date).collect()
    }

    pub fn holder(&self, date: NaiveDate, role: &Role) -> Option<&str> {
        self.by_slot.get(&(date, role.clone())).map(String::as_str)
    }

    pub fn role_on(&self, person: &str, date: NaiveDate) -> Option<&Role> {
        self.by_person.get(person).and_then(|dates| dates.get(&date))
    }

    pub fn served_on(&self, person: &str, date: NaiveDate) -> bool {
        self.role_on(person, date).is_some()
    }

    /// Most recent date strictly before `before` on which the person held `role`
    pub fn last_in_role(&self, person: &str, role: &Role, before: NaiveDate) -> Option<NaiveDate> {
        self.by_person
            .get(person)?
            .range(..before)
            .rev()
            .find(|(_, r)| *r == role)
            .map(|(date, _)| *date)
    }

    /// Consecutive Sundays, walking back through `preceding` (newest first), on
    /// which the person served or `counts_anyway` holds
    pub fn streak<F>(&self, person: &str, preceding: &[NaiveDate], counts_anyway: F) -> usize
    where
        F: Fn(NaiveDate) -> bool,
    {
        preceding
            .iter()
            .take_while(|d| self.served_on(person, **d) || counts_anyway(**d))
            .count()
    }

    /// Consecutive Sundays, walking back through `preceding`, spent in `role`
    pub fn role_streak(&self, person: &str, role: &Role, preceding: &[NaiveDate]) -> usize {
        preceding
            .iter()
            .take_while(|d| self.role_on(person, **d) == Some(role))
            .count()
    }
}
