use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::roster::{Pulpit, Role};
use super::eligibility::IneligibleReason;

/// One person serving one role on one Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub role: Role,
    pub person: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub reason: IneligibleReason,
    pub count: usize,
}

/// A role left open on a Sunday because nobody was eligible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub date: NaiveDate,
    pub role: Role,
    pub eligible_count: usize,
    /// Why the roster was turned away, most common first
    pub reasons: Vec<ReasonCount>,
    /// People free and capable that date who only failed a fairness rule
    pub fallback_candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "person", rename_all = "snake_case")]
pub enum CellState {
    Pending,
    Filled(String),
    Unfilled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub role: Role,
    pub state: CellState,
}

/// Schedule for a single Sunday, one cell per role in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub pulpit: Option<Pulpit>,
    pub cells: Vec<Cell>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate, pulpit: Option<Pulpit>, roles: &[Role]) -> Self {
        let cells = roles
            .iter()
            .map(|role| Cell { role: role.clone(), state: CellState::Pending })
            .collect();
        Self { date, pulpit, cells }
    }

    fn pending_cell(&mut self, role: &Role) -> Result<&mut Cell, ScheduleError> {
        let date = self.date;
        self.cells
            .iter_mut()
            .find(|c| c.role == *role && c.state == CellState::Pending)
            .ok_or_else(|| ScheduleError::CellAlreadyResolved { date, role: role.clone() })
    }

    pub fn fill(&mut self, role: &Role, person: &str) -> Result<(), ScheduleError> {
        self.pending_cell(role)?.state = CellState::Filled(person.to_string());
        Ok(())
    }

    pub fn leave_unfilled(&mut self, role: &Role) -> Result<(), ScheduleError> {
        self.pending_cell(role)?.state = CellState::Unfilled;
        Ok(())
    }

    pub fn holder(&self, role: &Role) -> Option<&str> {
        self.cells.iter().find(|c| c.role == *role).and_then(|c| match &c.state {
            CellState::Filled(person) => Some(person.as_str()),
            _ => None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.state != CellState::Pending)
    }

    /// Cells in rendering order rather than fill order
    pub fn cells_for_display(&self) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.iter().collect();
        cells.sort_by_key(|c| c.role.display_rank());
        cells
    }
}

/// Everything a run produced: filled cells, open cells and the per-day view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub assignments: Vec<Assignment>,
    pub gaps: Vec<Gap>,
    pub days: Vec<DaySchedule>,
}

impl ScheduleOutcome {
    pub fn day(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }
}
