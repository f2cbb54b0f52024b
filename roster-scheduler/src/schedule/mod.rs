pub mod builder;
pub mod eligibility;
pub mod history;
pub mod selector;
pub mod status;
pub mod timeline;
pub mod types;
pub mod validate;

pub use builder::{build_schedule, ScheduleBuilder, ScheduleState};
pub use eligibility::{EligibilityChecker, EligibilityRule, IneligibleReason, RuleContext, Verdict};
pub use history::AssignmentHistory;
pub use selector::{CandidateSelector, Rotation};
pub use status::{PersonStatus, StatusBoard, StatusEntry};
pub use timeline::{sundays_between, Timeline};
pub use types::{Assignment, Cell, CellState, DaySchedule, Gap, ReasonCount, ScheduleOutcome};
pub use validate::{validate_input, ScheduleInput};
