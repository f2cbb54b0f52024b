use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::LoadError;
use crate::schedule::{CellState, DaySchedule, Gap, ScheduleOutcome, StatusBoard, StatusEntry};

/// Long form used in reports and the CSV header, e.g. "April 06, 2025"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

fn cell_text(state: &CellState) -> &str {
    match state {
        CellState::Filled(person) => person,
        CellState::Unfilled => "[UNFILLED]",
        CellState::Pending => "[PENDING]",
    }
}

/// Renders one Sunday as a `** date **` block, roles in display order
pub fn render_day(schedule: &DaySchedule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", format_date(schedule.date));
    let (preacher, graphics) = schedule
        .pulpit
        .as_ref()
        .map(|p| (p.preacher.as_str(), p.graphics.as_str()))
        .unwrap_or(("", ""));
    let _ = writeln!(out, "PREACHER: {preacher}");
    let _ = writeln!(out, "GRAPHICS: {graphics}");
    for cell in schedule.cells_for_display() {
        let _ = writeln!(out, "{}: {}", cell.role, cell_text(&cell.state));
    }
    out
}

pub fn render_gaps(gaps: &[Gap]) -> String {
    let mut out = String::new();
    if gaps.is_empty() {
        let _ = writeln!(out, "All roles filled.");
        return out;
    }
    let _ = writeln!(out, "Unfilled roles needing manual assignment ({}):", gaps.len());
    for gap in gaps {
        let reasons: Vec<String> = gap
            .reasons
            .iter()
            .map(|r| format!("{:?} x{}", r.reason, r.count))
            .collect();
        let _ = writeln!(out, "  - {} {}: {}", format_date(gap.date), gap.role, reasons.join(", "));
        if !gap.fallback_candidates.is_empty() {
            let _ = writeln!(out, "      could be asked: {}", gap.fallback_candidates.join(", "));
        }
    }
    out
}

pub fn render_schedule(outcome: &ScheduleOutcome) -> String {
    let mut out = String::new();
    for day in &outcome.days {
        out.push_str(&render_day(day));
        out.push('\n');
    }
    out.push_str(&render_gaps(&outcome.gaps));
    out
}

pub fn render_status(date: NaiveDate, entries: &[StatusEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", format_date(date));
    for entry in entries {
        let _ = writeln!(out, "{}: {}", entry.person, entry.status);
    }
    out
}

/// Status blocks for each of `dates`, one line per person
pub fn render_status_report(board: &StatusBoard<'_>, dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|date| render_status(*date, &board.report(*date)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints every Sunday followed by the gap report
pub fn print_schedule(outcome: &ScheduleOutcome) {
    println!("\n=== Schedule ===");
    println!(
        "Sundays: {}, roles filled: {}, unfilled: {}",
        outcome.days.len(),
        outcome.assignments.len(),
        outcome.gaps.len()
    );
    println!();
    print!("{}", render_schedule(outcome));
}

pub fn write_schedule_to_file<P: AsRef<Path>>(outcome: &ScheduleOutcome, path: P) -> Result<(), LoadError> {
    let path = path.as_ref();
    fs::write(path, render_schedule(outcome)).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn write_status_to_file<P: AsRef<Path>>(
    board: &StatusBoard<'_>,
    dates: &[NaiveDate],
    path: P,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    fs::write(path, render_status_report(board, dates)).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::roster::{Person, Pulpit, Role};
    use crate::schedule::{Assignment, IneligibleReason, ReasonCount, ScheduleInput};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 6).unwrap()
    }

    #[test]
    fn day_block_lists_pulpit_then_roles_in_display_order() {
        let pulpit = Pulpit { preacher: "Kris".into(), graphics: "Ann".into() };
        let mut schedule = DaySchedule::new(day(), Some(pulpit), &[Role::WorshipLeader, Role::Emcee]);
        schedule.fill(&Role::WorshipLeader, "Gee").unwrap();
        schedule.leave_unfilled(&Role::Emcee).unwrap();

        assert_eq!(
            render_day(&schedule),
            "** April 06, 2025 **\nPREACHER: Kris\nGRAPHICS: Ann\nEMCEE: [UNFILLED]\nWORSHIP LEADER: Gee\n"
        );
    }

    #[test]
    fn gap_report_names_reasons_and_fallbacks() {
        let gaps = vec![Gap {
            date: day(),
            role: Role::WorshipLeader,
            eligible_count: 0,
            reasons: vec![ReasonCount { reason: IneligibleReason::PreachingSoon, count: 1 }],
            fallback_candidates: vec!["Kris".into()],
        }];
        let report = render_gaps(&gaps);
        assert!(report.contains("April 06, 2025 WORSHIP LEADER: PreachingSoon x1"));
        assert!(report.contains("could be asked: Kris"));
        assert_eq!(render_gaps(&[]), "All roles filled.\n");
    }

    #[test]
    fn status_report_has_a_block_per_sunday() {
        let next = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
        let input = ScheduleInput {
            roster: vec![
                Person::new("Gee", [Role::Keys]),
                Person::new("Mo", [Role::Keys]).with_leave(next),
            ],
            calendar: vec![day(), next],
            ..Default::default()
        };
        let outcome = ScheduleOutcome {
            assignments: vec![Assignment { date: day(), role: Role::Keys, person: "Gee".into() }],
            ..Default::default()
        };
        let config = EngineConfig::default();
        let board = StatusBoard::new(&input, &config, &outcome).unwrap();

        assert_eq!(
            render_status_report(&board, &input.calendar),
            "** April 06, 2025 **\nGee: ASSIGNED (KEYS)\nMo: UNASSIGNED\n\n\
             ** April 13, 2025 **\nGee: UNASSIGNED\nMo: ON-LEAVE\n"
        );
    }
}
