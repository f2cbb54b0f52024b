use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::display::format_date;
use crate::error::LoadError;
use crate::roster::Role;
use crate::schedule::{Assignment, CellState, ScheduleOutcome};

const PREACHER_ROW: &str = "PREACHER";
const GRAPHICS_ROW: &str = "GRAPHICS";

/// Lays the run out as a grid: one column per Sunday, one row per role.
/// The pulpit rows come first, then roles in display order.
pub fn schedule_grid(outcome: &ScheduleOutcome) -> Vec<Vec<String>> {
    let mut header = vec!["Role".to_string()];
    header.extend(outcome.days.iter().map(|d| format_date(d.date)));

    let mut preacher = vec![PREACHER_ROW.to_string()];
    let mut graphics = vec![GRAPHICS_ROW.to_string()];
    for day in &outcome.days {
        let pulpit = day.pulpit.as_ref();
        preacher.push(pulpit.map(|p| p.preacher.clone()).unwrap_or_default());
        graphics.push(pulpit.map(|p| p.graphics.clone()).unwrap_or_default());
    }

    let mut roles: Vec<&Role> = outcome
        .days
        .iter()
        .flat_map(|d| d.cells.iter().map(|c| &c.role))
        .collect();
    roles.sort_by(|a, b| a.display_rank().cmp(&b.display_rank()).then(a.cmp(b)));
    roles.dedup();

    let mut rows = vec![header, preacher, graphics];
    for role in roles {
        let mut row = vec![role.to_string()];
        for day in &outcome.days {
            let cell = match day.holder(role) {
                Some(person) => person.to_string(),
                None => match day.cells.iter().find(|c| &c.role == role).map(|c| &c.state) {
                    Some(CellState::Unfilled) => "[UNFILLED]".to_string(),
                    _ => String::new(),
                },
            };
            row.push(cell);
        }
        rows.push(row);
    }
    rows
}

/// Writes the schedule grid as CSV
pub fn export_schedule_csv<P: AsRef<Path>>(outcome: &ScheduleOutcome, path: P) -> Result<(), LoadError> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in schedule_grid(outcome) {
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), sundays = outcome.days.len(), "wrote schedule grid");
    Ok(())
}

/// Writes the full outcome, gaps included, as pretty JSON
pub fn export_schedule_json<P: AsRef<Path>>(outcome: &ScheduleOutcome, path: P) -> Result<(), LoadError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), outcome)?;
    Ok(())
}

fn parse_header_date(value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value.trim(), "%B %d, %Y").map_err(|source| LoadError::Date {
        value: value.to_string(),
        source,
    })
}

/// Reads a previously exported grid back as seed history.
/// Pulpit rows and empty or unfilled cells are skipped.
pub fn load_seed_history<P: AsRef<Path>>(path: P) -> Result<Vec<Assignment>, LoadError> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;

    let headers = rdr.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.trim().eq_ignore_ascii_case("role") => {}
        _ => return Err(LoadError::Grid("first column must be \"Role\"".to_string())),
    }
    let dates = headers
        .iter()
        .skip(1)
        .map(parse_header_date)
        .collect::<Result<Vec<_>, _>>()?;

    let mut history = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let Some(label) = record.get(0).map(str::trim) else {
            continue;
        };
        if label.is_empty() || label == PREACHER_ROW || label == GRAPHICS_ROW {
            continue;
        }
        let role = Role::try_from(label.to_string()).map_err(LoadError::Grid)?;
        if record.len() > dates.len() + 1 {
            return Err(LoadError::Grid(format!("row {label} has more cells than dates")));
        }
        for (date, cell) in dates.iter().zip(record.iter().skip(1)) {
            let person = cell.trim();
            if person.is_empty() || person.starts_with('[') {
                continue;
            }
            history.push(Assignment { date: *date, role: role.clone(), person: person.to_string() });
        }
    }

    history.sort_by(|a, b| a.date.cmp(&b.date).then(a.role.cmp(&b.role)));
    debug!(path = %path.display(), entries = history.len(), "loaded seed history");
    Ok(history)
}
