use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::LoadError;
use super::model::{Person, Preacher};

/// Parses a date in `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| LoadError::Date {
        value: value.to_string(),
        source,
    })
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Loads the team roster from a JSON array of person records
pub fn load_team<P: AsRef<Path>>(path: P) -> Result<Vec<Person>, LoadError> {
    let mut people: Vec<Person> = read_json(path)?;
    for person in &mut people {
        person.name = person.name.trim().to_string();
    }
    // Records without a name cannot be scheduled or referenced
    people.retain(|p| !p.name.is_empty());
    debug!(count = people.len(), "loaded team");
    Ok(people)
}

/// Loads the preaching calendar entries
pub fn load_preachers<P: AsRef<Path>>(path: P) -> Result<Vec<Preacher>, LoadError> {
    let preachers: Vec<Preacher> = read_json(path)?;
    debug!(count = preachers.len(), "loaded preachers");
    Ok(preachers)
}

/// Loads the worship leader rotation as an ordered list of names
pub fn load_rotation<P: AsRef<Path>>(path: P) -> Result<Vec<String>, LoadError> {
    let names: Vec<String> = read_json(path)?;
    let names: Vec<String> = names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    debug!(?names, "loaded rotation");
    Ok(names)
}
