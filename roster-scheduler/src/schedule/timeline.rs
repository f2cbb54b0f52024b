use chrono::{Datelike, Days, NaiveDate};

use crate::config::RecencyMode;

/// Every Sunday between `start` and `end`, both inclusive
pub fn sundays_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_sunday()) % 7;
    let mut current = start.checked_add_days(Days::new(offset as u64));
    let mut sundays = Vec::new();
    while let Some(day) = current {
        if day > end {
            break;
        }
        sundays.push(day);
        current = day.checked_add_days(Days::new(7));
    }
    sundays
}

/// Answers "which Sundays come before/after this one" under the configured recency mode
#[derive(Debug, Clone)]
pub struct Timeline {
    mode: RecencyMode,
    sundays: Vec<NaiveDate>,
}

impl Timeline {
    /// Builds the timeline from the run's calendar plus any seeded history dates
    pub fn new<I>(mode: RecencyMode, calendar: &[NaiveDate], history_dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut sundays: Vec<NaiveDate> = calendar.iter().copied().chain(history_dates).collect();
        sundays.sort();
        sundays.dedup();
        Self { mode, sundays }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.sundays.binary_search(&date).is_ok()
    }

    /// Up to `n` Sundays before `date`, newest first
    pub fn preceding(&self, date: NaiveDate, n: u32) -> Vec<NaiveDate> {
        match self.mode {
            RecencyMode::CalendarWeeks => (1..=n as u64)
                .map_while(|i| date.checked_sub_days(Days::new(7 * i)))
                .collect(),
            RecencyMode::ScheduledSundays => {
                let idx = self.sundays.partition_point(|d| *d < date);
                self.sundays[..idx].iter().rev().take(n as usize).copied().collect()
            }
        }
    }

    /// `date` followed by the next `n - 1` Sundays
    pub fn following(&self, date: NaiveDate, n: u32) -> Vec<NaiveDate> {
        let n = n as usize;
        let mut days = Vec::new();
        if n == 0 {
            return days;
        }
        days.push(date);
        if self.mode == RecencyMode::ScheduledSundays {
            let idx = self.sundays.partition_point(|d| *d <= date);
            days.extend(self.sundays[idx..].iter().take(n - 1).copied());
        }
        // Past the end of the scheduled calendar, fall back to weekly steps
        while days.len() < n {
            let Some(next) = days.last().and_then(|d| d.checked_add_days(Days::new(7))) else {
                break;
            };
            days.push(next);
        }
        days
    }

    /// Whether `earlier` lies within the `weeks` Sundays before `date`
    pub fn within_window(&self, earlier: NaiveDate, date: NaiveDate, weeks: u32) -> bool {
        if earlier >= date {
            return false;
        }
        match self.mode {
            RecencyMode::CalendarWeeks => (date - earlier).num_days() <= 7 * weeks as i64,
            RecencyMode::ScheduledSundays => self.preceding(date, weeks).contains(&earlier),
        }
    }
}
