use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};
use crate::roster::{Person, PreachingCalendar, Role};
use super::eligibility::{EligibilityChecker, IneligibleReason, RuleContext};
use super::history::AssignmentHistory;
use super::selector::{CandidateSelector, Rotation};
use super::timeline::Timeline;
use super::types::{Assignment, DaySchedule, Gap, ReasonCount, ScheduleOutcome};
use super::validate::{validate_input, ScheduleInput};

/// Mutable state threaded through the run, one Sunday at a time
#[derive(Debug, Clone)]
pub struct ScheduleState {
    pub history: AssignmentHistory,
    pub selector: CandidateSelector,
}

/// Read-only data shared by every step of a run
struct RunData<'a> {
    roster: &'a [Person],
    timeline: Timeline,
    preaching: PreachingCalendar,
}

/// Result of filling one Sunday
struct DayResult {
    schedule: DaySchedule,
    assignments: Vec<Assignment>,
    gaps: Vec<Gap>,
}

/// Fills every (Sunday, role) cell greedily, in date order then role priority order
pub struct ScheduleBuilder {
    config: EngineConfig,
    checker: EligibilityChecker,
}

impl ScheduleBuilder {
    pub fn new(config: EngineConfig) -> Self {
        let checker = EligibilityChecker::standard(&config);
        Self { config, checker }
    }

    /// Uses a custom rule list instead of the standard one
    pub fn with_checker(config: EngineConfig, checker: EligibilityChecker) -> Self {
        Self { config, checker }
    }

    /// Runs with the configured seed, or fresh entropy when none is set
    pub fn build(&self, input: &ScheduleInput) -> Result<ScheduleOutcome> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(input, &mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, input: &ScheduleInput, rng: &mut R) -> Result<ScheduleOutcome> {
        let preaching = validate_input(input, &self.config)?;
        let history = AssignmentHistory::seeded(&input.seed_history)?;
        let timeline = Timeline::new(self.config.recency_mode, &input.calendar, history.dates());
        let data = RunData { roster: &input.roster, timeline, preaching };

        info!(
            people = input.roster.len(),
            sundays = input.calendar.len(),
            roles = self.config.roles.len(),
            seeded = history.len(),
            "building schedule"
        );

        let mut state = ScheduleState {
            history,
            selector: CandidateSelector::new(Rotation::new(input.rotation.iter().cloned())),
        };
        let mut outcome = ScheduleOutcome::default();
        for &date in &input.calendar {
            let (next, day) = self.schedule_date(state, &data, date, rng)?;
            state = next;
            outcome.assignments.extend(day.assignments);
            outcome.gaps.extend(day.gaps);
            outcome.days.push(day.schedule);
        }

        info!(
            filled = outcome.assignments.len(),
            gaps = outcome.gaps.len(),
            "schedule complete"
        );
        Ok(outcome)
    }

    fn schedule_date<R: Rng + ?Sized>(
        &self,
        mut state: ScheduleState,
        data: &RunData<'_>,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<(ScheduleState, DayResult)> {
        if !data.timeline.contains(date) {
            return Err(ScheduleError::DateNotOnTimeline(date));
        }
        debug!(%date, preacher = ?data.preaching.preacher_on(date), "scheduling Sunday");

        let mut result = DayResult {
            schedule: DaySchedule::new(date, data.preaching.pulpit(date).cloned(), &self.config.roles),
            assignments: Vec::new(),
            gaps: Vec::new(),
        };

        for role in &self.config.roles {
            let mut eligible: Vec<&Person> = Vec::new();
            let mut rejections: BTreeMap<IneligibleReason, usize> = BTreeMap::new();
            for person in data.roster {
                let ctx = self.context(&state.history, data, person, role, date);
                match self.checker.evaluate(&ctx) {
                    Ok(()) => eligible.push(person),
                    Err(reason) => *rejections.entry(reason).or_default() += 1,
                }
            }
            debug!(
                %date,
                %role,
                eligible = ?eligible.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                "eligible persons"
            );

            match state.selector.select(&eligible, role, rng) {
                Some(person) => {
                    let assignment = Assignment { date, role: role.clone(), person: person.name.clone() };
                    state.history.record(assignment.clone())?;
                    result.schedule.fill(role, &person.name)?;
                    info!(%date, %role, person = %person.name, "assigned");
                    result.assignments.push(assignment);
                }
                None => {
                    result.schedule.leave_unfilled(role)?;
                    let fallback_candidates = self.fallback_candidates(&state.history, data, role, date);
                    warn!(
                        %date,
                        %role,
                        fallback = fallback_candidates.len(),
                        "no eligible person, slot needs manual assignment"
                    );
                    result.gaps.push(Gap {
                        date,
                        role: role.clone(),
                        eligible_count: 0,
                        reasons: tally(rejections),
                        fallback_candidates,
                    });
                }
            }
        }

        Ok((state, result))
    }

    /// People who clear every hard rule and only miss a fairness limit
    fn fallback_candidates(
        &self,
        history: &AssignmentHistory,
        data: &RunData<'_>,
        role: &Role,
        date: NaiveDate,
    ) -> Vec<String> {
        data.roster
            .iter()
            .filter(|person| {
                let ctx = self.context(history, data, person, role, date);
                self.checker.evaluate_hard(&ctx).is_ok()
            })
            .map(|p| p.name.clone())
            .collect()
    }

    fn context<'a>(
        &'a self,
        history: &'a AssignmentHistory,
        data: &'a RunData<'_>,
        person: &'a Person,
        role: &'a Role,
        date: NaiveDate,
    ) -> RuleContext<'a> {
        RuleContext {
            person,
            role,
            date,
            history,
            timeline: &data.timeline,
            preaching: &data.preaching,
            config: &self.config,
        }
    }
}

fn tally(rejections: BTreeMap<IneligibleReason, usize>) -> Vec<ReasonCount> {
    let mut counts: Vec<ReasonCount> = rejections
        .into_iter()
        .map(|(reason, count)| ReasonCount { reason, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.reason.cmp(&b.reason)));
    counts
}

/// Convenience wrapper: validate, seed and run in one call
pub fn build_schedule(input: &ScheduleInput, config: EngineConfig) -> Result<ScheduleOutcome> {
    ScheduleBuilder::new(config).build(input)
}
