use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use roster_scheduler::config::EngineConfig;
use roster_scheduler::roster::{load_preachers, load_rotation, load_team, Person, Preacher, Role};
use roster_scheduler::schedule::{
    build_schedule, sundays_between, Assignment, CellState, IneligibleReason, ScheduleInput, ScheduleOutcome,
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn team() -> Vec<Person> {
    use Role::*;
    vec![
        Person::new("Gee", [WorshipLeader, Backup, Acoustic]).with_blockout(day(5, 4)),
        Person::new("Mo", [WorshipLeader, Keys, Backup]).with_teaching(day(4, 20)),
        Person::new("Kris", [WorshipLeader, Emcee]),
        Person::new("Ann", [WorshipLeader, Backup]).with_leave(day(4, 13)).with_leave(day(4, 20)),
        Person::new("Lulu", [Emcee, Lyrics]),
        Person::new("Ben", [Emcee, SundaySchoolTeacher]),
        Person::new("Joy", [SundaySchoolTeacher, Backup]),
        Person::new("Rae", [SundaySchoolTeacher, Lyrics]),
        Person::new("Tom", [Drums, Bass]),
        Person::new("Sam", [Drums, Audio]).with_blockout(day(6, 1)),
        Person::new("Eli", [Bass, Keys, Acoustic]),
        Person::new("Ivy", [Keys, Acoustic, Backup]),
        Person::new("Dan", [Audio, Live]),
        Person::new("Pia", [Live, Lyrics, Audio]),
        Person::new("Nat", [Live, Bass, Drums]),
    ]
}

fn input() -> ScheduleInput {
    ScheduleInput {
        roster: team(),
        calendar: sundays_between(day(4, 1), day(6, 30)),
        preachers: vec![
            Preacher { name: "Kris".into(), graphics_support: "Pia".into(), dates: vec![day(4, 13), day(5, 18)] },
            Preacher {
                name: "Edmund".into(),
                graphics_support: "Dan".into(),
                dates: vec![day(4, 6), day(4, 20), day(4, 27), day(5, 4), day(5, 11)],
            },
        ],
        rotation: vec!["Mo".into(), "Gee".into(), "Kris".into(), "Ann".into()],
        seed_history: vec![
            Assignment { date: day(3, 30), role: Role::Emcee, person: "Lulu".into() },
            Assignment { date: day(3, 23), role: Role::SundaySchoolTeacher, person: "Joy".into() },
        ],
    }
}

fn run(seed: u64) -> ScheduleOutcome {
    let config = EngineConfig { seed: Some(seed), ..Default::default() };
    build_schedule(&input(), config).unwrap()
}

fn preaching(input: &ScheduleInput, person: &str, date: NaiveDate) -> bool {
    input.preachers.iter().any(|p| p.name == person && p.dates.contains(&date))
}

fn person<'a>(input: &'a ScheduleInput, name: &str) -> &'a Person {
    input.roster.iter().find(|p| p.name == name).unwrap()
}

/// Every assignment, including seed history, per person in date order
fn by_person(input: &ScheduleInput, outcome: &ScheduleOutcome) -> BTreeMap<String, Vec<(NaiveDate, Role)>> {
    let mut map: BTreeMap<String, Vec<(NaiveDate, Role)>> = BTreeMap::new();
    for a in input.seed_history.iter().chain(&outcome.assignments) {
        map.entry(a.person.clone()).or_default().push((a.date, a.role.clone()));
    }
    for served in map.values_mut() {
        served.sort();
    }
    map
}

#[test]
fn each_person_serves_at_most_once_per_sunday() {
    for seed in 0..20 {
        let outcome = run(seed);
        let mut seen = HashSet::new();
        for a in &outcome.assignments {
            assert!(seen.insert((a.date, a.person.clone())), "{} twice on {}", a.person, a.date);
        }
    }
}

#[test]
fn assignments_respect_capability_and_availability() {
    let input = input();
    for seed in 0..20 {
        for a in &run(seed).assignments {
            let p = person(&input, &a.person);
            assert!(p.can_serve(&a.role), "{} cannot serve {}", a.person, a.role);
            assert!(!p.is_on_leave(a.date));
            assert!(!p.is_blocked_out(a.date));
            assert!(!preaching(&input, &a.person, a.date), "{} serves while preaching", a.person);
        }
    }
}

#[test]
fn nobody_serves_more_than_three_sundays_in_a_row() {
    let input = input();
    for seed in 0..20 {
        let outcome = run(seed);
        for (name, served) in by_person(&input, &outcome) {
            let mut run_len = 1;
            for pair in served.windows(2) {
                run_len = if pair[1].0 - pair[0].0 == chrono::Duration::days(7) { run_len + 1 } else { 1 };
                assert!(run_len <= 3, "{name} served {run_len} Sundays in a row (seed {seed})");
            }
        }
    }
}

#[test]
fn nobody_holds_the_same_role_three_sundays_in_a_row() {
    let input = input();
    for seed in 0..20 {
        let outcome = run(seed);
        for (name, served) in by_person(&input, &outcome) {
            for triple in served.windows(3) {
                let consecutive = triple[1].0 - triple[0].0 == chrono::Duration::days(7)
                    && triple[2].0 - triple[1].0 == chrono::Duration::days(7);
                let same_role = triple[0].1 == triple[1].1 && triple[1].1 == triple[2].1;
                assert!(!(consecutive && same_role), "{name} held {} three weeks running", triple[0].1);
            }
        }
    }
}

#[test]
fn recency_windows_are_respected() {
    let input = input();
    let windows = [(Role::WorshipLeader, 28), (Role::SundaySchoolTeacher, 28), (Role::Emcee, 14)];
    for seed in 0..20 {
        let outcome = run(seed);
        for (name, served) in by_person(&input, &outcome) {
            for (role, days) in &windows {
                let dates: Vec<NaiveDate> = served.iter().filter(|(_, r)| r == role).map(|(d, _)| *d).collect();
                for pair in dates.windows(2) {
                    assert!(
                        (pair[1] - pair[0]).num_days() > *days,
                        "{name} repeated {role} after {} days",
                        (pair[1] - pair[0]).num_days()
                    );
                }
            }
        }
    }
}

#[test]
fn worship_leader_is_not_preaching_soon_or_teaching() {
    let input = input();
    for seed in 0..20 {
        for a in run(seed).assignments.iter().filter(|a| a.role == Role::WorshipLeader) {
            let next = a.date + chrono::Duration::days(7);
            assert!(!preaching(&input, &a.person, a.date));
            assert!(!preaching(&input, &a.person, next), "{} leads worship the week before preaching", a.person);
            assert!(!person(&input, &a.person).teaches_youth(a.date));
        }
    }
}

#[test]
fn every_cell_is_either_filled_or_a_gap() {
    let input = input();
    let roles = EngineConfig::default().roles;
    for seed in 0..20 {
        let outcome = run(seed);
        assert_eq!(outcome.days.len(), input.calendar.len());
        for date in &input.calendar {
            for role in &roles {
                let filled = outcome.assignments.iter().filter(|a| a.date == *date && a.role == *role).count();
                let gaps = outcome.gaps.iter().filter(|g| g.date == *date && g.role == *role).count();
                assert_eq!(filled + gaps, 1, "{date} {role}");

                let cell = outcome.day(*date).unwrap().cells.iter().find(|c| c.role == *role).unwrap();
                match &cell.state {
                    CellState::Filled(p) => assert_eq!(outcome.day(*date).unwrap().holder(role), Some(p.as_str())),
                    CellState::Unfilled => assert_eq!(gaps, 1),
                    CellState::Pending => panic!("{date} {role} left pending"),
                }
            }
        }
        for gap in &outcome.gaps {
            assert_eq!(gap.eligible_count, 0);
            assert_eq!(gap.reasons.iter().map(|r| r.count).sum::<usize>(), input.roster.len());
        }
    }
}

#[test]
fn same_seed_gives_same_schedule() {
    assert_eq!(run(42), run(42));
    let differs = (0..10).any(|seed| run(seed).assignments != run(42).assignments);
    assert!(differs);
}

#[test]
fn leave_and_exclusivity_scenario() {
    let input = ScheduleInput {
        roster: vec![
            Person::new("A", [Role::WorshipLeader, Role::Backup]),
            Person::new("B", [Role::WorshipLeader]).with_leave(day(4, 6)),
            Person::new("C", [Role::Backup]),
        ],
        calendar: vec![day(4, 6)],
        rotation: vec!["B".into(), "A".into()],
        ..Default::default()
    };
    let config = EngineConfig { roles: vec![Role::WorshipLeader, Role::Backup], seed: Some(1), ..Default::default() };
    let outcome = build_schedule(&input, config).unwrap();
    assert_eq!(outcome.day(day(4, 6)).unwrap().holder(&Role::WorshipLeader), Some("A"));
    assert_eq!(outcome.day(day(4, 6)).unwrap().holder(&Role::Backup), Some("C"));
    assert!(!outcome.has_gaps());
}

#[test]
fn lone_leader_preaching_soon_is_a_gap() {
    let input = ScheduleInput {
        roster: vec![Person::new("Kris", [Role::WorshipLeader])],
        calendar: vec![day(4, 6)],
        preachers: vec![Preacher { name: "Kris".into(), graphics_support: String::new(), dates: vec![day(4, 13)] }],
        ..Default::default()
    };
    let config = EngineConfig { roles: vec![Role::WorshipLeader], seed: Some(1), ..Default::default() };
    let outcome = build_schedule(&input, config).unwrap();
    assert!(outcome.assignments.is_empty());
    assert_eq!(outcome.gaps.len(), 1);
    assert_eq!(outcome.gaps[0].reasons[0].reason, IneligibleReason::PreachingSoon);
}

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn sample_files_schedule_electric_guitar_and_keep_default_windows() {
    let mut config = EngineConfig::load(sample("config.json")).unwrap();
    assert_eq!(config.roles.last(), Some(&Role::Electric));
    assert_eq!(config.role_window(&Role::WorshipLeader), Some(4));
    config.seed = Some(7);

    let input = ScheduleInput {
        roster: load_team(sample("team.json")).unwrap(),
        calendar: sundays_between(day(4, 1), day(6, 30)),
        preachers: load_preachers(sample("preaching.json")).unwrap(),
        rotation: load_rotation(sample("rotation.json")).unwrap(),
        seed_history: Vec::new(),
    };
    let outcome = build_schedule(&input, config).unwrap();

    for date in &input.calendar {
        let electric = outcome.assignments.iter().filter(|a| a.date == *date && a.role == Role::Electric).count()
            + outcome.gaps.iter().filter(|g| g.date == *date && g.role == Role::Electric).count();
        assert_eq!(electric, 1, "{date}");
    }
    assert!(outcome.assignments.iter().filter(|a| a.role == Role::Electric).all(|a| a.person == "Eli"));
    assert!(!outcome
        .assignments
        .iter()
        .any(|a| a.person == "Lulu" && a.role == Role::Emcee && preaching(&input, "Edmund", a.date)));
}

#[test]
fn partial_window_override_keeps_worship_leader_guard() {
    let config: EngineConfig = serde_json::from_str(r#"{"role_windows": {"EMCEE": 3}, "seed": 1}"#).unwrap();
    let input = ScheduleInput {
        roster: vec![Person::new("A", [Role::WorshipLeader]), Person::new("B", [Role::WorshipLeader])],
        calendar: vec![day(4, 6), day(4, 13), day(4, 20)],
        ..Default::default()
    };
    let config = EngineConfig { roles: vec![Role::WorshipLeader], ..config };
    let outcome = build_schedule(&input, config).unwrap();

    assert_eq!(outcome.assignments.len(), 2);
    assert_eq!(outcome.gaps.len(), 1);
    assert_eq!(outcome.gaps[0].date, day(4, 20));
    assert_eq!(outcome.gaps[0].reasons[0].reason, IneligibleReason::RecentlyInRole);
}
