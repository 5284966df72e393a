use chrono::{NaiveDate, NaiveDateTime};

use interview_schedule::attempt::SchedulingAttempt;
use interview_schedule::audit::{audit_schedule, AuditFindingKind};
use interview_schedule::exact::{ExactSolver, PassMode};
use interview_schedule::generator::{InstanceGenerator, InstanceGeneratorConfig};
use interview_schedule::models::{
    Applicant, EventDay, Interval, InterviewKind, Recruiter, Room, Team, ViolationType,
};
use interview_schedule::scheduler::score_schedule;
use interview_schedule::{schedule_interviews, ResourcePools, SchedulerConfig, StrategySelector};

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, day).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn window(day: u32, from: (u32, u32), to: (u32, u32)) -> Interval {
    Interval::new(at(day, from.0, from.1), at(day, to.0, to.1)).unwrap()
}

fn mixed_panel(day: u32, from: u32, to: u32) -> Vec<Recruiter> {
    ["Astra", "Astra", "Juvo", "Juvo"]
        .iter()
        .enumerate()
        .map(|(i, team)| Recruiter::new(format!("r{i}"), *team).with_window(window(day, (from, 0), (to, 0))))
        .collect()
}

#[test]
fn test_single_window_forms_one_diverse_group() {
    let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
        .with_teams(["Astra", "Juvo"])
        .with_solver_budget(5);
    let applicants = (0..5)
        .map(|i| {
            Applicant::new(format!("a{i}"))
                .with_team(if i % 2 == 0 { "Astra" } else { "Juvo" })
                .with_window(window(13, (9, 0), (9, 40)))
        })
        .collect();
    let rooms = vec![Room::new("101").with_window(window(13, (9, 0), (12, 0)))];

    let schedule = schedule_interviews(applicants, mixed_panel(13, 9, 12), rooms, config).unwrap();

    assert_eq!(schedule.count_of_kind(InterviewKind::Group), 1);
    let group = &schedule.interviews[0];
    assert!(group.is_group());
    assert_eq!(group.applicants().len(), 5);
    assert_eq!(group.recruiters().len(), 4);
    assert_eq!(group.interval().start(), at(13, 9, 0));
    assert_eq!(schedule.violation_count(&ViolationType::DiversityShortfall), 0);
}

#[test]
fn test_morning_only_applicant_stays_unscheduled() {
    let config = SchedulerConfig::new(vec![
        EventDay::from_hours(2025, 9, 11, 17, 20).unwrap(),
        EventDay::from_hours(2025, 9, 13, 9, 12).unwrap(),
    ])
    .with_teams(["Astra", "Juvo"])
    .with_solver_budget(5);

    let mut applicants: Vec<Applicant> = (0..4)
        .map(|i| Applicant::new(format!("a{i}")).with_team("Astra").with_window(window(11, (17, 0), (20, 0))))
        .collect();
    applicants.push(Applicant::new("early").with_team("Astra").with_window(window(13, (9, 0), (9, 20))));
    let rooms = vec![
        Room::new("101").with_window(window(11, (17, 0), (20, 0))),
        Room::new("102").with_window(window(11, (17, 0), (20, 0))),
    ];

    let schedule = schedule_interviews(applicants, mixed_panel(11, 17, 20), rooms, config).unwrap();

    assert!(schedule.is_unscheduled("early"));
    let early = schedule
        .unscheduled
        .iter()
        .find(|u| u.applicant_id == "early")
        .unwrap();
    assert!(early.missing_individual);
    assert!(schedule.interview_of_kind("early", InterviewKind::Individual).is_none());
    assert_eq!(schedule.fully_scheduled_count(), 4);
}

#[test]
fn test_sole_room_goes_to_one_applicant() {
    let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()]);
    // Windows differ but share only 9:20-9:40, the one slot the room is open.
    let applicants = vec![
        Applicant::new("x").with_window(window(13, (9, 0), (9, 40))),
        Applicant::new("y").with_window(window(13, (9, 20), (10, 0))),
    ];
    let recruiters = vec![
        Recruiter::new("r0", "Astra").with_window(window(13, (9, 0), (12, 0))),
        Recruiter::new("r1", "Juvo").with_window(window(13, (9, 0), (12, 0))),
    ];
    let rooms = vec![Room::new("101").with_window(window(13, (9, 20), (9, 40)))];
    let pools = ResourcePools::new(applicants, recruiters, rooms, config).unwrap();

    let schedule = StrategySelector::from_config(pools.config()).run(&pools).unwrap();

    assert_eq!(schedule.interview_count(), 1);
    assert_eq!(schedule.count_of_kind(InterviewKind::Individual), 1);
    assert_eq!(schedule.interviews[0].interval().start(), at(13, 9, 20));
    let placed: Vec<bool> = ["x", "y"]
        .iter()
        .map(|id| schedule.interview_of_kind(id, InterviewKind::Individual).is_some())
        .collect();
    assert_eq!(placed.iter().filter(|p| **p).count(), 1);
    assert_eq!(schedule.unscheduled.len(), 2); // both lack a group
    assert!(audit_schedule(&schedule, &pools).is_empty());
}

#[test]
fn test_never_available_records_do_not_fail_the_run() {
    let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
        .with_teams(["Astra", "Juvo"])
        .with_solver_budget(5);
    let mut applicants: Vec<Applicant> = (0..4)
        .map(|i| Applicant::new(format!("a{i}")).with_team("Astra").with_window(window(13, (9, 0), (12, 0))))
        .collect();
    applicants.push(Applicant::new("ghost").with_team("Astra"));
    applicants.push(Applicant::new("elsewhere").with_team("Terra").with_window(window(20, (9, 0), (12, 0))));
    let mut recruiters = mixed_panel(13, 9, 12);
    recruiters.push(Recruiter::new("idle", "Astra"));
    let rooms = vec![
        Room::new("101").with_window(window(13, (9, 0), (12, 0))),
        Room::new("102").with_window(window(13, (9, 0), (12, 0))),
    ];

    let schedule = schedule_interviews(applicants, recruiters, rooms, config).unwrap();

    assert_eq!(schedule.fully_scheduled_count(), 4);
    assert!(schedule.is_unscheduled("ghost"));
    assert!(schedule.is_unscheduled("elsewhere"));
    assert!(schedule.interviews_for_recruiter("idle").is_empty());
}

#[test]
fn test_selected_schedules_pass_audit() {
    for seed in [1, 2, 3] {
        let mut instance = InstanceGenerator::new(InstanceGeneratorConfig::easy(), seed)
            .generate()
            .unwrap();
        instance.config.solver_time_budget_seconds = 1;
        instance.config.shuffle_seed = Some(seed);
        let pools = instance.into_pools().unwrap();

        let outcomes = StrategySelector::from_config(pools.config()).run_all(&pools);
        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            let findings = audit_schedule(&outcome.schedule, &pools);
            assert!(
                findings.iter().all(|f| f.kind != AuditFindingKind::DoubleBooking),
                "{}: {findings:?}",
                outcome.strategy
            );
            assert!(findings.is_empty(), "{}: {findings:?}", outcome.strategy);
        }
    }
}

#[test]
fn test_relaxed_pass_never_lowers_coverage() {
    let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
        .with_solver_budget(5);
    let applicants = (0..4)
        .map(|i| Applicant::new(format!("a{i}")).with_team("Terra").with_window(window(13, (9, 0), (12, 0))))
        .collect();
    let rooms = (0..2)
        .map(|i| Room::new(format!("R{i}")).with_window(window(13, (9, 0), (12, 0))))
        .collect();
    let pools = ResourcePools::new(applicants, mixed_panel(13, 9, 12), rooms, config).unwrap();

    let (attempt, outcomes) = ExactSolver::new().solve(&pools);
    let strict_coverage = outcomes
        .iter()
        .find(|o| o.mode == PassMode::Strict)
        .and_then(|o| o.solution())
        .map(|s| SchedulingAttempt::from_placements(&pools, s.placements.iter().cloned()).complete_count())
        .unwrap_or(0);

    assert!(attempt.complete_count() >= strict_coverage);
    assert_eq!(attempt.complete_count(), 4);
}

#[test]
fn test_scoring_is_idempotent() {
    let pools = InstanceGenerator::new(InstanceGeneratorConfig::medium(), 11)
        .generate()
        .unwrap()
        .into_pools()
        .unwrap();
    let schedule = StrategySelector::new()
        .with_strategy(interview_schedule::greedy::GreedyConstruction::new())
        .run(&pools)
        .unwrap();

    let first = score_schedule(&schedule, &pools);
    let second = score_schedule(&schedule, &pools);
    assert_eq!(first, second);
    assert_eq!(first, score_schedule(&schedule.clone(), &pools));
}

#[test]
fn test_wildcard_interviewer_satisfies_affinity() {
    let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
        .with_exact_solver(false);
    let applicants = vec![Applicant::new("solo")
        .with_team("Terra")
        .with_window(window(13, (9, 0), (12, 0)))];
    let recruiters = vec![Recruiter::new("any", Team::All).with_window(window(13, (9, 0), (12, 0)))];
    let rooms = vec![Room::new("101").with_window(window(13, (9, 0), (12, 0)))];

    let schedule = schedule_interviews(applicants, recruiters, rooms, config).unwrap();
    assert_eq!(schedule.count_of_kind(InterviewKind::Individual), 1);
    assert_eq!(schedule.violation_count(&ViolationType::AffinityShortfall), 0);
}
