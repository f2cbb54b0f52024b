//! Eligibility rules deciding whether a person may take a role on a given Sunday.
//!
//! Each rule is an independent predicate over a [`RuleContext`]. The checker
//! runs them in order and stops at the first failure, so the reported reason
//! is the first rule that turned the person away.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, PairingKind, PreacherPairing};
use crate::roster::{Person, PreachingCalendar, Role};
use super::history::AssignmentHistory;
use super::timeline::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    NotCapable,
    OnLeave,
    BlockedOut,
    Preaching,
    AlreadyServing,
    RoleFilled,
    ConsecutiveSundays,
    SameRoleStreak,
    RecentlyInRole,
    PreachingSoon,
    TeachingYouth,
    PreacherPairing,
}

pub type Verdict = Result<(), IneligibleReason>;

/// Everything a rule may look at for one (person, role, date) question
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub person: &'a Person,
    pub role: &'a Role,
    pub date: NaiveDate,
    pub history: &'a AssignmentHistory,
    pub timeline: &'a Timeline,
    pub preaching: &'a PreachingCalendar,
    pub config: &'a EngineConfig,
}

pub trait EligibilityRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hard rules cannot be waived during manual triage
    fn is_hard(&self) -> bool {
        false
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict;
}

fn require(condition: bool, reason: IneligibleReason) -> Verdict {
    if condition {
        Ok(())
    } else {
        Err(reason)
    }
}

pub struct RoleCapabilityRule;

impl EligibilityRule for RoleCapabilityRule {
    fn name(&self) -> &'static str {
        "role_capability"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(ctx.person.can_serve(ctx.role), IneligibleReason::NotCapable)
    }
}

pub struct OnLeaveRule;

impl EligibilityRule for OnLeaveRule {
    fn name(&self) -> &'static str {
        "on_leave"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(!ctx.person.is_on_leave(ctx.date), IneligibleReason::OnLeave)
    }
}

pub struct BlockoutDateRule;

impl EligibilityRule for BlockoutDateRule {
    fn name(&self) -> &'static str {
        "blockout_date"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(!ctx.person.is_blocked_out(ctx.date), IneligibleReason::BlockedOut)
    }
}

pub struct PreachingDateRule;

impl EligibilityRule for PreachingDateRule {
    fn name(&self) -> &'static str {
        "preaching_date"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(!ctx.preaching.is_preaching(ctx.person, ctx.date), IneligibleReason::Preaching)
    }
}

/// One role per person per Sunday
pub struct AlreadyServingRule;

impl EligibilityRule for AlreadyServingRule {
    fn name(&self) -> &'static str {
        "already_serving"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(
            !ctx.history.served_on(&ctx.person.name, ctx.date),
            IneligibleReason::AlreadyServing,
        )
    }
}

/// One person per role per Sunday
pub struct RoleFilledRule;

impl EligibilityRule for RoleFilledRule {
    fn name(&self) -> &'static str {
        "role_filled"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        require(ctx.history.holder(ctx.date, ctx.role).is_none(), IneligibleReason::RoleFilled)
    }
}

/// Blocks the Sunday that would extend a serving streak past the limit
pub struct ConsecutiveSundayRule;

impl EligibilityRule for ConsecutiveSundayRule {
    fn name(&self) -> &'static str {
        "consecutive_sundays"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        let limit = ctx.config.consecutive_sunday_limit;
        let preceding = ctx.timeline.preceding(ctx.date, limit);
        let streak = ctx.history.streak(&ctx.person.name, &preceding, |d| {
            ctx.config.count_preaching_in_streak && ctx.preaching.is_preaching(ctx.person, d)
        });
        require(streak < limit as usize, IneligibleReason::ConsecutiveSundays)
    }
}

/// Blocks the Sunday that would extend a same-role streak past the limit
pub struct SameRoleStreakRule;

impl EligibilityRule for SameRoleStreakRule {
    fn name(&self) -> &'static str {
        "same_role_streak"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        let limit = ctx.config.same_role_streak_limit;
        let preceding = ctx.timeline.preceding(ctx.date, limit);
        let streak = ctx.history.role_streak(&ctx.person.name, ctx.role, &preceding);
        require(streak < limit as usize, IneligibleReason::SameRoleStreak)
    }
}

/// Per-role cool-down, e.g. four weeks between Sunday School classes
pub struct RoleWindowRule;

impl EligibilityRule for RoleWindowRule {
    fn name(&self) -> &'static str {
        "role_window"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        let Some(weeks) = ctx.config.role_window(ctx.role) else {
            return Ok(());
        };
        let recent = ctx
            .history
            .last_in_role(&ctx.person.name, ctx.role, ctx.date)
            .is_some_and(|last| ctx.timeline.within_window(last, ctx.date, weeks));
        require(!recent, IneligibleReason::RecentlyInRole)
    }
}

/// A Worship Leader needs the coming Sundays free of preaching duty
pub struct WorshipLeaderPreachingRule;

impl EligibilityRule for WorshipLeaderPreachingRule {
    fn name(&self) -> &'static str {
        "worship_leader_preaching"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        if *ctx.role != Role::WorshipLeader {
            return Ok(());
        }
        let preaching_soon = ctx
            .timeline
            .following(ctx.date, ctx.config.preaching_lookahead)
            .into_iter()
            .any(|d| ctx.preaching.is_preaching(ctx.person, d));
        require(!preaching_soon, IneligibleReason::PreachingSoon)
    }
}

pub struct WorshipLeaderTeachingRule;

impl EligibilityRule for WorshipLeaderTeachingRule {
    fn name(&self) -> &'static str {
        "worship_leader_teaching"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        if *ctx.role != Role::WorshipLeader {
            return Ok(());
        }
        require(!ctx.person.teaches_youth(ctx.date), IneligibleReason::TeachingYouth)
    }
}

/// Ties one person's role to who is preaching that Sunday
pub struct PreacherPairingRule {
    pairing: PreacherPairing,
}

impl PreacherPairingRule {
    pub fn new(pairing: PreacherPairing) -> Self {
        Self { pairing }
    }
}

impl EligibilityRule for PreacherPairingRule {
    fn name(&self) -> &'static str {
        "preacher_pairing"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Verdict {
        if ctx.person.name != self.pairing.person || *ctx.role != self.pairing.role {
            return Ok(());
        }
        let paired = ctx.preaching.preacher_on(ctx.date) == Some(self.pairing.preacher.as_str());
        let allowed = match self.pairing.kind {
            PairingKind::OnlyWith => paired,
            PairingKind::NeverWith => !paired,
        };
        require(allowed, IneligibleReason::PreacherPairing)
    }
}

/// Ordered rule list; new conditions are appended without touching the others
pub struct EligibilityChecker {
    rules: Vec<Box<dyn EligibilityRule>>,
}

impl EligibilityChecker {
    pub fn new(rules: Vec<Box<dyn EligibilityRule>>) -> Self {
        Self { rules }
    }

    /// The ministry rule set, followed by the configured preacher pairings
    pub fn standard(config: &EngineConfig) -> Self {
        let mut rules: Vec<Box<dyn EligibilityRule>> = vec![
            Box::new(RoleCapabilityRule),
            Box::new(OnLeaveRule),
            Box::new(BlockoutDateRule),
            Box::new(PreachingDateRule),
            Box::new(AlreadyServingRule),
            Box::new(RoleFilledRule),
            Box::new(ConsecutiveSundayRule),
            Box::new(SameRoleStreakRule),
            Box::new(RoleWindowRule),
            Box::new(WorshipLeaderPreachingRule),
            Box::new(WorshipLeaderTeachingRule),
        ];
        for pairing in &config.pairings {
            rules.push(Box::new(PreacherPairingRule::new(pairing.clone())));
        }
        Self { rules }
    }

    pub fn with_rule<R: EligibilityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        self.run(ctx, self.rules.iter())
    }

    /// Only the rules that manual triage cannot waive
    pub fn evaluate_hard(&self, ctx: &RuleContext<'_>) -> Verdict {
        self.run(ctx, self.rules.iter().filter(|r| r.is_hard()))
    }

    fn run<'r, I>(&self, ctx: &RuleContext<'_>, rules: I) -> Verdict
    where
        I: Iterator<Item = &'r Box<dyn EligibilityRule>>,
    {
        for rule in rules {
            let verdict = rule.check(ctx);
            debug!(
                rule = rule.name(),
                person = %ctx.person.name,
                role = %ctx.role,
                date = %ctx.date,
                ?verdict,
                "rule evaluated"
            );
            verdict?;
        }
        Ok(())
    }
}
