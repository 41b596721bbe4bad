//! User aggregate root, gamification stats, and streak bookkeeping.

use super::{UserId, progression};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Gamification counters carried on every user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Tasks completed for the first time, counted at XP-award time.
    pub tasks_completed: u64,
    /// Tasks this user has assigned to buddies.
    pub tasks_assigned: u64,
    /// Notes created (maintained by the notes feature, outside this core).
    pub notes_created: u64,
    /// Activities posted (maintained outside this core).
    pub activities_posted: u64,
    /// Unique first-time completions; tracks `tasks_completed`.
    pub total_tasks_completed_once: u64,
    /// Lifetime XP; always equals the user's current XP total.
    pub total_xp_earned: u64,
    /// Peak level reached; monotonic and never below the current level.
    pub highest_level: u64,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            tasks_completed: 0,
            tasks_assigned: 0,
            notes_created: 0,
            activities_posted: 0,
            total_tasks_completed_once: 0,
            total_xp_earned: 0,
            highest_level: 1,
        }
    }
}

/// User aggregate root.
///
/// `level`, `level_title`, `stats.highest_level`, and
/// `stats.total_xp_earned` are derived from `xp` and refreshed through
/// [`User::apply_derived_fields`] whenever XP changes, so they can never
/// drift from the XP total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    xp: u64,
    level: u64,
    level_title: String,
    streak: u64,
    last_active_date: DateTime<Utc>,
    buddies: BTreeSet<UserId>,
    stats: UserStats,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with zero XP at level 1.
    #[must_use]
    pub fn new(username: impl Into<String>, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            id: UserId::new(),
            username: username.into(),
            xp: 0,
            level: 1,
            level_title: progression::title_for_level(1).to_owned(),
            streak: 0,
            last_active_date: now,
            buddies: BTreeSet::new(),
            stats: UserStats::default(),
            created_at: now,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the accumulated XP.
    #[must_use]
    pub const fn xp(&self) -> u64 {
        self.xp
    }

    /// Returns the level derived from XP.
    #[must_use]
    pub const fn level(&self) -> u64 {
        self.level
    }

    /// Returns the display title for the current level.
    #[must_use]
    pub fn level_title(&self) -> &str {
        &self.level_title
    }

    /// Returns the consecutive-day login streak.
    #[must_use]
    pub const fn streak(&self) -> u64 {
        self.streak
    }

    /// Returns the timestamp of the most recent login.
    #[must_use]
    pub const fn last_active_date(&self) -> DateTime<Utc> {
        self.last_active_date
    }

    /// Returns the buddy set.
    #[must_use]
    pub const fn buddies(&self) -> &BTreeSet<UserId> {
        &self.buddies
    }

    /// Returns the gamification counters.
    #[must_use]
    pub const fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether `other` is in this user's buddy set.
    #[must_use]
    pub fn is_buddy(&self, other: UserId) -> bool {
        self.buddies.contains(&other)
    }

    /// Adds a user to the buddy set. Idempotent.
    pub fn add_buddy(&mut self, other: UserId) {
        self.buddies.insert(other);
    }

    /// Removes a user from the buddy set. Idempotent.
    pub fn remove_buddy(&mut self, other: UserId) {
        self.buddies.remove(&other);
    }

    /// Recomputes every XP-derived field.
    ///
    /// Idempotent; running it twice yields the same state. Must be applied
    /// before any persist of a user whose XP changed. All XP-granting
    /// mutators on this type call it themselves.
    pub fn apply_derived_fields(&mut self) {
        self.level = progression::level_for_xp(self.xp);
        self.level_title = progression::title_for_level(self.level).to_owned();
        if self.level > self.stats.highest_level {
            self.stats.highest_level = self.level;
        }
        self.stats.total_xp_earned = self.xp;
    }

    /// Grants the one-time completion reward and bumps completion stats.
    pub fn record_task_completion(&mut self) {
        self.xp = self.xp.saturating_add(progression::TASK_COMPLETION_XP);
        self.stats.tasks_completed = self.stats.tasks_completed.saturating_add(1);
        self.stats.total_tasks_completed_once =
            self.stats.total_tasks_completed_once.saturating_add(1);
        self.apply_derived_fields();
    }

    /// Grants the assignment reward and bumps the assigned counter.
    pub fn record_task_assignment(&mut self) {
        self.xp = self.xp.saturating_add(progression::TASK_ASSIGNMENT_XP);
        self.stats.tasks_assigned = self.stats.tasks_assigned.saturating_add(1);
        self.apply_derived_fields();
    }

    /// Applies the login streak rule and advances `last_active_date`.
    ///
    /// A gap of exactly one calendar day extends the streak, a longer gap
    /// restarts it at 1, and a same-day login leaves it unchanged.
    pub fn record_login(&mut self, clock: &impl Clock) {
        let now = clock.utc();
        let gap_days = now
            .date_naive()
            .signed_duration_since(self.last_active_date.date_naive())
            .num_days();
        if gap_days == 1 {
            self.streak = self.streak.saturating_add(1);
        } else if gap_days > 1 {
            self.streak = 1;
        }
        self.last_active_date = now;
    }
}
