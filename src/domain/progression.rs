//! Pure XP progression engine.
//!
//! Maps accumulated XP to levels and display titles, and holds the single
//! authoritative gate deciding whether a task status change awards XP. The
//! engine mutates nothing; callers apply its decisions to the aggregates
//! and persist them.

use super::{Task, TaskStatus};

/// XP granted to the assignee on the first completion of a task.
pub const TASK_COMPLETION_XP: u64 = 10;

/// XP granted to the assigner when a task is created.
pub const TASK_ASSIGNMENT_XP: u64 = 5;

/// XP span of a single level.
const XP_PER_LEVEL: u64 = 100;

/// Computes the level for an XP total: one level per 100 XP, starting at 1.
///
/// Total over all of `u64`; there is no upper bound on level.
#[must_use]
pub const fn level_for_xp(xp: u64) -> u64 {
    xp.div_euclid(XP_PER_LEVEL).saturating_add(1)
}

/// Returns the display title for a level.
///
/// Levels beyond 10 saturate at the level-10 title.
#[must_use]
pub const fn title_for_level(level: u64) -> &'static str {
    match level {
        0 | 1 => "Initiate",
        2 => "Adept",
        3 => "Scholar",
        4 => "Rune Bearer",
        5 => "Arcane Coder",
        6 => "Shadow Architect",
        7 => "Chrono Sage",
        8 => "Mythic Engineer",
        9 => "Ethereal Overlord",
        _ => "Celestial Ascendant",
    }
}

/// Decides whether a status change awards the one-time completion XP.
///
/// True iff the new status is [`TaskStatus::Completed`] and the task has
/// not had its reward recorded. This is the only code path permitted to
/// make that decision; evaluate it against the task state *before* the
/// mutation is applied.
#[must_use]
pub const fn should_award_xp(task: &Task, new_status: TaskStatus) -> bool {
    matches!(new_status, TaskStatus::Completed) && !task.xp_awarded()
}
