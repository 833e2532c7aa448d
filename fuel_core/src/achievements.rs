//! Achievements unlocked by workouts, streaks and food logging.
//!
//! The catalog is fixed in [`ACHIEVEMENTS`]; only the earned dates are
//! persisted. Once earned, an achievement stays earned.

use crate::journal::daily_totals;
use crate::workouts::{calculate_streak, longest_run, workout_days};
use crate::{store, FoodEntry, Result, Workout};
use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A workout started before this local hour earns the early bird badge
pub const EARLY_BIRD_HOUR: u32 = 7;

/// A day "hits" the calorie goal when intake is within this fraction of it
pub const GOAL_HIT_TOLERANCE: f64 = 0.10;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Workout,
    Streak,
    Nutrition,
    Milestone,
}

/// What an achievement asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Workouts(usize),
    WorkoutStreak(u32),
    WorkoutBefore(u32),
    LoggedDays(usize),
    GoalStreak(u32),
}

/// Catalog entry
#[derive(Clone, Copy, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub requirement: Requirement,
}

pub static ACHIEVEMENTS: [AchievementDef; 10] = [
    AchievementDef {
        id: "first_workout",
        title: "First Workout",
        description: "Complete your first workout",
        icon: "🎯",
        category: AchievementCategory::Workout,
        requirement: Requirement::Workouts(1),
    },
    AchievementDef {
        id: "week_streak",
        title: "7 Day Streak",
        description: "Log activity for 7 days straight",
        icon: "🔥",
        category: AchievementCategory::Streak,
        requirement: Requirement::WorkoutStreak(7),
    },
    AchievementDef {
        id: "early_bird",
        title: "Early Bird",
        description: "Complete a workout before 7am",
        icon: "🌅",
        category: AchievementCategory::Workout,
        requirement: Requirement::WorkoutBefore(EARLY_BIRD_HOUR),
    },
    AchievementDef {
        id: "consistency_king",
        title: "Consistency King",
        description: "Log 30 days in a row",
        icon: "👑",
        category: AchievementCategory::Streak,
        requirement: Requirement::WorkoutStreak(30),
    },
    AchievementDef {
        id: "ten_workouts",
        title: "10 Workouts",
        description: "Complete 10 workouts",
        icon: "💪",
        category: AchievementCategory::Workout,
        requirement: Requirement::Workouts(10),
    },
    AchievementDef {
        id: "fifty_workouts",
        title: "50 Workouts",
        description: "Complete 50 workouts",
        icon: "🏆",
        category: AchievementCategory::Workout,
        requirement: Requirement::Workouts(50),
    },
    AchievementDef {
        id: "hundred_workouts",
        title: "100 Workouts",
        description: "Complete 100 workouts",
        icon: "⭐",
        category: AchievementCategory::Milestone,
        requirement: Requirement::Workouts(100),
    },
    AchievementDef {
        id: "nutrition_tracker",
        title: "Nutrition Tracker",
        description: "Log meals for 7 days",
        icon: "🥗",
        category: AchievementCategory::Nutrition,
        requirement: Requirement::LoggedDays(7),
    },
    AchievementDef {
        id: "goal_crusher",
        title: "Goal Crusher",
        description: "Hit your calorie goal 5 days in a row",
        icon: "🎖️",
        category: AchievementCategory::Nutrition,
        requirement: Requirement::GoalStreak(5),
    },
    AchievementDef {
        id: "month_streak",
        title: "30 Day Streak",
        description: "Log activity for 30 days straight",
        icon: "🌟",
        category: AchievementCategory::Streak,
        requirement: Requirement::WorkoutStreak(30),
    },
];

/// An achievement and when it was earned
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }

    fn definition(&self) -> Option<&'static AchievementDef> {
        ACHIEVEMENTS.iter().find(|def| def.id == self.id)
    }
}

impl From<&AchievementDef> for Achievement {
    fn from(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            category: def.category,
            earned_at: None,
        }
    }
}

/// The full catalog, nothing earned
pub fn default_achievements() -> Vec<Achievement> {
    ACHIEVEMENTS.iter().map(Achievement::from).collect()
}

/// Activity facts the unlock rules are checked against
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ActivitySummary {
    pub workout_count: usize,
    pub workout_streak: u32,
    /// Earliest local hour any workout was performed at
    pub earliest_workout_hour: Option<u32>,
    pub logged_days: usize,
    pub goal_streak: u32,
}

impl ActivitySummary {
    /// Summarize workouts and food entries as seen from `today` in `tz`
    pub fn collect<Tz: TimeZone>(
        workouts: &[Workout],
        entries: &[FoodEntry],
        calorie_goal: i64,
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let days = daily_totals(entries, tz);
        let goal_days = days
            .iter()
            .filter(|(_, totals)| hits_goal(totals.calories, calorie_goal))
            .map(|(day, _)| *day);

        Self {
            workout_count: workouts.len(),
            workout_streak: calculate_streak(workout_days(workouts, tz), today),
            earliest_workout_hour: workouts
                .iter()
                .map(|w| w.performed_at.with_timezone(tz).hour())
                .min(),
            logged_days: days.len(),
            goal_streak: longest_run(goal_days),
        }
    }

    pub fn satisfies(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Workouts(n) => self.workout_count >= n,
            Requirement::WorkoutStreak(n) => self.workout_streak >= n,
            Requirement::WorkoutBefore(hour) => {
                self.earliest_workout_hour.is_some_and(|h| h < hour)
            }
            Requirement::LoggedDays(n) => self.logged_days >= n,
            Requirement::GoalStreak(n) => self.goal_streak >= n,
        }
    }
}

/// Whether a day's intake counts as hitting the calorie goal
pub fn hits_goal(calories: i64, calorie_goal: i64) -> bool {
    if calorie_goal <= 0 || calories <= 0 {
        return false;
    }
    let tolerance = calorie_goal as f64 * GOAL_HIT_TOLERANCE;
    ((calories - calorie_goal) as f64).abs() <= tolerance
}

/// Mark every unearned achievement whose requirement is met as earned at
/// `now`, returning the newly unlocked ones
pub fn check_and_unlock(
    achievements: &mut [Achievement],
    summary: &ActivitySummary,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let mut unlocked = Vec::new();

    for achievement in achievements.iter_mut().filter(|a| !a.is_earned()) {
        let Some(def) = achievement.definition() else {
            continue;
        };
        if summary.satisfies(def.requirement) {
            achievement.earned_at = Some(now);
            tracing::info!("Unlocked achievement {}", achievement.id);
            unlocked.push(achievement.clone());
        }
    }

    unlocked
}

/// Load saved achievements merged onto the catalog
///
/// A missing or corrupt file yields the catalog with nothing earned. Saved
/// ids that are no longer in the catalog are dropped.
pub fn load_achievements(path: &Path) -> Result<Vec<Achievement>> {
    let saved: Vec<Achievement> = store::load_json(path, "achievements")?.unwrap_or_default();
    let earned: HashMap<String, DateTime<Utc>> = saved
        .into_iter()
        .filter_map(|a| a.earned_at.map(|at| (a.id, at)))
        .collect();

    let mut achievements = default_achievements();
    for achievement in &mut achievements {
        achievement.earned_at = earned.get(&achievement.id).copied();
    }
    Ok(achievements)
}

/// Save achievements atomically
pub fn save_achievements(path: &Path, achievements: &[Achievement]) -> Result<()> {
    store::save_json(path, &achievements)?;
    tracing::debug!("Saved achievements to {:?}", path);
    Ok(())
}
