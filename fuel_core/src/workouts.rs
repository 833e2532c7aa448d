//! Workout log, history statistics and day streaks.
//!
//! Completed workouts are appended to a JSONL file next to the food journal.

use crate::journal::EntrySink;
use crate::{store, Error, Result, Workout};
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// JSONL-based workout log with file locking
pub struct WorkoutLog {
    path: PathBuf,
}

impl WorkoutLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EntrySink<Workout> for WorkoutLog {
    fn append(&mut self, workout: &Workout) -> Result<()> {
        workout.validate()?;
        store::append_jsonl(&self.path, workout)?;

        tracing::debug!(
            "Appended workout {} ({} exercises) to log",
            workout.id,
            workout.exercises.len()
        );
        Ok(())
    }
}

impl Workout {
    /// A workout needs a name and at least one exercise with sets and reps
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Workout("workout needs a name".into()));
        }
        if self.exercises.is_empty() {
            return Err(Error::Workout(format!(
                "workout '{}' needs at least one exercise",
                self.name
            )));
        }
        for exercise in &self.exercises {
            if exercise.name.trim().is_empty() {
                return Err(Error::Workout("exercise needs a name".into()));
            }
            if exercise.sets == 0 || exercise.reps == 0 {
                return Err(Error::Workout(format!(
                    "exercise '{}' needs at least one set and one rep",
                    exercise.name
                )));
            }
            if let Some(weight) = exercise.weight {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(Error::Workout(format!(
                        "exercise '{}' has an invalid weight",
                        exercise.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Read all workouts from a log file
pub fn read_workouts(path: &Path) -> Result<Vec<Workout>> {
    store::read_jsonl(path, "workout")
}

/// Workouts sorted newest first
pub fn history(workouts: &[Workout]) -> Vec<Workout> {
    let mut sorted = workouts.to_vec();
    sorted.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
    sorted
}

/// The local day of each workout
pub fn workout_days<Tz: TimeZone>(workouts: &[Workout], tz: &Tz) -> Vec<NaiveDate> {
    workouts
        .iter()
        .map(|w| w.performed_at.with_timezone(tz).date_naive())
        .collect()
}

/// Consecutive days of activity ending today or yesterday
///
/// The streak is anchored on today when there was activity today, on
/// yesterday otherwise; a gap of more than one day since the latest activity
/// is a streak of 0. Several entries on one day count once, and days after
/// `today` are ignored.
pub fn calculate_streak(days: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = days.into_iter().collect();
    days.sort_unstable_by(|a, b| b.cmp(a));

    let Some(&latest) = days.first() else {
        return 0;
    };

    let gap = (today - latest).num_days();
    if gap > 1 {
        return 0;
    }

    let mut check = if gap == 1 {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    } else {
        today
    };

    let mut streak = 0;
    for day in days {
        match day.cmp(&check) {
            Ordering::Equal => {
                streak += 1;
                match check.pred_opt() {
                    Some(previous) => check = previous,
                    None => break,
                }
            }
            Ordering::Less => break,
            Ordering::Greater => continue,
        }
    }
    streak
}

/// Longest run of consecutive days in `days`
pub fn longest_run(days: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let mut days: Vec<NaiveDate> = days.into_iter().collect();
    days.sort_unstable();
    days.dedup();

    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        current = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(day);
    }
    longest
}

/// Totals shown above the workout history
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_sets: u32,
    pub avg_sets_per_workout: u32,
    pub total_minutes: u32,
}

impl WorkoutStats {
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        let total_workouts = workouts.len();
        let total_sets: u32 = workouts.iter().map(Workout::total_sets).sum();
        let total_minutes = workouts.iter().map(|w| w.duration_minutes).sum();
        let avg_sets_per_workout = if total_workouts > 0 {
            (f64::from(total_sets) / total_workouts as f64).round() as u32
        } else {
            0
        };

        Self {
            total_workouts,
            total_sets,
            avg_sets_per_workout,
            total_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;
    use chrono::{Duration, Utc};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn leg_day() -> Workout {
        Workout::new("Leg Day", 60)
            .with_exercise(Exercise::new("Squats", 5, 8).with_weight(100.0))
            .with_exercise(Exercise::new("Lunges", 3, 10))
    }

    #[test]
    fn test_append_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.jsonl");

        let mut log = WorkoutLog::new(&path);
        let workout = leg_day();
        log.append(&workout).unwrap();

        assert_eq!(read_workouts(&path).unwrap(), vec![workout]);
    }

    #[test]
    fn test_rejects_incomplete_workouts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.jsonl");
        let mut log = WorkoutLog::new(&path);

        let unnamed = Workout::new(" ", 30).with_exercise(Exercise::new("Push-ups", 3, 15));
        assert!(matches!(log.append(&unnamed), Err(Error::Workout(_))));

        let empty = Workout::new("Rest", 30);
        assert!(matches!(log.append(&empty), Err(Error::Workout(_))));

        let no_reps = Workout::new("Upper", 30).with_exercise(Exercise::new("Rows", 3, 0));
        assert!(matches!(log.append(&no_reps), Err(Error::Workout(_))));

        assert!(!path.exists());
    }

    #[test]
    fn test_history_newest_first() {
        let older = Workout {
            performed_at: Utc::now() - Duration::days(2),
            ..leg_day()
        };
        let newer = leg_day();

        let sorted = history(&[older.clone(), newer.clone()]);
        assert_eq!(sorted, vec![newer, older]);
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let today = day("2024-03-10");
        let days = [day("2024-03-08"), day("2024-03-10"), day("2024-03-09")];
        assert_eq!(calculate_streak(days, today), 3);
    }

    #[test]
    fn test_streak_anchors_on_yesterday() {
        let today = day("2024-03-10");
        let days = [day("2024-03-09"), day("2024-03-08"), day("2024-03-06")];
        assert_eq!(calculate_streak(days, today), 2);
    }

    #[test]
    fn test_streak_broken_by_gap() {
        let today = day("2024-03-10");
        assert_eq!(calculate_streak([day("2024-03-08")], today), 0);
        assert_eq!(calculate_streak(Vec::new(), today), 0);
    }

    #[test]
    fn test_streak_counts_days_not_workouts() {
        let today = day("2024-03-10");
        let days = [
            day("2024-03-10"),
            day("2024-03-10"),
            day("2024-03-09"),
            day("2024-03-09"),
        ];
        assert_eq!(calculate_streak(days, today), 2);
    }

    #[test]
    fn test_streak_ignores_future_days() {
        let today = day("2024-03-10");
        let days = [day("2024-03-12"), day("2024-03-10"), day("2024-03-09")];
        assert_eq!(calculate_streak(days, today), 2);
    }

    #[test]
    fn test_longest_run() {
        let days = [
            day("2024-01-01"),
            day("2024-01-02"),
            day("2024-01-04"),
            day("2024-01-05"),
            day("2024-01-06"),
            day("2024-01-05"),
        ];
        assert_eq!(longest_run(days), 3);
        assert_eq!(longest_run(Vec::new()), 0);
    }

    #[test]
    fn test_stats() {
        let quick = Workout::new("Quick", 20).with_exercise(Exercise::new("Plank", 3, 1));
        let stats = WorkoutStats::from_workouts(&[leg_day(), quick]);
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_sets, 11);
        // 5.5 rounds up
        assert_eq!(stats.avg_sets_per_workout, 6);
        assert_eq!(stats.total_minutes, 80);

        assert_eq!(WorkoutStats::from_workouts(&[]), WorkoutStats::default());
    }
}
