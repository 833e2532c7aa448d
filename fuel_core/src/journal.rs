//! Food journal persistence and daily totals.
//!
//! Entries are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{store, Error, FoodEntry, GoalResult, Meal, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use fs2::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Calorie goal shown when no profile has been calculated yet
pub const DEFAULT_CALORIE_GOAL: i64 = 2400;

/// Sink for logged records (food entries, workouts)
pub trait EntrySink<T> {
    fn append(&mut self, entry: &T) -> Result<()>;
}

/// JSONL-based food journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EntrySink<FoodEntry> for JsonlJournal {
    fn append(&mut self, entry: &FoodEntry) -> Result<()> {
        if entry.name.trim().is_empty() {
            return Err(Error::Journal("food entry needs a name".into()));
        }

        store::append_jsonl(&self.path, entry)?;

        tracing::debug!("Appended entry {} to journal", entry.id);
        Ok(())
    }
}

/// Read all entries from a journal file
pub fn read_entries(path: &Path) -> Result<Vec<FoodEntry>> {
    store::read_jsonl(path, "journal")
}

/// Remove the entry with `id`, rewriting the journal atomically
///
/// Returns whether an entry was removed. Malformed lines are dropped by the
/// rewrite.
pub fn remove_entry(path: &Path, id: Uuid) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let file = OpenOptions::new().read(true).write(true).open(path)?;
    file.lock_exclusive()?;

    let result = rewrite_without(path, &file, id);
    file.unlock()?;
    result
}

fn rewrite_without(path: &Path, file: &File, id: Uuid) -> Result<bool> {
    let entries: Vec<FoodEntry> = store::parse_jsonl(file, "journal")?;
    let before = entries.len();
    let kept: Vec<_> = entries.into_iter().filter(|e| e.id != id).collect();

    if kept.len() == before {
        return Ok(false);
    }

    store::replace_jsonl(path, &kept)?;

    tracing::debug!("Removed entry {} from journal", id);
    Ok(true)
}

/// Entries logged on `date` in the given timezone
pub fn entries_on<Tz: TimeZone>(entries: &[FoodEntry], date: NaiveDate, tz: &Tz) -> Vec<FoodEntry> {
    entries
        .iter()
        .filter(|e| e.logged_at.with_timezone(tz).date_naive() == date)
        .cloned()
        .collect()
}

/// Entries logged today in local time
pub fn entries_today(entries: &[FoodEntry]) -> Vec<FoodEntry> {
    let today: DateTime<Local> = Local::now();
    entries_on(entries, today.date_naive(), &Local)
}

/// Totals for every local day with at least one entry, oldest first
pub fn daily_totals<Tz: TimeZone>(entries: &[FoodEntry], tz: &Tz) -> BTreeMap<NaiveDate, MacroTotals> {
    let mut days: BTreeMap<NaiveDate, Vec<&FoodEntry>> = BTreeMap::new();
    for entry in entries {
        let day = entry.logged_at.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(entry);
    }

    days.into_iter()
        .map(|(day, entries)| (day, MacroTotals::sum(entries)))
        .collect()
}

/// Summed calories and macros
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl MacroTotals {
    pub fn sum<'a>(entries: impl IntoIterator<Item = &'a FoodEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |acc, e| Self {
            calories: acc.calories + i64::from(e.calories),
            protein: acc.protein + i64::from(e.protein),
            carbs: acc.carbs + i64::from(e.carbs),
            fat: acc.fat + i64::from(e.fat),
        })
    }
}

/// Totals for each meal, in breakfast/lunch/dinner/snack order
pub fn meal_totals(entries: &[FoodEntry]) -> Vec<(Meal, MacroTotals)> {
    Meal::ALL
        .iter()
        .map(|meal| {
            let totals = MacroTotals::sum(entries.iter().filter(|e| e.meal == *meal));
            (*meal, totals)
        })
        .collect()
}

/// A day's intake against the stored goals
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct DailyProgress {
    pub totals: MacroTotals,
    pub goals: GoalResult,
    pub remaining_calories: i64,
    pub calorie_percent: f64,
}

impl DailyProgress {
    pub fn new(totals: MacroTotals, goals: GoalResult) -> Self {
        let calorie_percent = if goals.calorie_goal > 0 {
            (totals.calories as f64 / goals.calorie_goal as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            totals,
            goals,
            remaining_calories: goals.calorie_goal - totals.calories,
            calorie_percent,
        }
    }

    /// Goals used before any profile exists
    pub fn fallback_goals() -> GoalResult {
        GoalResult {
            calorie_goal: DEFAULT_CALORIE_GOAL,
            protein_goal: 0,
            carbs_goal: 0,
            fat_goal: 0,
        }
    }
}
