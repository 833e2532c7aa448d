#![forbid(unsafe_code)]

//! Calorie and macro goal engine for the Fuel tracker.
//!
//! This crate provides:
//! - Domain types (metrics, goals, food entries)
//! - The BMR/TDEE/calorie/macro goal engine
//! - Input validation and configuration
//! - Persistence (profile document, food journal, workout log)
//! - Workout history, streaks and achievements

pub mod types;
pub mod error;
pub mod macros;
pub mod validation;
pub mod config;
pub mod logging;
pub mod engine;
pub mod profile;
pub mod journal;
pub mod workouts;
pub mod achievements;
mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use macros::{CarbPolicy, MacroRatio, MacroTable};
pub use config::Config;
pub use engine::{
    calculate, compute_bmr, compute_calorie_goal, compute_macros, compute_macros_with,
    compute_tdee, Engine,
};
pub use journal::{read_entries, remove_entry, DailyProgress, EntrySink, JsonlJournal, MacroTotals};
pub use workouts::{calculate_streak, read_workouts, WorkoutLog, WorkoutStats};
pub use achievements::{check_and_unlock, load_achievements, save_achievements, Achievement, ActivitySummary};
