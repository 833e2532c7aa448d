//! Core domain types for the Fuel goal engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Body metrics and the user's weight goal
//! - Computed calorie and macro goals
//! - Persisted profile, food journal entries and workouts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Metric Inputs
// ============================================================================

/// Selects the BMR formula branch
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::Error::Validation(format!(
                "unknown gender '{}' (expected male or female)",
                other
            ))),
        }
    }
}

/// Activity level, each bound to a fixed TDEE multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// TDEE multiplier applied to BMR
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Light => "Exercise 1-3 days/week",
            ActivityLevel::Moderate => "Exercise 3-5 days/week",
            ActivityLevel::Active => "Exercise 6-7 days/week",
            ActivityLevel::VeryActive => "Hard exercise daily",
        }
    }

    /// Parse an activity level, falling back to `Moderate` for anything unrecognised.
    ///
    /// Never fails: an unknown level is a permissive default, not an error.
    pub fn parse_lossy(s: &str) -> Self {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "moderate" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very" | "veryactive" => ActivityLevel::VeryActive,
            _ => {
                tracing::warn!(
                    "Unknown activity level '{}', falling back to moderate",
                    s
                );
                ActivityLevel::Moderate
            }
        }
    }
}

impl Default for ActivityLevel {
    fn default() -> Self {
        ActivityLevel::Moderate
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very Active",
        };
        f.write_str(label)
    }
}

/// Weight goal; shapes both the calorie clamp and the macro ratios
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Default for Goal {
    fn default() -> Self {
        Goal::Lose
    }
}

impl FromStr for Goal {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            other => Err(crate::Error::Validation(format!(
                "unknown goal '{}' (expected lose, maintain or gain)",
                other
            ))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Goal::Lose => "Lose Weight",
            Goal::Maintain => "Maintain",
            Goal::Gain => "Gain Weight",
        };
        f.write_str(label)
    }
}

/// Body metrics and goal supplied for a single calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserMetrics {
    pub gender: Gender,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    pub target_weight_kg: f64,
    pub timeframe_weeks: u32,
}

// ============================================================================
// Goal Outputs
// ============================================================================

/// Daily protein/carb/fat targets in grams
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Macros {
    pub protein_goal: i64,
    pub carbs_goal: i64,
    pub fat_goal: i64,
}

/// Daily calorie target plus its macro split
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalResult {
    pub calorie_goal: i64,
    pub protein_goal: i64,
    pub carbs_goal: i64,
    pub fat_goal: i64,
}

impl GoalResult {
    pub fn new(calorie_goal: i64, macros: Macros) -> Self {
        Self {
            calorie_goal,
            protein_goal: macros.protein_goal,
            carbs_goal: macros.carbs_goal,
            fat_goal: macros.fat_goal,
        }
    }

    /// Calories reconstructed from the macro grams (4/4/9 kcal per gram)
    pub fn macro_calories(&self) -> i64 {
        self.protein_goal * 4 + self.carbs_goal * 4 + self.fat_goal * 9
    }
}

/// Which clamp, if any, shaped the calorie goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalorieClamp {
    None,
    LossFloor,
    GainCeiling,
}

/// A calculated goal with the intermediate values that produced it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GoalBreakdown {
    pub bmr: f64,
    pub tdee: f64,
    pub daily_adjustment: f64,
    pub clamp: CalorieClamp,
    pub result: GoalResult,
}

// ============================================================================
// Persisted Types
// ============================================================================

/// Onboarding result: raw metrics together with the goals computed from them
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub metrics: UserMetrics,
    pub goals: GoalResult,
    pub computed_at: DateTime<Utc>,
}

/// Meal a food entry belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl Meal {
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner, Meal::Snack];
}

impl FromStr for Meal {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Meal::Breakfast),
            "lunch" => Ok(Meal::Lunch),
            "dinner" => Ok(Meal::Dinner),
            "snack" => Ok(Meal::Snack),
            other => Err(crate::Error::Validation(format!("unknown meal '{}'", other))),
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Dinner => "Dinner",
            Meal::Snack => "Snack",
        };
        f.write_str(label)
    }
}

/// A logged food item
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub meal: Meal,
    pub logged_at: DateTime<Utc>,
}

impl FoodEntry {
    pub fn new(name: impl Into<String>, calories: u32, meal: Meal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories,
            protein: 0,
            carbs: 0,
            fat: 0,
            meal,
            logged_at: Utc::now(),
        }
    }

    pub fn with_macros(mut self, protein: u32, carbs: u32, fat: u32) -> Self {
        self.protein = protein;
        self.carbs = carbs;
        self.fat = fat;
        self
    }
}

/// One exercise within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Load per rep, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Parses `name:SETSxREPS` or `name:SETSxREPS@WEIGHT`, e.g. `Squats:5x8@100`
impl FromStr for Exercise {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || {
            crate::Error::Validation(format!(
                "invalid exercise '{}' (expected name:SETSxREPS[@WEIGHT])",
                s
            ))
        };

        let (name, volume) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (volume, weight) = match volume.split_once('@') {
            Some((volume, weight)) => (volume, Some(weight)),
            None => (volume, None),
        };
        let (sets, reps) = volume.split_once(['x', 'X']).ok_or_else(invalid)?;

        let sets: u32 = sets.trim().parse().map_err(|_| invalid())?;
        let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
        let mut exercise = Exercise::new(name.trim(), sets, reps);
        if let Some(weight) = weight {
            let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
            exercise = exercise.with_weight(weight);
        }
        Ok(exercise)
    }
}

/// A completed training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub performed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(name: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            performed_at: Utc::now(),
            duration_minutes,
            exercises: Vec::new(),
        }
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}
