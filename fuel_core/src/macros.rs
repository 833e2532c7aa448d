//! Macro derivation table.
//!
//! Per-goal protein (grams per kg of bodyweight) and fat (fraction of daily
//! calories) ratios. Carbohydrates fill whatever calories remain.

use crate::{Error, Goal, Result};
use serde::{Deserialize, Serialize};

/// Protein and fat ratios for a single goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MacroRatio {
    pub protein_per_kg: f64,
    pub fat_fraction: f64,
}

impl MacroRatio {
    pub const fn new(protein_per_kg: f64, fat_fraction: f64) -> Self {
        Self {
            protein_per_kg,
            fat_fraction,
        }
    }
}

/// Ratios for every goal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MacroTable {
    #[serde(default = "default_lose")]
    pub lose: MacroRatio,

    #[serde(default = "default_maintain")]
    pub maintain: MacroRatio,

    #[serde(default = "default_gain")]
    pub gain: MacroRatio,
}

impl Default for MacroTable {
    fn default() -> Self {
        Self {
            lose: default_lose(),
            maintain: default_maintain(),
            gain: default_gain(),
        }
    }
}

// Higher protein preserves muscle during a deficit
fn default_lose() -> MacroRatio {
    MacroRatio::new(2.2, 0.25)
}

fn default_maintain() -> MacroRatio {
    MacroRatio::new(1.8, 0.30)
}

fn default_gain() -> MacroRatio {
    MacroRatio::new(2.0, 0.25)
}

impl MacroTable {
    pub fn ratio_for(&self, goal: Goal) -> MacroRatio {
        match goal {
            Goal::Lose => self.lose,
            Goal::Maintain => self.maintain,
            Goal::Gain => self.gain,
        }
    }

    /// Check every ratio is finite and in range
    pub fn validate(&self) -> Result<()> {
        for (goal, ratio) in [
            (Goal::Lose, self.lose),
            (Goal::Maintain, self.maintain),
            (Goal::Gain, self.gain),
        ] {
            if !ratio.protein_per_kg.is_finite() || ratio.protein_per_kg < 0.0 {
                return Err(Error::Config(format!(
                    "protein_per_kg for {:?} must be a non-negative number, got {}",
                    goal, ratio.protein_per_kg
                )));
            }
            if !(0.0..=1.0).contains(&ratio.fat_fraction) {
                return Err(Error::Config(format!(
                    "fat_fraction for {:?} must be between 0 and 1, got {}",
                    goal, ratio.fat_fraction
                )));
            }
        }
        Ok(())
    }
}

/// What to do when protein and fat already exceed the calorie goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CarbPolicy {
    /// Report zero grams of carbs
    #[default]
    FloorAtZero,
    /// Report the negative remainder unchanged
    AllowNegative,
}
