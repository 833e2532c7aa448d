//! Input validation for user metrics.
//!
//! The engine's free functions accept anything; these checks run before the
//! configured [`Engine`](crate::Engine) calculates.

use crate::{Error, Goal, Result, UserMetrics};

/// Ages accepted by onboarding (exclusive upper bound)
pub const MAX_AGE_YEARS: u32 = 120;

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Validation(format!("{} must be a finite number", field)));
    }
    if value <= 0.0 {
        return Err(Error::Validation(format!(
            "{} must be greater than zero, got {}",
            field, value
        )));
    }
    Ok(())
}

impl UserMetrics {
    /// Check the metrics are usable
    ///
    /// With `strict_goal_direction`, a `lose` goal whose target weight is above
    /// the current weight (or a `gain` goal below it) is rejected instead of
    /// being left to the calorie clamps.
    pub fn validate(&self, strict_goal_direction: bool) -> Result<()> {
        if self.age_years == 0 || self.age_years >= MAX_AGE_YEARS {
            return Err(Error::Validation(format!(
                "age must be between 1 and {}, got {}",
                MAX_AGE_YEARS - 1,
                self.age_years
            )));
        }

        require_positive("weight", self.weight_kg)?;
        require_positive("height", self.height_cm)?;
        require_positive("target weight", self.target_weight_kg)?;

        if self.timeframe_weeks == 0 {
            return Err(Error::Validation(
                "timeframe must be at least one week".into(),
            ));
        }

        if strict_goal_direction {
            match self.goal {
                Goal::Lose if self.target_weight_kg > self.weight_kg => {
                    return Err(Error::Validation(format!(
                        "goal is to lose weight but target {} kg is above current {} kg",
                        self.target_weight_kg, self.weight_kg
                    )));
                }
                Goal::Gain if self.target_weight_kg < self.weight_kg => {
                    return Err(Error::Validation(format!(
                        "goal is to gain weight but target {} kg is below current {} kg",
                        self.target_weight_kg, self.weight_kg
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
