//! Calorie and macro goal engine.
//!
//! The pipeline runs in four steps:
//! - BMR from the Mifflin–St Jeor equation
//! - TDEE by scaling BMR with the activity multiplier
//! - Calorie goal from TDEE plus the daily adjustment needed to reach the
//!   target weight, clamped by goal
//! - Macro split derived from the calorie goal
//!
//! Everything here is a pure function of its inputs. The free functions do no
//! validation; [`Engine`] validates before calculating.

use crate::{
    ActivityLevel, CalorieClamp, CarbPolicy, Gender, Goal, GoalBreakdown, GoalResult,
    MacroTable, Macros, Result, UserMetrics,
};

/// Approximate energy content of one kg of body mass
pub const KCAL_PER_KG: f64 = 7700.0;

/// A losing goal never targets fewer calories than this
pub const MIN_LOSS_CALORIES: f64 = 1200.0;

/// A gaining goal never targets more than this above TDEE
pub const MAX_GAIN_SURPLUS: f64 = 500.0;

pub const KCAL_PER_G_PROTEIN: i64 = 4;
pub const KCAL_PER_G_CARBS: i64 = 4;
pub const KCAL_PER_G_FAT: i64 = 9;

/// Round to the nearest integer, halves toward positive infinity.
///
/// `2.5 -> 3`, `-2.5 -> -2`. Non-finite input saturates (NaN becomes 0).
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Basal metabolic rate in kcal/day (Mifflin–St Jeor)
pub fn compute_bmr(gender: Gender, weight_kg: f64, age_years: u32, height_cm: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Total daily energy expenditure in kcal/day
pub fn compute_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Daily calorie change needed to move from `weight_kg` to `target_weight_kg`
/// over `timeframe_weeks`. Negative for loss.
pub fn daily_adjustment(weight_kg: f64, target_weight_kg: f64, timeframe_weeks: u32) -> f64 {
    let weight_delta_kg = target_weight_kg - weight_kg;
    let total_kcal_needed = weight_delta_kg * KCAL_PER_KG;
    let days = f64::from(timeframe_weeks) * 7.0;
    total_kcal_needed / days
}

fn clamp_target(tdee: f64, target: f64, goal: Goal) -> (f64, CalorieClamp) {
    match goal {
        Goal::Lose if target < MIN_LOSS_CALORIES => (MIN_LOSS_CALORIES, CalorieClamp::LossFloor),
        Goal::Gain if target > tdee + MAX_GAIN_SURPLUS => {
            (tdee + MAX_GAIN_SURPLUS, CalorieClamp::GainCeiling)
        }
        _ => (target, CalorieClamp::None),
    }
}

/// Daily calorie goal, clamped by goal and rounded
///
/// A `lose` goal never drops below 1200 kcal and a `gain` goal never exceeds
/// TDEE + 500. `maintain` is left as computed. The direction of the weight
/// change is not checked against the goal.
pub fn compute_calorie_goal(
    tdee: f64,
    weight_kg: f64,
    target_weight_kg: f64,
    timeframe_weeks: u32,
    goal: Goal,
) -> i64 {
    let target = tdee + daily_adjustment(weight_kg, target_weight_kg, timeframe_weeks);
    let (clamped, _) = clamp_target(tdee, target, goal);
    round_half_up(clamped)
}

/// Macro split for a calorie goal using the default onboarding table
pub fn compute_macros(calorie_goal: i64, weight_kg: f64, goal: Goal) -> Macros {
    compute_macros_with(
        &MacroTable::default(),
        CarbPolicy::default(),
        calorie_goal,
        weight_kg,
        goal,
    )
}

/// Macro split for a calorie goal using the given table and carb policy
///
/// Under [`CarbPolicy::FloorAtZero`] no gram value is negative: a calorie
/// goal below zero derives fat from zero, and carbs are floored.
pub fn compute_macros_with(
    table: &MacroTable,
    carb_policy: CarbPolicy,
    calorie_goal: i64,
    weight_kg: f64,
    goal: Goal,
) -> Macros {
    let ratio = table.ratio_for(goal);

    let protein_goal = round_half_up(weight_kg * ratio.protein_per_kg);
    let fat_calories = match carb_policy {
        CarbPolicy::FloorAtZero if calorie_goal < 0 => {
            tracing::debug!("Calorie goal {} is negative, fat set to 0", calorie_goal);
            0
        }
        _ => calorie_goal,
    };
    let fat_goal =
        round_half_up(fat_calories as f64 * ratio.fat_fraction / KCAL_PER_G_FAT as f64);

    let remaining =
        calorie_goal - protein_goal * KCAL_PER_G_PROTEIN - fat_goal * KCAL_PER_G_FAT;
    let carbs = round_half_up(remaining as f64 / KCAL_PER_G_CARBS as f64);

    let carbs_goal = match carb_policy {
        CarbPolicy::FloorAtZero if carbs < 0 => {
            tracing::debug!(
                "Protein and fat exceed {} kcal by {} kcal, flooring carbs at 0",
                calorie_goal,
                -remaining
            );
            0
        }
        _ => carbs,
    };

    Macros {
        protein_goal,
        carbs_goal,
        fat_goal,
    }
}

/// Run the whole pipeline with default ratios and no validation
pub fn calculate(metrics: &UserMetrics) -> GoalResult {
    run_pipeline(&MacroTable::default(), CarbPolicy::default(), metrics).result
}

fn run_pipeline(
    table: &MacroTable,
    carb_policy: CarbPolicy,
    metrics: &UserMetrics,
) -> GoalBreakdown {
    let bmr = compute_bmr(
        metrics.gender,
        metrics.weight_kg,
        metrics.age_years,
        metrics.height_cm,
    );
    let tdee = compute_tdee(bmr, metrics.activity_level);
    let adjustment = daily_adjustment(
        metrics.weight_kg,
        metrics.target_weight_kg,
        metrics.timeframe_weeks,
    );

    let (target, clamp) = clamp_target(tdee, tdee + adjustment, metrics.goal);
    let calorie_goal = round_half_up(target);
    let macros = compute_macros_with(
        table,
        carb_policy,
        calorie_goal,
        metrics.weight_kg,
        metrics.goal,
    );

    GoalBreakdown {
        bmr,
        tdee,
        daily_adjustment: adjustment,
        clamp,
        result: GoalResult::new(calorie_goal, macros),
    }
}

/// Configured goal calculator
///
/// Holds the macro table and policies; immutable once built, so one value can
/// be shared freely between callers.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    table: MacroTable,
    carb_policy: CarbPolicy,
    strict_goal_direction: bool,
}

impl Engine {
    pub fn new(table: MacroTable, carb_policy: CarbPolicy) -> Self {
        Self {
            table,
            carb_policy,
            strict_goal_direction: false,
        }
    }

    /// Build an engine from the loaded configuration
    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.macros.clone(), config.engine.carb_policy)
            .with_strict_goal_direction(config.engine.strict_goal_direction)
    }

    /// Reject goals whose target weight moves the wrong way
    pub fn with_strict_goal_direction(mut self, strict: bool) -> Self {
        self.strict_goal_direction = strict;
        self
    }

    pub fn table(&self) -> &MacroTable {
        &self.table
    }

    /// Validate the metrics, then calculate the goal and its breakdown
    pub fn calculate(&self, metrics: &UserMetrics) -> Result<GoalBreakdown> {
        metrics.validate(self.strict_goal_direction)?;

        let breakdown = run_pipeline(&self.table, self.carb_policy, metrics);

        tracing::info!(
            "Calculated goal: {} kcal (BMR {:.0}, TDEE {:.0}, adjustment {:+.0}, clamp {:?})",
            breakdown.result.calorie_goal,
            breakdown.bmr,
            breakdown.tdee,
            breakdown.daily_adjustment,
            breakdown.clamp
        );

        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, MacroRatio};

    fn example_metrics() -> UserMetrics {
        UserMetrics {
            gender: Gender::Male,
            age_years: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal: Goal::Lose,
            target_weight_kg: 75.0,
            timeframe_weeks: 10,
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(f64::NAN), 0);
    }

    #[test]
    fn test_round_half_up_is_exact_near_boundaries() {
        // Largest double below 0.5; adding 0.5 to it rounds up to 1.0
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(-0.49999999999999994), 0);

        // Odd integers above 2^52 have no fractional part to round
        let odd = 4_503_599_627_370_497.0;
        assert_eq!(round_half_up(odd), 4_503_599_627_370_497);
        assert_eq!(round_half_up(-odd), -4_503_599_627_370_497);
    }

    #[test]
    fn test_bmr_mifflin_st_jeor() {
        assert_eq!(compute_bmr(Gender::Male, 80.0, 30, 180.0), 1880.0);
        assert_eq!(compute_bmr(Gender::Female, 60.0, 25, 165.0), 1345.25);
    }

    #[test]
    fn test_bmr_increases_with_weight() {
        let mut previous = compute_bmr(Gender::Female, 40.0, 35, 170.0);
        for weight in 41..=150 {
            let bmr = compute_bmr(Gender::Female, f64::from(weight), 35, 170.0);
            assert!(bmr > previous, "BMR did not increase at {} kg", weight);
            previous = bmr;
        }
    }

    #[test]
    fn test_gender_offset_is_166() {
        for (weight, age, height) in [(50.0, 20, 150.0), (80.0, 30, 180.0), (120.5, 65, 195.5)] {
            let male = compute_bmr(Gender::Male, weight, age, height);
            let female = compute_bmr(Gender::Female, weight, age, height);
            assert_eq!(male - female, 166.0);
        }
    }

    #[test]
    fn test_activity_multiplier_table() {
        assert!((compute_tdee(100.0, ActivityLevel::Sedentary) - 120.0).abs() < 1e-9);
        assert!((compute_tdee(100.0, ActivityLevel::Light) - 137.5).abs() < 1e-9);
        assert!((compute_tdee(100.0, ActivityLevel::Moderate) - 155.0).abs() < 1e-9);
        assert!((compute_tdee(100.0, ActivityLevel::Active) - 172.5).abs() < 1e-9);
        assert!((compute_tdee(100.0, ActivityLevel::VeryActive) - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_loss_floor() {
        // 2 kg/week deficit on a small TDEE lands far below the floor
        assert_eq!(compute_calorie_goal(1171.8, 50.0, 45.0, 4, Goal::Lose), 1200);
        assert_eq!(compute_calorie_goal(1800.0, 90.0, 60.0, 2, Goal::Lose), 1200);
    }

    #[test]
    fn test_floor_only_applies_to_lose() {
        assert_eq!(compute_calorie_goal(1800.0, 90.0, 60.0, 2, Goal::Maintain), -14700);
    }

    #[test]
    fn test_gain_ceiling() {
        assert_eq!(compute_calorie_goal(2000.0, 70.0, 80.0, 4, Goal::Gain), 2500);
        assert_eq!(compute_calorie_goal(2345.6, 70.0, 90.0, 1, Goal::Gain), 2846);
    }

    #[test]
    fn test_gain_below_ceiling_is_untouched() {
        // +1 kg over 10 weeks is +110 kcal/day
        assert_eq!(compute_calorie_goal(2000.0, 70.0, 71.0, 10, Goal::Gain), 2110);
    }

    #[test]
    fn test_maintain_pass_through() {
        assert_eq!(compute_calorie_goal(2345.6, 70.0, 70.0, 8, Goal::Maintain), 2346);
        assert_eq!(compute_calorie_goal(1999.5, 55.0, 55.0, 1, Goal::Maintain), 2000);
    }

    #[test]
    fn test_contradictory_goal_is_masked_by_clamp() {
        // Losing goal with a heavier target still computes a surplus
        assert_eq!(compute_calorie_goal(2000.0, 70.0, 75.0, 10, Goal::Lose), 2550);
    }

    #[test]
    fn test_end_to_end_example() {
        let metrics = example_metrics();
        let bmr = compute_bmr(metrics.gender, metrics.weight_kg, metrics.age_years, metrics.height_cm);
        assert_eq!(bmr, 1880.0);

        let tdee = compute_tdee(bmr, metrics.activity_level);
        assert!((tdee - 2914.0).abs() < 1e-9);

        let adjustment = daily_adjustment(metrics.weight_kg, metrics.target_weight_kg, 10);
        assert!((adjustment + 550.0).abs() < 1e-9);

        let result = calculate(&metrics);
        assert_eq!(result.calorie_goal, 2364);
        assert_eq!(result.protein_goal, 176);
        assert_eq!(result.fat_goal, 66);
        assert_eq!(result.carbs_goal, 267);
    }

    #[test]
    fn test_macros_per_goal() {
        let maintain = compute_macros(2500, 70.0, Goal::Maintain);
        assert_eq!(maintain.protein_goal, 126);
        assert_eq!(maintain.fat_goal, 83);
        // 2500 - 504 - 747 = 1249 -> 312.25
        assert_eq!(maintain.carbs_goal, 312);

        let gain = compute_macros(3000, 70.0, Goal::Gain);
        assert_eq!(gain.protein_goal, 140);
        assert_eq!(gain.fat_goal, 83);
        // 3000 - 560 - 747 = 1693 -> 423.25
        assert_eq!(gain.carbs_goal, 423);
    }

    #[test]
    fn test_macro_reconstruction() {
        for calories in (1200..=4000).step_by(37) {
            for weight in [45.0, 62.5, 80.0, 97.3, 130.0] {
                for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
                    let macros = compute_macros_with(
                        &MacroTable::default(),
                        CarbPolicy::AllowNegative,
                        calories,
                        weight,
                        goal,
                    );
                    let result = GoalResult::new(calories, macros);
                    let diff = (result.macro_calories() - calories).abs();
                    assert!(
                        diff <= 4,
                        "{} kcal, {} kg, {:?}: reconstructed {}",
                        calories,
                        weight,
                        goal,
                        result.macro_calories()
                    );
                }
            }
        }
    }

    #[test]
    fn test_carbs_floor_at_zero() {
        crate::logging::init_test();

        // 150 kg at 2.2 g/kg is 1320 kcal of protein alone
        let floored = compute_macros(1200, 150.0, Goal::Lose);
        assert_eq!(floored.protein_goal, 330);
        assert_eq!(floored.fat_goal, 33);
        assert_eq!(floored.carbs_goal, 0);

        let negative = compute_macros_with(
            &MacroTable::default(),
            CarbPolicy::AllowNegative,
            1200,
            150.0,
            Goal::Lose,
        );
        assert_eq!(negative.carbs_goal, -104);
    }

    #[test]
    fn test_negative_calorie_goal_keeps_grams_non_negative() {
        // Maintain has no clamp, so 30 kg in 2 weeks drives the goal negative
        let metrics = UserMetrics {
            weight_kg: 90.0,
            goal: Goal::Maintain,
            target_weight_kg: 60.0,
            timeframe_weeks: 2,
            ..example_metrics()
        };

        let breakdown = Engine::default().calculate(&metrics).unwrap();
        let result = breakdown.result;
        assert_eq!(result.calorie_goal, -13586);
        assert_eq!(result.protein_goal, 162);
        assert_eq!(result.fat_goal, 0);
        assert_eq!(result.carbs_goal, 0);
        assert_eq!(calculate(&metrics), result);

        let raw = compute_macros_with(
            &MacroTable::default(),
            CarbPolicy::AllowNegative,
            result.calorie_goal,
            metrics.weight_kg,
            metrics.goal,
        );
        assert_eq!(raw.fat_goal, -453);
    }

    #[test]
    fn test_default_engine_never_emits_negative_grams() {
        let engine = Engine::default();
        for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
            for target in [40.0, 60.0, 90.0, 140.0] {
                for weeks in [1, 2, 12] {
                    let metrics = UserMetrics {
                        weight_kg: 90.0,
                        goal,
                        target_weight_kg: target,
                        timeframe_weeks: weeks,
                        ..example_metrics()
                    };
                    let result = engine.calculate(&metrics).unwrap().result;
                    assert!(
                        result.protein_goal >= 0 && result.carbs_goal >= 0 && result.fat_goal >= 0,
                        "{:?} to {} kg in {} weeks: {:?}",
                        goal,
                        target,
                        weeks,
                        result
                    );
                }
            }
        }
    }

    #[test]
    fn test_custom_table() {
        let mut table = MacroTable::default();
        table.lose = MacroRatio::new(1.0, 0.5);

        let macros = compute_macros_with(&table, CarbPolicy::default(), 1800, 80.0, Goal::Lose);
        assert_eq!(macros.protein_goal, 80);
        assert_eq!(macros.fat_goal, 100);
        // 1800 - 320 - 900 = 580
        assert_eq!(macros.carbs_goal, 145);
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let metrics = example_metrics();
        assert_eq!(calculate(&metrics), calculate(&metrics));

        let engine = Engine::default();
        let first = engine.calculate(&metrics).unwrap();
        let second = engine.calculate(&metrics).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_engine_breakdown_reports_clamp() {
        let engine = Engine::default();

        let metrics = example_metrics();
        let breakdown = engine.calculate(&metrics).unwrap();
        assert_eq!(breakdown.clamp, CalorieClamp::None);
        assert_eq!(breakdown.bmr, 1880.0);

        let crash_diet = UserMetrics {
            target_weight_kg: 60.0,
            timeframe_weeks: 2,
            ..example_metrics()
        };
        let breakdown = engine.calculate(&crash_diet).unwrap();
        assert_eq!(breakdown.clamp, CalorieClamp::LossFloor);
        assert_eq!(breakdown.result.calorie_goal, 1200);

        let bulk = UserMetrics {
            goal: Goal::Gain,
            target_weight_kg: 100.0,
            timeframe_weeks: 4,
            ..example_metrics()
        };
        let breakdown = engine.calculate(&bulk).unwrap();
        assert_eq!(breakdown.clamp, CalorieClamp::GainCeiling);
        assert_eq!(breakdown.result.calorie_goal, 3414);
    }

    #[test]
    fn test_engine_rejects_invalid_metrics() {
        let engine = Engine::default();
        let metrics = UserMetrics {
            weight_kg: f64::NAN,
            ..example_metrics()
        };
        assert!(matches!(engine.calculate(&metrics), Err(Error::Validation(_))));
    }

    #[test]
    fn test_strict_engine_rejects_contradictory_goal() {
        let metrics = UserMetrics {
            target_weight_kg: 85.0,
            ..example_metrics()
        };

        assert!(Engine::default().calculate(&metrics).is_ok());
        assert!(Engine::default()
            .with_strict_goal_direction(true)
            .calculate(&metrics)
            .is_err());
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
