use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use fuel_core::journal::{entries_today, meal_totals};
use fuel_core::workouts::{history, workout_days};
use fuel_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fuel")]
#[command(about = "Calorie and macro goal tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate daily calorie and macro goals
    Calc {
        /// male or female
        #[arg(long)]
        gender: Gender,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// Current weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// sedentary, light, moderate, active or very
        #[arg(long, default_value = "moderate")]
        activity: String,

        /// lose, maintain or gain
        #[arg(long, default_value = "lose")]
        goal: Goal,

        /// Target weight in kg
        #[arg(long)]
        target_weight: f64,

        /// Weeks to reach the target weight
        #[arg(long)]
        weeks: u32,

        /// Store the result as the current profile
        #[arg(long)]
        save: bool,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the stored profile
    Profile {
        #[arg(long)]
        json: bool,
    },

    /// Log a food entry
    Log {
        #[arg(long)]
        name: String,

        #[arg(long)]
        calories: u32,

        #[arg(long, default_value_t = 0)]
        protein: u32,

        #[arg(long, default_value_t = 0)]
        carbs: u32,

        #[arg(long, default_value_t = 0)]
        fat: u32,

        /// breakfast, lunch, dinner or snack
        #[arg(long, default_value = "breakfast")]
        meal: Meal,
    },

    /// Remove a logged food entry
    Remove {
        /// Entry id as shown by `fuel today`
        id: Uuid,
    },

    /// Show today's intake against your goals (default)
    Today {
        #[arg(long)]
        json: bool,
    },

    /// Log a completed workout
    Workout {
        #[arg(long)]
        name: String,

        /// Duration in minutes
        #[arg(long, default_value_t = 0)]
        duration: u32,

        /// name:SETSxREPS[@WEIGHT], repeatable (e.g. "Squats:5x8@100")
        #[arg(long = "exercise", required = true)]
        exercises: Vec<Exercise>,
    },

    /// Show workout history, totals and the current streak
    Workouts {
        #[arg(long)]
        json: bool,
    },

    /// Show earned and locked achievements
    Achievements {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        fuel_core::logging::init_with_level("debug");
    } else {
        fuel_core::logging::init();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Calc {
            gender,
            age,
            weight,
            height,
            activity,
            goal,
            target_weight,
            weeks,
            save,
            json,
        }) => {
            let metrics = UserMetrics {
                gender,
                age_years: age,
                weight_kg: weight,
                height_cm: height,
                activity_level: ActivityLevel::parse_lossy(&activity),
                goal,
                target_weight_kg: target_weight,
                timeframe_weeks: weeks,
            };
            cmd_calc(&data_dir, &config, metrics, save, json)
        }
        Some(Commands::Profile { json }) => cmd_profile(&data_dir, json),
        Some(Commands::Log {
            name,
            calories,
            protein,
            carbs,
            fat,
            meal,
        }) => {
            let entry = FoodEntry::new(name, calories, meal).with_macros(protein, carbs, fat);
            cmd_log(&data_dir, entry)
        }
        Some(Commands::Remove { id }) => cmd_remove(&data_dir, id),
        Some(Commands::Today { json }) => cmd_today(&data_dir, json),
        Some(Commands::Workout {
            name,
            duration,
            exercises,
        }) => {
            let workout = exercises
                .into_iter()
                .fold(Workout::new(name, duration), Workout::with_exercise);
            cmd_workout(&data_dir, workout)
        }
        Some(Commands::Workouts { json }) => cmd_workouts(&data_dir, json),
        Some(Commands::Achievements { json }) => cmd_achievements(&data_dir, json),
        None => cmd_today(&data_dir, false),
    }
}

fn cmd_calc(
    data_dir: &Path,
    config: &Config,
    metrics: UserMetrics,
    save: bool,
    json: bool,
) -> Result<()> {
    let engine = Engine::from_config(config);
    let breakdown = engine.calculate(&metrics)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        display_breakdown(&metrics, &breakdown);
        let ratio = engine.table().ratio_for(metrics.goal);
        println!(
            "  Split: {} g/kg protein, {:.0}% of calories from fat",
            ratio.protein_per_kg,
            ratio.fat_fraction * 100.0
        );
        println!();
    }

    if save {
        let profile = UserProfile::from_breakdown(metrics, &breakdown);
        let path = Config::profile_path(data_dir);
        profile.save(&path)?;
        if !json {
            println!("✓ Profile saved to {}", path.display());
        }
    }

    Ok(())
}

fn cmd_profile(data_dir: &Path, json: bool) -> Result<()> {
    let path = Config::profile_path(data_dir);
    let Some(profile) = UserProfile::load(&path)? else {
        println!("No profile yet. Run `fuel calc ... --save` to create one.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let m = &profile.metrics;
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROFILE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Gender:         {:?}", m.gender);
    println!("  Age:            {}", m.age_years);
    println!("  Weight:         {} kg", m.weight_kg);
    println!("  Height:         {} cm", m.height_cm);
    println!("  Activity:       {}", m.activity_level);
    println!("  Goal:           {}", m.goal);
    println!("  Target weight:  {} kg in {} weeks", m.target_weight_kg, m.timeframe_weeks);
    println!();
    display_goals(&profile.goals);
    println!(
        "  Calculated {}",
        profile.computed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!();
    Ok(())
}

fn cmd_log(data_dir: &Path, entry: FoodEntry) -> Result<()> {
    let mut journal = JsonlJournal::new(Config::journal_path(data_dir));
    journal.append(&entry)?;

    println!(
        "✓ Logged {} ({} cal) to {}",
        entry.name, entry.calories, entry.meal
    );
    println!("  id: {}", entry.id);
    announce_unlocked(data_dir)
}

fn cmd_remove(data_dir: &Path, id: Uuid) -> Result<()> {
    if remove_entry(&Config::journal_path(data_dir), id)? {
        println!("✓ Removed entry {}", id);
        Ok(())
    } else {
        Err(Error::Journal(format!("no entry with id {}", id)))
    }
}

fn cmd_today(data_dir: &Path, json: bool) -> Result<()> {
    let goals = match UserProfile::load(&Config::profile_path(data_dir))? {
        Some(profile) => profile.goals,
        None => {
            tracing::debug!("No profile, using fallback goals");
            DailyProgress::fallback_goals()
        }
    };

    let entries = entries_today(&read_entries(&Config::journal_path(data_dir))?);
    let progress = DailyProgress::new(MacroTotals::sum(&entries), goals);

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} / {} cal ({:.0}%)",
        progress.totals.calories, progress.goals.calorie_goal, progress.calorie_percent
    );
    if progress.remaining_calories >= 0 {
        println!("  {} cal remaining", progress.remaining_calories);
    } else {
        println!("  {} cal over", -progress.remaining_calories);
    }
    println!(
        "  Protein {}g / {}g   Carbs {}g / {}g   Fat {}g / {}g",
        progress.totals.protein,
        progress.goals.protein_goal,
        progress.totals.carbs,
        progress.goals.carbs_goal,
        progress.totals.fat,
        progress.goals.fat_goal
    );

    for (meal, totals) in meal_totals(&entries) {
        println!();
        println!("  {}: {} cal", meal, totals.calories);
        for entry in entries.iter().filter(|e| e.meal == meal) {
            println!(
                "    {}  {} ({} cal, P {}g C {}g F {}g)  [{}]",
                entry.logged_at.with_timezone(&Local).format("%H:%M"),
                entry.name,
                entry.calories,
                entry.protein,
                entry.carbs,
                entry.fat,
                entry.id
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_workout(data_dir: &Path, workout: Workout) -> Result<()> {
    let mut log = WorkoutLog::new(Config::workouts_path(data_dir));
    log.append(&workout)?;

    println!(
        "✓ Logged workout {} ({} exercises, {} sets, {} min)",
        workout.name,
        workout.exercises.len(),
        workout.total_sets(),
        workout.duration_minutes
    );
    println!("  id: {}", workout.id);
    announce_unlocked(data_dir)
}

fn cmd_workouts(data_dir: &Path, json: bool) -> Result<()> {
    let workouts = history(&read_workouts(&Config::workouts_path(data_dir))?);
    let stats = WorkoutStats::from_workouts(&workouts);
    let streak = calculate_streak(
        workout_days(&workouts, &Local),
        Local::now().date_naive(),
    );

    if json {
        let value = serde_json::json!({
            "stats": stats,
            "streak_days": streak,
            "workouts": workouts,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT HISTORY");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if workouts.is_empty() {
        println!("  No workouts yet. Log one with `fuel workout`.");
        println!();
        return Ok(());
    }

    println!(
        "  {} workouts, {} sets ({} per workout), {} min",
        stats.total_workouts, stats.total_sets, stats.avg_sets_per_workout, stats.total_minutes
    );
    println!("  Current streak: {} days", streak);

    for workout in &workouts {
        println!();
        println!(
            "  {}  {} ({} min)",
            workout.performed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            workout.name,
            workout.duration_minutes
        );
        for exercise in &workout.exercises {
            match exercise.weight {
                Some(weight) => println!(
                    "    {}: {}x{} @ {}",
                    exercise.name, exercise.sets, exercise.reps, weight
                ),
                None => println!("    {}: {}x{}", exercise.name, exercise.sets, exercise.reps),
            }
        }
    }
    println!();
    Ok(())
}

fn cmd_achievements(data_dir: &Path, json: bool) -> Result<()> {
    refresh_achievements(data_dir)?;
    let achievements = load_achievements(&Config::achievements_path(data_dir))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&achievements)?);
        return Ok(());
    }

    let earned = achievements.iter().filter(|a| a.is_earned()).count();
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ACHIEVEMENTS ({}/{})", earned, achievements.len());
    println!("╰─────────────────────────────────────────╯");
    println!();

    for achievement in &achievements {
        match achievement.earned_at {
            Some(at) => println!(
                "  {} {}  {} (earned {})",
                achievement.icon,
                achievement.title,
                achievement.description,
                at.with_timezone(&Local).format("%Y-%m-%d")
            ),
            None => println!(
                "  ·  {}  {}",
                achievement.title, achievement.description
            ),
        }
    }
    println!();
    Ok(())
}

/// Check every unlock rule against the stored logs and persist the result
fn refresh_achievements(data_dir: &Path) -> Result<Vec<Achievement>> {
    let path = Config::achievements_path(data_dir);
    let mut achievements = load_achievements(&path)?;

    let calorie_goal = match UserProfile::load(&Config::profile_path(data_dir))? {
        Some(profile) => profile.goals.calorie_goal,
        None => DailyProgress::fallback_goals().calorie_goal,
    };
    let workouts = read_workouts(&Config::workouts_path(data_dir))?;
    let entries = read_entries(&Config::journal_path(data_dir))?;
    let summary = ActivitySummary::collect(
        &workouts,
        &entries,
        calorie_goal,
        Local::now().date_naive(),
        &Local,
    );

    let unlocked = check_and_unlock(&mut achievements, &summary, Utc::now());
    if !unlocked.is_empty() {
        save_achievements(&path, &achievements)?;
    }
    Ok(unlocked)
}

fn announce_unlocked(data_dir: &Path) -> Result<()> {
    for achievement in refresh_achievements(data_dir)? {
        println!(
            "🏆 Achievement unlocked: {} {} ({})",
            achievement.icon, achievement.title, achievement.description
        );
    }
    Ok(())
}

fn display_breakdown(metrics: &UserMetrics, breakdown: &GoalBreakdown) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  YOUR DAILY CALORIE GOAL");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  BMR:   {:.0} cal", breakdown.bmr);
    println!(
        "  TDEE:  {:.0} cal ({}, x{}: {})",
        breakdown.tdee,
        metrics.activity_level,
        metrics.activity_level.multiplier(),
        metrics.activity_level.description()
    );
    println!("  Daily adjustment: {:+.0} cal", breakdown.daily_adjustment);

    match breakdown.clamp {
        CalorieClamp::LossFloor => {
            println!("  ⚠ Raised to the 1200 cal minimum for safe weight loss");
        }
        CalorieClamp::GainCeiling => {
            println!("  ⚠ Capped at TDEE + 500 cal for lean weight gain");
        }
        CalorieClamp::None => {}
    }

    println!();
    display_goals(&breakdown.result);
}

fn display_goals(goals: &GoalResult) {
    println!("  {} calories per day", goals.calorie_goal);
    println!("  → Protein: {}g", goals.protein_goal);
    println!("  → Carbs:   {}g", goals.carbs_goal);
    println!("  → Fat:     {}g", goals.fat_goal);
    println!();
}
