use anyhow::Context;
use chrono::NaiveDate;
use healthlog::config::{self, HealthConfig};
use healthlog::report::{Overview, UserReport};
use healthlog::seed::{SeedConfig, Seeder};
use healthlog::ui::{self, Icons, SeedProgress, Spinner, TableBuilder};
use healthlog::{HealthStore, IntegrityKind, ReportEngine, User};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Flags for `healthlog seed`; unset values fall back to the config
#[derive(Debug, Clone, Copy)]
pub struct SeedArgs {
    pub users: Option<usize>,
    pub days: Option<u32>,
    pub seed: Option<u64>,
    pub anchor: NaiveDate,
}

pub fn open_store(database: &Path, config: &HealthConfig) -> anyhow::Result<HealthStore> {
    config::ensure_db_dir(database)?;
    HealthStore::open_with(database, config.store_options())
        .with_context(|| format!("failed to open database at {}", database.display()))
}

pub fn run_init(
    config_path: &Path,
    database: &Path,
    config: &HealthConfig,
    force: bool,
) -> anyhow::Result<()> {
    ui::header("Initializing health database");
    let store = open_store(database, config)?;
    ui::info("Database", &database.display().to_string());
    ui::info(
        "Foreign keys",
        if store.foreign_keys_enabled()? { "enforced" } else { "off" },
    );

    if !config_path.exists() || force {
        let written = HealthConfig {
            database: Some(database.display().to_string()),
            ..config.clone()
        };
        config::write_config(config_path, &written, force)?;
        ui::info("Config", &config_path.display().to_string());
    }
    ui::success("Schema ready");
    Ok(())
}

pub fn run_seed(database: &Path, config: &HealthConfig, args: SeedArgs) -> anyhow::Result<()> {
    let mut seed_config = SeedConfig::new(args.anchor);
    if let Some(users) = args.users.or(config.seed.users) {
        seed_config.users = users;
    }
    if let Some(days) = args.days.or(config.seed.days) {
        seed_config.days = days;
    }
    if let Some(seed) = args.seed.or(config.seed.seed) {
        seed_config.seed = seed;
    }

    let store = open_store(database, config)?;
    ui::section(Icons::SEED, &format!(
        "Seeding {} users over {}..={} (seed {})",
        seed_config.users,
        seed_config.first_day(),
        seed_config.anchor,
        seed_config.seed
    ));

    let progress = SeedProgress::new(seed_config.users);
    let start = Instant::now();
    let summary = Seeder::new(&store, seed_config).run_with(|done, _| progress.set(done))?;
    progress.finish_with_summary(start.elapsed(), summary.users, summary.total());

    println!();
    println!("{}", summary);
    Ok(())
}

pub fn run_report(
    database: &Path,
    config: &HealthConfig,
    user: Option<i64>,
    today: NaiveDate,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store = open_store(database, config)?;
    let engine = ReportEngine::new(&store);
    let start = Instant::now();
    let spinner = Spinner::new("Building report");
    let overview = engine.overview(today)?;
    let user_report = user.map(|id| engine.user_report(id, today)).transpose()?;
    spinner.finish_and_clear();

    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "overview": overview,
                "user": user_report,
            });
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        OutputFormat::Text => {
            print_overview(&overview);
            if let Some(report) = &user_report {
                print_user_report(report);
            }
            println!();
            ui::timing(&format!("{:.2?}", start.elapsed()));
        }
    }
    Ok(())
}

pub fn run_stats(database: &Path, config: &HealthConfig, format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(database, config)?;
    let stats = store.stats()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            ui::section(Icons::DATABASE, &format!("Healthlog Statistics ({})", database.display()));
            println!("{}", ui::stats_table(&stats));
        }
    }
    Ok(())
}

pub fn run_remove_user(
    database: &Path,
    config: &HealthConfig,
    id: i64,
    purge: bool,
) -> anyhow::Result<()> {
    let store = open_store(database, config)?;

    if purge {
        let summary = store.purge_user(id)?;
        ui::section(Icons::DEL, &format!(
            "Removed user #{} and {} dependent rows",
            id,
            summary.total_children()
        ));
        for (table, rows) in &summary.removed {
            ui::summary_row(table.name(), &rows.to_string());
        }
        return Ok(());
    }

    match store.delete::<User>(id) {
        Ok(()) => {
            ui::section(Icons::DEL, &format!("Removed user #{}", id));
            Ok(())
        }
        Err(err) if err.integrity_kind() == Some(IntegrityKind::ForeignKey) => {
            ui::error(&format!("User #{} still has logged data", id));
            ui::warn("Rerun with --purge to remove it too");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

// ========== Text Rendering ==========

fn figure(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

fn print_overview(overview: &Overview) {
    ui::section(Icons::STATS, &format!("Overview as of {}", overview.today));
    ui::summary_row("Users:", &overview.user_count.to_string());
    for user in &overview.first_users {
        let age = user.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
        println!("    {} {}", user.name, ui::dim(&format!("(age {}, {})", age, user.email)));
    }

    match &overview.best_sleeper_30d {
        Some(best) => ui::summary_row(
            "Best sleeper (30 days):",
            &format!("{} ({:.2})", best.name, best.average),
        ),
        None => ui::summary_row("Best sleeper (30 days):", "-"),
    }

    ui::section(Icons::FOOD, "Most logged foods");
    for food in &overview.top_foods {
        ui::summary_row(&format!("{}:", food.name), &food.total.to_string());
    }

    ui::section(Icons::RUN, "Recommendations");
    ui::summary_row(
        "Strength workouts:",
        &overview.strength_recommendations.to_string(),
    );
    if let Some(usage) = &overview.most_frequent_recommendation {
        ui::summary_row(
            "Most used:",
            &format!("#{} ({} times)", usage.recommendation_id, usage.times),
        );
    }
    if overview.quick_easy_cardio.is_empty() {
        println!("  {}", ui::muted("No easy cardio under 45 minutes"));
    } else {
        println!("  {}", ui::dim("Easy cardio under 45 minutes:"));
        for workout in &overview.quick_easy_cardio {
            println!("    {} ({:.2} h)", workout.workout_name, workout.duration);
        }
    }
}

fn print_user_report(report: &UserReport) {
    let user = &report.user;
    ui::section(Icons::PERSON, &format!("{} (#{})", user.name, user.id));

    let mut metrics = TableBuilder::new();
    metrics.add_optional("Heart rate (30d avg)", report.metrics_30d.heart_rate);
    metrics.add_optional("Steps (30d avg)", report.metrics_30d.steps_taken);
    metrics.add_optional("Steps (7d avg)", report.steps_7d);
    metrics.add_optional("Stand hours (30d avg)", report.metrics_30d.stand_hours);
    metrics.add_optional("Systolic BP (30d avg)", report.metrics_30d.systolic_bp);
    metrics.add_optional("Diastolic BP (30d avg)", report.metrics_30d.diastolic_bp);
    metrics.add_optional("Sleep hours (30d avg)", report.sleep_30d.duration);
    metrics.add_optional("Sleep quality (30d avg)", report.sleep_30d.quality);
    ui::section(Icons::HEART, "Health");
    println!("{}", metrics.build());

    if let Some(sleep) = &report.latest_sleep {
        ui::section(Icons::MOON, "Last night logged");
        ui::summary_row(
            &format!("{}:", sleep.date),
            &format!(
                "{} to {}, {} h, quality {}",
                sleep.start_time.format("%H:%M"),
                sleep.end_time.format("%H:%M"),
                figure(sleep.duration),
                sleep.quality.map(|q| q.to_string()).unwrap_or_else(|| "-".to_string())
            ),
        );
    }

    ui::section(Icons::FOOD, "Nutrition");
    if report.foods_yesterday.is_empty() {
        println!("  {}", ui::muted("Nothing logged yesterday"));
    }
    for entry in &report.foods_yesterday {
        let time = entry
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        println!("    {} {} {}", ui::dim(&time), entry.food.name, ui::muted(&format!("{} kcal", entry.food.calories)));
    }
    ui::summary_row("Vegetables this week:", &report.veggies_7d.to_string());
    ui::summary_row("Calories today:", &report.calories_today.to_string());

    ui::section(Icons::RUN, "Workouts");
    ui::summary_row("Workouts this week:", &report.workouts_7d.to_string());
    ui::summary_row("Burned today:", &format!("{} kcal", report.calories_burned_today));
    match &report.latest_custom_workout {
        Some(custom) => {
            ui::summary_row(
                "Latest own workout:",
                &format!(
                    "{} on {} ({}, {}, {:.2} h)",
                    custom.workout.description,
                    custom.log.date,
                    custom.workout.exercise_type,
                    custom.workout.difficulty_level,
                    custom.workout.duration
                ),
            );
        }
        None => println!("  {}", ui::muted("No user-created workouts")),
    }

    ui::section(Icons::TARGET, "Goals");
    ui::summary_row("Completed:", &report.completed_goals.to_string());
    ui::summary_row("In progress:", &report.in_progress_goals.len().to_string());
    let table = ui::goals_table(&report.goals, report.today);
    if !table.is_empty() {
        println!("{}", table);
    }
}
