use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

fn is_term() -> bool {
    console::Term::stdout().is_term()
}

/// Per-user progress while seeding. Hidden when stdout is not a terminal.
pub struct SeedProgress {
    bar: ProgressBar,
}

impl SeedProgress {
    pub fn new(total_users: usize) -> Self {
        let bar = if is_term() {
            ProgressBar::new(total_users as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("Seeding users");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn set(&self, done: usize) {
        self.bar.set_position(done as u64);
    }

    pub fn finish_with_summary(&self, duration: Duration, users: usize, rows: usize) {
        self.bar.finish_and_clear();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}",
            Icons::PERSON.style(theme().info.clone()),
            users,
            Icons::DATABASE.style(theme().info.clone()),
            rows
        );
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
