use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use adhd_planner::{
    LaunchState, Planner,
    clock::{Clock, SystemClock},
    config::{Config, DATA_DIR_ENV},
    models::{
        profile::{AppUsageMode, MuteWindow, PreferenceKey, ProfilePatch, ThemeMode},
        schedule::parse_weekday,
        task::{Energy, Recurrence, RecurrenceKind, TaskPatch, TimeBlock},
    },
    services::{
        categories::CreateCategoryParameters,
        focus::{Countdown, FocusTimer},
        work_time::{self, ScheduleError},
    },
    storage::json::JsonFileStorage,
};

mod ui;

type CliPlanner = Planner<JsonFileStorage, SystemClock>;

#[derive(Parser)]
#[command(
    name = "planner",
    about = "A gentle day planner for scattered brains"
)]
struct Cli {
    /// Directory holding the planner data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's plan, block by block
    Today,

    /// Add a new task
    Add {
        /// Task text
        text: String,

        /// Time block (morning, afternoon, evening)
        #[arg(short, long, default_value = "morning")]
        block: TimeBlock,

        /// Energy needed (low, medium, high)
        #[arg(short, long)]
        energy: Option<Energy>,

        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,

        /// Category id, overriding the work/personal default
        #[arg(short, long)]
        category: Option<String>,

        /// Repeat the task (daily, weekly, monthly)
        #[arg(short, long)]
        repeat: Option<RecurrenceKind>,

        /// Every n days, for daily repeats
        #[arg(long)]
        every: Option<u32>,

        /// Weekdays for weekly repeats (can be used multiple times)
        #[arg(long, action = clap::ArgAction::Append)]
        on: Vec<String>,
    },

    /// Toggle completion of a task
    Done { block: TimeBlock, position: usize },

    /// Edit a task
    Edit {
        block: TimeBlock,
        position: usize,

        #[arg(short, long)]
        text: Option<String>,

        #[arg(short, long)]
        energy: Option<Energy>,

        #[arg(long)]
        estimate: Option<u32>,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a task
    Delete { block: TimeBlock, position: usize },

    /// Show suggestions for right now
    Suggest,

    /// Turn a suggestion into a task
    Accept { number: usize },

    /// Hide a suggestion for the rest of the day
    Dismiss { number: usize },

    /// Show or replace today's brain dump
    Dump {
        text: Option<String>,

        #[arg(short, long)]
        title: Option<String>,
    },

    /// Daily check-in with your mood
    Checkin {
        mood: String,

        /// Turn the nth offered goal step into a task
        #[arg(short, long)]
        step: Option<usize>,

        /// Time block for the goal step
        #[arg(short, long, default_value = "morning")]
        block: TimeBlock,
    },

    /// Show tasks completed today
    Completed,

    /// Show the completion streak
    Streak,

    /// Show whether it is work time
    Status {
        /// Keep re-evaluating once a minute
        #[arg(short, long)]
        watch: bool,
    },

    /// Run a focus countdown
    Focus {
        #[arg(short, long, default_value_t = 25)]
        minutes: u32,

        /// Mark a body doubling session while the timer runs
        #[arg(long)]
        body_doubling: bool,
    },

    /// Manage the profile
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Debug, Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Set your name
    Name { name: String },
    /// Set usage mode (personal, work, both)
    Usage { mode: AppUsageMode },
    /// Set working hours for a weekday
    Schedule {
        day: String,
        start: String,
        end: String,
    },
    /// Stop treating a weekday as a work day
    ScheduleOff { day: String },
    /// Turn the work schedule on or off
    Work { state: Toggle },
    /// Toggle a preference (notifications, auto-save, energy-reminders,
    /// focus-mode, work-life-separation, smart-scheduling)
    Pref { key: PreferenceKey, state: Toggle },
    /// Mute notifications during or after work (work, after)
    Mute { window: MuteWindow, state: Toggle },
    /// Set theme mode (system, light, dark)
    Theme { mode: ThemeMode },
    /// Add a goal
    Goal { goal: String },
    /// Set the steps of a goal
    Steps { goal: String, steps: Vec<String> },
    /// Manage custom categories
    #[command(subcommand)]
    Category(CategoryCommands),
}

#[derive(Debug, Subcommand)]
enum CategoryCommands {
    /// Create a category
    Add {
        name: String,
        #[arg(long, default_value = "#6366f1")]
        color: String,
        #[arg(long, default_value = "tag")]
        icon: String,
    },
    /// Remove a category by id
    Remove { id: String },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::resolve(cli.data_dir);
    if let Err(e) = config.ensure_data_dir() {
        eprintln!("Error: Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    let storage = JsonFileStorage::new(config.data_dir.clone());
    let mut planner = Planner::new(storage, SystemClock);
    let state = planner.load_all();

    match cli.command {
        Some(Commands::Today) | None => show_today(&planner, state),
        Some(Commands::Add {
            text,
            block,
            energy,
            estimate,
            category,
            repeat,
            every,
            on,
        }) => {
            let recurrence = match build_recurrence(repeat, every, &on) {
                Ok(r) => r,
                Err(ScheduleError::UnknownWeekday(day)) => {
                    eprintln!("Error: Unknown weekday '{}'", day);
                    eprintln!("\nExample: planner add 'Water plants' --repeat weekly --on mon --on thu");
                    std::process::exit(1);
                }
                Err(e) => fail(e),
            };

            let id = planner.add_task(block, &text, None, recurrence);
            if energy.is_some() || estimate.is_some() || category.is_some() {
                planner.update_task(
                    block,
                    id,
                    TaskPatch {
                        energy,
                        estimated: estimate,
                        category,
                        ..TaskPatch::default()
                    },
                );
            }
            println!("✓ Task added to {}: {}", block, text.trim());
        }
        Some(Commands::Done { block, position }) => {
            let id = task_at(&planner, block, position);
            match planner.toggle_task_complete(block, id) {
                Some(true) => {
                    println!("✓ Nice work!");
                    ui::render_streak(planner.profile());
                }
                Some(false) => println!("○ Marked as not done"),
                None => missing_task(block, position),
            }
        }
        Some(Commands::Edit {
            block,
            position,
            text,
            energy,
            estimate,
            category,
        }) => {
            let id = task_at(&planner, block, position);
            let patch = TaskPatch {
                text,
                energy,
                estimated: estimate,
                category,
                recurrence: None,
            };
            if planner.update_task(block, id, patch) {
                println!("✓ Task updated");
            } else {
                missing_task(block, position);
            }
        }
        Some(Commands::Delete { block, position }) => {
            let id = task_at(&planner, block, position);
            match planner.delete_task(block, id) {
                Some(task) => println!("✓ Task deleted: {}", task.text),
                None => missing_task(block, position),
            }
        }
        Some(Commands::Suggest) => {
            ui::render_work_status(planner.work_time());
            ui::render_section_header("Suggestions");
            ui::render_suggestions(&planner.suggestions());
        }
        Some(Commands::Accept { number }) => {
            let suggestions = planner.suggestions();
            let Some(suggestion) = number.checked_sub(1).and_then(|i| suggestions.get(i)) else {
                missing_suggestion(number, suggestions.len());
            };
            planner.accept_suggestion(suggestion);
            println!(
                "✓ Added to {}: {}",
                suggestion.time_block.resolve(),
                suggestion.text
            );
        }
        Some(Commands::Dismiss { number }) => {
            let suggestions = planner.suggestions();
            let Some(suggestion) = number.checked_sub(1).and_then(|i| suggestions.get(i)) else {
                missing_suggestion(number, suggestions.len());
            };
            planner.dismiss_suggestion_for_today(&suggestion.text);
            println!("✓ Hidden for today: {}", suggestion.text);
        }
        Some(Commands::Dump { text, title }) => {
            if let Some(title) = title {
                planner.save_brain_dump_title(&title);
            }
            if let Some(text) = text {
                planner.save_brain_dump(&text);
            }

            let title = planner.brain_dump_title();
            let header = if title.is_empty() { "Brain dump" } else { title };
            ui::render_section_header(header);
            if planner.brain_dump().is_empty() {
                println!("  {}", "Empty. Get it out of your head!".dimmed());
            } else {
                for line in planner.brain_dump().lines() {
                    println!("  {}", line);
                }
            }
        }
        Some(Commands::Checkin { mood, step, block }) => {
            planner.set_mood(&mood);
            println!("✓ Checked in feeling {}", mood.bold());

            let offers: Vec<(String, String)> = planner
                .checkin_step_offers(&mood)
                .into_iter()
                .map(|(goal, step)| (goal.to_string(), step.to_string()))
                .collect();
            match step {
                None if offers.is_empty() => {}
                None => {
                    ui::render_section_header("Work on a goal today?");
                    for (index, (goal, step)) in offers.iter().enumerate() {
                        println!("  {:>3}  {}  {}", index + 1, step.bold(), goal.dimmed());
                    }
                    println!("\n  planner checkin {} --step <n>", mood);
                }
                Some(number) => {
                    let Some((goal, step)) = number.checked_sub(1).and_then(|i| offers.get(i))
                    else {
                        eprintln!("Error: No goal step #{}", number);
                        if offers.is_empty() {
                            eprintln!(
                                "\nGoal steps are offered on calm or neutral days with goals set."
                            );
                        }
                        std::process::exit(1);
                    };
                    planner.add_task(block, step, None, None);
                    println!("✓ Added to {}: {} ({})", block, step, goal.dimmed());
                }
            }
        }
        Some(Commands::Completed) => {
            let done = planner.completed_today();
            if done.is_empty() {
                println!("Nothing completed yet today");
            } else {
                ui::render_view_header("Done today", done.len());
                println!();
                for (position, (block, task)) in done.iter().enumerate() {
                    ui::render_task_line(position + 1, task);
                    println!("       {}", block.to_string().dimmed());
                }
            }
        }
        Some(Commands::Streak) => ui::render_streak(planner.profile()),
        Some(Commands::Status { watch }) => {
            ui::render_work_status(planner.work_time());
            while watch {
                std::thread::sleep(Duration::from_secs(60));
                if planner.tick() {
                    ui::render_work_status(planner.work_time());
                }
            }
        }
        Some(Commands::Focus {
            minutes,
            body_doubling,
        }) => run_focus(&mut planner, minutes, body_doubling),
        Some(Commands::Profile(command)) => run_profile(&mut planner, command),
    }
}

fn show_today(planner: &CliPlanner, state: LaunchState) {
    match state {
        LaunchState::NeedsOnboarding => {
            println!("Welcome! Tell me your name first:");
            println!("  planner profile name <your name>");
            return;
        }
        LaunchState::NeedsDailyCheckIn => {
            println!("{}", "How are you feeling today?".cyan());
            println!("  planner checkin <mood>\n");
        }
        LaunchState::Ready => {}
    }

    let today = planner.clock().local_date();
    let total = planner.tasks().len();
    ui::render_view_header(&format!("Today ({})", today.strftime("%b %d")), total);
    ui::render_work_status(planner.work_time());

    for block in TimeBlock::ALL {
        ui::render_block(block, planner.tasks().bucket(block));
    }
}

fn build_recurrence(
    repeat: Option<RecurrenceKind>,
    every: Option<u32>,
    on: &[String],
) -> Result<Option<Recurrence>, ScheduleError> {
    let recurrence = match repeat {
        None | Some(RecurrenceKind::None) => return Ok(None),
        Some(RecurrenceKind::Daily) => Recurrence::daily(every.unwrap_or(1)),
        Some(RecurrenceKind::Weekly) if on.is_empty() => Recurrence {
            kind: RecurrenceKind::Weekly,
            ..Recurrence::default()
        },
        Some(RecurrenceKind::Weekly) => {
            let days = on
                .iter()
                .map(|day| {
                    parse_weekday(day)
                        .map(|w| w.to_sunday_zero_offset() as u8)
                        .ok_or_else(|| ScheduleError::UnknownWeekday(day.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Recurrence::weekly(days)
        }
        Some(RecurrenceKind::Monthly) => Recurrence::monthly(),
    };
    Ok(Some(recurrence))
}

fn run_focus(planner: &mut CliPlanner, minutes: u32, body_doubling: bool) {
    let session = jiff::SignedDuration::from_mins(i64::from(minutes.max(1)));
    let mut timer = FocusTimer::new(session);

    if body_doubling {
        planner.set_body_doubling(true);
    }

    timer.start(planner.clock().now().timestamp());
    loop {
        let now = planner.clock().now().timestamp();
        print!("\r  {} {}", "◷ Focus".magenta().bold(), Countdown(timer.remaining(now)));
        // Countdown output is best effort
        let _ = std::io::stdout().flush();
        if timer.is_finished(now) {
            break;
        }
        std::thread::sleep(Duration::from_secs(1));
    }
    println!("\n✓ Session done. Take a short break.");

    if body_doubling {
        planner.set_body_doubling(false);
    }
}

fn run_profile(planner: &mut CliPlanner, command: ProfileCommands) {
    match command {
        ProfileCommands::Show => {
            let profile = planner.profile();
            let name = if profile.name.is_empty() { "(not set)" } else { profile.name.as_str() };
            println!("\n  {}", name.cyan().bold());
            println!("  {} {}", "Usage:".dimmed(), profile.app_usage_mode);
            println!("  {} {:?}", "Theme:".dimmed(), profile.theme_mode);
            if let Some(mood) = &profile.todays_mood {
                println!("  {} {}", "Mood:".dimmed(), mood);
            }

            ui::render_section_header("Work schedule");
            let schedule = &profile.work_schedule;
            if !schedule.enabled {
                println!("  {}", "off".dimmed());
            }
            for (label, day) in [
                ("Mon", &schedule.days.monday),
                ("Tue", &schedule.days.tuesday),
                ("Wed", &schedule.days.wednesday),
                ("Thu", &schedule.days.thursday),
                ("Fri", &schedule.days.friday),
                ("Sat", &schedule.days.saturday),
                ("Sun", &schedule.days.sunday),
            ] {
                if day.enabled {
                    println!("  {}  {} - {}", label.bold(), day.start, day.end);
                } else {
                    println!("  {}  {}", label.dimmed(), "free".dimmed());
                }
            }

            let goals: Vec<_> = profile.active_goals().collect();
            if !goals.is_empty() {
                ui::render_section_header("Goals");
                for goal in goals {
                    println!("  {} {}", "•".green(), goal.bold());
                    for step in profile.goal_steps.get(goal).into_iter().flatten() {
                        println!("      {} {}", "─".dimmed(), step);
                    }
                }
            }

            if !profile.custom_categories.is_empty() {
                ui::render_section_header("Categories");
                for category in &profile.custom_categories {
                    println!(
                        "  {} {} {}",
                        "•".green(),
                        category.name.bold(),
                        format!("({})", category.id).dimmed()
                    );
                }
            }
        }
        ProfileCommands::Name { name } => {
            planner.save_profile(ProfilePatch {
                name: Some(name.trim().to_string()),
                ..ProfilePatch::default()
            });
            println!("✓ Hi {}!", name.trim());
        }
        ProfileCommands::Usage { mode } => {
            planner.save_profile(ProfilePatch {
                app_usage_mode: Some(mode),
                ..ProfilePatch::default()
            });
            println!("✓ Usage set to {}", mode);
        }
        ProfileCommands::Schedule { day, start, end } => {
            let weekday =
                parse_weekday(&day).unwrap_or_else(|| fail(ScheduleError::UnknownWeekday(day)));
            let work_day = work_time::work_day(&start, &end).unwrap_or_else(|e| fail(e));

            let mut schedule = planner.profile().work_schedule.clone();
            schedule.enabled = true;
            *schedule.days.day_mut(weekday) = work_day;
            planner.save_profile(ProfilePatch {
                work_schedule: Some(schedule),
                ..ProfilePatch::default()
            });
            println!("✓ Working {:?} {} - {}", weekday, start, end);
        }
        ProfileCommands::ScheduleOff { day } => {
            let weekday =
                parse_weekday(&day).unwrap_or_else(|| fail(ScheduleError::UnknownWeekday(day)));
            let mut schedule = planner.profile().work_schedule.clone();
            schedule.days.day_mut(weekday).enabled = false;
            planner.save_profile(ProfilePatch {
                work_schedule: Some(schedule),
                ..ProfilePatch::default()
            });
            println!("✓ {:?} is free", weekday);
        }
        ProfileCommands::Work { state } => {
            let mut schedule = planner.profile().work_schedule.clone();
            schedule.enabled = matches!(state, Toggle::On);
            planner.save_profile(ProfilePatch {
                work_schedule: Some(schedule),
                ..ProfilePatch::default()
            });
            ui::render_work_status(planner.work_time());
        }
        ProfileCommands::Pref { key, state } => {
            planner.set_preference(key, matches!(state, Toggle::On));
            let state = if planner.profile().preferences.get(key) {
                "on"
            } else {
                "off"
            };
            println!("✓ {} {}", key, state);
        }
        ProfileCommands::Mute { window, state } => {
            let muted = matches!(state, Toggle::On);
            planner.set_notification_mute(window, muted);
            let label = match window {
                MuteWindow::DuringWork => "during work",
                MuteWindow::AfterWork => "after work",
            };
            if muted {
                println!("✓ Notifications muted {}", label);
            } else {
                println!("✓ Notifications on {}", label);
            }
        }
        ProfileCommands::Theme { mode } => {
            planner.save_profile(ProfilePatch {
                theme_mode: Some(mode),
                ..ProfilePatch::default()
            });
            println!("✓ Theme mode set to {:?}", mode);
        }
        ProfileCommands::Goal { goal } => {
            planner.add_goal(&goal);
            println!("✓ Goal added: {}", goal.trim());
        }
        ProfileCommands::Steps { goal, steps } => {
            let count = steps.len();
            planner.set_goal_steps(&goal, steps);
            println!("✓ {} step(s) saved for {}", count, goal);
        }
        ProfileCommands::Category(CategoryCommands::Add { name, color, icon }) => {
            match planner.add_category(CreateCategoryParameters { name, color, icon }) {
                Ok(category) => {
                    println!("✓ Category {} created with id {}", category.name, category.id)
                }
                Err(e) => fail(e),
            }
        }
        ProfileCommands::Category(CategoryCommands::Remove { id }) => {
            match planner.remove_category(&id) {
                Ok(category) => println!("✓ Category removed: {}", category.name),
                Err(e) => fail(e),
            }
        }
    }
}

fn task_at(planner: &CliPlanner, block: TimeBlock, position: usize) -> Uuid {
    position
        .checked_sub(1)
        .and_then(|i| planner.tasks().bucket(block).get(i))
        .map(|task| task.id)
        .unwrap_or_else(|| missing_task(block, position))
}

fn missing_task(block: TimeBlock, position: usize) -> ! {
    eprintln!("Error: No task #{} in {}", position, block);
    eprintln!("\nRun 'planner today' to see task numbers.");
    std::process::exit(1);
}

fn missing_suggestion(number: usize, available: usize) -> ! {
    eprintln!("Error: No suggestion #{}", number);
    if available == 0 {
        eprintln!("\nThere are no suggestions right now.");
    } else {
        eprintln!("\nPick a number between 1 and {}.", available);
    }
    std::process::exit(1);
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}
