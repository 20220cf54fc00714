use colored::*;

use adhd_planner::models::{
    profile::UserProfile,
    suggestion::TaskSuggestion,
    task::{Energy, RecurrenceKind, Task, TimeBlock},
};
use adhd_planner::services::work_time::WorkTimeStatus;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task) -> ColoredString {
    if task.completed {
        "✓".dimmed()
    } else {
        "○".normal()
    }
}

fn energy_label(energy: Energy) -> ColoredString {
    match energy {
        Energy::Low => "low".green(),
        Energy::Medium => "medium".yellow(),
        Energy::High => "high".red(),
    }
}

/// Right-hand context: energy · estimate · category · recurrence marker
fn get_task_context(task: &Task) -> String {
    let mut parts = vec![
        task.energy.to_string(),
        format!("{}m", task.estimated),
        task.category.clone(),
    ];
    match task.recurrence.kind {
        RecurrenceKind::None => {}
        _ if task.parent_task_id.is_some() => parts.push("↻".to_string()),
        RecurrenceKind::Daily => parts.push("↻ daily".to_string()),
        RecurrenceKind::Weekly => parts.push("↻ weekly".to_string()),
        RecurrenceKind::Monthly => parts.push("↻ monthly".to_string()),
    }
    parts.join("  ·  ")
}

/// Render a single task line with position, glyph, text, and right-aligned context
pub fn render_task_line(position: usize, task: &Task) {
    let terminal_width = get_terminal_width();

    let id_str = format!("{position:>3}");
    let glyph = get_status_glyph(task);
    let left_section = format!("  {}  {}  {}", id_str, glyph, task.text);

    let styled_left = if task.completed {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_section = get_task_context(task);
    let left_visible_len = format!("  {}  {}  {}", id_str, " ", task.text).chars().count();
    let right_visible_len = right_section.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
    } else {
        // Not enough space for right alignment, just print normally
        println!("{}", styled_left);
    }
}

/// Render every task of a block, numbered from 1
pub fn render_block(block: TimeBlock, tasks: &[Task]) {
    render_section_header(&capitalize(&block.to_string()));
    if tasks.is_empty() {
        println!("  {}", "nothing planned".dimmed());
        return;
    }
    for (index, task) in tasks.iter().enumerate() {
        render_task_line(index + 1, task);
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "Morning", "Suggestions")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn render_work_status(status: WorkTimeStatus) {
    match status.remaining() {
        Some(remaining) => println!(
            "  {} {}",
            "● Work time".blue().bold(),
            format!("({remaining} left)").dimmed()
        ),
        None => println!("  {}", "○ Personal time".green()),
    }
}

pub fn render_suggestions(suggestions: &[TaskSuggestion]) {
    if suggestions.is_empty() {
        println!("  {}", "No suggestions right now".dimmed());
        return;
    }
    for (index, suggestion) in suggestions.iter().enumerate() {
        println!(
            "  {:>3}  {}  {}",
            index + 1,
            suggestion.text.bold(),
            energy_label(suggestion.energy)
        );
        println!("       {}", suggestion.reason.dimmed());
    }
}

pub fn render_streak(profile: &UserProfile) {
    let streak = &profile.streak_data;
    let day_word = |n: u32| if n == 1 { "day" } else { "days" };
    println!(
        "\n  {} {} {}",
        "🔥".normal(),
        streak.current_streak.to_string().bold(),
        day_word(streak.current_streak)
    );
    println!(
        "  {} {} {}",
        "Longest:".dimmed(),
        streak.longest_streak,
        day_word(streak.longest_streak)
    );

    let recent: Vec<_> = streak.completion_history.iter().rev().take(7).collect();
    if !recent.is_empty() {
        render_section_header("Last days");
        for (date, count) in recent {
            println!("  {}  {}", date.dimmed(), "■".repeat(*count as usize).green());
        }
    }
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
