use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};

use crate::error::Result;
use crate::model::{Status, Task};

const TITLE_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

fn colored_status(status: Status) -> ColoredString {
    match status {
        Status::Todo => status.as_str().yellow(),
        Status::InProgress => status.as_str().cyan(),
        Status::Done => status.as_str().green(),
    }
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// At most `max_len` chars; `...` marks the cut when there is room for it.
fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        return title.to_string();
    }
    let Some(keep) = max_len.checked_sub(3) else {
        return title.chars().take(max_len).collect();
    };
    let truncated: String = title.chars().take(keep).collect();
    format!("{truncated}...")
}

fn minimal_row(task: &Task) -> String {
    format!(
        "{:>4} {:w$} {:11} {}",
        task.id,
        truncate_title(&task.title, TITLE_WIDTH),
        task.status,
        timestamp(&task.updated_at),
        w = TITLE_WIDTH
    )
}

pub fn render_task(task: &Task, format: Format) -> Result<String> {
    let rendered = match format {
        Format::Json => serde_json::to_string(task)?,
        Format::Pretty => {
            let mut lines = vec![format!(
                "[{}] {} ({})",
                task.id,
                task.title.bold(),
                colored_status(task.status)
            )];
            if !task.description.is_empty() {
                lines.push(format!("  {}", task.description));
            }
            lines.push(format!(
                "  created: {} | updated: {}",
                timestamp(&task.created_at),
                timestamp(&task.updated_at)
            ));
            lines.join("\n")
        }
        Format::Minimal => minimal_row(task),
    };
    Ok(rendered)
}

/// `filter` names the list being shown, if it is narrower than all tasks.
pub fn render_tasks(tasks: &[Task], format: Format, filter: Option<&str>) -> Result<String> {
    let rendered = match format {
        Format::Json => serde_json::to_string(tasks)?,
        _ if tasks.is_empty() => match filter {
            Some(f) => format!("No tasks found with filter '{f}'"),
            None => "No tasks found".to_string(),
        },
        Format::Pretty => tasks
            .iter()
            .map(|t| render_task(t, Format::Pretty))
            .collect::<Result<Vec<_>>>()?
            .join("\n\n"),
        Format::Minimal => {
            let mut lines = vec![
                format!(
                    "{:>4} {:w$} {:11} UPDATED",
                    "ID",
                    "TITLE",
                    "STATUS",
                    w = TITLE_WIDTH
                ),
                "-".repeat(62),
            ];
            lines.extend(tasks.iter().map(minimal_row));
            lines.join("\n")
        }
    };
    Ok(rendered)
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    println!("{}", render_task(task, format)?);
    Ok(())
}

pub fn print_tasks(tasks: &[Task], format: Format, filter: Option<&str>) -> Result<()> {
    println!("{}", render_tasks(tasks, format, filter)?);
    Ok(())
}

pub fn print_deleted(id: u64, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::json!({ "deleted": id })),
        Format::Pretty | Format::Minimal => println!("Task {id} deleted"),
    }
    Ok(())
}
