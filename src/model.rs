use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type BoardId = String;
pub type ColumnId = String;
pub type TaskId = String;

pub const DEFAULT_COLUMNS: [&str; 4] = ["To Do", "In Progress", "Review", "Done"];
pub const DEFAULT_BOARD_COLOR: &str = "blue";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Board {
    pub id: BoardId,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub position: i64,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub position: i64,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A column together with its tasks, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWithTasks {
    pub column: Column,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Label {
    pub color: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Upcoming,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBoard {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

/// Input for creating a task. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub labels: Vec<Label>,
    pub checklist: Vec<ChecklistItem>,
}

/// Partial task update. `None` leaves a field alone; for clearable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub assignee: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub labels: Option<Vec<Label>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown priority {0:?} (expected low, medium or high)")]
pub struct ParsePriorityError(String);

impl Board {
    pub fn new(id: BoardId, user_id: &str, fields: &NewBoard) -> Self {
        let now = Utc::now();
        Board {
            id,
            user_id: user_id.to_string(),
            title: fields.title.trim().to_string(),
            description: fields.description.clone(),
            color: fields
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string()),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &BoardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        self.updated_at = Utc::now();
    }
}

impl Column {
    pub fn new(id: ColumnId, board_id: &str, title: &str, position: i64) -> Self {
        Column {
            id,
            board_id: board_id.to_string(),
            title: title.to_string(),
            position,
            archived: false,
            created_at: Utc::now(),
        }
    }
}

impl ColumnWithTasks {
    pub fn new(column: Column) -> Self {
        ColumnWithTasks {
            column,
            tasks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.column.id
    }
}

impl Task {
    pub fn new(id: TaskId, column_id: &str, fields: &TaskFields, position: i64) -> Self {
        let now = Utc::now();
        Task {
            id,
            column_id: column_id.to_string(),
            title: fields.title.trim().to_string(),
            description: fields.description.clone(),
            assignee: fields.assignee.clone(),
            due_date: fields.due_date,
            priority: fields.priority,
            labels: fields.labels.clone(),
            checklist: fields.checklist.clone(),
            position,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone();
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(labels) = &patch.labels {
            self.labels = labels.clone();
        }
        if let Some(checklist) = &patch.checklist {
            self.checklist = checklist.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Fields that a copy of this task would be created with.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            due_date: self.due_date,
            priority: self.priority,
            labels: self.labels.clone(),
            checklist: self.checklist.clone(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let haystack = format!(
            "{} {}",
            self.title,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        haystack.contains(&query.to_lowercase())
    }

    pub fn due_status(&self, now: DateTime<Utc>) -> Option<DueStatus> {
        let due = self.due_date?.and_hms_opt(0, 0, 0)?.and_utc();
        Some(if due < now {
            DueStatus::Overdue
        } else if due - now < Duration::hours(24) {
            DueStatus::DueSoon
        } else {
            DueStatus::Upcoming
        })
    }

    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|c| c.done).count();
        (done, self.checklist.len())
    }
}

impl TaskFields {
    #[cfg(test)]
    pub fn titled(title: impl Into<String>) -> Self {
        TaskFields {
            title: title.into(),
            ..TaskFields::default()
        }
    }
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

pub fn assignee_initials(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("U");
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// Parses `name:color` pairs separated by commas. A label without a colour
/// gets `gray`.
pub fn parse_labels(input: &str) -> Vec<Label> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| match raw.split_once(':') {
            Some((name, color)) => Label {
                name: name.trim().to_string(),
                color: color.trim().to_string(),
            },
            None => Label {
                name: raw.to_string(),
                color: "gray".to_string(),
            },
        })
        .collect()
}

pub fn format_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| format!("{}:{}", l.name, l.color))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One item per line; a leading `[x]` marks it done, `[ ]` is optional.
pub fn parse_checklist(input: &str) -> Vec<ChecklistItem> {
    input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            if let Some(rest) = line
                .strip_prefix("[x]")
                .or_else(|| line.strip_prefix("[X]"))
            {
                ChecklistItem {
                    text: rest.trim().to_string(),
                    done: true,
                }
            } else {
                ChecklistItem {
                    text: line.strip_prefix("[ ]").unwrap_or(line).trim().to_string(),
                    done: false,
                }
            }
        })
        .filter(|item| !item.text.is_empty())
        .collect()
}

pub fn format_checklist(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|c| format!("[{}] {}", if c.done { "x" } else { " " }, c.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse_due_date(input: &str) -> anyhow::Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| anyhow::anyhow!("invalid date format (use YYYY-MM-DD): {}", trimmed))
}
