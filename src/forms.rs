//! Dialog state for the interactive board. Each form owns its text fields,
//! consumes key presses, and converts into the store's input types.

use crate::model::{
    format_checklist, format_labels, parse_checklist, parse_due_date, parse_labels, Board,
    BoardPatch, Priority, Task, TaskFields, TaskPatch,
};
use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to an open form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Pending,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub value: String,
    pub cursor: usize,
}

impl FieldValue {
    pub fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    pub fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    pub fn move_up(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx == 0 {
            return;
        }
        self.cursor = index_at_col(&self.value, line_starts[line_idx - 1], col);
    }

    pub fn move_down(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx + 1 >= line_starts.len() {
            return;
        }
        self.cursor = index_at_col(&self.value, line_starts[line_idx + 1], col);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    /// Applies a plain editing key. Returns `false` for keys it ignores.
    fn edit(&mut self, key: KeyEvent, multiline: bool) -> bool {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up if multiline => self.move_up(),
            KeyCode::Down if multiline => self.move_down(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Enter if multiline => self.insert_char('\n'),
            KeyCode::Char(c) if !has_command_modifier(key) => self.insert_char(c),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Assignee,
    Due,
    Priority,
    Labels,
    Checklist,
}

impl TaskField {
    const ORDER: [TaskField; 7] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Assignee,
        TaskField::Due,
        TaskField::Priority,
        TaskField::Labels,
        TaskField::Checklist,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Assignee => "Assignee",
            TaskField::Due => "Due (YYYY-MM-DD)",
            TaskField::Priority => "Priority (←/→)",
            TaskField::Labels => "Labels (name:color, ...)",
            TaskField::Checklist => "Checklist ([x] done, one per line)",
        }
    }

    fn multiline(&self) -> bool {
        matches!(self, TaskField::Description | TaskField::Checklist)
    }

    fn step(self, forward: bool) -> Self {
        let len = TaskField::ORDER.len();
        let idx = TaskField::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        TaskField::ORDER[next]
    }
}

/// Create/edit dialog for a task. Enter adds a newline in the description
/// and checklist; Ctrl+Enter submits from any field.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: FieldValue,
    pub description: FieldValue,
    pub assignee: FieldValue,
    pub due: FieldValue,
    pub priority: Priority,
    pub labels: FieldValue,
    pub checklist: FieldValue,
    pub field: TaskField,
}

impl TaskForm {
    pub fn new() -> Self {
        TaskForm::from_fields(&TaskFields::default())
    }

    pub fn from_task(task: &Task) -> Self {
        TaskForm::from_fields(&task.fields())
    }

    fn from_fields(fields: &TaskFields) -> Self {
        TaskForm {
            title: FieldValue::new(&fields.title),
            description: FieldValue::new(fields.description.as_deref().unwrap_or_default()),
            assignee: FieldValue::new(fields.assignee.as_deref().unwrap_or_default()),
            due: FieldValue::new(
                &fields
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            priority: fields.priority,
            labels: FieldValue::new(&format_labels(&fields.labels)),
            checklist: FieldValue::new(&format_checklist(&fields.checklist)),
            field: TaskField::Title,
        }
    }

    pub fn next_field(&mut self) {
        self.field = self.field.step(true);
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.step(false);
    }

    pub fn text_field(&self, field: TaskField) -> Option<&FieldValue> {
        match field {
            TaskField::Title => Some(&self.title),
            TaskField::Description => Some(&self.description),
            TaskField::Assignee => Some(&self.assignee),
            TaskField::Due => Some(&self.due),
            TaskField::Labels => Some(&self.labels),
            TaskField::Checklist => Some(&self.checklist),
            TaskField::Priority => None,
        }
    }

    fn active_field_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            TaskField::Title => Some(&mut self.title),
            TaskField::Description => Some(&mut self.description),
            TaskField::Assignee => Some(&mut self.assignee),
            TaskField::Due => Some(&mut self.due),
            TaskField::Labels => Some(&mut self.labels),
            TaskField::Checklist => Some(&mut self.checklist),
            TaskField::Priority => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        match key.code {
            KeyCode::Esc => return FormInput::Cancel,
            KeyCode::Tab => self.next_field(),
            KeyCode::BackTab => self.prev_field(),
            KeyCode::Enter if submits(key, self.field.multiline()) => return FormInput::Submit,
            KeyCode::Left if self.field == TaskField::Priority => {
                self.priority = self.priority.prev()
            }
            KeyCode::Right if self.field == TaskField::Priority => {
                self.priority = self.priority.next()
            }
            _ => {
                let multiline = self.field.multiline();
                if let Some(field) = self.active_field_mut() {
                    field.edit(key, multiline);
                }
            }
        }
        FormInput::Pending
    }

    /// Input for a new task. The title is checked by the store.
    pub fn to_fields(&self) -> Result<TaskFields> {
        Ok(TaskFields {
            title: self.title.value.trim().to_string(),
            description: optional(&self.description.value),
            assignee: optional(&self.assignee.value),
            due_date: parse_due_date(&self.due.value)?,
            priority: self.priority,
            labels: parse_labels(&self.labels.value),
            checklist: parse_checklist(&self.checklist.value),
        })
    }

    /// Only the fields that differ from `task`.
    pub fn to_patch(&self, task: &Task) -> Result<TaskPatch> {
        let fields = self.to_fields()?;
        Ok(TaskPatch {
            title: changed(fields.title, &task.title),
            description: changed(fields.description, &task.description),
            assignee: changed(fields.assignee, &task.assignee),
            due_date: changed(fields.due_date, &task.due_date),
            priority: changed(fields.priority, &task.priority),
            labels: changed(fields.labels, &task.labels),
            checklist: changed(fields.checklist, &task.checklist),
        })
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm::new()
    }
}

/// Single-line dialog: new column, rename column, new board.
#[derive(Debug, Clone)]
pub struct TitleForm {
    pub title: FieldValue,
}

impl TitleForm {
    pub fn new(initial: &str) -> Self {
        TitleForm {
            title: FieldValue::new(initial),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        match key.code {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Enter => FormInput::Submit,
            _ => {
                self.title.edit(key, false);
                FormInput::Pending
            }
        }
    }

    pub fn value(&self) -> &str {
        self.title.value.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardField {
    Title,
    Description,
    Color,
}

pub const BOARD_COLORS: [&str; 8] = [
    "blue", "green", "red", "yellow", "purple", "pink", "orange", "gray",
];

/// Board settings dialog. The colour is picked from [`BOARD_COLORS`] with
/// ←/→.
#[derive(Debug, Clone)]
pub struct BoardForm {
    pub title: FieldValue,
    pub description: FieldValue,
    pub color: String,
    pub field: BoardField,
}

impl BoardForm {
    pub fn from_board(board: &Board) -> Self {
        BoardForm {
            title: FieldValue::new(&board.title),
            description: FieldValue::new(board.description.as_deref().unwrap_or_default()),
            color: board.color.clone(),
            field: BoardField::Title,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        match key.code {
            KeyCode::Esc => return FormInput::Cancel,
            KeyCode::Enter => return FormInput::Submit,
            KeyCode::Tab | KeyCode::Down => self.field = self.step(true),
            KeyCode::BackTab | KeyCode::Up => self.field = self.step(false),
            KeyCode::Left if self.field == BoardField::Color => self.cycle_color(false),
            KeyCode::Right if self.field == BoardField::Color => self.cycle_color(true),
            _ => match self.field {
                BoardField::Title => {
                    self.title.edit(key, false);
                }
                BoardField::Description => {
                    self.description.edit(key, false);
                }
                BoardField::Color => {}
            },
        }
        FormInput::Pending
    }

    fn step(&self, forward: bool) -> BoardField {
        match (self.field, forward) {
            (BoardField::Title, true) | (BoardField::Color, false) => BoardField::Description,
            (BoardField::Description, true) | (BoardField::Title, false) => BoardField::Color,
            (BoardField::Color, true) | (BoardField::Description, false) => BoardField::Title,
        }
    }

    fn cycle_color(&mut self, forward: bool) {
        let len = BOARD_COLORS.len();
        let next = match BOARD_COLORS.iter().position(|c| *c == self.color) {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None => 0,
        };
        self.color = BOARD_COLORS[next].to_string();
    }

    pub fn to_patch(&self, board: &Board) -> BoardPatch {
        BoardPatch {
            title: changed(self.title.value.trim().to_string(), &board.title),
            description: changed(optional(&self.description.value), &board.description),
            color: changed(self.color.clone(), &board.color),
        }
    }
}

/// Chooses a column position other than the current one, for the
/// "move column" and "move all tasks" dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPicker {
    current: usize,
    len: usize,
    selected: usize,
}

impl IndexPicker {
    /// `None` when there is no other position to pick.
    pub fn new(current: usize, len: usize) -> Option<Self> {
        let selected = (0..len).find(|idx| *idx != current)?;
        Some(IndexPicker {
            current,
            len,
            selected,
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Positions offered to the user.
    pub fn choices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |idx| *idx != self.current)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        match key.code {
            KeyCode::Esc => return FormInput::Cancel,
            KeyCode::Enter => return FormInput::Submit,
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h') => {
                self.step(false)
            }
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l') => {
                self.step(true)
            }
            _ => {}
        }
        FormInput::Pending
    }

    fn step(&mut self, forward: bool) {
        let choices: Vec<usize> = self.choices().collect();
        let Some(pos) = choices.iter().position(|idx| *idx == self.selected) else {
            return;
        };
        let next = if forward {
            (pos + 1).min(choices.len() - 1)
        } else {
            pos.saturating_sub(1)
        };
        self.selected = choices[next];
    }
}

fn submits(key: KeyEvent, multiline: bool) -> bool {
    !multiline || key.modifiers.contains(KeyModifiers::CONTROL)
}

fn has_command_modifier(key: KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn changed<T: PartialEq>(new: T, old: &T) -> Option<T> {
    (new != *old).then_some(new)
}

/// Parses a raw priority typed outside the form, e.g. on the command line.
pub fn parse_priority(raw: &str) -> Result<Priority> {
    raw.parse::<Priority>().map_err(|err| anyhow!(err))
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn line_state(text: &str, cursor: usize) -> (Vec<usize>, usize, usize) {
    let mut starts = vec![0];
    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(idx + 1);
        }
    }
    let line_idx = starts.iter().rposition(|start| *start <= cursor).unwrap_or(0);
    let col = text[starts[line_idx]..cursor].chars().count();
    (starts, line_idx, col)
}

fn index_at_col(text: &str, start: usize, target_col: usize) -> usize {
    let slice = &text[start..];
    let limit = slice.find('\n').unwrap_or(slice.len());
    slice[..limit]
        .char_indices()
        .nth(target_col)
        .map(|(idx, _)| start + idx)
        .unwrap_or(start + limit)
}
