use crate::backend::Backend;
use crate::commands::Session;
use crate::drag::{drop_column, DragController, DropOutcome, DropTarget};
use crate::filter::{filter_columns, is_active};
use crate::forms::{
    BoardForm, FieldValue, FormInput, IndexPicker, TaskField, TaskForm, TitleForm,
};
use crate::model::{
    assignee_initials, Board, BoardId, BoardPatch, ColumnId, ColumnWithTasks, DueStatus, NewBoard, Priority,
    Task, TaskId,
};
use crate::storage::WorkspaceLocation;
use crate::store::{BoardStore, StoreError};
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::fmt::Display;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::info;

pub fn run<B: Backend>(store: BoardStore<B>, session: &Session) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(store, session.user.clone(), session.location.clone());
    info!(board = %app.store.board().id, "interactive board opened");
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App<B: Backend> {
    store: BoardStore<B>,
    user: String,
    location: WorkspaceLocation,
    drag: DragController,
    /// Column the drag cursor is over, and the slot inside it.
    drag_column: usize,
    drag_slot: usize,
    query: String,
    selected_column: usize,
    selected_task: usize,
    archived_idx: usize,
    board_idx: usize,
    boards: Vec<Board>,
    scroll_offsets: Vec<usize>,
    last_sync: Instant,
    status: String,
    mode: Mode,
    view: ViewMode,
}

enum Mode {
    Normal,
    Search(FieldValue),
    NewTask {
        column_id: Option<ColumnId>,
        form: TaskForm,
    },
    EditTask {
        task_id: TaskId,
        form: TaskForm,
    },
    NewColumn(TitleForm),
    RenameColumn {
        column_id: ColumnId,
        form: TitleForm,
    },
    NewBoard(TitleForm),
    EditBoard(BoardForm),
    MoveColumn {
        column_id: ColumnId,
        picker: IndexPicker,
    },
    MoveAll {
        column_id: ColumnId,
        picker: IndexPicker,
    },
    ConfirmDelete(ItemRef),
}

/// Something a dialog acts on by id.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ItemRef {
    Task(TaskId),
    Column(ColumnId),
    Board(BoardId),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ViewMode {
    Board,
    Archived,
    Boards,
}

/// One row of the archived view.
enum ArchivedEntry<'a> {
    Column(&'a ColumnWithTasks),
    Task(&'a Task),
}

impl ViewMode {
    fn label(&self) -> &'static str {
        match self {
            ViewMode::Board => "Board",
            ViewMode::Archived => "Archived",
            ViewMode::Boards => "Boards",
        }
    }
}

impl<B: Backend> App<B> {
    fn new(store: BoardStore<B>, user: String, location: WorkspaceLocation) -> Self {
        let status = format!(
            "Loaded \"{}\" from {}",
            store.board().title,
            location.path.display()
        );
        let column_count = store.columns().len();
        App {
            store,
            user,
            location,
            drag: DragController::new(),
            drag_column: 0,
            drag_slot: 0,
            query: String::new(),
            selected_column: 0,
            selected_task: 0,
            archived_idx: 0,
            board_idx: 0,
            boards: Vec::new(),
            scroll_offsets: vec![0; column_count],
            last_sync: Instant::now(),
            status,
            mode: Mode::Normal,
            view: ViewMode::Board,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let quit = match self.mode {
            Mode::Normal if self.drag.is_dragging() => {
                self.handle_drag_key(key);
                false
            }
            Mode::Normal => self.handle_normal_key(key)?,
            Mode::Search(_) => {
                self.handle_search_key(key);
                false
            }
            _ => {
                self.handle_dialog_key(key)?;
                false
            }
        };
        self.clamp_selection();
        Ok(quit)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => self.set_view(ViewMode::Board)?,
            KeyCode::Char('2') => self.set_view(ViewMode::Archived)?,
            KeyCode::Char('3') => self.set_view(ViewMode::Boards)?,
            _ => match self.view {
                ViewMode::Board => self.handle_board_key(key),
                ViewMode::Archived => self.handle_archived_key(key),
                ViewMode::Boards => self.handle_boards_key(key)?,
            },
        }
        Ok(false)
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_task(),
            KeyCode::Down | KeyCode::Char('j') => self.next_task(),
            KeyCode::Char('H') => self.shift_column(-1),
            KeyCode::Char('L') => self.shift_column(1),
            KeyCode::Char(' ') => self.start_drag(),
            KeyCode::Char('/') => {
                self.mode = Mode::Search(FieldValue::new(&self.query));
                self.status = "Search: type to filter, Enter to keep, Esc to clear".into();
            }
            KeyCode::Esc if is_active(&self.query) => {
                self.query.clear();
                self.status = "Search cleared".into();
            }
            KeyCode::Char('n') => {
                let column_id = self.current_column().map(|c| c.column.id.clone());
                self.mode = Mode::NewTask {
                    column_id,
                    form: TaskForm::new(),
                };
                self.status =
                    "New task (Tab/Shift-Tab move, Ctrl+Enter save, Esc cancel)".into();
            }
            KeyCode::Char('N') => {
                self.mode = Mode::NewColumn(TitleForm::new(""));
                self.status = "New list".into();
            }
            KeyCode::Char('e') => match self.current_task() {
                Some(task) => {
                    self.status = format!("Editing {}", task.title);
                    self.mode = Mode::EditTask {
                        task_id: task.id.clone(),
                        form: TaskForm::from_task(&task),
                    };
                }
                None => self.status = "No task selected to edit".into(),
            },
            KeyCode::Char('E') => match self.current_column() {
                Some(col) => {
                    self.mode = Mode::RenameColumn {
                        column_id: col.column.id.clone(),
                        form: TitleForm::new(&col.column.title),
                    };
                    self.status = "Rename list".into();
                }
                None => self.status = "No list selected".into(),
            },
            KeyCode::Char('B') => {
                self.mode = Mode::EditBoard(BoardForm::from_board(self.store.board()));
                self.status = "Edit board (Tab move, ←/→ colour, Enter save)".into();
            }
            KeyCode::Char('c') => self.copy_column(),
            KeyCode::Char('M') => self.open_picker(false),
            KeyCode::Char('A') => self.open_picker(true),
            KeyCode::Char('a') => match self.current_task() {
                Some(task) => {
                    let result = self.store.archive_task(&task.id);
                    self.report(result, |_| format!("Archived \"{}\"", task.title));
                }
                None => self.status = "No task selected to archive".into(),
            },
            KeyCode::Char('z') => match self.current_column_id() {
                Some(id) => {
                    let result = self.store.archive_tasks_in_column(&id);
                    self.report(result, |count| format!("Archived {} task(s)", count));
                }
                None => self.status = "No list selected".into(),
            },
            KeyCode::Char('Z') => match self.current_column() {
                Some(col) => {
                    let (id, title) = (col.column.id.clone(), col.column.title.clone());
                    let result = self.store.archive_column(&id, true);
                    self.report(result, |_| format!("Archived list \"{}\"", title));
                }
                None => self.status = "No list selected".into(),
            },
            KeyCode::Char('d') => match self.current_task() {
                Some(task) => {
                    self.mode = Mode::ConfirmDelete(ItemRef::Task(task.id.clone()));
                    self.status = format!("Delete \"{}\"? (y to confirm, n/Esc to cancel)", task.title);
                }
                None => self.status = "No task selected to delete".into(),
            },
            _ => {}
        }
    }

    fn handle_archived_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.archived_idx = self.archived_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => self.archived_idx += 1,
            KeyCode::Char('r') => match self.selected_archived() {
                Some(ItemRef::Column(id)) => {
                    let title = self.archived_title(&id);
                    let result = self.store.restore_column(&id);
                    self.report(result, |_| format!("Restored list \"{}\"", title));
                }
                Some(ItemRef::Task(id)) => {
                    let title = self.archived_title(&id);
                    match self.store.restore_task(&id) {
                        Ok(column_id) => {
                            let target = self.store_column_title(&column_id).unwrap_or(column_id);
                            self.status = format!("Restored \"{}\" to \"{}\"", title, target);
                            self.last_sync = Instant::now();
                        }
                        Err(err) => self.status = format!("Error: {}", err),
                    }
                }
                _ => self.status = "Nothing archived".into(),
            },
            KeyCode::Char('d') => match self.selected_archived() {
                Some(target) => {
                    self.mode = Mode::ConfirmDelete(target);
                    self.status = "Delete permanently? (y to confirm, n/Esc to cancel)".into();
                }
                None => self.status = "Nothing archived".into(),
            },
            _ => {}
        }
    }

    fn handle_boards_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.board_idx = self.board_idx.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.board_idx += 1,
            KeyCode::Enter => {
                if let Some(board) = self.boards.get(self.board_idx).cloned() {
                    self.open_board(&board.id);
                }
            }
            KeyCode::Char('n') => {
                self.mode = Mode::NewBoard(TitleForm::new(""));
                self.status = "New board".into();
            }
            KeyCode::Char('a') => {
                if let Some(board) = self.boards.get(self.board_idx).cloned() {
                    let archived = !board.archived;
                    let result = self
                        .store
                        .backend_mut()
                        .persist_board_archive(&board.id, archived);
                    let verb = if archived { "Archived" } else { "Restored" };
                    self.report(result, |_| format!("{} board \"{}\"", verb, board.title));
                    if board.id == self.store.board().id {
                        self.reload_store();
                    }
                    self.refresh_boards()?;
                }
            }
            KeyCode::Char('d') => {
                if let Some(board) = self.boards.get(self.board_idx) {
                    if board.id == self.store.board().id {
                        self.status = "Open another board before deleting this one".into();
                    } else {
                        self.status = format!(
                            "Delete board \"{}\" with all its lists? (y/n)",
                            board.title
                        );
                        self.mode = Mode::ConfirmDelete(ItemRef::Board(board.id.clone()));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Mode::Search(field) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.query.clear();
                self.mode = Mode::Normal;
                self.status = "Search cleared".into();
                return;
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.status = if is_active(&self.query) {
                    format!("Filtering by \"{}\" (Esc clears)", self.query.trim())
                } else {
                    "Showing all tasks".into()
                };
                return;
            }
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Backspace => field.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                field.insert_char(c)
            }
            _ => {}
        }
        self.query = field.value.clone();
        self.selected_task = 0;
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let input = match &mut mode {
            Mode::NewTask { form, .. } | Mode::EditTask { form, .. } => form.handle_key(key),
            Mode::NewColumn(form) | Mode::RenameColumn { form, .. } | Mode::NewBoard(form) => {
                form.handle_key(key)
            }
            Mode::EditBoard(form) => form.handle_key(key),
            Mode::MoveColumn { picker, .. } | Mode::MoveAll { picker, .. } => {
                picker.handle_key(key)
            }
            Mode::ConfirmDelete(_) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => FormInput::Submit,
                KeyCode::Char('n') | KeyCode::Esc => FormInput::Cancel,
                _ => FormInput::Pending,
            },
            Mode::Normal | Mode::Search(_) => FormInput::Pending,
        };
        let close = match input {
            FormInput::Pending => false,
            FormInput::Cancel => {
                self.status = "Canceled".into();
                true
            }
            FormInput::Submit => self.submit(&mode)?,
        };
        if !close {
            self.mode = mode;
        }
        Ok(())
    }

    /// Applies a submitted dialog. Returns whether the dialog closes; text
    /// forms stay open when their input is rejected.
    fn submit(&mut self, mode: &Mode) -> Result<bool> {
        let close = match mode {
            Mode::NewTask { column_id, form } => match form.to_fields() {
                Ok(fields) => {
                    let title = fields.title.clone();
                    let result = self.store.create_task(column_id.as_deref(), fields);
                    let created = result.as_ref().ok().cloned();
                    let ok = self.report(result, |_| format!("Created \"{}\"", title));
                    if let Some(id) = created {
                        self.select_task(&id);
                    }
                    ok
                }
                Err(err) => self.reject(err),
            },
            Mode::EditTask { task_id, form } => {
                let Some(task) = self.store.find_task(task_id).map(|(_, t)| t.clone()) else {
                    self.status = format!("Task {} no longer exists", task_id);
                    return Ok(true);
                };
                match form.to_patch(&task) {
                    Ok(patch) if patch.is_empty() => {
                        self.status = "No changes".into();
                        true
                    }
                    Ok(patch) => {
                        let result = self.store.update_task(task_id, patch);
                        self.report(result, |_| format!("Updated \"{}\"", form.title.value.trim()))
                    }
                    Err(err) => self.reject(err),
                }
            }
            Mode::NewColumn(form) => {
                let result = self.store.create_column(form.value());
                let ok = self.report(result, |_| format!("Added list \"{}\"", form.value()));
                if ok {
                    self.selected_column = self.store.columns().len().saturating_sub(1);
                    self.selected_task = 0;
                }
                ok
            }
            Mode::RenameColumn { column_id, form } => {
                let result = self.store.update_column(column_id, form.value());
                self.report(result, |_| format!("Renamed list to \"{}\"", form.value()))
            }
            Mode::NewBoard(form) => {
                if form.value().is_empty() {
                    return Ok(self.reject(StoreError::EmptyTitle));
                }
                let new_board = NewBoard {
                    title: form.value().to_string(),
                    ..NewBoard::default()
                };
                let user = self.user.clone();
                match self.store.backend_mut().persist_board_create(&user, &new_board) {
                    Ok(board) => {
                        self.open_board(&board.id);
                        self.refresh_boards()?;
                        true
                    }
                    Err(err) => self.reject(err),
                }
            }
            Mode::EditBoard(form) => {
                let patch = form.to_patch(self.store.board());
                if patch == BoardPatch::default() {
                    self.status = "No changes".into();
                    true
                } else {
                    let result = self.store.update_board(patch);
                    self.report(result, |_| "Board updated".to_string())
                }
            }
            Mode::MoveColumn { column_id, picker } => {
                let target = picker.selected();
                let result = drop_column(&mut self.store, column_id, target);
                if self.report(result, |_| format!("Moved list to position {}", target + 1)) {
                    self.selected_column = target;
                }
                true
            }
            Mode::MoveAll { column_id, picker } => {
                let target = picker.selected();
                let title = self
                    .store
                    .active_column(target)
                    .map(|c| c.title.clone())
                    .unwrap_or_default();
                let result = self.store.move_all_tasks(column_id, target);
                self.report(result, |count| format!("Moved {} task(s) to \"{}\"", count, title));
                true
            }
            Mode::ConfirmDelete(target) => {
                self.delete(target.clone())?;
                true
            }
            Mode::Normal | Mode::Search(_) => true,
        };
        Ok(close)
    }

    fn delete(&mut self, target: ItemRef) -> Result<()> {
        match target {
            ItemRef::Task(id) => {
                let result = self.store.delete_task(&id);
                self.report(result, |_| format!("Deleted {}", id));
            }
            ItemRef::Column(id) => {
                let result = self.store.delete_column(&id);
                self.report(result, |_| format!("Deleted list {}", id));
            }
            ItemRef::Board(id) => {
                let result = self.store.backend_mut().persist_board_delete(&id);
                self.report(result, |_| format!("Deleted board {}", id));
                self.refresh_boards()?;
            }
        }
        Ok(())
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.drag_vertical(-1),
            KeyCode::Down | KeyCode::Char('j') => self.drag_vertical(1),
            KeyCode::Left | KeyCode::Char('h') => self.drag_horizontal(-1),
            KeyCode::Right | KeyCode::Char('l') => self.drag_horizontal(1),
            KeyCode::Enter => self.finish_drag(),
            KeyCode::Esc => {
                self.drag.cancel(&mut self.store);
                self.status = "Move canceled".into();
                self.follow_task(None);
            }
            _ => self.status = "Moving a task: arrows choose, Enter drops, Esc cancels".into(),
        }
    }

    fn start_drag(&mut self) {
        if is_active(&self.query) {
            self.status = "Clear the search before moving tasks".into();
            return;
        }
        let Some(task) = self.current_task() else {
            self.status = "No task selected to move".into();
            return;
        };
        if self.drag.start(&self.store, &task.id) {
            self.drag_column = self.selected_column;
            self.drag_slot = self.selected_task;
            self.status = format!(
                "Moving \"{}\": arrows choose, Enter drops, Esc cancels",
                task.title
            );
        }
    }

    fn drag_vertical(&mut self, delta: isize) {
        let Some(active) = self.drag.active_task().map(str::to_string) else {
            return;
        };
        let Some((active_column, active_idx)) = self.store.locate_task(&active) else {
            return;
        };
        let Some(column) = self.store.columns().get(self.drag_column) else {
            return;
        };
        if self.drag_column == active_column {
            let Some(target) = step_index(active_idx, delta, column.tasks.len()) else {
                return;
            };
            let over = column.tasks[target].id.clone();
            self.drag.over(&mut self.store, DropTarget::Task(over));
            // The preview put the dragged card where the cursor is.
            self.drag.over(&mut self.store, DropTarget::Task(active.clone()));
            self.follow_task(Some(&active));
            self.drag_slot = self.selected_task;
        } else {
            let len = column.tasks.len();
            let slot = (self.drag_slot as isize + delta).clamp(0, len as isize) as usize;
            let target = match column.tasks.get(slot) {
                Some(task) => DropTarget::Task(task.id.clone()),
                None => DropTarget::Column(column.column.id.clone()),
            };
            self.drag_slot = slot;
            self.drag.over(&mut self.store, target);
        }
    }

    fn drag_horizontal(&mut self, delta: isize) {
        let Some(active) = self.drag.active_task().map(str::to_string) else {
            return;
        };
        let Some(next) = step_index(self.drag_column, delta, self.store.columns().len()) else {
            return;
        };
        let Some((active_column, active_idx)) = self.store.locate_task(&active) else {
            return;
        };
        self.drag_column = next;
        self.selected_column = next;
        if next == active_column {
            self.drag_slot = active_idx;
            self.selected_task = active_idx;
            self.drag.over(&mut self.store, DropTarget::Task(active));
        } else {
            let column = &self.store.columns()[next];
            self.drag_slot = column.tasks.len();
            let target = DropTarget::Column(column.column.id.clone());
            self.drag.over(&mut self.store, target);
        }
    }

    fn finish_drag(&mut self) {
        let active = self.drag.active_task().map(str::to_string);
        let target = self.drag.hover().cloned();
        match self.drag.end(&mut self.store, target) {
            Ok(DropOutcome::Moved {
                task_id, column_id, ..
            }) => {
                let column = self.store_column_title(&column_id).unwrap_or(column_id);
                self.status = format!("Moved task to \"{}\"", column);
                self.last_sync = Instant::now();
                self.follow_task(Some(&task_id));
            }
            Ok(DropOutcome::Unchanged) => {
                self.status = "Task stayed in place".into();
                self.follow_task(active.as_deref());
            }
            Ok(DropOutcome::Cancelled) => {
                self.status = "Move canceled".into();
                self.follow_task(active.as_deref());
            }
            Err(err) => {
                self.status = format!("Error: {}", err);
                self.follow_task(active.as_deref());
            }
        }
    }

    /// Points the selection at `task_id`, or back at the origin column when
    /// it is gone.
    fn follow_task(&mut self, task_id: Option<&str>) {
        match task_id.and_then(|id| self.store.locate_task(id)) {
            Some((column, task)) => {
                self.selected_column = column;
                self.selected_task = task;
            }
            None => self.clamp_selection(),
        }
    }

    fn select_task(&mut self, task_id: &str) {
        if let Some((column, task)) = self.store.locate_task(task_id) {
            self.selected_column = column;
            self.selected_task = task;
        }
    }

    fn shift_column(&mut self, delta: isize) {
        let Some(id) = self.current_column_id() else {
            self.status = "No list selected".into();
            return;
        };
        let Some(target) = step_index(self.selected_column, delta, self.store.columns().len())
        else {
            return;
        };
        let result = drop_column(&mut self.store, &id, target);
        if self.report(result, |_| format!("Moved list to position {}", target + 1)) {
            self.selected_column = target;
        }
    }

    fn copy_column(&mut self) {
        let Some(id) = self.current_column_id() else {
            self.status = "No list selected".into();
            return;
        };
        let result = self.store.copy_column(&id);
        if self.report(result, |_| "List copied".to_string()) {
            self.selected_column += 1;
            self.selected_task = 0;
        }
    }

    fn open_picker(&mut self, move_all: bool) {
        let Some(id) = self.current_column_id() else {
            self.status = "No list selected".into();
            return;
        };
        let Some(picker) = IndexPicker::new(self.selected_column, self.store.columns().len())
        else {
            self.status = "There is no other list position".into();
            return;
        };
        self.mode = if move_all {
            Mode::MoveAll {
                column_id: id,
                picker,
            }
        } else {
            Mode::MoveColumn {
                column_id: id,
                picker,
            }
        };
        self.status = "Choose a position (↑/↓, Enter, Esc)".into();
    }

    fn open_board(&mut self, board_id: &str) {
        match self.store.open_board(board_id) {
            Ok(()) => {
                self.drag = DragController::new();
                self.query.clear();
                self.selected_column = 0;
                self.selected_task = 0;
                self.archived_idx = 0;
                self.scroll_offsets = vec![0; self.store.columns().len()];
                self.view = ViewMode::Board;
                self.last_sync = Instant::now();
                self.status = format!("Opened \"{}\"", self.store.board().title);
            }
            Err(err) => self.status = format!("Error: {:#}", err),
        }
    }

    fn reload_store(&mut self) {
        if let Err(err) = self.store.reload() {
            self.status = format!("Error: {:#}", err);
        }
    }

    fn refresh_boards(&mut self) -> Result<()> {
        self.boards = self.store.backend().fetch_boards(&self.user)?;
        Ok(())
    }

    fn set_view(&mut self, view: ViewMode) -> Result<()> {
        if view == ViewMode::Boards {
            self.refresh_boards()?;
            self.board_idx = self
                .boards
                .iter()
                .position(|b| b.id == self.store.board().id)
                .unwrap_or(0);
        }
        if self.view != view {
            self.view = view;
            self.status = format!("Switched to {} view", view.label());
        }
        Ok(())
    }

    /// Turns a store result into status text. Returns whether it succeeded.
    fn report<T, E: Display>(
        &mut self,
        result: Result<T, E>,
        done: impl FnOnce(T) -> String,
    ) -> bool {
        match result {
            Ok(value) => {
                self.status = done(value);
                self.last_sync = Instant::now();
                true
            }
            Err(err) => {
                self.status = format!("Error: {}", err);
                false
            }
        }
    }

    fn reject(&mut self, err: impl Display) -> bool {
        self.status = format!("Could not save: {}", err);
        false
    }

    fn visible_columns(&self) -> Vec<ColumnWithTasks> {
        filter_columns(self.store.columns(), &self.query)
    }

    fn current_column(&self) -> Option<&ColumnWithTasks> {
        self.store.columns().get(self.selected_column)
    }

    fn current_column_id(&self) -> Option<ColumnId> {
        self.current_column().map(|c| c.column.id.clone())
    }

    fn store_column_title(&self, column_id: &str) -> Option<String> {
        self.store.column(column_id).map(|c| c.column.title.clone())
    }

    fn current_task(&self) -> Option<Task> {
        self.visible_columns()
            .get(self.selected_column)?
            .tasks
            .get(self.selected_task)
            .cloned()
    }

    fn archived_entries(&self) -> Vec<ArchivedEntry<'_>> {
        self.store
            .archived_columns()
            .iter()
            .map(ArchivedEntry::Column)
            .chain(self.store.archived_tasks().iter().map(ArchivedEntry::Task))
            .collect()
    }

    fn selected_archived(&self) -> Option<ItemRef> {
        match self.archived_entries().get(self.archived_idx)? {
            ArchivedEntry::Column(col) => Some(ItemRef::Column(col.column.id.clone())),
            ArchivedEntry::Task(task) => Some(ItemRef::Task(task.id.clone())),
        }
    }

    fn archived_title(&self, id: &str) -> String {
        self.archived_entries()
            .into_iter()
            .find_map(|entry| match entry {
                ArchivedEntry::Column(col) if col.column.id == id => Some(col.column.title.clone()),
                ArchivedEntry::Task(task) if task.id == id => Some(task.title.clone()),
                _ => None,
            })
            .unwrap_or_else(|| id.to_string())
    }

    fn prev_column(&mut self) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.selected_task = 0;
        }
    }

    fn next_column(&mut self) {
        if self.selected_column + 1 < self.store.columns().len() {
            self.selected_column += 1;
            self.selected_task = 0;
        }
    }

    fn prev_task(&mut self) {
        self.selected_task = self.selected_task.saturating_sub(1);
    }

    fn next_task(&mut self) {
        self.selected_task += 1;
    }

    fn clamp_selection(&mut self) {
        let columns = self.visible_columns();
        self.selected_column = self
            .selected_column
            .min(columns.len().saturating_sub(1));
        let tasks = columns
            .get(self.selected_column)
            .map(|c| c.tasks.len())
            .unwrap_or(0);
        self.selected_task = self.selected_task.min(tasks.saturating_sub(1));
        let archived = self.archived_entries().len();
        self.archived_idx = self.archived_idx.min(archived.saturating_sub(1));
        self.board_idx = self.board_idx.min(self.boards.len().saturating_sub(1));
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(5),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        match self.view {
            ViewMode::Board => self.draw_board(f, layout[1]),
            ViewMode::Archived => self.draw_archived(f, layout[1]),
            ViewMode::Boards => self.draw_boards(f, layout[1]),
        }
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::NewTask { form, .. } => draw_task_form(f, "New Task", form),
            Mode::EditTask { form, .. } => draw_task_form(f, "Edit Task", form),
            Mode::NewColumn(form) => draw_title_form(f, "New List", form),
            Mode::RenameColumn { form, .. } => draw_title_form(f, "Rename List", form),
            Mode::NewBoard(form) => draw_title_form(f, "New Board", form),
            Mode::EditBoard(form) => draw_board_form(f, form),
            Mode::MoveColumn { picker, .. } => {
                draw_picker(f, "Move List", picker, &self.store.column_titles())
            }
            Mode::MoveAll { picker, .. } => draw_picker(
                f,
                "Move All Tasks To",
                picker,
                &self.store.column_titles(),
            ),
            Mode::ConfirmDelete(target) => self.draw_confirm(f, target),
            Mode::Normal | Mode::Search(_) => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let board = self.store.board();
        let mut spans = vec![
            Span::styled(
                "taskboard ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                board.title.clone(),
                Style::default()
                    .fg(named_color(&board.color))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{} tasks", self.store.total_tasks()),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("synced {}", format_elapsed(self.last_sync)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view.label().to_lowercase()),
                Style::default().fg(Color::Magenta),
            ),
        ];
        if is_active(&self.query) {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                format!("/{}", self.query.trim()),
                Style::default().fg(Color::LightYellow),
            ));
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = self.visible_columns();
        if columns.is_empty() {
            let msg = Paragraph::new("No lists yet. Press N to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("taskboard"));
            f.render_widget(Clear, area);
            f.render_widget(msg, area);
            return;
        }

        if self.scroll_offsets.len() != columns.len() {
            self.scroll_offsets.resize(columns.len(), 0);
        }

        let constraints = columns
            .iter()
            .map(|_| Constraint::Percentage((100 / columns.len() as u16).max(1)))
            .collect::<Vec<_>>();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let now = Utc::now();
        let active = self.drag.active_task().map(str::to_string);
        let dragging = active.is_some();
        let filtering = is_active(&self.query);
        for (idx, column) in columns.iter().enumerate() {
            let accent = color_for_index(idx);
            let width = chunks[idx].width.saturating_sub(2);
            let selected_col = idx == self.selected_column;
            let mut items = column
                .tasks
                .iter()
                .enumerate()
                .map(|(t_idx, task)| {
                    let style = if active.as_deref() == Some(task.id.as_str()) {
                        CardStyle::Dragged
                    } else if !dragging && selected_col && t_idx == self.selected_task {
                        CardStyle::Selected
                    } else {
                        CardStyle::Plain
                    };
                    task_item(task, width, style, now)
                })
                .collect::<Vec<_>>();

            let drop_here = dragging
                && idx == self.drag_column
                && active
                    .as_deref()
                    .map(|id| !column.tasks.iter().any(|t| t.id == id))
                    .unwrap_or(false);
            if drop_here {
                let slot = self.drag_slot.min(items.len());
                items.insert(slot, drop_marker(width));
            }

            let mut state = ListState::default();
            let viewport = chunks[idx].height.saturating_sub(2) as usize / CARD_HEIGHT;
            let focus = if dragging && idx == self.drag_column {
                Some(self.drag_slot)
            } else if selected_col {
                Some(self.selected_task)
            } else {
                None
            };
            let mut offset = self.scroll_offsets[idx];
            if let Some(sel) = focus {
                offset = adjust_offset(sel, offset, viewport, 1, items.len());
                self.scroll_offsets[idx] = offset;
            }
            *state.offset_mut() = offset.min(items.len().saturating_sub(1));

            let total = self
                .store
                .columns()
                .get(idx)
                .map(|c| c.tasks.len())
                .unwrap_or(0);
            let title = if filtering {
                format!("{} ({}/{})", column.column.title, column.tasks.len(), total)
            } else {
                format!("{} ({})", column.column.title, column.tasks.len())
            };
            let highlighted = selected_col || (dragging && idx == self.drag_column);
            let border = if dragging && idx == self.drag_column {
                Color::LightMagenta
            } else {
                accent
            };
            let block = Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(accent).add_modifier(if highlighted {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(Color::Rgb(16, 18, 24)));

            let list = List::new(items).block(block);
            f.render_stateful_widget(list, chunks[idx], &mut state);
        }
    }

    fn draw_archived(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        let column_count = self.store.archived_columns().len();

        let columns = self
            .store
            .archived_columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                archived_item(
                    format!("{} ({} tasks)", col.column.title, col.tasks.len()),
                    idx == self.archived_idx,
                )
            })
            .collect::<Vec<_>>();
        let tasks = self
            .store
            .archived_tasks()
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let origin = self
                    .store_column_title(&task.column_id)
                    .unwrap_or_else(|| "first list".into());
                archived_item(
                    format!("{}  → {}", task.title, origin),
                    column_count + idx == self.archived_idx,
                )
            })
            .collect::<Vec<_>>();

        for (area, title, items) in [
            (halves[0], "Archived lists", columns),
            (halves[1], "Archived tasks", tasks),
        ] {
            let empty = items.is_empty();
            let block = Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray));
            if empty {
                let msg = Paragraph::new("Nothing here")
                    .alignment(Alignment::Center)
                    .block(block);
                f.render_widget(msg, area);
            } else {
                f.render_widget(List::new(items).block(block), area);
            }
        }
    }

    fn draw_boards(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let current = &self.store.board().id;
        let items = self
            .boards
            .iter()
            .enumerate()
            .map(|(idx, board)| {
                let mut spans = vec![
                    Span::styled(
                        if board.id == *current { "● " } else { "  " },
                        Style::default().fg(Color::LightGreen),
                    ),
                    Span::styled(
                        board.title.clone(),
                        Style::default()
                            .fg(named_color(&board.color))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  [{}]", board.id),
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                if board.archived {
                    spans.push(Span::styled(
                        "  (archived)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                if let Some(description) = &board.description {
                    spans.push(Span::styled(
                        format!("  {}", truncate_text(description, 40)),
                        Style::default().fg(Color::Gray),
                    ));
                }
                let mut item = ListItem::new(Line::from(spans));
                if idx == self.board_idx {
                    item = item.style(Style::default().bg(Color::Rgb(40, 44, 56)));
                }
                item
            })
            .collect::<Vec<_>>();
        let block = Block::default()
            .title(Span::styled(
                format!("Boards of {}", self.user),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(List::new(items).block(block), area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let status = match &self.mode {
            Mode::Search(field) => format!("Search: {}", field.with_caret()),
            _ => self.status.clone(),
        };
        let status = Paragraph::new(status).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(status, bottom[0]);

        let detail_lines = match self.current_task() {
            Some(task) if self.view == ViewMode::Board => task_detail(&task),
            _ => vec![Line::from("No task selected")],
        };
        let detail = Paragraph::new(detail_lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        let mut spans = vec![
            key("1", Color::LightCyan),
            Span::raw(" board  "),
            key("2", Color::LightCyan),
            Span::raw(" archived  "),
            key("3", Color::LightCyan),
            Span::raw(" boards  "),
        ];
        if self.drag.is_dragging() {
            spans.extend([
                key("←↑↓→", Color::LightMagenta),
                Span::raw(" choose spot  "),
                key("Enter", Color::LightGreen),
                Span::raw(" drop  "),
                key("Esc", Color::LightRed),
                Span::raw(" cancel"),
            ]);
            return Line::from(spans);
        }
        match self.view {
            ViewMode::Board => spans.extend([
                key("←↑↓→/hjkl", Color::LightCyan),
                Span::raw(" select  "),
                key("space", Color::LightMagenta),
                Span::raw(" move  "),
                key("H/L", Color::LightGreen),
                Span::raw(" shift list  "),
                key("/", Color::LightYellow),
                Span::raw(" search  "),
                key("n/N", Color::LightMagenta),
                Span::raw(" new task/list  "),
                key("e/E/B", Color::LightYellow),
                Span::raw(" edit task/list/board  "),
                key("c", Color::LightGreen),
                Span::raw(" copy  "),
                key("M/A", Color::LightGreen),
                Span::raw(" move list/all  "),
                key("a/z/Z", Color::Yellow),
                Span::raw(" archive task/tasks/list  "),
                key("d", Color::LightRed),
                Span::raw(" delete  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
            ViewMode::Archived => spans.extend([
                key("↑↓", Color::LightCyan),
                Span::raw(" browse  "),
                key("r", Color::LightGreen),
                Span::raw(" restore  "),
                key("d", Color::LightRed),
                Span::raw(" delete  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
            ViewMode::Boards => spans.extend([
                key("↑↓", Color::LightCyan),
                Span::raw(" browse  "),
                key("Enter", Color::LightGreen),
                Span::raw(" open  "),
                key("n", Color::LightMagenta),
                Span::raw(" new  "),
                key("a", Color::Yellow),
                Span::raw(" archive/restore  "),
                key("d", Color::LightRed),
                Span::raw(" delete  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
        }
        Line::from(spans)
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, target: &ItemRef) {
        let area = centered_rect(50, 30, f.size());
        let what = match target {
            ItemRef::Task(id) => {
                let title = self
                    .store
                    .find_task(id)
                    .map(|(_, t)| t.title.clone())
                    .or_else(|| {
                        self.store
                            .archived_tasks()
                            .iter()
                            .find(|t| t.id == *id)
                            .map(|t| t.title.clone())
                    })
                    .unwrap_or_else(|| id.clone());
                format!("task \"{}\"", title)
            }
            ItemRef::Column(id) => format!("list {} and its tasks", id),
            ItemRef::Board(id) => format!("board {} and everything on it", id),
        };
        let body = vec![
            Line::from(Span::styled(
                format!("Delete {}?", what),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Confirm Delete",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightRed)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

const CARD_HEIGHT: usize = 4;

#[derive(Copy, Clone, PartialEq, Eq)]
enum CardStyle {
    Plain,
    Selected,
    Dragged,
}

fn draw_task_form(f: &mut ratatui::Frame<'_>, title: &str, form: &TaskForm) {
    let area = centered_rect(70, 70, f.size());
    let mut lines = Vec::new();
    for field in [
        TaskField::Title,
        TaskField::Description,
        TaskField::Assignee,
        TaskField::Due,
    ] {
        if let Some(value) = form.text_field(field) {
            lines.extend(field_lines(field.label(), value, form.field == field));
        }
    }
    let priority_active = form.field == TaskField::Priority;
    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", TaskField::Priority.label()),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD | Modifier::DIM),
        ),
        Span::styled(
            if priority_active {
                format!("< {} >", form.priority.label())
            } else {
                form.priority.label().to_string()
            },
            Style::default().fg(priority_color(form.priority)),
        ),
    ]));
    for field in [TaskField::Labels, TaskField::Checklist] {
        if let Some(value) = form.text_field(field) {
            lines.extend(field_lines(field.label(), value, form.field == field));
        }
    }
    lines.push(Line::from(Span::styled(
        "Ctrl+Enter to save • Esc to cancel • Tab/Shift-Tab to move • Enter adds a line in Description and Checklist",
        Style::default().fg(Color::Gray),
    )));
    render_dialog(f, area, title, lines);
}

fn draw_title_form(f: &mut ratatui::Frame<'_>, title: &str, form: &TitleForm) {
    let area = centered_rect(50, 20, f.size());
    let mut lines = field_lines("Title", &form.title, true);
    lines.push(Line::from(Span::styled(
        "Enter to save • Esc to cancel",
        Style::default().fg(Color::Gray),
    )));
    render_dialog(f, area, title, lines);
}

fn draw_board_form(f: &mut ratatui::Frame<'_>, form: &BoardForm) {
    use crate::forms::BoardField;
    let area = centered_rect(60, 30, f.size());
    let mut lines = field_lines("Title", &form.title, form.field == BoardField::Title);
    lines.extend(field_lines(
        "Description",
        &form.description,
        form.field == BoardField::Description,
    ));
    let color_active = form.field == BoardField::Color;
    lines.push(Line::from(vec![
        Span::styled(
            "Colour (←/→): ",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD | Modifier::DIM),
        ),
        Span::styled(
            if color_active {
                format!("< {} >", form.color)
            } else {
                form.color.clone()
            },
            Style::default().fg(named_color(&form.color)),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "Enter to save • Esc to cancel • Tab to move",
        Style::default().fg(Color::Gray),
    )));
    render_dialog(f, area, "Edit Board", lines);
}

fn draw_picker(f: &mut ratatui::Frame<'_>, title: &str, picker: &IndexPicker, names: &[&str]) {
    let area = centered_rect(40, 40, f.size());
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "Current: {}. {}",
            picker.current() + 1,
            names.get(picker.current()).copied().unwrap_or("")
        ),
        Style::default().fg(Color::DarkGray),
    ))];
    for idx in picker.choices() {
        let selected = idx == picker.selected();
        lines.push(Line::from(Span::styled(
            format!(
                "{} {}. {}",
                if selected { "▶" } else { " " },
                idx + 1,
                names.get(idx).copied().unwrap_or("")
            ),
            if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            },
        )));
    }
    render_dialog(f, area, title, lines);
}

fn render_dialog(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// `idx + delta` when it stays inside `0..len`.
fn step_index(idx: usize, delta: isize, len: usize) -> Option<usize> {
    let next = idx.checked_add_signed(delta)?;
    (next < len).then_some(next)
}

fn color_for_index(idx: usize) -> Color {
    let palette = [
        Color::Cyan,
        Color::LightGreen,
        Color::LightMagenta,
        Color::LightBlue,
        Color::LightYellow,
        Color::LightRed,
    ];
    palette[idx % palette.len()]
}

/// Terminal colour for a board or label colour name.
fn named_color(name: &str) -> Color {
    match name.trim().to_lowercase().as_str() {
        "blue" => Color::LightBlue,
        "green" => Color::LightGreen,
        "red" => Color::LightRed,
        "yellow" => Color::LightYellow,
        "purple" => Color::Magenta,
        "pink" => Color::LightMagenta,
        "orange" => Color::Rgb(255, 165, 0),
        "cyan" | "teal" => Color::Cyan,
        _ => Color::Gray,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Medium => Color::LightYellow,
        Priority::Low => Color::LightGreen,
    }
}

fn due_color(status: DueStatus) -> Color {
    match status {
        DueStatus::Overdue => Color::Red,
        DueStatus::DueSoon => Color::LightYellow,
        DueStatus::Upcoming => Color::Gray,
    }
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&".".repeat(max - keep));
    out
}

/// Card for one task: title, then priority / due / checklist / assignee,
/// then labels.
fn task_item(task: &Task, width: u16, style: CardStyle, now: chrono::DateTime<Utc>) -> ListItem<'static> {
    let inner = width.saturating_sub(2).max(10) as usize;
    let title_style = match style {
        CardStyle::Dragged => Style::default()
            .fg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        _ => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    };
    let marker = match style {
        CardStyle::Dragged => "⇅ ",
        CardStyle::Selected => "▶ ",
        CardStyle::Plain => "  ",
    };

    let mut meta = vec![Span::styled(
        format!("  {}", task.priority.label()),
        Style::default().fg(priority_color(task.priority)),
    )];
    if let (Some(due), Some(status)) = (task.due_date, task.due_status(now)) {
        meta.push(Span::styled(
            format!("  due {}", due.format("%Y-%m-%d")),
            Style::default().fg(due_color(status)),
        ));
    }
    if !task.checklist.is_empty() {
        let (done, total) = task.checklist_progress();
        meta.push(Span::styled(
            format!("  ☑ {}/{}", done, total),
            Style::default().fg(if done == total {
                Color::LightGreen
            } else {
                Color::Gray
            }),
        ));
    }
    if task.assignee.is_some() {
        meta.push(Span::styled(
            format!("  ({})", assignee_initials(task.assignee.as_deref())),
            Style::default().fg(Color::LightCyan),
        ));
    }

    let mut labels = vec![Span::raw("  ")];
    for label in &task.labels {
        labels.push(Span::styled(
            format!("#{} ", label.name),
            Style::default().fg(named_color(&label.color)),
        ));
    }

    let lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(truncate_text(&task.title, inner.saturating_sub(2)), title_style),
        ]),
        Line::from(meta),
        Line::from(labels),
        Line::styled("─".repeat(inner), Style::default().fg(Color::DarkGray)),
    ];
    let base = Style::default().bg(Color::Rgb(22, 24, 30)).fg(Color::Gray);
    let item = ListItem::new(lines);
    match style {
        CardStyle::Plain => item.style(base),
        CardStyle::Selected => item.style(base.bg(Color::Rgb(60, 52, 28))),
        CardStyle::Dragged => item.style(base.bg(Color::Rgb(48, 30, 56))),
    }
}

fn drop_marker(width: u16) -> ListItem<'static> {
    let inner = width.saturating_sub(2).max(10) as usize;
    let label = " drop here ";
    let side = inner.saturating_sub(label.len()) / 2;
    ListItem::new(Line::from(Span::styled(
        format!("{}{}{}", "╌".repeat(side), label, "╌".repeat(side)),
        Style::default()
            .fg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD),
    )))
}

fn archived_item(text: String, selected: bool) -> ListItem<'static> {
    let item = ListItem::new(Line::from(text));
    if selected {
        item.style(
            Style::default()
                .bg(Color::Rgb(40, 44, 56))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        item.style(Style::default().fg(Color::Gray))
    }
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            Line::from(vec![
                Span::styled(
                    if idx == 0 {
                        prefix.clone()
                    } else {
                        spacer.clone()
                    },
                    label_style,
                ),
                Span::styled(line.to_string(), value_style),
            ])
        })
        .collect()
}

fn task_detail(task: &Task) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        task.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(description) = &task.description {
        lines.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )));
    }
    if let Some(assignee) = &task.assignee {
        lines.push(Line::from(format!("Assignee: {}", assignee)));
    }
    for item in &task.checklist {
        lines.push(Line::from(format!(
            "[{}] {}",
            if item.done { "x" } else { " " },
            item.text
        )));
    }
    lines
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, MemoryBackend};
    use crate::model::TaskFields;
    use crate::storage::WorkspaceScope;
    use std::path::PathBuf;

    fn app_with(columns: &[(&str, &[&str])]) -> App<MemoryBackend> {
        let mut backend = MemoryBackend::default();
        let no_columns: [&str; 0] = [];
        let board = backend.doc.create_board(
            "ada",
            &NewBoard {
                title: "Launch".into(),
                ..NewBoard::default()
            },
            &no_columns,
        );
        for (title, tasks) in columns {
            let column = backend.doc.create_column(&board.id, title).unwrap();
            for task in *tasks {
                backend
                    .doc
                    .create_task(&column.id, &TaskFields::titled(*task))
                    .unwrap();
            }
        }
        let store = BoardStore::load(backend, &board.id).unwrap();
        let location = WorkspaceLocation {
            path: PathBuf::from(".taskboard/data.yml"),
            scope: WorkspaceScope::Project,
        };
        App::new(store, "ada".into(), location)
    }

    fn press(app: &mut App<MemoryBackend>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn type_text(app: &mut App<MemoryBackend>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn titles(app: &App<MemoryBackend>, column: usize) -> Vec<String> {
        app.store.columns()[column]
            .tasks
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    fn moves(app: &App<MemoryBackend>) -> usize {
        app.store
            .backend()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::TaskMove(..)))
            .count()
    }

    #[test]
    fn keyboard_drag_reorders_within_column() {
        let mut app = app_with(&[("To Do", &["A", "B", "C"])]);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(titles(&app, 0), ["B", "C", "A"]);
        assert_eq!(moves(&app), 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(titles(&app, 0), ["B", "C", "A"]);
        assert_eq!(moves(&app), 1);
        assert_eq!(app.selected_task, 2);
        assert!(!app.drag.is_dragging());
    }

    #[test]
    fn keyboard_drag_across_columns() {
        let mut app = app_with(&[("To Do", &["A", "B"]), ("Done", &["X"])]);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(titles(&app, 0), ["B"]);
        assert_eq!(titles(&app, 1), ["A", "X"]);
        assert_eq!((app.selected_column, app.selected_task), (1, 0));
    }

    #[test]
    fn escape_cancels_drag_without_persisting() {
        let mut app = app_with(&[("To Do", &["A", "B"])]);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Esc);
        assert_eq!(titles(&app, 0), ["A", "B"]);
        assert!(app.store.backend().calls.is_empty());
    }

    #[test]
    fn new_task_goes_to_selected_column() {
        let mut app = app_with(&[("To Do", &[]), ("Doing", &[])]);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Write tests");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(titles(&app, 1), ["Write tests"]);
        assert_eq!(app.current_task().unwrap().title, "Write tests");
    }

    #[test]
    fn empty_title_keeps_form_open() {
        let mut app = app_with(&[("To Do", &[])]);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::NewTask { .. }));
        assert!(app.status.contains("title must not be empty"));
        assert!(app.store.backend().calls.is_empty());
    }

    #[test]
    fn search_filters_and_blocks_drag() {
        let mut app = app_with(&[("To Do", &["Fix login", "Write docs"])]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "docs");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.visible_columns()[0].tasks.len(), 1);
        assert_eq!(app.current_task().unwrap().title, "Write docs");
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.drag.is_dragging());
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible_columns()[0].tasks.len(), 2);
    }

    #[test]
    fn archive_and_restore_column() {
        let mut app = app_with(&[("To Do", &["A"]), ("Done", &[])]);
        press(&mut app, KeyCode::Char('Z'));
        assert_eq!(app.store.columns().len(), 1);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.store.columns().len(), 2);
        assert_eq!(app.store.columns()[1].column.title, "To Do");
    }

    #[test]
    fn move_column_dialog() {
        let mut app = app_with(&[("A", &[]), ("B", &[]), ("C", &[])]);
        press(&mut app, KeyCode::Char('M'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.column_titles(), ["B", "C", "A"]);
        assert_eq!(app.selected_column, 2);
    }

    #[test]
    fn shift_column_right() {
        let mut app = app_with(&[("A", &[]), ("B", &[])]);
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.store.column_titles(), ["B", "A"]);
        assert_eq!(app.selected_column, 1);
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.store.column_titles(), ["B", "A"]);
    }

    #[test]
    fn failed_persist_is_reported() {
        let mut app = app_with(&[("To Do", &["A"])]);
        app.store.backend_mut().fail_after = Some(0);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(titles(&app, 0), ["A"]);
        assert!(app.status.contains("reverted"));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = app_with(&[("To Do", &["A"])]);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(titles(&app, 0), ["A"]);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(titles(&app, 0).is_empty());
    }

    #[test]
    fn new_board_opens_it() {
        let mut app = app_with(&[("To Do", &[])]);
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Roadmap");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.board().title, "Roadmap");
        assert_eq!(app.view, ViewMode::Board);
        assert_eq!(app.store.columns().len(), 4);
        assert_eq!(app.boards.len(), 2);
    }

    #[test]
    fn step_index_stays_in_bounds() {
        assert_eq!(step_index(0, -1, 3), None);
        assert_eq!(step_index(2, 1, 3), None);
        assert_eq!(step_index(1, 1, 3), Some(2));
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a long title", 8), "a lon...");
    }
}
