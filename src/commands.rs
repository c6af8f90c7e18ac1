use crate::backend::{Backend, Identity};
use crate::cli::{BoardCommand, ColumnCommand, TaskArgs};
use crate::config::Config;
use crate::filter::filter_columns;
use crate::forms::parse_priority;
use crate::model::{
    assignee_initials, parse_checklist, parse_due_date, parse_labels, Board, BoardPatch,
    ColumnWithTasks, DueStatus, NewBoard, Priority, Task, TaskFields, TaskPatch,
};
use crate::storage::{
    current_workspace, init_project_workspace, FileBackend, WorkspaceLocation,
};
use crate::store::BoardStore;
use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::env;

/// Where commands read from and who they act for.
pub struct Session {
    pub config: Config,
    pub location: WorkspaceLocation,
    pub user: String,
}

impl Session {
    pub fn open(config: Config) -> Result<Self> {
        let location = current_workspace()?;
        Session::with_location(config, location)
    }

    fn with_location(config: Config, location: WorkspaceLocation) -> Result<Self> {
        let user = config.identity().current_user_id()?;
        Ok(Session {
            config,
            location,
            user,
        })
    }

    pub fn backend(&self) -> FileBackend {
        FileBackend::new(self.location.clone(), self.config.default_columns())
    }

    /// The board named by `--board`, else the user's newest active board.
    pub fn resolve_board(&self, requested: Option<&str>) -> Result<Board> {
        let backend = self.backend();
        if let Some(id) = requested {
            let board = backend.fetch_board(id)?;
            if board.user_id != self.user {
                return Err(anyhow!("board {} belongs to another user", id));
            }
            return Ok(board);
        }
        backend
            .fetch_boards(&self.user)?
            .into_iter()
            .find(|b| !b.archived)
            .ok_or_else(|| anyhow!("no boards yet; run `taskboard init` or `taskboard board new`"))
    }

    pub fn open_store(&self, requested: Option<&str>) -> Result<BoardStore<FileBackend>> {
        let board = self.resolve_board(requested)?;
        BoardStore::load(self.backend(), &board.id)
    }
}

pub fn init(config: Config, name: Option<String>) -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_workspace(&cwd)?;
    let session = Session::with_location(config, location)?;
    let mut backend = session.backend();
    if let Some(board) = backend.fetch_boards(&session.user)?.into_iter().next() {
        println!(
            "Workspace already initialized at {} (board {} \"{}\")",
            session.location.path.display(),
            board.id,
            board.title
        );
        return Ok(());
    }
    let title = name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    });
    let board = backend.persist_board_create(
        &session.user,
        &NewBoard {
            title,
            ..NewBoard::default()
        },
    )?;
    println!(
        "Initialized board {} \"{}\" at {}",
        board.id,
        board.title,
        session.location.path.display()
    );
    Ok(())
}

pub fn boards(session: &Session, all: bool) -> Result<()> {
    let boards = session.backend().fetch_boards(&session.user)?;
    println!(
        "Boards for {} ({})",
        session.user,
        session.location.scope.label()
    );
    let mut shown = 0;
    for board in boards.iter().filter(|b| all || !b.archived) {
        let archived = if board.archived { "  (archived)" } else { "" };
        println!("  - {}: {} [{}]{}", board.id, board.title, board.color, archived);
        if let Some(description) = &board.description {
            println!("    {}", description);
        }
        shown += 1;
    }
    if shown == 0 {
        println!("  (none)");
    }
    Ok(())
}

pub fn board(session: &Session, requested: Option<&str>, command: BoardCommand) -> Result<()> {
    match command {
        BoardCommand::New {
            title,
            description,
            color,
        } => {
            if title.trim().is_empty() {
                return Err(anyhow!("board title must not be empty"));
            }
            let board = session.backend().persist_board_create(
                &session.user,
                &NewBoard {
                    title,
                    description,
                    color,
                },
            )?;
            println!("Created board {} \"{}\"", board.id, board.title);
        }
        BoardCommand::Edit {
            title,
            description,
            color,
        } => {
            let mut store = session.open_store(requested)?;
            store.update_board(BoardPatch {
                title,
                description: description.map(Some),
                color,
            })?;
            println!("Updated board {}", store.board().id);
        }
        BoardCommand::Archive => set_board_archived(session, requested, true)?,
        BoardCommand::Restore => set_board_archived(session, requested, false)?,
        BoardCommand::Delete => {
            let board = session.resolve_board(requested)?;
            session.backend().persist_board_delete(&board.id)?;
            println!("Deleted board {} \"{}\"", board.id, board.title);
        }
    }
    Ok(())
}

fn set_board_archived(session: &Session, requested: Option<&str>, archived: bool) -> Result<()> {
    // Archived boards are never the default, so restoring needs an explicit id.
    let board = match requested {
        Some(id) => session.resolve_board(Some(id))?,
        None if archived => session.resolve_board(None)?,
        None => return Err(anyhow!("pass --board to pick the board to restore")),
    };
    session
        .backend()
        .persist_board_archive(&board.id, archived)?;
    let verb = if archived { "Archived" } else { "Restored" };
    println!("{} board {}", verb, board.id);
    Ok(())
}

pub fn list(
    session: &Session,
    requested: Option<&str>,
    query: Option<String>,
    column: Option<String>,
    archived: bool,
) -> Result<()> {
    let store = session.open_store(requested)?;
    let board = store.board();
    println!(
        "Board: {} [{}] ({} tasks, {})",
        board.title,
        board.id,
        store.total_tasks(),
        session.location.scope.label()
    );
    if archived {
        print_archive(&store);
        return Ok(());
    }
    let query = query.unwrap_or_default();
    let columns = filter_columns(store.columns(), &query);
    if columns.is_empty() {
        println!("  (no columns)");
    }
    for col in columns {
        if let Some(ref filter) = column {
            if &col.column.id != filter {
                continue;
            }
        }
        print_column(&col);
    }
    Ok(())
}

pub fn add(
    session: &Session,
    requested: Option<&str>,
    title: String,
    column: Option<String>,
    args: TaskArgs,
) -> Result<()> {
    let mut store = session.open_store(requested)?;
    let fields = task_fields(title, args)?;
    let id = store
        .create_task(column.as_deref(), fields)
        .context("adding task")?;
    let (column_idx, _) = store
        .find_task(&id)
        .ok_or_else(|| anyhow!("task {} vanished after create", id))?;
    println!(
        "Added task {} to {}",
        id,
        store.columns()[column_idx].column.title
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    session: &Session,
    requested: Option<&str>,
    task_id: String,
    title: Option<String>,
    args: TaskArgs,
    clear_description: bool,
    clear_assignee: bool,
    clear_due: bool,
) -> Result<()> {
    let mut store = session.open_store(requested)?;
    let mut patch = task_patch(title, args)?;
    if clear_description {
        patch.description = Some(None);
    }
    if clear_assignee {
        patch.assignee = Some(None);
    }
    if clear_due {
        patch.due_date = Some(None);
    }
    if patch.is_empty() {
        println!("Nothing to change for {}", task_id);
        return Ok(());
    }
    store
        .update_task(&task_id, patch)
        .with_context(|| format!("editing task {}", task_id))?;
    println!("Updated task {}", task_id);
    Ok(())
}

pub fn move_task(
    session: &Session,
    requested: Option<&str>,
    task_id: String,
    column_id: String,
    index: Option<usize>,
) -> Result<()> {
    let mut store = session.open_store(requested)?;
    let index = index.unwrap_or(usize::MAX);
    let moved = store
        .move_task(&task_id, &column_id, index)
        .with_context(|| format!("moving task {} to {}", task_id, column_id))?;
    if moved {
        println!("Moved task {} to {}", task_id, column_id);
    } else {
        println!("Task {} is already there", task_id);
    }
    Ok(())
}

pub fn archive(session: &Session, requested: Option<&str>, task_id: String) -> Result<()> {
    let mut store = session.open_store(requested)?;
    store
        .archive_task(&task_id)
        .with_context(|| format!("archiving task {}", task_id))?;
    println!("Archived task {}", task_id);
    Ok(())
}

pub fn restore(session: &Session, requested: Option<&str>, task_id: String) -> Result<()> {
    let mut store = session.open_store(requested)?;
    let column_id = store
        .restore_task(&task_id)
        .with_context(|| format!("restoring task {}", task_id))?;
    println!("Restored task {} to {}", task_id, column_id);
    Ok(())
}

pub fn delete(session: &Session, requested: Option<&str>, task_id: String) -> Result<()> {
    let mut store = session.open_store(requested)?;
    store
        .delete_task(&task_id)
        .with_context(|| format!("deleting task {}", task_id))?;
    println!("Deleted task {}", task_id);
    Ok(())
}

pub fn column(session: &Session, requested: Option<&str>, command: ColumnCommand) -> Result<()> {
    let mut store = session.open_store(requested)?;
    match command {
        ColumnCommand::Add { title } => {
            let id = store.create_column(&title).context("adding column")?;
            println!("Added column {}", id);
        }
        ColumnCommand::Rename { column_id, title } => {
            store.update_column(&column_id, &title)?;
            println!("Renamed column {}", column_id);
        }
        ColumnCommand::Move { column_id, index } => {
            if store.move_column(&column_id, index)? {
                println!("Moved column {} to position {}", column_id, index);
            } else {
                println!("Column {} not moved", column_id);
            }
        }
        ColumnCommand::Archive { column_id } => {
            store.archive_column(&column_id, true)?;
            println!("Archived column {}", column_id);
        }
        ColumnCommand::Restore { column_id } => {
            store.restore_column(&column_id)?;
            println!("Restored column {}", column_id);
        }
        ColumnCommand::Delete { column_id } => {
            store.delete_column(&column_id)?;
            println!("Deleted column {}", column_id);
        }
        ColumnCommand::Copy { column_id } => {
            let id = store.copy_column(&column_id)?;
            println!("Copied column {} to {}", column_id, id);
        }
        ColumnCommand::MoveAll { column_id, index } => {
            let count = store.move_all_tasks(&column_id, index)?;
            println!("Moved {} tasks from {}", count, column_id);
        }
        ColumnCommand::ArchiveTasks { column_id } => {
            let count = store.archive_tasks_in_column(&column_id)?;
            println!("Archived {} tasks from {}", count, column_id);
        }
    }
    Ok(())
}

pub fn tui(session: &Session, requested: Option<&str>) -> Result<()> {
    let store = session.open_store(requested)?;
    ui::run(store, session)
}

fn task_fields(title: String, args: TaskArgs) -> Result<TaskFields> {
    Ok(TaskFields {
        title,
        description: args.description.filter(|d| !d.trim().is_empty()),
        assignee: args.assignee.filter(|a| !a.trim().is_empty()),
        due_date: parse_due_date(args.due.as_deref().unwrap_or_default())?,
        priority: priority_arg(args.priority.as_deref())?.unwrap_or_default(),
        labels: parse_labels(&args.labels.join(",")),
        checklist: parse_checklist(&args.checklist.join("\n")),
    })
}

fn task_patch(title: Option<String>, args: TaskArgs) -> Result<TaskPatch> {
    let due_date = match args.due.as_deref() {
        Some(raw) => Some(parse_due_date(raw)?),
        None => None,
    };
    Ok(TaskPatch {
        title,
        description: args.description.map(Some),
        assignee: args.assignee.map(Some),
        due_date,
        priority: priority_arg(args.priority.as_deref())?,
        labels: (!args.labels.is_empty()).then(|| parse_labels(&args.labels.join(","))),
        checklist: (!args.checklist.is_empty())
            .then(|| parse_checklist(&args.checklist.join("\n"))),
    })
}

fn priority_arg(raw: Option<&str>) -> Result<Option<Priority>> {
    raw.map(parse_priority).transpose()
}

fn print_column(col: &ColumnWithTasks) {
    println!("{} [{}] ({})", col.column.title, col.column.id, col.tasks.len());
    if col.tasks.is_empty() {
        println!("  (empty)");
    }
    for task in &col.tasks {
        print_task(task);
    }
    println!();
}

fn print_archive<B: Backend>(store: &BoardStore<B>) {
    println!("Archived columns");
    if store.archived_columns().is_empty() {
        println!("  (none)");
    }
    for col in store.archived_columns() {
        println!(
            "  - {}: {} ({} tasks)",
            col.column.id,
            col.column.title,
            col.tasks.len()
        );
    }
    println!();
    println!("Archived tasks");
    if store.archived_tasks().is_empty() {
        println!("  (none)");
    }
    for task in store.archived_tasks() {
        print_task(task);
    }
}

fn print_task(task: &Task) {
    println!(
        "  - {}: {} [{}]",
        task.id,
        task.title,
        task.priority.label()
    );
    if let Some(description) = &task.description {
        println!("    {}", description);
    }
    if let Some(assignee) = &task.assignee {
        println!(
            "    assignee: {} ({})",
            assignee,
            assignee_initials(Some(assignee))
        );
    }
    if let Some(due) = task.due_date {
        let status = match task.due_status(Utc::now()) {
            Some(DueStatus::Overdue) => " (overdue)",
            Some(DueStatus::DueSoon) => " (due soon)",
            _ => "",
        };
        println!("    due: {}{}", due.format("%Y-%m-%d"), status);
    }
    if !task.labels.is_empty() {
        let labels: Vec<&str> = task.labels.iter().map(|l| l.name.as_str()).collect();
        println!("    labels: {}", labels.join(", "));
    }
    if !task.checklist.is_empty() {
        let (done, total) = task.checklist_progress();
        println!("    checklist: {}/{}", done, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_args_become_fields() {
        let args = TaskArgs {
            description: Some("  ".into()),
            assignee: Some("Ada".into()),
            due: Some("2030-01-02".into()),
            priority: Some("high".into()),
            labels: vec!["Bug:red".into(), "UI".into()],
            checklist: vec!["[x] repro".into(), "fix".into()],
        };
        let fields = task_fields("Crash".into(), args).unwrap();
        assert_eq!(fields.description, None);
        assert_eq!(fields.assignee.as_deref(), Some("Ada"));
        assert_eq!(fields.priority, Priority::High);
        assert_eq!(fields.labels.len(), 2);
        assert_eq!(fields.checklist.len(), 2);
        assert!(fields.checklist[0].done);
    }

    #[test]
    fn empty_args_make_empty_patch() {
        let patch = task_patch(None, TaskArgs::default()).unwrap();
        assert!(patch.is_empty());
        let patch = task_patch(
            None,
            TaskArgs {
                due: Some("".into()),
                ..TaskArgs::default()
            },
        )
        .unwrap();
        assert_eq!(patch.due_date, Some(None));
    }

    #[test]
    fn bad_priority_is_reported() {
        let args = TaskArgs {
            priority: Some("urgent".into()),
            ..TaskArgs::default()
        };
        assert!(task_fields("x".into(), args).is_err());
    }
}
