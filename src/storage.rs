use crate::backend::Backend;
use crate::model::{
    Board, BoardPatch, Column, ColumnWithTasks, NewBoard, Task, TaskFields, TaskPatch,
};
use crate::order::{self, Identified};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DATA_DIR: &str = ".taskboard";
const DATA_FILE: &str = "data.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct WorkspaceLocation {
    pub path: PathBuf,
    pub scope: WorkspaceScope,
}

/// The persisted tables. Rows are kept in insertion order; display order
/// comes from `position`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl WorkspaceScope {
    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceScope::Project => "project",
            WorkspaceScope::Global => "global",
        }
    }
}

pub fn init_project_workspace(dir: &Path) -> Result<WorkspaceLocation> {
    let data_dir = dir.join(DATA_DIR);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    Ok(WorkspaceLocation {
        path: data_dir.join(DATA_FILE),
        scope: WorkspaceScope::Project,
    })
}

pub fn locate_workspace(start: &Path) -> Result<WorkspaceLocation> {
    if let Some(project_path) = find_project_workspace(start) {
        return Ok(WorkspaceLocation {
            path: project_path,
            scope: WorkspaceScope::Project,
        });
    }
    Ok(WorkspaceLocation {
        path: global_data_dir()?.join(DATA_FILE),
        scope: WorkspaceScope::Global,
    })
}

pub fn current_workspace() -> Result<WorkspaceLocation> {
    let cwd = env::current_dir()?;
    locate_workspace(&cwd)
}

pub fn load_document(location: &WorkspaceLocation) -> Result<Document> {
    if !location.path.exists() {
        return Ok(Document::default());
    }
    let data = fs::read_to_string(&location.path)
        .with_context(|| format!("reading {:?}", location.path))?;
    let doc: Document = serde_yaml::from_str(&data).context("parsing workspace file")?;
    Ok(doc)
}

pub fn save_document(location: &WorkspaceLocation, doc: &Document) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(doc).context("serializing workspace")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}

pub fn global_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "taskboard").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn find_project_workspace(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(DATA_DIR).join(DATA_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

impl Document {
    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            let taken = self.boards.iter().any(|b| b.id == id)
                || self.columns.iter().any(|c| c.id == id)
                || self.tasks.iter().any(|t| t.id == id);
            if !taken {
                return id;
            }
        }
    }

    pub fn boards_for(&self, user_id: &str) -> Vec<Board> {
        let mut boards: Vec<Board> = self
            .boards
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        boards
    }

    pub fn board(&self, board_id: &str) -> Result<Board> {
        self.boards
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| anyhow!("board {} not found", board_id))
    }

    fn board_mut(&mut self, board_id: &str) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.id == board_id)
            .ok_or_else(|| anyhow!("board {} not found", board_id))
    }

    fn column_mut(&mut self, column_id: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| anyhow!("column {} not found", column_id))
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| anyhow!("task {} not found", task_id))
    }

    /// Columns of a board with the given archived flag, each with its
    /// active tasks.
    pub fn columns_with_tasks(&self, board_id: &str, archived: bool) -> Vec<ColumnWithTasks> {
        let mut columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.board_id == board_id && c.archived == archived)
            .collect();
        columns.sort_by_key(|c| c.position);
        columns
            .into_iter()
            .map(|column| ColumnWithTasks {
                column: column.clone(),
                tasks: self
                    .sorted_tasks(&column.id, false)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    pub fn archived_tasks(&self, board_id: &str) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.archived)
            .filter(|t| {
                self.columns
                    .iter()
                    .any(|c| c.id == t.column_id && c.board_id == board_id && !c.archived)
            })
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.updated_at);
        tasks
    }

    fn sorted_tasks(&self, column_id: &str, archived: bool) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id && t.archived == archived)
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    fn next_column_position(&self, board_id: &str) -> i64 {
        self.columns
            .iter()
            .filter(|c| c.board_id == board_id && !c.archived)
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0)
    }

    fn next_task_position(&self, column_id: &str) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.column_id == column_id && !t.archived)
            .map(|t| t.position + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn create_board<S: AsRef<str>>(
        &mut self,
        user_id: &str,
        fields: &NewBoard,
        default_columns: &[S],
    ) -> Board {
        let board = Board::new(self.fresh_id(), user_id, fields);
        self.boards.push(board.clone());
        for (idx, title) in default_columns.iter().enumerate() {
            let column = Column::new(self.fresh_id(), &board.id, title.as_ref(), idx as i64);
            self.columns.push(column);
        }
        board
    }

    pub fn update_board(&mut self, board_id: &str, patch: &BoardPatch) -> Result<()> {
        self.board_mut(board_id)?.apply(patch);
        Ok(())
    }

    pub fn archive_board(&mut self, board_id: &str, archived: bool) -> Result<()> {
        let board = self.board_mut(board_id)?;
        board.archived = archived;
        board.updated_at = Utc::now();
        Ok(())
    }

    pub fn delete_board(&mut self, board_id: &str) -> Result<()> {
        self.board(board_id)?;
        let column_ids: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.board_id == board_id)
            .map(|c| c.id.clone())
            .collect();
        self.tasks.retain(|t| !column_ids.contains(&t.column_id));
        self.columns.retain(|c| c.board_id != board_id);
        self.boards.retain(|b| b.id != board_id);
        Ok(())
    }

    pub fn create_column(&mut self, board_id: &str, title: &str) -> Result<Column> {
        self.board(board_id)?;
        let position = self.next_column_position(board_id);
        let column = Column::new(self.fresh_id(), board_id, title, position);
        self.columns.push(column.clone());
        Ok(column)
    }

    pub fn update_column(&mut self, column_id: &str, title: &str) -> Result<()> {
        self.column_mut(column_id)?.title = title.to_string();
        Ok(())
    }

    pub fn move_column(&mut self, column_id: &str, new_index: usize) -> Result<()> {
        let board_id = self.column_mut(column_id)?.board_id.clone();
        let mut siblings: Vec<ColumnWithTasks> = self.columns_with_tasks(&board_id, false);
        let target = new_index.min(siblings.len().saturating_sub(1));
        order::move_to_index(&mut siblings, column_id, target);
        order::reindex(&mut siblings);
        for sibling in siblings {
            self.column_mut(sibling.id())?.position = sibling.column.position;
        }
        Ok(())
    }

    pub fn archive_column(&mut self, column_id: &str, archived: bool) -> Result<()> {
        let board_id = self.column_mut(column_id)?.board_id.clone();
        let position = self.next_column_position(&board_id);
        let column = self.column_mut(column_id)?;
        if column.archived && !archived {
            column.position = position;
        }
        column.archived = archived;
        Ok(())
    }

    pub fn delete_column(&mut self, column_id: &str) -> Result<()> {
        self.column_mut(column_id)?;
        self.tasks.retain(|t| t.column_id != column_id);
        self.columns.retain(|c| c.id != column_id);
        Ok(())
    }

    pub fn create_task(&mut self, column_id: &str, fields: &TaskFields) -> Result<Task> {
        self.column_mut(column_id)?;
        let position = self.next_task_position(column_id);
        let task = Task::new(self.fresh_id(), column_id, fields, position);
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()> {
        self.task_mut(task_id)?.apply(patch);
        Ok(())
    }

    pub fn move_task(&mut self, task_id: &str, target_column_id: &str, index: usize) -> Result<()> {
        self.column_mut(target_column_id)?;
        let source_column_id = self.task_mut(task_id)?.column_id.clone();

        let mut source: Vec<Task> = self
            .sorted_tasks(&source_column_id, false)
            .into_iter()
            .cloned()
            .collect();
        let mut moved = order::remove_by_id(&mut source, task_id)
            .ok_or_else(|| anyhow!("task {} is archived", task_id))?;
        moved.column_id = target_column_id.to_string();
        moved.updated_at = Utc::now();

        let mut target: Vec<Task> = if source_column_id == target_column_id {
            std::mem::take(&mut source)
        } else {
            self.sorted_tasks(target_column_id, false)
                .into_iter()
                .cloned()
                .collect()
        };
        order::insert_clamped(&mut target, moved, index);
        order::reindex(&mut source);
        order::reindex(&mut target);
        for task in source.into_iter().chain(target) {
            let id = task.id.clone();
            *self.task_mut(&id)? = task;
        }
        Ok(())
    }

    pub fn archive_task(&mut self, task_id: &str, archived: bool) -> Result<()> {
        let column_id = self.task_mut(task_id)?.column_id.clone();
        let position = self.next_task_position(&column_id);
        let task = self.task_mut(task_id)?;
        if task.archived && !archived {
            task.position = position;
        }
        task.archived = archived;
        task.updated_at = Utc::now();
        Ok(())
    }

    pub fn archive_tasks_in_column(&mut self, column_id: &str, archived: bool) -> Result<()> {
        self.column_mut(column_id)?;
        let ids: Vec<String> = self
            .sorted_tasks(column_id, !archived)
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        for id in ids {
            self.archive_task(&id, archived)?;
        }
        Ok(())
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<()> {
        self.task_mut(task_id)?;
        self.tasks.retain(|t| t.id != task_id);
        Ok(())
    }
}

/// Local backend over a YAML workspace file. Each persist call reloads the
/// document, applies one change, and writes it back.
pub struct FileBackend {
    location: WorkspaceLocation,
    default_columns: Vec<String>,
}

impl FileBackend {
    pub fn new(location: WorkspaceLocation, default_columns: Vec<String>) -> Self {
        FileBackend {
            location,
            default_columns,
        }
    }

    fn read(&self) -> Result<Document> {
        load_document(&self.location)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut doc = self.read()?;
        let out = f(&mut doc)?;
        save_document(&self.location, &doc)?;
        Ok(out)
    }
}

impl Backend for FileBackend {
    fn fetch_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        Ok(self.read()?.boards_for(user_id))
    }

    fn fetch_board(&self, board_id: &str) -> Result<Board> {
        self.read()?.board(board_id)
    }

    fn fetch_columns_with_tasks(&self, board_id: &str) -> Result<Vec<ColumnWithTasks>> {
        Ok(self.read()?.columns_with_tasks(board_id, false))
    }

    fn fetch_archived_columns(&self, board_id: &str) -> Result<Vec<ColumnWithTasks>> {
        Ok(self.read()?.columns_with_tasks(board_id, true))
    }

    fn fetch_archived_tasks(&self, board_id: &str) -> Result<Vec<Task>> {
        Ok(self.read()?.archived_tasks(board_id))
    }

    fn persist_board_create(&mut self, user_id: &str, board: &NewBoard) -> Result<Board> {
        let columns = self.default_columns.clone();
        self.write(|doc| Ok(doc.create_board(user_id, board, &columns)))
    }

    fn persist_board_update(&mut self, board_id: &str, patch: &BoardPatch) -> Result<()> {
        self.write(|doc| doc.update_board(board_id, patch))
    }

    fn persist_board_archive(&mut self, board_id: &str, archived: bool) -> Result<()> {
        self.write(|doc| doc.archive_board(board_id, archived))
    }

    fn persist_board_delete(&mut self, board_id: &str) -> Result<()> {
        self.write(|doc| doc.delete_board(board_id))
    }

    fn persist_column_create(&mut self, board_id: &str, title: &str) -> Result<Column> {
        self.write(|doc| doc.create_column(board_id, title))
    }

    fn persist_column_update(&mut self, column_id: &str, title: &str) -> Result<()> {
        self.write(|doc| doc.update_column(column_id, title))
    }

    fn persist_column_move(&mut self, column_id: &str, new_index: usize) -> Result<()> {
        self.write(|doc| doc.move_column(column_id, new_index))
    }

    fn persist_column_archive(&mut self, column_id: &str, archived: bool) -> Result<()> {
        self.write(|doc| doc.archive_column(column_id, archived))
    }

    fn persist_column_delete(&mut self, column_id: &str) -> Result<()> {
        self.write(|doc| doc.delete_column(column_id))
    }

    fn persist_task_create(&mut self, column_id: &str, fields: &TaskFields) -> Result<Task> {
        self.write(|doc| doc.create_task(column_id, fields))
    }

    fn persist_task_update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()> {
        self.write(|doc| doc.update_task(task_id, patch))
    }

    fn persist_task_move(
        &mut self,
        task_id: &str,
        target_column_id: &str,
        target_index: usize,
    ) -> Result<()> {
        self.write(|doc| doc.move_task(task_id, target_column_id, target_index))
    }

    fn persist_task_archive(&mut self, task_id: &str, archived: bool) -> Result<()> {
        self.write(|doc| doc.archive_task(task_id, archived))
    }

    fn persist_task_archive_bulk(&mut self, column_id: &str, archived: bool) -> Result<()> {
        self.write(|doc| doc.archive_tasks_in_column(column_id, archived))
    }

    fn persist_task_delete(&mut self, task_id: &str) -> Result<()> {
        self.write(|doc| doc.delete_task(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_COLUMNS;

    fn titles(columns: &[ColumnWithTasks]) -> Vec<&str> {
        columns.iter().map(|c| c.column.title.as_str()).collect()
    }

    fn task_titles(column: &ColumnWithTasks) -> Vec<&str> {
        column.tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn seeded() -> (Document, Board) {
        let mut doc = Document::default();
        let board = doc.create_board(
            "ada",
            &NewBoard {
                title: "Launch".into(),
                ..NewBoard::default()
            },
            &DEFAULT_COLUMNS,
        );
        (doc, board)
    }

    #[test]
    fn board_creation_seeds_default_columns() {
        let (doc, board) = seeded();
        assert_eq!(board.color, "blue");
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(titles(&columns), ["To Do", "In Progress", "Review", "Done"]);
        assert_eq!(doc.boards_for("ada").len(), 1);
        assert!(doc.boards_for("grace").is_empty());
    }

    #[test]
    fn move_column_reindexes_siblings() {
        let (mut doc, board) = seeded();
        let review = doc.columns_with_tasks(&board.id, false)[2].column.id.clone();
        doc.move_column(&review, 0).unwrap();
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(titles(&columns), ["Review", "To Do", "In Progress", "Done"]);
        let positions: Vec<i64> = columns.iter().map(|c| c.column.position).collect();
        assert_eq!(positions, [0, 1, 2, 3]);
    }

    #[test]
    fn move_task_across_columns_and_within() {
        let (mut doc, board) = seeded();
        let columns = doc.columns_with_tasks(&board.id, false);
        let todo = columns[0].column.id.clone();
        let done = columns[3].column.id.clone();
        let a = doc.create_task(&todo, &TaskFields::titled("A")).unwrap();
        doc.create_task(&todo, &TaskFields::titled("B")).unwrap();
        let c = doc.create_task(&todo, &TaskFields::titled("C")).unwrap();

        doc.move_task(&c.id, &todo, 0).unwrap();
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(task_titles(&columns[0]), ["C", "A", "B"]);

        doc.move_task(&a.id, &done, 5).unwrap();
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(task_titles(&columns[0]), ["C", "B"]);
        assert_eq!(task_titles(&columns[3]), ["A"]);
        assert_eq!(columns[3].tasks[0].column_id, done);
    }

    #[test]
    fn archive_and_restore_tasks() {
        let (mut doc, board) = seeded();
        let todo = doc.columns_with_tasks(&board.id, false)[0].column.id.clone();
        let a = doc.create_task(&todo, &TaskFields::titled("A")).unwrap();
        doc.create_task(&todo, &TaskFields::titled("B")).unwrap();

        doc.archive_tasks_in_column(&todo, true).unwrap();
        assert!(doc.columns_with_tasks(&board.id, false)[0].tasks.is_empty());
        assert_eq!(doc.archived_tasks(&board.id).len(), 2);

        doc.archive_task(&a.id, false).unwrap();
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(task_titles(&columns[0]), ["A"]);
        assert_eq!(doc.archived_tasks(&board.id).len(), 1);
    }

    #[test]
    fn move_task_rewrites_every_reindexed_row() {
        let (mut doc, board) = seeded();
        let columns = doc.columns_with_tasks(&board.id, false);
        let todo = columns[0].column.id.clone();
        let review = columns[2].column.id.clone();
        let a = doc.create_task(&todo, &TaskFields::titled("A")).unwrap();
        let b = doc.create_task(&todo, &TaskFields::titled("B")).unwrap();
        doc.create_task(&review, &TaskFields::titled("R")).unwrap();

        doc.move_task(&a.id, &review, 0).unwrap();
        let stored = doc.tasks.iter().find(|t| t.id == a.id).unwrap();
        assert_eq!(stored.column_id, review);
        assert_eq!(stored.position, 0);
        let left = doc.tasks.iter().find(|t| t.id == b.id).unwrap();
        assert_eq!(left.position, 0);
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(task_titles(&columns[2]), ["A", "R"]);
        assert_eq!(columns[2].tasks[1].position, 1);
    }

    #[test]
    fn archived_tasks_skip_archived_columns() {
        let (mut doc, board) = seeded();
        let columns = doc.columns_with_tasks(&board.id, false);
        let todo = columns[0].column.id.clone();
        let doing = columns[1].column.id.clone();
        let a = doc.create_task(&doing, &TaskFields::titled("A")).unwrap();
        let b = doc.create_task(&todo, &TaskFields::titled("B")).unwrap();
        doc.archive_task(&a.id, true).unwrap();
        doc.archive_task(&b.id, true).unwrap();

        doc.archive_column(&doing, true).unwrap();
        let archived = doc.archived_tasks(&board.id);
        let listed: Vec<&str> = archived
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(listed, ["B"]);

        doc.archive_column(&doing, false).unwrap();
        assert_eq!(doc.archived_tasks(&board.id).len(), 2);
    }

    #[test]
    fn archived_column_keeps_tasks_and_restores_at_end() {
        let (mut doc, board) = seeded();
        let todo = doc.columns_with_tasks(&board.id, false)[0].column.id.clone();
        doc.create_task(&todo, &TaskFields::titled("A")).unwrap();

        doc.archive_column(&todo, true).unwrap();
        let archived = doc.columns_with_tasks(&board.id, true);
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].tasks.len(), 1);
        assert_eq!(doc.columns_with_tasks(&board.id, false).len(), 3);

        doc.archive_column(&todo, false).unwrap();
        let columns = doc.columns_with_tasks(&board.id, false);
        assert_eq!(titles(&columns), ["In Progress", "Review", "Done", "To Do"]);
    }

    #[test]
    fn deletes_cascade() {
        let (mut doc, board) = seeded();
        let todo = doc.columns_with_tasks(&board.id, false)[0].column.id.clone();
        doc.create_task(&todo, &TaskFields::titled("A")).unwrap();
        doc.delete_column(&todo).unwrap();
        assert!(doc.tasks.is_empty());
        assert_eq!(doc.columns.len(), 3);

        doc.delete_board(&board.id).unwrap();
        assert!(doc.columns.is_empty());
        assert!(doc.boards.is_empty());
        assert!(doc.delete_board(&board.id).is_err());
    }

    #[test]
    fn file_backend_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let location = init_project_workspace(dir.path()).unwrap();
        let mut backend = FileBackend::new(
            location.clone(),
            vec!["Backlog".to_string(), "Shipped".to_string()],
        );
        let board = backend
            .persist_board_create(
                "ada",
                &NewBoard {
                    title: "Ops".into(),
                    ..NewBoard::default()
                },
            )
            .unwrap();
        let columns = backend.fetch_columns_with_tasks(&board.id).unwrap();
        assert_eq!(titles(&columns), ["Backlog", "Shipped"]);
        let task = backend
            .persist_task_create(columns[0].id(), &TaskFields::titled("Rotate keys"))
            .unwrap();
        backend
            .persist_task_move(&task.id, columns[1].id(), 0)
            .unwrap();

        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = locate_workspace(&nested).unwrap();
        assert_eq!(found.scope, WorkspaceScope::Project);
        assert_eq!(found.path, location.path);

        let reread = FileBackend::new(found, Vec::new());
        let columns = reread.fetch_columns_with_tasks(&board.id).unwrap();
        assert_eq!(task_titles(&columns[1]), ["Rotate keys"]);
        assert_eq!(reread.fetch_boards("ada").unwrap()[0].title, "Ops");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let location = WorkspaceLocation {
            path: dir.path().join("none.yml"),
            scope: WorkspaceScope::Project,
        };
        let doc = load_document(&location).unwrap();
        assert!(doc.boards.is_empty());
    }
}
