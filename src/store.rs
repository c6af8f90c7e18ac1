use crate::backend::Backend;
use crate::model::{
    Board, BoardPatch, Column, ColumnId, ColumnWithTasks, Task, TaskFields, TaskId, TaskPatch,
};
use crate::order::{self, position_of};
use anyhow::Context;
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("no column at position {0}")]
    ColumnIndexOutOfRange(usize),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("board has no active columns")]
    NoActiveColumn,
    #[error("{op} failed, local change reverted: {source:#}")]
    Persistence {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// How local state is brought back in line after a failed persist call.
#[derive(Clone, Copy)]
enum Recovery {
    /// Put back the state captured before the mutation.
    Restore,
    /// Re-fetch from the backend, since several calls may have landed.
    Refetch,
}

#[derive(Clone)]
struct Snapshot {
    board: Board,
    columns: Vec<ColumnWithTasks>,
    archived_columns: Vec<ColumnWithTasks>,
    archived_tasks: Vec<Task>,
}

/// In-memory state of one board: active columns with their active tasks,
/// plus the archived columns and archived tasks shown in the archive view.
///
/// Every mutation updates local state first, then calls the backend. If
/// the call fails the local change is undone and the error returned.
pub struct BoardStore<B: Backend> {
    backend: B,
    board: Board,
    columns: Vec<ColumnWithTasks>,
    archived_columns: Vec<ColumnWithTasks>,
    archived_tasks: Vec<Task>,
}

impl<B: Backend> BoardStore<B> {
    pub fn load(backend: B, board_id: &str) -> anyhow::Result<Self> {
        let board = backend
            .fetch_board(board_id)
            .with_context(|| format!("loading board {}", board_id))?;
        let mut store = BoardStore {
            backend,
            board,
            columns: Vec::new(),
            archived_columns: Vec::new(),
            archived_tasks: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn reload(&mut self) -> anyhow::Result<()> {
        let board_id = self.board.id.clone();
        self.open_board(&board_id)
    }

    /// Replaces the loaded state with another board from the same backend.
    /// Nothing changes if any fetch fails.
    pub fn open_board(&mut self, board_id: &str) -> anyhow::Result<()> {
        let board = self
            .backend
            .fetch_board(board_id)
            .with_context(|| format!("loading board {}", board_id))?;
        let columns = self
            .backend
            .fetch_columns_with_tasks(board_id)
            .context("fetching columns")?;
        let archived_columns = self
            .backend
            .fetch_archived_columns(board_id)
            .context("fetching archived columns")?;
        let archived_tasks = self
            .backend
            .fetch_archived_tasks(board_id)
            .context("fetching archived tasks")?;
        self.board = board;
        self.columns = columns;
        self.archived_columns = archived_columns;
        self.archived_tasks = archived_tasks;
        debug!(board = %board_id, columns = self.columns.len(), "board loaded");
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[ColumnWithTasks] {
        &self.columns
    }

    pub fn archived_columns(&self) -> &[ColumnWithTasks] {
        &self.archived_columns
    }

    pub fn archived_tasks(&self) -> &[Task] {
        &self.archived_tasks
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend access for board-level calls that sit outside the loaded
    /// board, such as creating or deleting other boards.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn total_tasks(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    /// Active task and the index of the column holding it.
    pub fn find_task(&self, task_id: &str) -> Option<(usize, &Task)> {
        self.columns.iter().enumerate().find_map(|(idx, col)| {
            col.tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|task| (idx, task))
        })
    }

    /// `(column index, task index)` of an active task.
    pub fn locate_task(&self, task_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(c_idx, col)| position_of(&col.tasks, task_id).map(|t_idx| (c_idx, t_idx)))
    }

    fn column_index(&self, column_id: &str) -> Result<usize, StoreError> {
        position_of(&self.columns, column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            columns: self.columns.clone(),
            archived_columns: self.archived_columns.clone(),
            archived_tasks: self.archived_tasks.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.columns = snapshot.columns;
        self.archived_columns = snapshot.archived_columns;
        self.archived_tasks = snapshot.archived_tasks;
    }

    fn persist<T>(
        &mut self,
        op: &'static str,
        snapshot: Snapshot,
        recovery: Recovery,
        call: impl FnOnce(&mut B) -> anyhow::Result<T>,
    ) -> Result<T, StoreError> {
        match call(&mut self.backend) {
            Ok(value) => Ok(value),
            Err(source) => {
                let message = format!("{source:#}");
                warn!(op, board = %self.board.id, error = %message, "persist failed, reverting");
                match recovery {
                    Recovery::Restore => self.restore(snapshot),
                    Recovery::Refetch => {
                        if let Err(err) = self.reload() {
                            let message = format!("{err:#}");
                            warn!(op, error = %message, "refetch failed, restoring snapshot");
                            self.restore(snapshot);
                        }
                    }
                }
                Err(StoreError::Persistence { op, source })
            }
        }
    }

    pub fn update_board(&mut self, mut patch: BoardPatch) -> Result<(), StoreError> {
        if let Some(title) = patch.title.as_mut() {
            *title = non_empty(title)?;
        }
        let snapshot = self.snapshot();
        self.board.apply(&patch);
        let board_id = self.board.id.clone();
        self.persist("update board", snapshot, Recovery::Restore, |b| {
            b.persist_board_update(&board_id, &patch)
        })?;
        debug!(board = %board_id, "board updated");
        Ok(())
    }

    /// Appends a new empty column. The identifier comes from the backend,
    /// so the column appears once the create call returns.
    pub fn create_column(&mut self, title: &str) -> Result<ColumnId, StoreError> {
        let title = non_empty(title)?;
        let board_id = self.board.id.clone();
        let snapshot = self.snapshot();
        let column = self.persist("create column", snapshot, Recovery::Restore, |b| {
            b.persist_column_create(&board_id, &title)
        })?;
        let id = column.id.clone();
        self.columns.push(ColumnWithTasks::new(column));
        order::reindex(&mut self.columns);
        debug!(column = %id, "column created");
        Ok(id)
    }

    pub fn update_column(&mut self, column_id: &str, title: &str) -> Result<(), StoreError> {
        let title = non_empty(title)?;
        let snapshot = self.snapshot();
        let column = self
            .columns
            .iter_mut()
            .chain(self.archived_columns.iter_mut())
            .find(|c| c.column.id == column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
        column.column.title = title.clone();
        self.persist("rename column", snapshot, Recovery::Restore, |b| {
            b.persist_column_update(column_id, &title)
        })?;
        debug!(column = %column_id, "column renamed");
        Ok(())
    }

    /// Returns `false` when the move is a no-op (target out of range or
    /// already in place); nothing is persisted then.
    pub fn move_column(&mut self, column_id: &str, target_index: usize) -> Result<bool, StoreError> {
        self.column_index(column_id)?;
        let snapshot = self.snapshot();
        if !order::move_to_index(&mut self.columns, column_id, target_index) {
            return Ok(false);
        }
        order::reindex(&mut self.columns);
        self.persist("move column", snapshot, Recovery::Restore, |b| {
            b.persist_column_move(column_id, target_index)
        })?;
        debug!(column = %column_id, target_index, "column moved");
        Ok(true)
    }

    pub fn archive_column(&mut self, column_id: &str, archived: bool) -> Result<(), StoreError> {
        if !archived {
            return self.restore_column(column_id);
        }
        let idx = self.column_index(column_id)?;
        let snapshot = self.snapshot();
        let mut column = self.columns.remove(idx);
        column.column.archived = true;
        self.archived_columns.push(column);
        order::reindex(&mut self.columns);
        self.persist("archive column", snapshot, Recovery::Restore, |b| {
            b.persist_column_archive(column_id, true)
        })?;
        debug!(column = %column_id, "column archived");
        Ok(())
    }

    /// Puts an archived column back at the end of the board, with the tasks
    /// it held when archived.
    pub fn restore_column(&mut self, column_id: &str) -> Result<(), StoreError> {
        let snapshot = self.snapshot();
        let mut column = order::remove_by_id(&mut self.archived_columns, column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
        column.column.archived = false;
        self.columns.push(column);
        order::reindex(&mut self.columns);
        self.persist("restore column", snapshot, Recovery::Restore, |b| {
            b.persist_column_archive(column_id, false)
        })?;
        debug!(column = %column_id, "column restored");
        Ok(())
    }

    /// Removes a column, active or archived, and every task in it.
    pub fn delete_column(&mut self, column_id: &str) -> Result<(), StoreError> {
        let snapshot = self.snapshot();
        let removed = order::remove_by_id(&mut self.columns, column_id)
            .or_else(|| order::remove_by_id(&mut self.archived_columns, column_id));
        if removed.is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        self.archived_tasks.retain(|t| t.column_id != column_id);
        order::reindex(&mut self.columns);
        self.persist("delete column", snapshot, Recovery::Restore, |b| {
            b.persist_column_delete(column_id)
        })?;
        debug!(column = %column_id, "column deleted");
        Ok(())
    }

    /// Duplicates a column and its active tasks directly after the source.
    pub fn copy_column(&mut self, column_id: &str) -> Result<ColumnId, StoreError> {
        let idx = self.column_index(column_id)?;
        let source = self.columns[idx].clone();
        let board_id = self.board.id.clone();
        let title = format!("{} (copy)", source.column.title);
        let snapshot = self.snapshot();
        let copy = self.persist("copy column", snapshot, Recovery::Refetch, |b| {
            let column = b.persist_column_create(&board_id, &title)?;
            b.persist_column_move(&column.id, idx + 1)?;
            let mut copy = ColumnWithTasks::new(column);
            for task in &source.tasks {
                copy.tasks.push(b.persist_task_create(&copy.column.id, &task.fields())?);
            }
            Ok(copy)
        })?;
        let id = copy.column.id.clone();
        order::insert_clamped(&mut self.columns, copy, idx + 1);
        order::reindex(&mut self.columns);
        debug!(source = %column_id, column = %id, "column copied");
        Ok(id)
    }

    /// Creates a task at the end of `column_id`, or of the first column when
    /// none is given.
    pub fn create_task(
        &mut self,
        column_id: Option<&str>,
        mut fields: TaskFields,
    ) -> Result<TaskId, StoreError> {
        fields.title = non_empty(&fields.title)?;
        let idx = match column_id {
            Some(id) => self.column_index(id)?,
            None if self.columns.is_empty() => return Err(StoreError::NoActiveColumn),
            None => 0,
        };
        let target = self.columns[idx].column.id.clone();
        let snapshot = self.snapshot();
        let task = self.persist("create task", snapshot, Recovery::Restore, |b| {
            b.persist_task_create(&target, &fields)
        })?;
        let id = task.id.clone();
        self.columns[idx].tasks.push(task);
        order::reindex(&mut self.columns[idx].tasks);
        debug!(task = %id, column = %target, "task created");
        Ok(id)
    }

    pub fn update_task(&mut self, task_id: &str, mut patch: TaskPatch) -> Result<(), StoreError> {
        if let Some(title) = patch.title.as_mut() {
            *title = non_empty(title)?;
        }
        let snapshot = self.snapshot();
        let task = self
            .columns
            .iter_mut()
            .chain(self.archived_columns.iter_mut())
            .flat_map(|c| c.tasks.iter_mut())
            .chain(self.archived_tasks.iter_mut())
            .find(|t| t.id == task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
        task.apply(&patch);
        self.persist("update task", snapshot, Recovery::Restore, |b| {
            b.persist_task_update(task_id, &patch)
        })?;
        debug!(task = %task_id, "task updated");
        Ok(())
    }

    /// Deletes a task wherever it lives: active, in an archived column, or in
    /// the archived-task list.
    pub fn delete_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        let snapshot = self.snapshot();
        let mut removed = false;
        for column in self.columns.iter_mut().chain(self.archived_columns.iter_mut()) {
            if order::remove_by_id(&mut column.tasks, task_id).is_some() {
                order::reindex(&mut column.tasks);
                removed = true;
            }
        }
        if order::remove_by_id(&mut self.archived_tasks, task_id).is_some() {
            removed = true;
        }
        if !removed {
            return Err(StoreError::TaskNotFound(task_id.to_string()));
        }
        self.persist("delete task", snapshot, Recovery::Restore, |b| {
            b.persist_task_delete(task_id)
        })?;
        debug!(task = %task_id, "task deleted");
        Ok(())
    }

    /// Relocates an active task. `target_index` is clamped to the target
    /// column's bounds. Returns `false` (and persists nothing) when the task
    /// already sits at the resulting place.
    pub fn move_task(
        &mut self,
        task_id: &str,
        target_column_id: &str,
        target_index: usize,
    ) -> Result<bool, StoreError> {
        let (source_idx, task_idx) = self
            .locate_task(task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
        let target_idx = self.column_index(target_column_id)?;
        if source_idx == target_idx {
            let last = self.columns[source_idx].tasks.len() - 1;
            if target_index.min(last) == task_idx {
                return Ok(false);
            }
        }

        let snapshot = self.snapshot();
        let mut task = self.columns[source_idx].tasks.remove(task_idx);
        task.column_id = target_column_id.to_string();
        let index =
            order::insert_clamped(&mut self.columns[target_idx].tasks, task, target_index);
        order::reindex(&mut self.columns[source_idx].tasks);
        order::reindex(&mut self.columns[target_idx].tasks);
        self.persist("move task", snapshot, Recovery::Restore, |b| {
            b.persist_task_move(task_id, target_column_id, index)
        })?;
        debug!(task = %task_id, column = %target_column_id, index, "task moved");
        Ok(true)
    }

    /// Moves a task inside its own column without telling the backend. Used
    /// for live drag feedback; the drop commits through `move_task`.
    pub fn preview_move(&mut self, task_id: &str, index: usize) -> bool {
        let Some((column_idx, _)) = self.locate_task(task_id) else {
            return false;
        };
        order::move_to_index(&mut self.columns[column_idx].tasks, task_id, index)
    }

    /// Appends every task of `from_column_id` to the column at
    /// `to_column_index`, keeping their order. Returns how many moved.
    pub fn move_all_tasks(
        &mut self,
        from_column_id: &str,
        to_column_index: usize,
    ) -> Result<usize, StoreError> {
        let from_idx = self.column_index(from_column_id)?;
        if to_column_index >= self.columns.len() {
            return Err(StoreError::ColumnIndexOutOfRange(to_column_index));
        }
        if from_idx == to_column_index || self.columns[from_idx].tasks.is_empty() {
            return Ok(0);
        }

        let snapshot = self.snapshot();
        let target_id = self.columns[to_column_index].column.id.clone();
        let base = self.columns[to_column_index].tasks.len();
        let mut moved = std::mem::take(&mut self.columns[from_idx].tasks);
        for task in moved.iter_mut() {
            task.column_id = target_id.clone();
        }
        let ids: Vec<TaskId> = moved.iter().map(|t| t.id.clone()).collect();
        self.columns[to_column_index].tasks.extend(moved);
        order::reindex(&mut self.columns[to_column_index].tasks);

        self.persist("move all tasks", snapshot, Recovery::Refetch, |b| {
            for (offset, id) in ids.iter().enumerate() {
                b.persist_task_move(id, &target_id, base + offset)?;
            }
            Ok(())
        })?;
        debug!(from = %from_column_id, to = %target_id, count = ids.len(), "tasks moved");
        Ok(ids.len())
    }

    pub fn archive_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        let (column_idx, task_idx) = self
            .locate_task(task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
        let snapshot = self.snapshot();
        let mut task = self.columns[column_idx].tasks.remove(task_idx);
        task.archived = true;
        self.archived_tasks.push(task);
        order::reindex(&mut self.columns[column_idx].tasks);
        self.persist("archive task", snapshot, Recovery::Restore, |b| {
            b.persist_task_archive(task_id, true)
        })?;
        debug!(task = %task_id, "task archived");
        Ok(())
    }

    /// Archives every active task of a column. Returns how many were archived.
    pub fn archive_tasks_in_column(&mut self, column_id: &str) -> Result<usize, StoreError> {
        let idx = self.column_index(column_id)?;
        let snapshot = self.snapshot();
        let mut tasks = std::mem::take(&mut self.columns[idx].tasks);
        for task in tasks.iter_mut() {
            task.archived = true;
        }
        let count = tasks.len();
        self.archived_tasks.extend(tasks);
        self.persist("archive tasks", snapshot, Recovery::Restore, |b| {
            b.persist_task_archive_bulk(column_id, true)
        })?;
        debug!(column = %column_id, count, "column tasks archived");
        Ok(count)
    }

    /// Returns an archived task to the end of its original column, or of the
    /// first column when the original is archived or gone. Returns the id of
    /// the column it landed in.
    pub fn restore_task(&mut self, task_id: &str) -> Result<ColumnId, StoreError> {
        let archived_idx = position_of(&self.archived_tasks, task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))?;
        let original = self.archived_tasks[archived_idx].column_id.clone();
        let target_idx = match position_of(&self.columns, &original) {
            Some(idx) => idx,
            None if self.columns.is_empty() => return Err(StoreError::NoActiveColumn),
            None => 0,
        };
        let target_id = self.columns[target_idx].column.id.clone();

        let snapshot = self.snapshot();
        let mut task = self.archived_tasks.remove(archived_idx);
        task.archived = false;
        task.column_id = target_id.clone();
        let index = self.columns[target_idx].tasks.len();
        self.columns[target_idx].tasks.push(task);
        order::reindex(&mut self.columns[target_idx].tasks);

        let relocated = target_id != original;
        let recovery = if relocated {
            Recovery::Refetch
        } else {
            Recovery::Restore
        };
        self.persist("restore task", snapshot, recovery, |b| {
            b.persist_task_archive(task_id, false)?;
            if relocated {
                b.persist_task_move(task_id, &target_id, index)?;
            }
            Ok(())
        })?;
        debug!(task = %task_id, column = %target_id, relocated, "task restored");
        Ok(target_id)
    }

    pub fn column_titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.title.as_str()).collect()
    }

    pub fn active_column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx).map(|c| &c.column)
    }
}

fn non_empty(title: &str) -> Result<String, StoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, MemoryBackend};
    use crate::model::{NewBoard, Priority};

    fn task_titles(store: &BoardStore<MemoryBackend>, column: usize) -> Vec<String> {
        store.columns()[column]
            .tasks
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    /// A board whose columns hold the given task titles.
    fn board_with(columns: &[(&str, &[&str])]) -> BoardStore<MemoryBackend> {
        let mut backend = MemoryBackend::default();
        let no_columns: [&str; 0] = [];
        let board = backend.doc.create_board(
            "ada",
            &NewBoard {
                title: "Test".into(),
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
        BoardStore::load(backend, &board.id).unwrap()
    }

    fn id_of(store: &BoardStore<MemoryBackend>, title: &str) -> String {
        store
            .columns()
            .iter()
            .flat_map(|c| c.tasks.iter())
            .chain(store.archived_tasks().iter())
            .find(|t| t.title == title)
            .map(|t| t.id.clone())
            .unwrap()
    }

    fn column_id(store: &BoardStore<MemoryBackend>, idx: usize) -> String {
        store.columns()[idx].column.id.clone()
    }

    fn calls(store: &BoardStore<MemoryBackend>) -> &[Call] {
        &store.backend().calls
    }

    #[test]
    fn cross_column_move() {
        let mut store = board_with(&[("To Do", &["A", "B"]), ("Done", &[])]);
        let a = id_of(&store, "A");
        let done = column_id(&store, 1);
        assert!(store.move_task(&a, &done, 0).unwrap());
        assert_eq!(task_titles(&store, 0), ["B"]);
        assert_eq!(task_titles(&store, 1), ["A"]);
        assert_eq!(store.columns()[1].tasks[0].column_id, done);
        assert_eq!(calls(&store), [Call::TaskMove(a, done, 0)]);
    }

    #[test]
    fn move_within_column_and_noop() {
        let mut store = board_with(&[("To Do", &["A", "B", "C"])]);
        let a = id_of(&store, "A");
        let todo = column_id(&store, 0);
        assert!(!store.move_task(&a, &todo, 0).unwrap());
        assert!(calls(&store).is_empty());
        assert!(store.move_task(&a, &todo, 9).unwrap());
        assert_eq!(task_titles(&store, 0), ["B", "C", "A"]);
        assert_eq!(calls(&store), [Call::TaskMove(a, todo, 2)]);
    }

    #[test]
    fn move_all_tasks_appends_in_order() {
        let mut store = board_with(&[("List1", &["X", "Y"]), ("List2", &["Z"])]);
        let list1 = column_id(&store, 0);
        assert_eq!(store.move_all_tasks(&list1, 1).unwrap(), 2);
        assert!(task_titles(&store, 0).is_empty());
        assert_eq!(task_titles(&store, 1), ["Z", "X", "Y"]);
        assert_eq!(calls(&store).len(), 2);

        store.reload().unwrap();
        assert_eq!(task_titles(&store, 1), ["Z", "X", "Y"]);
    }

    #[test]
    fn move_all_tasks_to_self_or_missing_index() {
        let mut store = board_with(&[("List1", &["X"]), ("List2", &[])]);
        let list1 = column_id(&store, 0);
        assert_eq!(store.move_all_tasks(&list1, 0).unwrap(), 0);
        assert!(matches!(
            store.move_all_tasks(&list1, 5),
            Err(StoreError::ColumnIndexOutOfRange(5))
        ));
        assert_eq!(task_titles(&store, 0), ["X"]);
        assert!(calls(&store).is_empty());
    }

    #[test]
    fn column_reorder() {
        let mut store = board_with(&[("A", &[]), ("B", &[]), ("C", &[]), ("D", &[])]);
        let c = column_id(&store, 2);
        assert!(store.move_column(&c, 0).unwrap());
        assert_eq!(store.column_titles(), ["C", "A", "B", "D"]);
        assert_eq!(calls(&store), [Call::ColumnMove(c.clone(), 0)]);

        assert!(!store.move_column(&c, 4).unwrap());
        assert_eq!(calls(&store).len(), 1);

        store.reload().unwrap();
        assert_eq!(store.column_titles(), ["C", "A", "B", "D"]);
    }

    #[test]
    fn blank_titles_are_rejected_without_persisting() {
        let mut store = board_with(&[("To Do", &["A"])]);
        let todo = column_id(&store, 0);
        assert!(matches!(
            store.create_task(Some(&todo), TaskFields::titled("   ")),
            Err(StoreError::EmptyTitle)
        ));
        assert!(matches!(store.create_column(" "), Err(StoreError::EmptyTitle)));
        assert!(matches!(
            store.update_column(&todo, ""),
            Err(StoreError::EmptyTitle)
        ));
        assert_eq!(store.total_tasks(), 1);
        assert_eq!(store.columns().len(), 1);
        assert!(calls(&store).is_empty());
    }

    #[test]
    fn create_task_defaults_to_first_column_and_medium() {
        let mut store = board_with(&[("To Do", &[]), ("Done", &[])]);
        let id = store.create_task(None, TaskFields::titled(" New ")).unwrap();
        let (column, task) = store.find_task(&id).unwrap();
        assert_eq!(column, 0);
        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn create_task_in_unknown_column() {
        let mut store = board_with(&[("To Do", &[])]);
        assert!(matches!(
            store.create_task(Some("nope"), TaskFields::titled("A")),
            Err(StoreError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn archive_then_restore_round_trip() {
        let mut store = board_with(&[("To Do", &["A", "B"]), ("Done", &["C"])]);
        let todo = column_id(&store, 0);
        let total = store.total_tasks() + store.archived_tasks().len();

        assert_eq!(store.archive_tasks_in_column(&todo).unwrap(), 2);
        assert!(task_titles(&store, 0).is_empty());
        assert_eq!(store.archived_tasks().len(), 2);
        assert_eq!(store.total_tasks() + store.archived_tasks().len(), total);

        let a = id_of(&store, "A");
        assert_eq!(store.restore_task(&a).unwrap(), todo);
        assert_eq!(task_titles(&store, 0), ["A"]);
        assert!(store.archived_tasks().iter().all(|t| t.id != a));
        assert_eq!(store.total_tasks() + store.archived_tasks().len(), total);
        assert_eq!(
            calls(&store),
            [
                Call::TaskArchiveBulk(todo.clone(), true),
                Call::TaskArchive(a, false)
            ]
        );
    }

    #[test]
    fn restore_falls_back_to_first_column_when_original_archived() {
        let mut store = board_with(&[("To Do", &[]), ("Doing", &["A"])]);
        let doing = column_id(&store, 1);
        let todo = column_id(&store, 0);
        let a = id_of(&store, "A");
        store.archive_task(&a).unwrap();
        store.archive_column(&doing, true).unwrap();
        assert_eq!(store.archived_columns().len(), 1);
        assert!(store.archived_columns()[0].tasks.is_empty());

        assert_eq!(store.restore_task(&a).unwrap(), todo);
        assert_eq!(task_titles(&store, 0), ["A"]);

        store.reload().unwrap();
        assert_eq!(task_titles(&store, 0), ["A"]);
    }

    #[test]
    fn reload_lists_archived_tasks_only_under_active_columns() {
        let mut store = board_with(&[("To Do", &[]), ("Doing", &["A"])]);
        let doing = column_id(&store, 1);
        let a = id_of(&store, "A");
        store.archive_task(&a).unwrap();
        store.archive_column(&doing, true).unwrap();

        store.reload().unwrap();
        assert!(store.archived_tasks().is_empty());
        assert!(matches!(
            store.restore_task(&a),
            Err(StoreError::TaskNotFound(_))
        ));

        store.archive_column(&doing, false).unwrap();
        store.reload().unwrap();
        assert_eq!(store.archived_tasks().len(), 1);
        assert_eq!(store.restore_task(&a).unwrap(), doing);
    }

    #[test]
    fn archive_column_preserves_task_count_and_restores() {
        let mut store = board_with(&[("To Do", &["A", "B"]), ("Done", &[])]);
        let todo = column_id(&store, 0);
        store.archive_column(&todo, true).unwrap();
        assert_eq!(store.column_titles(), ["Done"]);
        assert_eq!(store.archived_columns()[0].tasks.len(), 2);

        store.archive_column(&todo, false).unwrap();
        assert_eq!(store.column_titles(), ["Done", "To Do"]);
        assert_eq!(store.columns()[1].tasks.len(), 2);
        assert!(store.archived_columns().is_empty());
    }

    #[test]
    fn delete_task_removes_from_archive_view() {
        let mut store = board_with(&[("To Do", &["A", "B"])]);
        let a = id_of(&store, "A");
        store.archive_task(&a).unwrap();
        store.delete_task(&a).unwrap();
        assert!(store.archived_tasks().is_empty());
        assert!(matches!(
            store.delete_task(&a),
            Err(StoreError::TaskNotFound(_))
        ));
    }

    #[test]
    fn delete_column_drops_tasks() {
        let mut store = board_with(&[("To Do", &["A"]), ("Done", &[])]);
        let todo = column_id(&store, 0);
        store.delete_column(&todo).unwrap();
        assert_eq!(store.column_titles(), ["Done"]);
        store.reload().unwrap();
        assert_eq!(store.total_tasks(), 0);
    }

    #[test]
    fn copy_column_lands_after_source() {
        let mut store = board_with(&[("To Do", &["A", "B"]), ("Done", &[])]);
        let todo = column_id(&store, 0);
        let copy = store.copy_column(&todo).unwrap();
        assert_eq!(store.column_titles(), ["To Do", "To Do (copy)", "Done"]);
        assert_eq!(column_id(&store, 1), copy);
        assert_eq!(task_titles(&store, 1), ["A", "B"]);

        store.reload().unwrap();
        assert_eq!(store.column_titles(), ["To Do", "To Do (copy)", "Done"]);
        assert_eq!(task_titles(&store, 1), ["A", "B"]);
    }

    #[test]
    fn update_task_patches_fields() {
        let mut store = board_with(&[("To Do", &["A"])]);
        let a = id_of(&store, "A");
        store
            .update_task(
                &a,
                TaskPatch {
                    title: Some(" Renamed ".into()),
                    priority: Some(Priority::High),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let (_, task) = store.find_task(&a).unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.priority, Priority::High);
        assert!(matches!(
            store.update_task(
                &a,
                TaskPatch {
                    title: Some("".into()),
                    ..TaskPatch::default()
                }
            ),
            Err(StoreError::EmptyTitle)
        ));
    }

    #[test]
    fn failed_persist_rolls_back_single_call() {
        let mut store = board_with(&[("To Do", &["A", "B"]), ("Done", &[])]);
        let before = store.columns().to_vec();
        store.backend.fail_after = Some(0);
        let a = id_of(&store, "A");
        let done = column_id(&store, 1);

        let err = store.move_task(&a, &done, 0).unwrap_err();
        assert!(matches!(err, StoreError::Persistence { op: "move task", .. }));
        assert_eq!(store.columns(), before.as_slice());

        assert!(store.archive_tasks_in_column(&column_id(&store, 0)).is_err());
        assert_eq!(store.columns(), before.as_slice());
        assert!(store.archived_tasks().is_empty());
    }

    #[test]
    fn failed_bulk_move_refetches_partial_state() {
        let mut store = board_with(&[("List1", &["X", "Y"]), ("List2", &[])]);
        store.backend.fail_after = Some(1);
        let list1 = column_id(&store, 0);

        assert!(store.move_all_tasks(&list1, 1).is_err());
        // the first move reached the backend, the second did not
        assert_eq!(task_titles(&store, 0), ["Y"]);
        assert_eq!(task_titles(&store, 1), ["X"]);
    }

    #[test]
    fn update_board_title() {
        let mut store = board_with(&[]);
        store
            .update_board(BoardPatch {
                title: Some("Renamed".into()),
                color: Some("green".into()),
                ..BoardPatch::default()
            })
            .unwrap();
        assert_eq!(store.board().title, "Renamed");
        store.reload().unwrap();
        assert_eq!(store.board().color, "green");
        assert!(matches!(
            store.update_board(BoardPatch {
                title: Some(" ".into()),
                ..BoardPatch::default()
            }),
            Err(StoreError::EmptyTitle)
        ));
    }

    #[test]
    fn preview_move_does_not_persist() {
        let mut store = board_with(&[("To Do", &["A", "B", "C"])]);
        let c = id_of(&store, "C");
        assert!(store.preview_move(&c, 0));
        assert_eq!(task_titles(&store, 0), ["C", "A", "B"]);
        assert!(calls(&store).is_empty());
    }

    #[test]
    fn open_board_switches_and_failure_keeps_state() {
        let mut store = board_with(&[("To Do", &["A"])]);
        let first = store.board().id.clone();
        let other = store
            .backend_mut()
            .persist_board_create("ada", &NewBoard {
                title: "Other".into(),
                ..NewBoard::default()
            })
            .unwrap();
        store.open_board(&other.id).unwrap();
        assert_eq!(store.board().title, "Other");
        assert_eq!(store.columns().len(), 4);

        assert!(store.open_board("missing").is_err());
        assert_eq!(store.board().id, other.id);
        store.open_board(&first).unwrap();
        assert_eq!(task_titles(&store, 0), ["A"]);
    }
}
