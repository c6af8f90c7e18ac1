use crate::model::{
    Board, BoardPatch, Column, ColumnWithTasks, NewBoard, Task, TaskFields, TaskPatch,
};
use anyhow::Result;

/// Data-access collaborator behind the board store.
///
/// Fetches return entities in display order. Every `persist_*` call is a
/// single request against the source of truth; the store has already
/// applied the same change locally when it calls them.
pub trait Backend {
    fn fetch_boards(&self, user_id: &str) -> Result<Vec<Board>>;
    fn fetch_board(&self, board_id: &str) -> Result<Board>;
    fn fetch_columns_with_tasks(&self, board_id: &str) -> Result<Vec<ColumnWithTasks>>;
    fn fetch_archived_columns(&self, board_id: &str) -> Result<Vec<ColumnWithTasks>>;
    fn fetch_archived_tasks(&self, board_id: &str) -> Result<Vec<Task>>;

    fn persist_board_create(&mut self, user_id: &str, board: &NewBoard) -> Result<Board>;
    fn persist_board_update(&mut self, board_id: &str, patch: &BoardPatch) -> Result<()>;
    fn persist_board_archive(&mut self, board_id: &str, archived: bool) -> Result<()>;
    fn persist_board_delete(&mut self, board_id: &str) -> Result<()>;

    fn persist_column_create(&mut self, board_id: &str, title: &str) -> Result<Column>;
    fn persist_column_update(&mut self, column_id: &str, title: &str) -> Result<()>;
    fn persist_column_move(&mut self, column_id: &str, new_index: usize) -> Result<()>;
    fn persist_column_archive(&mut self, column_id: &str, archived: bool) -> Result<()>;
    fn persist_column_delete(&mut self, column_id: &str) -> Result<()>;

    fn persist_task_create(&mut self, column_id: &str, fields: &TaskFields) -> Result<Task>;
    fn persist_task_update(&mut self, task_id: &str, patch: &TaskPatch) -> Result<()>;
    fn persist_task_move(
        &mut self,
        task_id: &str,
        target_column_id: &str,
        target_index: usize,
    ) -> Result<()>;
    fn persist_task_archive(&mut self, task_id: &str, archived: bool) -> Result<()>;
    fn persist_task_archive_bulk(&mut self, column_id: &str, archived: bool) -> Result<()>;
    fn persist_task_delete(&mut self, task_id: &str) -> Result<()>;
}

/// Identity collaborator.
pub trait Identity {
    fn current_user_id(&self) -> Result<String>;
}
