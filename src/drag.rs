//! Drag gesture bookkeeping for tasks and columns.
//!
//! A task drag runs `start` → any number of `over` → `end` (or `cancel`).
//! Hovering another task in the same column reorders the store live,
//! without persisting. Hovering another column changes nothing until the
//! drop. The drop compares the final placement with where the task was
//! picked up and persists only a real change.

use crate::backend::Backend;
use crate::model::{ColumnId, TaskId};
use crate::store::{BoardStore, StoreError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A column container, for dropping at its end or into an empty column.
    Column(ColumnId),
    Task(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: TaskId,
        origin_column: ColumnId,
        origin_index: usize,
        hover: Option<DropTarget>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        task_id: TaskId,
        column_id: ColumnId,
        index: usize,
    },
    Unchanged,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        DragController::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_task(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn hover(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Picks up an active task. Returns `false` if a drag is already running
    /// or the task is unknown.
    pub fn start<B: Backend>(&mut self, store: &BoardStore<B>, task_id: &str) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some((column_idx, task_idx)) = store.locate_task(task_id) else {
            return false;
        };
        self.state = DragState::Dragging {
            active: task_id.to_string(),
            origin_column: store.columns()[column_idx].column.id.clone(),
            origin_index: task_idx,
            hover: None,
        };
        debug!(task = %task_id, "drag started");
        true
    }

    /// Records the hover target. Returns `true` when the live preview
    /// reordered the store.
    pub fn over<B: Backend>(&mut self, store: &mut BoardStore<B>, target: DropTarget) -> bool {
        let DragState::Dragging { active, hover, .. } = &mut self.state else {
            return false;
        };
        *hover = Some(target.clone());
        let DropTarget::Task(over_id) = target else {
            return false;
        };
        if over_id == *active {
            return false;
        }
        let (Some((source, _)), Some((target_column, over_index))) =
            (store.locate_task(active), store.locate_task(&over_id))
        else {
            return false;
        };
        if source != target_column {
            return false;
        }
        store.preview_move(active, over_index)
    }

    /// Finishes the gesture. The controller is idle afterwards whatever the
    /// result.
    pub fn end<B: Backend>(
        &mut self,
        store: &mut BoardStore<B>,
        target: Option<DropTarget>,
    ) -> Result<DropOutcome, StoreError> {
        let DragState::Dragging {
            active,
            origin_column,
            origin_index,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Ok(DropOutcome::Cancelled);
        };

        let placement = target.and_then(|t| final_placement(store, &active, &t));
        let Some((column_id, index)) = placement else {
            revert(store, &active, &origin_column, origin_index);
            debug!(task = %active, "drag cancelled");
            return Ok(DropOutcome::Cancelled);
        };

        // Undo the preview so the commit below starts from the persisted
        // order; moving one item to its final index reproduces the preview.
        revert(store, &active, &origin_column, origin_index);
        if column_id == origin_column && index == origin_index {
            return Ok(DropOutcome::Unchanged);
        }
        if !store.move_task(&active, &column_id, index)? {
            return Ok(DropOutcome::Unchanged);
        }
        let index = store.locate_task(&active).map(|(_, i)| i).unwrap_or(index);
        Ok(DropOutcome::Moved {
            task_id: active,
            column_id,
            index,
        })
    }

    /// Releases the task without a target: the preview is undone.
    pub fn cancel<B: Backend>(&mut self, store: &mut BoardStore<B>) {
        if let DragState::Dragging {
            active,
            origin_column,
            origin_index,
            ..
        } = std::mem::take(&mut self.state)
        {
            revert(store, &active, &origin_column, origin_index);
            debug!(task = %active, "drag cancelled");
        }
    }
}

/// Drops a column at `target_index` of the board's column order.
pub fn drop_column<B: Backend>(
    store: &mut BoardStore<B>,
    column_id: &str,
    target_index: usize,
) -> Result<bool, StoreError> {
    store.move_column(column_id, target_index)
}

/// Column and index the active task should end at, in the current
/// (previewed) state. `None` when the target is not on the board.
fn final_placement<B: Backend>(
    store: &BoardStore<B>,
    active: &str,
    target: &DropTarget,
) -> Option<(ColumnId, usize)> {
    let (current_column, current_index) = store.locate_task(active)?;
    let current_id = store.columns()[current_column].column.id.clone();
    match target {
        DropTarget::Column(column_id) => {
            let column = store.column(column_id)?;
            if *column_id == current_id {
                Some((current_id, current_index))
            } else {
                Some((column_id.clone(), column.tasks.len()))
            }
        }
        DropTarget::Task(task_id) if task_id == active => Some((current_id, current_index)),
        DropTarget::Task(task_id) => {
            let (column_idx, index) = store.locate_task(task_id)?;
            Some((store.columns()[column_idx].column.id.clone(), index))
        }
    }
}

/// Puts the active task back at its pick-up index if a preview moved it.
fn revert<B: Backend>(store: &mut BoardStore<B>, active: &str, origin_column: &str, origin_index: usize) {
    let Some((column_idx, _)) = store.locate_task(active) else {
        return;
    };
    if store.columns()[column_idx].column.id == origin_column {
        store.preview_move(active, origin_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, MemoryBackend};
    use crate::model::{NewBoard, TaskFields};

    fn store(columns: &[(&str, &[&str])]) -> BoardStore<MemoryBackend> {
        let mut backend = MemoryBackend::default();
        let none: [&str; 0] = [];
        let board = backend.doc.create_board(
            "ada",
            &NewBoard {
                title: "Drag".into(),
                ..NewBoard::default()
            },
            &none,
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

    fn id(store: &BoardStore<MemoryBackend>, title: &str) -> String {
        store
            .columns()
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.title == title)
            .map(|t| t.id.clone())
            .unwrap()
    }

    fn titles(store: &BoardStore<MemoryBackend>, column: usize) -> Vec<String> {
        store.columns()[column]
            .tasks
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn same_column_hover_previews_then_drop_persists() {
        let mut store = store(&[("To Do", &["A", "B", "C"])]);
        let mut drag = DragController::new();
        let (a, c) = (id(&store, "A"), id(&store, "C"));
        let todo = store.columns()[0].column.id.clone();

        assert!(drag.start(&store, &a));
        assert_eq!(drag.active_task(), Some(a.as_str()));
        assert!(drag.over(&mut store, DropTarget::Task(c.clone())));
        assert_eq!(titles(&store, 0), ["B", "C", "A"]);
        assert!(store.backend().calls.is_empty());

        // After the preview the pointer sits on the dragged card itself.
        let outcome = drag.end(&mut store, Some(DropTarget::Task(a.clone()))).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                task_id: a.clone(),
                column_id: todo.clone(),
                index: 2
            }
        );
        assert_eq!(titles(&store, 0), ["B", "C", "A"]);
        assert_eq!(store.backend().calls, [Call::TaskMove(a, todo, 2)]);
        assert!(!drag.is_dragging());

        store.reload().unwrap();
        assert_eq!(titles(&store, 0), ["B", "C", "A"]);
    }

    #[test]
    fn cross_column_hover_does_not_preview() {
        let mut store = store(&[("To Do", &["A", "B"]), ("Done", &["X"])]);
        let mut drag = DragController::new();
        let (a, x) = (id(&store, "A"), id(&store, "X"));
        drag.start(&store, &a);
        assert!(!drag.over(&mut store, DropTarget::Task(x.clone())));
        assert_eq!(titles(&store, 0), ["A", "B"]);
        assert_eq!(drag.hover(), Some(&DropTarget::Task(x.clone())));

        let done = store.columns()[1].column.id.clone();
        let outcome = drag.end(&mut store, Some(DropTarget::Task(x))).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                task_id: a,
                column_id: done,
                index: 0
            }
        );
        assert_eq!(titles(&store, 0), ["B"]);
        assert_eq!(titles(&store, 1), ["A", "X"]);
    }

    #[test]
    fn drop_on_other_column_appends() {
        let mut store = store(&[("To Do", &["A", "B"]), ("Done", &["X"])]);
        let mut drag = DragController::new();
        let a = id(&store, "A");
        let done = store.columns()[1].column.id.clone();
        drag.start(&store, &a);
        drag.over(&mut store, DropTarget::Column(done.clone()));
        let outcome = drag.end(&mut store, Some(DropTarget::Column(done.clone()))).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                task_id: a.clone(),
                column_id: done.clone(),
                index: 1
            }
        );
        assert_eq!(titles(&store, 1), ["X", "A"]);
        assert_eq!(store.backend().calls, [Call::TaskMove(a, done, 1)]);
    }

    #[test]
    fn drop_on_own_column_without_change_persists_nothing() {
        let mut store = store(&[("To Do", &["A", "B"])]);
        let mut drag = DragController::new();
        let a = id(&store, "A");
        let todo = store.columns()[0].column.id.clone();
        drag.start(&store, &a);
        let outcome = drag.end(&mut store, Some(DropTarget::Column(todo))).unwrap();
        assert_eq!(outcome, DropOutcome::Unchanged);
        assert!(store.backend().calls.is_empty());
    }

    #[test]
    fn drop_on_nothing_reverts_preview() {
        let mut store = store(&[("To Do", &["A", "B", "C"])]);
        let mut drag = DragController::new();
        let (a, b) = (id(&store, "A"), id(&store, "B"));
        drag.start(&store, &a);
        drag.over(&mut store, DropTarget::Task(b));
        assert_eq!(titles(&store, 0), ["B", "A", "C"]);

        assert_eq!(drag.end(&mut store, None).unwrap(), DropOutcome::Cancelled);
        assert_eq!(titles(&store, 0), ["A", "B", "C"]);
        assert!(store.backend().calls.is_empty());
        assert_eq!(drag.active_task(), None);
    }

    #[test]
    fn unknown_target_cancels_and_cancel_reverts() {
        let mut store = store(&[("To Do", &["A", "B"])]);
        let mut drag = DragController::new();
        let (a, b) = (id(&store, "A"), id(&store, "B"));
        drag.start(&store, &a);
        let outcome = drag
            .end(&mut store, Some(DropTarget::Task("ghost".into())))
            .unwrap();
        assert_eq!(outcome, DropOutcome::Cancelled);

        drag.start(&store, &a);
        drag.over(&mut store, DropTarget::Task(b));
        drag.cancel(&mut store);
        assert_eq!(titles(&store, 0), ["A", "B"]);
        assert_eq!(*drag.state(), DragState::Idle);
    }

    #[test]
    fn failed_commit_clears_gesture_and_rolls_back() {
        let mut store = store(&[("To Do", &["A"]), ("Done", &[])]);
        let mut drag = DragController::new();
        let a = id(&store, "A");
        let done = store.columns()[1].column.id.clone();
        drag.start(&store, &a);
        store.backend_mut().fail_after = Some(0);
        assert!(drag
            .end(&mut store, Some(DropTarget::Column(done)))
            .is_err());
        assert!(!drag.is_dragging());
        assert_eq!(titles(&store, 0), ["A"]);
        assert!(titles(&store, 1).is_empty());
    }

    #[test]
    fn second_start_is_ignored_and_idle_ops_are_noops() {
        let mut store = store(&[("To Do", &["A", "B"])]);
        let mut drag = DragController::new();
        let (a, b) = (id(&store, "A"), id(&store, "B"));
        assert!(!drag.over(&mut store, DropTarget::Task(b.clone())));
        assert!(!drag.start(&store, "ghost"));
        assert!(drag.start(&store, &a));
        assert!(!drag.start(&store, &b));
        assert_eq!(drag.active_task(), Some(a.as_str()));
    }

    #[test]
    fn column_drop_reorders() {
        let mut store = store(&[("A", &[]), ("B", &[]), ("C", &[]), ("D", &[])]);
        let c = store.columns()[2].column.id.clone();
        assert!(drop_column(&mut store, &c, 0).unwrap());
        assert_eq!(store.column_titles(), ["C", "A", "B", "D"]);
    }
}
