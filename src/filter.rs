use crate::model::ColumnWithTasks;

/// Search projection over the board. Every column is kept; each keeps only
/// the tasks whose title or description contains `query`, ignoring case.
/// A blank query returns the columns as they are.
pub fn filter_columns(columns: &[ColumnWithTasks], query: &str) -> Vec<ColumnWithTasks> {
    if query.trim().is_empty() {
        return columns.to_vec();
    }
    columns
        .iter()
        .map(|col| ColumnWithTasks {
            column: col.column.clone(),
            tasks: col
                .tasks
                .iter()
                .filter(|t| t.matches(query))
                .cloned()
                .collect(),
        })
        .collect()
}

pub fn is_active(query: &str) -> bool {
    !query.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Task, TaskFields};

    fn board() -> Vec<ColumnWithTasks> {
        let task = |id: &str, title: &str, description: Option<&str>| {
            let mut fields = TaskFields::titled(title);
            fields.description = description.map(String::from);
            Task::new(id.into(), "c", &fields, 0)
        };
        vec![
            ColumnWithTasks {
                column: Column::new("c1".into(), "b", "To Do", 0),
                tasks: vec![
                    task("t1", "Fix login", None),
                    task("t2", "Write docs", Some("covers LOGIN flow")),
                ],
            },
            ColumnWithTasks {
                column: Column::new("c2".into(), "b", "Done", 1),
                tasks: vec![task("t3", "Release", None)],
            },
        ]
    }

    #[test]
    fn keeps_every_column_and_matching_tasks() {
        let columns = board();
        let filtered = filter_columns(&columns, "Login");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].tasks.len(), 2);
        assert!(filtered[1].tasks.is_empty());
        assert_eq!(filter_columns(&columns, "docs")[0].tasks[0].id, "t2");
    }

    #[test]
    fn filtering_then_clearing_restores_view_without_touching_source() {
        let columns = board();
        let before = columns.clone();
        let filtered = filter_columns(&columns, "release");
        assert_eq!(filtered[0].tasks.len(), 0);
        assert_eq!(columns, before);
        assert_eq!(filter_columns(&columns, "   "), before);
        assert!(!is_active(" "));
        assert!(is_active("x"));
    }
}
