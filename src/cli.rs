use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Kanban task boards in the terminal")]
pub struct Cli {
    /// Board id to work on (defaults to your newest board)
    #[arg(long, global = true)]
    pub board: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project workspace with one board in the current directory
    Init {
        /// Optional board title
        #[arg(long)]
        name: Option<String>,
    },
    /// List your boards
    Boards {
        /// Include archived boards
        #[arg(long)]
        all: bool,
    },
    /// Create, edit, archive or delete boards
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },
    /// Show the columns and tasks of the board
    List {
        /// Only show tasks whose title or description contains this text
        #[arg(long, short = 'q')]
        query: Option<String>,
        /// Only show this column id
        #[arg(long)]
        column: Option<String>,
        /// Show archived columns and tasks instead
        #[arg(long)]
        archived: bool,
    },
    /// Add a new task
    Add {
        /// Title of the task
        title: String,
        /// Column id to place the task (defaults to first column)
        #[arg(long)]
        column: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Edit an existing task
    Edit {
        /// Task id to edit
        task_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
        /// Clear the description
        #[arg(long)]
        clear_description: bool,
        /// Clear the assignee
        #[arg(long)]
        clear_assignee: bool,
        /// Clear the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Move a task to a column
    Move {
        /// Task id to move
        task_id: String,
        /// Destination column id
        column_id: String,
        /// Position in the destination column (defaults to the end)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Archive a task
    Archive {
        /// Task id to archive
        task_id: String,
    },
    /// Restore an archived task
    Restore {
        /// Task id to restore
        task_id: String,
    },
    /// Delete a task permanently
    Delete {
        /// Task id to delete
        task_id: String,
    },
    /// Manage the columns of the board
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },
    /// Launch the interactive board
    Tui,
}

#[derive(clap::Args, Debug, Default)]
pub struct TaskArgs {
    /// Description
    #[arg(long)]
    pub description: Option<String>,
    /// Assignee name or email
    #[arg(long)]
    pub assignee: Option<String>,
    /// Due date in YYYY-MM-DD format
    #[arg(long)]
    pub due: Option<String>,
    /// Priority: low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    /// Labels as name:color (repeatable)
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,
    /// Checklist items, prefix with [x] when done (repeatable)
    #[arg(long = "check")]
    pub checklist: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Create a board with the default columns
    New {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Edit the selected board
    Edit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Archive the selected board
    Archive,
    /// Restore an archived board
    Restore,
    /// Delete the selected board with all its columns and tasks
    Delete,
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// Append a column
    Add { title: String },
    /// Rename a column
    Rename { column_id: String, title: String },
    /// Move a column to a position (0-based)
    Move { column_id: String, index: usize },
    /// Archive a column with its tasks
    Archive { column_id: String },
    /// Restore an archived column
    Restore { column_id: String },
    /// Delete a column and its tasks
    Delete { column_id: String },
    /// Copy a column and its tasks
    Copy { column_id: String },
    /// Move every task of a column to the column at a position (0-based)
    MoveAll { column_id: String, index: usize },
    /// Archive every task of a column
    ArchiveTasks { column_id: String },
}
