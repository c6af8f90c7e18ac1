mod backend;
mod cli;
mod commands;
mod config;
mod drag;
mod filter;
mod forms;
mod logging;
mod model;
mod order;
mod storage;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use commands::Session;
use config::Config;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::load()?;
    let _guard = logging::init(&config.log_filter(), &storage::global_data_dir()?.join("logs"))?;

    match args.command.unwrap_or(Command::Tui) {
        Command::Init { name } => commands::init(config, name),
        command => {
            let session = Session::open(config)?;
            tracing::debug!(
                user = %session.user,
                path = %session.location.path.display(),
                "session opened"
            );
            dispatch(&session, args.board.as_deref(), command)
        }
    }
}

fn dispatch(session: &Session, board: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Init { name } => commands::init(session.config.clone(), name),
        Command::Boards { all } => commands::boards(session, all),
        Command::Board { command } => commands::board(session, board, command),
        Command::List {
            query,
            column,
            archived,
        } => commands::list(session, board, query, column, archived),
        Command::Add {
            title,
            column,
            fields,
        } => commands::add(session, board, title, column, fields),
        Command::Edit {
            task_id,
            title,
            fields,
            clear_description,
            clear_assignee,
            clear_due,
        } => commands::edit(
            session,
            board,
            task_id,
            title,
            fields,
            clear_description,
            clear_assignee,
            clear_due,
        ),
        Command::Move {
            task_id,
            column_id,
            index,
        } => commands::move_task(session, board, task_id, column_id, index),
        Command::Archive { task_id } => commands::archive(session, board, task_id),
        Command::Restore { task_id } => commands::restore(session, board, task_id),
        Command::Delete { task_id } => commands::delete(session, board, task_id),
        Command::Column { command } => commands::column(session, board, command),
        Command::Tui => commands::tui(session, board),
    }
}
