use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::task_file::{FileOptions, TaskFileError, read_task_text};
use crate::model::config::Config;
use crate::ops::container::TaskContainer;
use crate::ops::sequence::{DisplayRow, SystemClock};
use crate::parse::validate_lines;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs to reach the task file.
struct Session {
    config: Config,
    path: PathBuf,
    options: FileOptions,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let config = match cli.config.as_deref() {
        Some(path) => config_io::read_config_from(Path::new(path))?,
        None => config_io::read_config()?,
    };

    let mut options = config.file_options();
    if cli.legacy_header {
        options.skip_header = true;
    }
    let path = PathBuf::from(cli.file.as_deref().unwrap_or(&config.storage.file));

    let session = Session {
        config,
        path,
        options,
        json: cli.json,
    };

    match cli.command.unwrap_or(Commands::List(ListArgs::default())) {
        Commands::List(args) => cmd_list(&session, args),
        Commands::Add(args) => cmd_add(&session, args),
        Commands::Toggle(args) => cmd_toggle(&session, args),
        Commands::Rm(args) => cmd_rm(&session, args),
        Commands::Check => cmd_check(&session),
        Commands::Recovery(args) => cmd_recovery(&session, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Messages the container reported since it was opened.
type ErrorSink = Arc<Mutex<Vec<String>>>;

fn new_container(session: &Session) -> (TaskContainer, ErrorSink) {
    let errors: ErrorSink = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let container = TaskContainer::new(move |e: &TaskFileError| {
        if let Ok(mut list) = sink.lock() {
            list.push(e.to_string());
        }
    })
    .with_options(session.options)
    .with_context(session.config.display_context());
    (container, errors)
}

/// Load the session's task file, failing if the container reported anything.
fn open_container(session: &Session) -> Result<(TaskContainer, ErrorSink), Box<dyn std::error::Error>> {
    let (mut container, errors) = new_container(session);
    container.load_from(&session.path);
    take_errors(&errors)?;
    Ok((container, errors))
}

/// Turn collected handler messages into a command failure.
fn take_errors(errors: &ErrorSink) -> CmdResult {
    let mut list = errors.lock().map_err(|_| "error list poisoned")?;
    if list.is_empty() {
        return Ok(());
    }
    let message = list.join("\n");
    list.clear();
    Err(message.into())
}

/// Save and surface any write failure.
fn save(container: &mut TaskContainer, errors: &ErrorSink) -> CmdResult {
    container.save();
    take_errors(errors)
}

fn unknown_id(id: i64) -> Box<dyn std::error::Error> {
    format!("no task with id {}", id).into()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &Session, args: ListArgs) -> CmdResult {
    let (container, _errors) = open_container(session)?;
    let mut rows: Vec<DisplayRow> = container.display(&SystemClock).collect();
    if args.reverse != session.config.display.newest_first {
        rows.reverse();
    }

    if session.json {
        let json: Vec<RowJson> = rows.iter().map(row_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if container.is_empty() {
        println!("No tasks in {}", session.path.display());
        return Ok(());
    }
    let max_id = container
        .records()
        .iter()
        .map(|t| t.sequence_id)
        .max()
        .unwrap_or(0);
    let width = id_width(max_id);
    for row in &rows {
        println!("{}", format_row(row, width));
    }
    Ok(())
}

fn cmd_check(session: &Session) -> CmdResult {
    let text = read_task_text(&session.path)?;
    let errors = validate_lines(&text, session.options.skip_header);

    if session.json {
        let result = CheckJson {
            valid: errors.is_empty(),
            errors: errors
                .iter()
                .map(|e| CheckErrorJson {
                    line: e.line(),
                    message: e.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if errors.is_empty() {
        println!("{}: all lines valid", session.path.display());
    } else {
        for err in &errors {
            println!("  {}", err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} malformed line(s)", errors.len()).into())
    }
}

fn cmd_recovery(session: &Session, args: RecoveryArgs) -> CmdResult {
    let dir = recovery::log_dir_for(&session.path);
    let entries = recovery::read_recovery_entries(&dir, Some(args.limit.unwrap_or(10)));

    if session.json {
        let json: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if entries.is_empty() {
        println!("No recovery entries.");
    } else {
        for entry in &entries {
            print!("{}", entry.to_markdown());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &Session, args: AddArgs) -> CmdResult {
    // A missing file is started fresh rather than reported.
    let (mut container, errors) = if session.path.exists() {
        open_container(session)?
    } else {
        new_container(session)
    };

    let Some((task, rank)) = container.add_from_text(&args.text) else {
        take_errors(&errors)?;
        return Err("task was not added".into());
    };
    let added = AddedJson {
        rank,
        task: task_to_json(task),
    };

    container.save_to(&session.path);
    take_errors(&errors)?;

    if session.json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        println!("Added task {} at position {}", added.task.id, rank + 1);
    }
    Ok(())
}

fn cmd_toggle(session: &Session, args: IdArgs) -> CmdResult {
    let (mut container, errors) = open_container(session)?;
    let done = container.toggle(args.id).ok_or_else(|| unknown_id(args.id))?;
    save(&mut container, &errors)?;

    let state = if done { "done" } else { "not done" };
    println!("Task {} marked {}", args.id, state);
    Ok(())
}

fn cmd_rm(session: &Session, args: IdArgs) -> CmdResult {
    let (mut container, errors) = open_container(session)?;
    let task = container.remove(args.id).ok_or_else(|| unknown_id(args.id))?;
    save(&mut container, &errors)?;

    println!("Removed task {}: {}", args.id, task.description);
    Ok(())
}
