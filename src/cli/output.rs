use serde::Serialize;

use crate::model::task::Task;
use crate::ops::sequence::DisplayRow;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub topic: String,
    pub description: String,
    pub done: bool,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowJson {
    Now { text: String },
    Task(TaskJson),
}

#[derive(Serialize)]
pub struct AddedJson {
    pub rank: usize,
    #[serde(flatten)]
    pub task: TaskJson,
}

#[derive(Serialize)]
pub struct CheckJson {
    pub valid: bool,
    pub errors: Vec<CheckErrorJson>,
}

#[derive(Serialize)]
pub struct CheckErrorJson {
    pub line: usize,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.sequence_id,
        date: task.date_label(),
        time: format!("{:02}:{:02}", task.hour(), task.minute()),
        topic: task.topic.clone(),
        description: task.description.clone(),
        done: task.done,
    }
}

pub fn row_to_json(row: &DisplayRow) -> RowJson {
    match row {
        DisplayRow::Now(text) => RowJson::Now { text: text.clone() },
        DisplayRow::Task(task, _) => RowJson::Task(task_to_json(task)),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Width of the id column for `max_id`.
pub fn id_width(max_id: i64) -> usize {
    max_id.max(0).to_string().len()
}

/// A display row prefixed with its task id. The divider gets a blank prefix.
pub fn format_row(row: &DisplayRow, width: usize) -> String {
    match row.task() {
        Some(task) => format!("{:>width$}  {}", task.sequence_id, row.text()),
        None => format!("{:>width$}  {}", "", row.text()),
    }
}
