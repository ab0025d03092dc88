use std::path::{Path, PathBuf};

use crate::io::recovery;
use crate::io::task_file::{FileOptions, TaskFileError, load_tasks, save_lines};
use crate::model::task::{DisplayContext, Task, sort_by_deadline};
use crate::ops::sequence::{Clock, DisplaySequence, display_sequence};
use crate::parse::{parse_line, serialize_tasks};

/// Receives load, save and add failures. Errors never propagate past the
/// container; the handler is the only place they surface.
pub type ErrorHandler = Box<dyn FnMut(&TaskFileError) + Send>;

/// The live, deadline-ordered task list backing one task file.
///
/// Every mutation leaves `records()` sorted by `Task::compare_key`.
pub struct TaskContainer {
    source: PathBuf,
    tasks: Vec<Task>,
    context: DisplayContext,
    options: FileOptions,
    on_error: ErrorHandler,
}

impl TaskContainer {
    /// Create an empty container with no active source.
    pub fn new(on_error: impl FnMut(&TaskFileError) + Send + 'static) -> Self {
        TaskContainer {
            source: PathBuf::new(),
            tasks: Vec::new(),
            context: DisplayContext::default(),
            options: FileOptions::default(),
            on_error: Box::new(on_error),
        }
    }

    pub fn with_options(mut self, options: FileOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `context`'s column gap. Its topic width is recomputed on load.
    pub fn with_context(mut self, context: DisplayContext) -> Self {
        self.context = context;
        self
    }

    // -----------------------------------------------------------------------
    // File operations
    // -----------------------------------------------------------------------

    /// Replace the whole collection with the contents of `path`, which
    /// becomes the active source. On failure the collection is emptied.
    pub fn load_from(&mut self, path: impl AsRef<Path>) {
        self.source = path.as_ref().to_path_buf();
        match load_tasks(&self.source, &self.options, &mut self.context) {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => {
                self.tasks.clear();
                self.context.reset();
                (self.on_error)(&e);
            }
        }
    }

    /// Reload the active source, dropping unsaved changes.
    pub fn refresh(&mut self) {
        let source = self.source.clone();
        self.load_from(source);
    }

    /// Write the collection, in its current order, to the active source.
    pub fn save(&mut self) {
        let destination = self.source.clone();
        self.save_to(&destination);
    }

    /// Write the collection to `path` without changing the active source.
    pub fn save_to(&mut self, path: impl AsRef<Path>) {
        let lines = serialize_tasks(&self.tasks);
        if let Err(e) = save_lines(path.as_ref(), lines, &self.options) {
            (self.on_error)(&e);
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Parse `text` as one storage line and insert it.
    ///
    /// Returns the new task and its rank in deadline order. On a malformed
    /// line the handler is called and the collection is left untouched.
    pub fn add_from_text(&mut self, text: &str) -> Option<(&Task, usize)> {
        let sequence_id = self.next_sequence_id();
        let task = match parse_line(sequence_id, text, &mut self.context) {
            Ok(task) => task,
            Err(e) => {
                (self.on_error)(&TaskFileError::Format(e));
                return None;
            }
        };

        self.tasks.push(task);
        sort_by_deadline(&mut self.tasks);
        let rank = self.position(sequence_id)?;
        Some((&self.tasks[rank], rank))
    }

    /// Remove the task with this id. Unknown ids are ignored.
    pub fn remove(&mut self, sequence_id: i64) -> Option<Task> {
        let idx = self.position(sequence_id)?;
        let task = self.tasks.remove(idx);
        if self.options.recovery_log {
            recovery::log_task_deletion(&self.source, &task);
        }
        Some(task)
    }

    /// Flip completion of the task with this id, returning its new state.
    /// Order does not depend on completion, so no re-sort is needed.
    pub fn toggle(&mut self, sequence_id: i64) -> Option<bool> {
        let idx = self.position(sequence_id)?;
        let task = &mut self.tasks[idx];
        task.toggle_done();
        Some(task.done)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn records(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, sequence_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.sequence_id == sequence_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn context(&self) -> &DisplayContext {
        &self.context
    }

    pub fn options(&self) -> &FileOptions {
        &self.options
    }

    /// Rendered rows for the whole collection, with the "now" divider.
    pub fn display(&self, clock: &dyn Clock) -> DisplaySequence<'_> {
        display_sequence(&self.tasks, &self.context, clock)
    }

    fn position(&self, sequence_id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.sequence_id == sequence_id)
    }

    /// The collection size, unless a removal left that id in use; then one
    /// past the largest id.
    fn next_sequence_id(&self) -> i64 {
        let len = self.tasks.len() as i64;
        if self.position(len).is_none() {
            return len;
        }
        self.tasks
            .iter()
            .map(|t| t.sequence_id)
            .max()
            .map_or(len, |max| max + 1)
    }
}
