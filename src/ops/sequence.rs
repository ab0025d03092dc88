use std::slice;

use chrono::{Local, NaiveDateTime};

use crate::model::task::{DisplayContext, Task};

/// Source of the current wall-clock time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// One rendered row of a task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow<'a> {
    /// The divider between past and upcoming deadlines
    Now(String),
    Task(&'a Task, String),
}

impl<'a> DisplayRow<'a> {
    pub fn text(&self) -> &str {
        match self {
            DisplayRow::Now(text) | DisplayRow::Task(_, text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            DisplayRow::Now(text) | DisplayRow::Task(_, text) => text,
        }
    }

    pub fn task(&self) -> Option<&'a Task> {
        match self {
            DisplayRow::Task(task, _) => Some(*task),
            DisplayRow::Now(_) => None,
        }
    }
}

/// Text of the "now" divider.
pub fn now_line(now: &Task) -> String {
    format!("----- Now is {} {} -----", now.date_label(), now.time_label())
}

/// Lazily renders sorted tasks, inserting the "now" divider once, right
/// before the first task due after the clock's current time.
#[derive(Debug)]
pub struct DisplaySequence<'a> {
    tasks: slice::Iter<'a, Task>,
    context: DisplayContext,
    now: Task,
    marker_pending: bool,
    held: Option<&'a Task>,
}

/// Build the display sequence for `tasks`, which must already be in
/// deadline order.
pub fn display_sequence<'a>(
    tasks: &'a [Task],
    context: &DisplayContext,
    clock: &dyn Clock,
) -> DisplaySequence<'a> {
    DisplaySequence {
        tasks: tasks.iter(),
        context: *context,
        now: Task::now_marker(clock.now()),
        marker_pending: true,
        held: None,
    }
}

impl<'a> DisplaySequence<'a> {
    /// The rows as plain strings.
    pub fn into_lines(self) -> impl Iterator<Item = String> + 'a {
        self.map(DisplayRow::into_text)
    }

    fn row(&self, task: &'a Task) -> DisplayRow<'a> {
        DisplayRow::Task(task, task.format_display(&self.context))
    }
}

impl<'a> Iterator for DisplaySequence<'a> {
    type Item = DisplayRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(task) = self.held.take() {
            return Some(self.row(task));
        }

        let task = self.tasks.next()?;
        if self.marker_pending && self.now.compare_key() < task.compare_key() {
            self.marker_pending = false;
            self.held = Some(task);
            return Some(DisplayRow::Now(now_line(&self.now)));
        }
        Some(self.row(task))
    }
}
