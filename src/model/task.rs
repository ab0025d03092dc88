use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};

use crate::util::unicode::{display_width, fit_to_width};

/// Due time assigned when a line leaves the time field blank (end of day).
pub const DEFAULT_DUE_TIME: u16 = 2359;

/// Sequence id carried by the synthetic "now" task.
pub const NOW_SEQUENCE_ID: i64 = -100;

/// Glyph shown for a completed task
pub const DONE_GLYPH: &str = "⬛";
/// Glyph shown for an open task
pub const TODO_GLYPH: &str = "⬜";

/// Spaces after each display column unless configured otherwise.
pub const DEFAULT_COLUMN_GAP: usize = 2;

/// A single task parsed from one line of the task file
#[derive(Debug, Clone)]
pub struct Task {
    /// Position of the line in the file at load time (0-indexed).
    /// Only used to break ties between identical deadlines.
    pub sequence_id: i64,
    /// Due date encoded as `MMDD`
    pub due_date: u16,
    /// Due time encoded as `HHMM` (24-hour)
    pub due_time: u16,
    /// Short label, e.g. a course or project name
    pub topic: String,
    /// What needs doing
    pub description: String,
    /// Completion flag
    pub done: bool,
}

impl Task {
    pub fn new(
        sequence_id: i64,
        due_date: u16,
        due_time: u16,
        topic: String,
        description: String,
        done: bool,
    ) -> Self {
        Task {
            sequence_id,
            due_date,
            due_time,
            topic,
            description,
            done,
        }
    }

    /// A synthetic task positioned at `now`, used to place the "now" divider.
    pub fn now_marker(now: NaiveDateTime) -> Self {
        Task::new(
            NOW_SEQUENCE_ID,
            (now.month() * 100 + now.day()) as u16,
            (now.hour() * 100 + now.minute()) as u16,
            String::new(),
            String::new(),
            false,
        )
    }

    pub fn month(&self) -> u16 {
        self.due_date / 100
    }

    pub fn day(&self) -> u16 {
        self.due_date % 100
    }

    pub fn hour(&self) -> u16 {
        self.due_time / 100
    }

    pub fn minute(&self) -> u16 {
        self.due_time % 100
    }

    /// Ordering key: earliest deadline first, file position breaks ties.
    pub fn compare_key(&self) -> (u16, u16, i64) {
        (self.due_date, self.due_time, self.sequence_id)
    }

    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }

    pub fn status_glyph(&self) -> &'static str {
        if self.done { DONE_GLYPH } else { TODO_GLYPH }
    }

    /// `MM/DD`
    pub fn date_label(&self) -> String {
        format!("{:02}/{:02}", self.month(), self.day())
    }

    /// 12-hour clock, e.g. `09:05 AM`
    pub fn time_label(&self) -> String {
        match NaiveTime::from_hms_opt(self.hour().into(), self.minute().into(), 0) {
            Some(t) => t.format("%I:%M %p").to_string(),
            None => format!("{:02}:{:02}", self.hour(), self.minute()),
        }
    }

    /// Render the fixed-width row shown in task lists.
    pub fn format_display(&self, context: &DisplayContext) -> String {
        let gap = " ".repeat(context.column_gap);
        let date = self.date_label();
        let time = self.time_label();
        let topic = fit_to_width(&self.topic, context.topic_width);
        let columns: [&str; 5] = [
            self.status_glyph(),
            &date,
            &time,
            &topic,
            &self.description,
        ];

        let mut row = String::new();
        for column in columns {
            row.push_str(column);
            row.push_str(&gap);
        }
        row.trim_end().to_string()
    }
}

/// The positional id is not persisted, so it is not part of equality:
/// a task read back from its own storage line equals the original.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.due_date == other.due_date
            && self.due_time == other.due_time
            && self.topic == other.topic
            && self.description == other.description
            && self.done == other.done
    }
}

impl Eq for Task {}

/// Sort tasks by deadline (earliest due date rule). Stable, total on
/// `compare_key`.
pub fn sort_by_deadline(tasks: &mut [Task]) {
    tasks.sort_by_key(Task::compare_key);
}

/// Column layout shared by every row rendered from one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    /// Widest topic seen since the last reset, in terminal cells
    pub topic_width: usize,
    /// Spaces after each column
    pub column_gap: usize,
}

impl Default for DisplayContext {
    fn default() -> Self {
        DisplayContext {
            topic_width: 0,
            column_gap: DEFAULT_COLUMN_GAP,
        }
    }
}

impl DisplayContext {
    pub fn with_column_gap(column_gap: usize) -> Self {
        DisplayContext {
            topic_width: 0,
            column_gap,
        }
    }

    /// Widen the topic column if `topic` does not fit. Never shrinks.
    pub fn observe_topic(&mut self, topic: &str) {
        self.topic_width = self.topic_width.max(display_width(topic));
    }

    pub fn reset(&mut self) {
        self.topic_width = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(date: u16, time: u16, topic: &str, desc: &str, done: bool) -> Task {
        Task::new(0, date, time, topic.to_string(), desc.to_string(), done)
    }

    #[test]
    fn test_labels() {
        let t = task(315, 905, "CS", "Quiz", false);
        assert_eq!(t.date_label(), "03/15");
        assert_eq!(t.time_label(), "09:05 AM");

        assert_eq!(task(1231, 0, "", "", false).time_label(), "12:00 AM");
        assert_eq!(task(1231, 1200, "", "", false).time_label(), "12:00 PM");
        assert_eq!(task(1231, 2359, "", "", false).time_label(), "11:59 PM");
    }

    #[test]
    fn test_format_display_pads_topic() {
        let t = task(315, 1330, "CS", "Read chapter 4", false);
        let ctx = DisplayContext {
            topic_width: 4,
            column_gap: 2,
        };
        assert_eq!(
            t.format_display(&ctx),
            "⬜  03/15  01:30 PM  CS    Read chapter 4"
        );
    }

    #[test]
    fn test_format_display_truncates_topic_and_trims() {
        let t = task(101, 800, "Chemistry", "", true);
        let ctx = DisplayContext {
            topic_width: 4,
            column_gap: 2,
        };
        assert_eq!(t.format_display(&ctx), "⬛  01/01  08:00 AM  Chem");
    }

    #[test]
    fn test_format_display_aligns_topic_with_tab() {
        let tabbed = task(101, 800, "A\tB", "x", false);
        let plain = task(102, 800, "Math", "y", false);
        let mut ctx = DisplayContext::default();
        ctx.observe_topic(&tabbed.topic);
        ctx.observe_topic(&plain.topic);
        assert_eq!(ctx.topic_width, 6);

        let a = tabbed.format_display(&ctx);
        let b = plain.format_display(&ctx);
        assert!(!a.contains('\t'));
        assert_eq!(a.find('x'), b.find('y'));
    }

    #[test]
    fn test_format_display_custom_gap() {
        let t = task(101, 800, "A", "b", false);
        let ctx = DisplayContext {
            topic_width: 1,
            column_gap: 1,
        };
        assert_eq!(t.format_display(&ctx), "⬜ 01/01 08:00 AM A b");
    }

    #[test]
    fn test_toggle_done() {
        let mut t = task(101, 800, "A", "b", false);
        t.toggle_done();
        assert!(t.done);
        t.toggle_done();
        assert!(!t.done);
    }

    #[test]
    fn test_sort_by_deadline_breaks_ties_by_position() {
        let mut tasks = vec![
            Task::new(0, 305, 900, "a".into(), String::new(), false),
            Task::new(1, 301, 2359, "b".into(), String::new(), false),
            Task::new(2, 305, 900, "c".into(), String::new(), false),
            Task::new(3, 301, 800, "d".into(), String::new(), false),
        ];
        sort_by_deadline(&mut tasks);
        let order: Vec<i64> = tasks.iter().map(|t| t.sequence_id).collect();
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_now_marker() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 33)
            .unwrap();
        let marker = Task::now_marker(now);
        assert_eq!(marker.compare_key(), (307, 1405, NOW_SEQUENCE_ID));
        assert!(marker.topic.is_empty());
        assert!(!marker.done);
    }

    #[test]
    fn test_equality_ignores_sequence_id() {
        let a = Task::new(0, 101, 800, "A".into(), "b".into(), false);
        let b = Task::new(7, 101, 800, "A".into(), "b".into(), false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_context_grows_and_resets() {
        let mut ctx = DisplayContext::default();
        ctx.observe_topic("ab");
        ctx.observe_topic("abcdefg");
        ctx.observe_topic("abcd");
        assert_eq!(ctx.topic_width, 7);
        ctx.reset();
        assert_eq!(ctx.topic_width, 0);
        assert_eq!(ctx.column_gap, DEFAULT_COLUMN_GAP);
    }
}
