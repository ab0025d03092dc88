use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::task::{DEFAULT_DUE_TIME, DisplayContext, Task, sort_by_deadline};

/// Layout quoted in format errors.
pub const EXPECTED_LAYOUT: &str = "MM/DD,[HH:MM],topic,description,0|1";

/// The whole-line grammar. Fields are trimmed and re-joined before matching,
/// so the pattern never sees surrounding whitespace. The `/` and `:`
/// separators are optional on input. Text fields never span a line break.
static LINE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<month>0[1-9]|1[0-2])/?(?P<day>0[1-9]|[12][0-9]|3[01]),(?:(?P<hour>[01][0-9]|2[0-3]):?(?P<minute>[0-5][0-9]))?,(?P<topic>[^,"\r\n]*),(?P<description>[^,"\r\n]*),(?P<status>[01])$"#,
    )
    .expect("line grammar is a valid regex")
});

/// A line that does not describe a valid task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line} is not properly formatted, expected `{}`", EXPECTED_LAYOUT)]
    Grammar { line: usize },
    #[error("line {line}: {field} {value} is out of range")]
    OutOfRange {
        line: usize,
        field: &'static str,
        value: u16,
    },
}

impl FormatError {
    /// 1-based line number the error refers to
    pub fn line(&self) -> usize {
        match self {
            FormatError::Grammar { line } | FormatError::OutOfRange { line, .. } => *line,
        }
    }

    /// Move the reported line down by `by` (lines skipped before parsing).
    fn shifted(self, by: usize) -> Self {
        match self {
            FormatError::Grammar { line } => FormatError::Grammar { line: line + by },
            FormatError::OutOfRange { line, field, value } => FormatError::OutOfRange {
                line: line + by,
                field,
                value,
            },
        }
    }
}

/// Parse one storage line into a task.
///
/// The line is validated as a whole before any field is extracted. A blank
/// time field means end of day (`23:59`). The task's topic widens
/// `context` if it is the longest seen so far.
pub fn parse_line(
    sequence_id: i64,
    raw: &str,
    context: &mut DisplayContext,
) -> Result<Task, FormatError> {
    let line = usize::try_from(sequence_id + 1).unwrap_or(0);

    let normalized = raw
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",");
    let caps = LINE_GRAMMAR
        .captures(&normalized)
        .ok_or(FormatError::Grammar { line })?;

    let month = number(&caps, "month", line)?;
    let day = number(&caps, "day", line)?;
    check_range(line, "month", month, 1, 12)?;
    check_range(line, "day", day, 1, 31)?;

    let due_time = if caps.name("hour").is_some() {
        let hour = number(&caps, "hour", line)?;
        let minute = number(&caps, "minute", line)?;
        check_range(line, "hour", hour, 0, 23)?;
        check_range(line, "minute", minute, 0, 59)?;
        hour * 100 + minute
    } else {
        DEFAULT_DUE_TIME
    };

    let topic = caps["topic"].to_string();
    let description = caps["description"].to_string();
    let done = &caps["status"] == "1";

    context.observe_topic(&topic);
    Ok(Task::new(
        sequence_id,
        month * 100 + day,
        due_time,
        topic,
        description,
        done,
    ))
}

/// Parse a whole task file. Resets `context`, skips the first line when
/// `skip_header` is set, stops at the first bad line and returns the tasks in
/// deadline order. Error line numbers count physical lines, header included.
pub fn parse_lines(
    source: &str,
    skip_header: bool,
    context: &mut DisplayContext,
) -> Result<Vec<Task>, FormatError> {
    context.reset();
    let offset = usize::from(skip_header);

    let mut tasks = Vec::new();
    for (idx, line) in source.lines().skip(offset).enumerate() {
        let task = parse_line(idx as i64, line, context).map_err(|e| e.shifted(offset))?;
        tasks.push(task);
    }

    sort_by_deadline(&mut tasks);
    Ok(tasks)
}

/// Check every line and report all failures instead of stopping at the first.
pub fn validate_lines(source: &str, skip_header: bool) -> Vec<FormatError> {
    let offset = usize::from(skip_header);
    let mut scratch = DisplayContext::default();
    source
        .lines()
        .skip(offset)
        .enumerate()
        .filter_map(|(idx, line)| parse_line(idx as i64, line, &mut scratch).err())
        .map(|e| e.shifted(offset))
        .collect()
}

fn number(caps: &Captures<'_>, name: &str, line: usize) -> Result<u16, FormatError> {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(FormatError::Grammar { line })
}

fn check_range(
    line: usize,
    field: &'static str,
    value: u16,
    min: u16,
    max: u16,
) -> Result<(), FormatError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FormatError::OutOfRange { line, field, value })
    }
}
