use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::model::task::Task;

/// Size of the recovery log above which old entries are trimmed (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this are dropped when the log is trimmed.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// File name of the log, created next to the task file.
const LOG_FILE_NAME: &str = ".taskmaster-recovery.log";

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- taskmaster recovery log: append-only error recovery data
     Lines that failed to load, saves that failed to write and removed
     tasks are kept here. View with: tm recovery
     Safe to delete. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    Parser,
    Write,
    Delete,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Directory holding the recovery log for a given task file.
pub fn log_dir_for(task_file: &Path) -> PathBuf {
    match task_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE_NAME)
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = log_dir_for(path);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Format this entry as a markdown block for the recovery log.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} - {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        // Body as fenced code block
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }

    /// Serialize to JSON value for `tm recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and printed to stderr.
pub fn log_recovery(dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(dir, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        trim_old_entries(&path);
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }

    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Drop entries older than `PRUNE_AGE_DAYS`. Best effort.
fn trim_old_entries(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);

    if trimmed.len() < content.len()
        && let Ok(mut f) = File::create(path)
    {
        let _ = f.write_all(trimmed.as_bytes());
    }
}

/// Record a failed load, keeping the offending line.
pub fn log_parse_failure(task_file: &Path, error: &dyn fmt::Display, line: Option<&str>) {
    let mut entry = RecoveryEntry::new(RecoveryCategory::Parser, "load failed")
        .field("Source", task_file.display())
        .field("Error", error);
    if let Some(line) = line {
        entry = entry.body(line);
    }
    log_recovery(&log_dir_for(task_file), entry);
}

/// Record a failed save. The body holds everything that would have been
/// written so it can be restored by hand.
pub fn log_write_failure(task_file: &Path, error: &dyn fmt::Display, content: &str) {
    log_recovery(
        &log_dir_for(task_file),
        RecoveryEntry::new(RecoveryCategory::Write, "save failed")
            .field("Target", task_file.display())
            .field("Error", error)
            .body(content),
    );
}

/// Record a removed task.
pub fn log_task_deletion(task_file: &Path, task: &Task) {
    log_recovery(
        &log_dir_for(task_file),
        RecoveryEntry::new(
            RecoveryCategory::Delete,
            format!("task {} removed", task.sequence_id),
        )
        .field("Source", task_file.display())
        .body(task.format_storage()),
    );
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries from the log file, most recent first.
pub fn read_recovery_entries(dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let path = recovery_log_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

/// Parse all entries from the log content string.
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if line == "---" && !in_code_block {
                break;
            }

            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }

            let trimmed = line.trim();
            if let Some((key, value)) = trimmed.split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> - <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" - ")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);

    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;

    Some((timestamp, category, description.to_string()))
}

/// Remove entries with timestamps before `cutoff` from the raw content.
/// Preserves the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current_entry = String::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            if let Some(ts) = current_timestamp
                && ts >= *cutoff
            {
                result.push_str(&current_entry);
            }
            current_entry.clear();
            current_timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current_entry.push_str(line);
        current_entry.push('\n');
    }

    if let Some(ts) = current_timestamp
        && ts >= *cutoff
    {
        result.push_str(&current_entry);
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
