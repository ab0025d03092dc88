pub mod line_parser;
pub mod line_serializer;

pub use line_parser::{FormatError, parse_line, parse_lines, validate_lines};
pub use line_serializer::{serialize_task, serialize_tasks};
