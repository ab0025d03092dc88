use crate::model::task::Task;

/// Serialize one task to its canonical storage line:
/// `MM/DD,HH:MM,topic,description,0|1`. The time is always written, so a
/// task whose time defaulted on load persists as `23:59`.
pub fn serialize_task(task: &Task) -> String {
    format!(
        "{:02}/{:02},{:02}:{:02},{},{},{}",
        task.month(),
        task.day(),
        task.hour(),
        task.minute(),
        task.topic,
        task.description,
        u8::from(task.done)
    )
}

/// Serialize tasks to storage lines, in the order given.
pub fn serialize_tasks(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(serialize_task).collect()
}

impl Task {
    /// The canonical storage line for this task.
    pub fn format_storage(&self) -> String {
        serialize_task(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::DisplayContext;
    use crate::parse::line_parser::parse_line;

    #[test]
    fn test_serialize_zero_pads() {
        let task = Task::new(0, 305, 905, "CS".into(), "Quiz".into(), false);
        assert_eq!(serialize_task(&task), "03/05,09:05,CS,Quiz,0");
    }

    #[test]
    fn test_serialize_done_flag() {
        let task = Task::new(0, 1231, 0, String::new(), "Party".into(), true);
        assert_eq!(task.format_storage(), "12/31,00:00,,Party,1");
    }

    #[test]
    fn test_defaulted_time_is_written_explicitly() {
        let mut ctx = DisplayContext::default();
        let task = parse_line(0, "04/01,,Math,HW,0", &mut ctx).unwrap();
        assert_eq!(serialize_task(&task), "04/01,23:59,Math,HW,0");
    }

    #[test]
    fn test_normalizes_compact_input() {
        let mut ctx = DisplayContext::default();
        let task = parse_line(0, " 0401 , 0730 ,Math , HW ,1", &mut ctx).unwrap();
        assert_eq!(task.format_storage(), "04/01,07:30,Math,HW,1");
    }

    #[test]
    fn test_serialized_line_parses_back() {
        let mut ctx = DisplayContext::default();
        let original = Task::new(3, 1102, 1745, "Bio".into(), "Lab write-up".into(), true);
        let reparsed = parse_line(0, &serialize_task(&original), &mut ctx).unwrap();
        assert_eq!(reparsed, original);
        assert_eq!(reparsed.sequence_id, 0);
    }

    #[test]
    fn test_serialize_tasks_keeps_order() {
        let tasks = vec![
            Task::new(1, 101, 800, "A".into(), "a".into(), false),
            Task::new(0, 102, 800, "B".into(), "b".into(), false),
        ];
        assert_eq!(
            serialize_tasks(&tasks),
            vec!["01/01,08:00,A,a,0", "01/02,08:00,B,b,0"]
        );
    }
}
