use chrono::NaiveDate;

use crate::models::{Category, Task};

/// How a task's due date relates to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// No due date set.
    Unscheduled,
    /// The task is in Done; its date no longer matters.
    Finished,
    /// Past due by this many days.
    Overdue(i64),
    Today,
    /// Due in this many days.
    Upcoming(i64),
}

impl DueStatus {
    /// Classifies `task` relative to `today`.
    pub fn of(task: &Task, today: NaiveDate) -> DueStatus {
        if task.category == Category::Done {
            return DueStatus::Finished;
        }
        let Some(due) = task.due_date else {
            return DueStatus::Unscheduled;
        };
        let days_left = (due - today).num_days();
        if days_left < 0 {
            DueStatus::Overdue(days_left.abs())
        } else if days_left == 0 {
            DueStatus::Today
        } else {
            DueStatus::Upcoming(days_left)
        }
    }

    pub fn label(&self) -> String {
        match self {
            DueStatus::Unscheduled | DueStatus::Finished => String::new(),
            DueStatus::Overdue(days) => format!("{}d overdue", days),
            DueStatus::Today => "Today".to_string(),
            DueStatus::Upcoming(days) => format!("{}d", days),
        }
    }

    /// Overdue or due today.
    pub fn is_pressing(&self) -> bool {
        matches!(self, DueStatus::Overdue(_) | DueStatus::Today)
    }
}
