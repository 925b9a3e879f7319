//! Display ordering for task lists.
//!
//! Key, compared left to right:
//! 1. incomplete before completed,
//! 2. priority rank (`High < Normal < Low < unrecognized`),
//! 3. earlier due date first.
//!
//! Sorting is stable, so tasks equal on all three keys keep input order.

use crate::model::task::Task;
use std::cmp::Ordering;

pub fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Returns a sorted copy; the input is left as is.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sort_in_place(&mut sorted);
    sorted
}

pub fn sort_in_place(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_display);
}

#[cfg(test)]
mod tests {
    use super::{compare_for_display, sort_for_display};
    use crate::model::task::{Priority, Task, TaskId};
    use chrono::{DateTime, Utc};
    use std::cmp::Ordering;

    fn task(id: &str, priority: Priority, due: &str, completed: bool) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("title {id}"),
            description: format!("description {id}"),
            due_date: due.parse::<DateTime<Utc>>().unwrap(),
            priority,
            completed,
            extra: Default::default(),
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn priority_beats_due_date() {
        let a = task("a", Priority::High, "2025-01-10T00:00:00Z", false);
        let b = task("b", Priority::Normal, "2025-01-05T00:00:00Z", false);
        assert_eq!(ids(&sort_for_display(&[a.clone(), b.clone()])), ["a", "b"]);
        assert_eq!(ids(&sort_for_display(&[b, a])), ["a", "b"]);
    }

    #[test]
    fn completion_beats_everything() {
        let a = task("a", Priority::Normal, "2025-01-10T00:00:00Z", true);
        let b = task("b", Priority::Low, "2025-01-05T00:00:00Z", false);
        assert_eq!(ids(&sort_for_display(&[a, b])), ["b", "a"]);
    }

    #[test]
    fn high_sorts_before_low_regardless_of_dates() {
        let high = task("high", Priority::High, "2030-12-31T00:00:00Z", false);
        let low = task("low", Priority::Low, "2020-01-01T00:00:00Z", false);
        assert_eq!(compare_for_display(&high, &low), Ordering::Less);
        assert_eq!(compare_for_display(&low, &high), Ordering::Greater);
    }

    #[test]
    fn unrecognized_priority_sorts_after_low() {
        let odd = task(
            "odd",
            Priority::Unrecognized("Urgent".into()),
            "2020-01-01T00:00:00Z",
            false,
        );
        let low = task("low", Priority::Low, "2030-01-01T00:00:00Z", false);
        assert_eq!(ids(&sort_for_display(&[odd, low])), ["low", "odd"]);
    }

    #[test]
    fn due_date_breaks_ties_and_full_ties_keep_input_order() {
        let later = task("later", Priority::Normal, "2025-02-01T00:00:00Z", false);
        let first = task("first", Priority::Normal, "2025-01-01T00:00:00Z", false);
        let twin = task("twin", Priority::Normal, "2025-01-01T00:00:00Z", false);
        assert_eq!(
            ids(&sort_for_display(&[later, first, twin])),
            ["first", "twin", "later"]
        );
    }

    #[test]
    fn sorting_is_idempotent() {
        let tasks = vec![
            task("1", Priority::Low, "2025-01-03T00:00:00Z", true),
            task("2", Priority::High, "2025-01-09T00:00:00Z", false),
            task("3", Priority::Normal, "2025-01-01T00:00:00Z", false),
            task("4", Priority::High, "2025-01-02T00:00:00Z", true),
            task("5", Priority::High, "2025-01-02T00:00:00Z", false),
        ];
        let once = sort_for_display(&tasks);
        let twice = sort_for_display(&once);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), ["5", "2", "3", "4", "1"]);
    }
}
