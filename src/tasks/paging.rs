//! Client-side pagination and goal grouping over an already-fetched task
//! list. Both are pure functions recomputed on every render, nothing is
//! maintained incrementally.

use crate::provider::entities::TodoEntity;

pub const TODOS_PER_PAGE: usize = 5;

pub const NO_GOAL_LABEL: &str = "(no goal)";

#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number after clamping.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn total_pages(item_count: usize) -> usize {
    item_count.div_ceil(TODOS_PER_PAGE)
}

/// Slices one fixed-size page out of `items`, preserving order. Requested
/// pages beyond the end clamp to the last page; page 0 clamps to the first.
pub fn paginate<T>(items: &[T], requested_page: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len());
    let number = requested_page.clamp(1, total_pages.max(1));
    let first = (number - 1) * TODOS_PER_PAGE;
    let last = (first + TODOS_PER_PAGE).min(items.len());
    Page {
        items: &items[first.min(items.len())..last],
        number,
        total_pages,
        total_items: items.len(),
    }
}

/// Groups tasks by their "today's goal" label, ordered by first appearance.
/// Tasks without a goal fall into the [NO_GOAL_LABEL] bucket.
pub fn group_by_goal(todos: &[TodoEntity]) -> Vec<(String, Vec<&TodoEntity>)> {
    let mut groups: Vec<(String, Vec<&TodoEntity>)> = Vec::new();
    for todo in todos {
        let label = todo.goal_day.as_deref().unwrap_or(NO_GOAL_LABEL);
        match groups.iter_mut().find(|(key, _)| key == label) {
            Some((_, members)) => members.push(todo),
            None => groups.push((label.to_string(), vec![todo])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn todos(count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    #[test]
    fn page_count_is_ceil_of_item_count() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(5), 1);
        assert_eq!(total_pages(6), 2);
        assert_eq!(total_pages(11), 3);
    }

    #[test]
    fn pages_are_disjoint_and_order_preserving() {
        let items = todos(12);
        let mut recombined = Vec::new();
        for page in 1..=total_pages(items.len()) {
            let slice = paginate(&items, page);
            assert!(slice.items.len() <= TODOS_PER_PAGE);
            recombined.extend_from_slice(slice.items);
        }
        assert_eq!(recombined, items);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items = todos(7);
        let beyond = paginate(&items, 99);
        assert_eq!(beyond.number, 2);
        assert_eq!(beyond.items, &items[5..]);

        let zero = paginate(&items, 0);
        assert_eq!(zero.number, 1);
        assert_eq!(zero.items, &items[..5]);
    }

    #[test]
    fn empty_list_yields_one_empty_page() {
        let items: Vec<usize> = vec![];
        let page = paginate(&items, 1);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    fn todo_with_goal(goal: Option<&str>) -> TodoEntity {
        let mut todo = TodoEntity::new(Uuid::new_v4(), "task".into(), Utc::now());
        todo.goal_day = goal.map(str::to_string);
        todo
    }

    #[test]
    fn grouping_keeps_first_appearance_order() {
        let todos = vec![
            todo_with_goal(Some("rust")),
            todo_with_goal(None),
            todo_with_goal(Some("piano")),
            todo_with_goal(Some("rust")),
        ];
        let groups = group_by_goal(&todos);
        let labels = groups.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["rust", NO_GOAL_LABEL, "piano"]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].id, todos[0].id);
        assert_eq!(groups[0].1[1].id, todos[3].id);
    }
}
