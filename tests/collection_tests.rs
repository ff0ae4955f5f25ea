use taskboard::collection::CategorizedTasks;
use taskboard::error::BoardError;
use taskboard::models::{Category, Task, TaskId};

fn task(id: &str, category: Category) -> Task {
    Task {
        id: TaskId::from(id),
        title: format!("Task {}", id),
        description: "desc".into(),
        category,
        due_date: None,
    }
}

fn ids(tasks: &CategorizedTasks, category: Category) -> Vec<String> {
    tasks
        .ids(category)
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

fn sample() -> CategorizedTasks {
    CategorizedTasks::from_tasks(&[
        task("a", Category::Todo),
        task("x", Category::InProgress),
        task("b", Category::Todo),
        task("d", Category::Done),
        task("c", Category::Todo),
    ])
}

#[test]
fn test_rebuild_groups_by_category_keeping_fetch_order() {
    let tasks = sample();
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "b", "c"]);
    assert_eq!(ids(&tasks, Category::InProgress), vec!["x"]);
    assert_eq!(ids(&tasks, Category::Done), vec!["d"]);
    assert_eq!(tasks.len(), 5);
}

#[test]
fn test_rebuild_is_idempotent() {
    let flat = vec![
        task("a", Category::Done),
        task("b", Category::Todo),
        task("c", Category::Done),
    ];
    let mut tasks = CategorizedTasks::from_tasks(&flat);
    let first = tasks.clone();
    tasks.rebuild_from(&flat);
    assert_eq!(tasks, first);
}

#[test]
fn test_rebuild_replaces_previous_contents() {
    let mut tasks = sample();
    tasks.rebuild_from(&[task("z", Category::Done)]);
    assert_eq!(tasks.len(), 1);
    assert!(tasks.column(Category::Todo).is_empty());
}

#[test]
fn test_rebuild_from_empty_fetch() {
    let tasks = CategorizedTasks::from_tasks(&[]);
    assert!(tasks.is_empty());
    for (_, column) in tasks.iter() {
        assert!(column.is_empty());
    }
}

#[test]
fn test_rebuild_keeps_first_of_duplicate_ids() {
    let mut dup = task("a", Category::Done);
    dup.title = "second".into();
    let tasks = CategorizedTasks::from_tasks(&[task("a", Category::Todo), dup]);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks.locate(&TaskId::from("a")), Some((Category::Todo, 0)));
}

#[test]
fn test_iter_yields_columns_in_board_order() {
    let tasks = sample();
    let order: Vec<Category> = tasks.iter().map(|(c, _)| c).collect();
    assert_eq!(order, vec![Category::Todo, Category::InProgress, Category::Done]);
}

#[test]
fn test_remove_by_id() {
    let mut tasks = sample();
    let removed = tasks.remove_by_id(&TaskId::from("b"));
    let (category, index, task) = removed.expect("task b is on the board");
    assert_eq!((category, index), (Category::Todo, 1));
    assert_eq!(task.id.as_str(), "b");
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "c"]);
    assert_eq!(tasks.len(), 4);
}

#[test]
fn test_remove_missing_id_changes_nothing() {
    let mut tasks = sample();
    let before = tasks.clone();
    assert!(tasks.remove_by_id(&TaskId::from("nope")).is_none());
    assert_eq!(tasks, before);
}

#[test]
fn test_move_within_category_forward_and_back() {
    let mut tasks = sample();
    tasks.move_within_category(Category::Todo, 0, 2).unwrap();
    assert_eq!(ids(&tasks, Category::Todo), vec!["b", "c", "a"]);
    tasks.move_within_category(Category::Todo, 2, 0).unwrap();
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "b", "c"]);
}

#[test]
fn test_move_within_category_same_index_is_identity() {
    let mut tasks = sample();
    tasks.move_within_category(Category::Todo, 1, 1).unwrap();
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "b", "c"]);
}

#[test]
fn test_move_within_category_out_of_range() {
    let mut tasks = sample();
    let err = tasks.move_within_category(Category::Todo, 0, 3).unwrap_err();
    match err {
        BoardError::IndexOutOfRange { category, index, len } => {
            assert_eq!(category, Category::Todo);
            assert_eq!(index, 3);
            assert_eq!(len, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "b", "c"]);
}

#[test]
fn test_move_across_categories_sets_category() {
    let mut tasks = sample();
    let index = tasks
        .move_across_categories(Category::Todo, 0, Category::InProgress, 0)
        .unwrap();
    assert_eq!(index, 0);
    assert_eq!(ids(&tasks, Category::Todo), vec!["b", "c"]);
    assert_eq!(ids(&tasks, Category::InProgress), vec!["a", "x"]);
    let moved = tasks.get(&TaskId::from("a")).unwrap();
    assert_eq!(moved.category, Category::InProgress);
}

#[test]
fn test_move_across_categories_clamps_target_index() {
    let mut tasks = sample();
    let index = tasks
        .move_across_categories(Category::Todo, 1, Category::Done, 99)
        .unwrap();
    assert_eq!(index, 1);
    assert_eq!(ids(&tasks, Category::Done), vec!["d", "b"]);
}

#[test]
fn test_move_across_categories_into_empty_column() {
    let mut tasks = CategorizedTasks::from_tasks(&[task("a", Category::Todo)]);
    let index = tasks
        .move_across_categories(Category::Todo, 0, Category::Done, 5)
        .unwrap();
    assert_eq!(index, 0);
    assert_eq!(ids(&tasks, Category::Done), vec!["a"]);
    assert!(tasks.column(Category::Todo).is_empty());
}

#[test]
fn test_move_across_categories_bad_source_index() {
    let mut tasks = sample();
    let err = tasks
        .move_across_categories(Category::Done, 4, Category::Todo, 0)
        .unwrap_err();
    assert!(matches!(err, BoardError::IndexOutOfRange { index: 4, len: 1, .. }));
    assert_eq!(tasks.len(), 5);
}

#[test]
fn test_replace_keeps_position_in_same_category() {
    let mut tasks = sample();
    let mut edited = task("b", Category::Todo);
    edited.title = "Edited".into();
    tasks.replace(&TaskId::from("b"), edited).unwrap();
    assert_eq!(ids(&tasks, Category::Todo), vec!["a", "b", "c"]);
    assert_eq!(tasks.get(&TaskId::from("b")).unwrap().title, "Edited");
}

#[test]
fn test_replace_with_new_category_appends() {
    let mut tasks = sample();
    tasks
        .replace(&TaskId::from("a"), task("a", Category::Done))
        .unwrap();
    assert_eq!(ids(&tasks, Category::Todo), vec!["b", "c"]);
    assert_eq!(ids(&tasks, Category::Done), vec!["d", "a"]);
}

#[test]
fn test_replace_at_inserts_at_index() {
    let mut tasks = sample();
    tasks
        .replace_at(&TaskId::from("a"), task("a", Category::Done), 0)
        .unwrap();
    assert_eq!(ids(&tasks, Category::Done), vec!["a", "d"]);
}

#[test]
fn test_replace_keeps_original_id() {
    let mut tasks = sample();
    tasks
        .replace(&TaskId::from("a"), task("other", Category::Todo))
        .unwrap();
    assert!(tasks.get(&TaskId::from("other")).is_none());
    assert!(tasks.get(&TaskId::from("a")).is_some());
}

#[test]
fn test_replace_missing_id_is_not_found() {
    let mut tasks = sample();
    let err = tasks
        .replace(&TaskId::from("nope"), task("nope", Category::Todo))
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound { .. }));
}

#[test]
fn test_insert_at_clamps_and_dedupes() {
    let mut tasks = sample();
    let index = tasks.insert_at(task("a", Category::Todo), 10);
    assert_eq!(index, 2);
    assert_eq!(ids(&tasks, Category::Todo), vec!["b", "c", "a"]);
    assert_eq!(tasks.len(), 5);
}
