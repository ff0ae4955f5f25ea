use tempfile::tempdir;

use taskboard::error::BoardError;
use taskboard::models::{Category, TaskId, TaskInput, TaskPatch};
use taskboard::storage::temp_path;
use taskboard::store::{FileTaskStore, TaskStore};

fn input(title: &str, category: Category) -> TaskInput {
    TaskInput {
        title: title.into(),
        description: "desc".into(),
        category,
        due_date: None,
    }
}

#[tokio::test]
async fn test_missing_file_is_an_empty_board() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    assert!(store.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_persists_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("tasks.json");

    let created = FileTaskStore::new(&path)
        .create_task(&input("Write report", Category::Todo))
        .await
        .unwrap();
    assert!(path.exists());

    let tasks = FileTaskStore::new(&path).list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);
    assert_eq!(tasks[0].title, "Write report");
}

#[tokio::test]
async fn test_created_ids_are_unique() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    let a = store.create_task(&input("a", Category::Todo)).await.unwrap();
    let b = store.create_task(&input("b", Category::Todo)).await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_update_returns_stored_task() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    let task = store.create_task(&input("a", Category::Todo)).await.unwrap();

    let updated = store
        .update_task(&task.id, &TaskPatch::category(Category::Done))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.category, Category::Done);
    assert_eq!(updated.title, "a");
    assert_eq!(store.list_tasks().await.unwrap()[0].category, Category::Done);
}

#[tokio::test]
async fn test_update_and_delete_missing_task() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    store.create_task(&input("a", Category::Todo)).await.unwrap();

    let ghost = TaskId::from("ghost");
    let err = store
        .update_task(&ghost, &TaskPatch::category(Category::Done))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotFound { .. }));
    assert!(matches!(store.delete_task(&ghost).await, Err(BoardError::NotFound { .. })));
    assert_eq!(store.list_tasks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_task() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    let a = store.create_task(&input("a", Category::Todo)).await.unwrap();
    let b = store.create_task(&input("b", Category::Todo)).await.unwrap();

    store.delete_task(&a.id).await.unwrap();

    let tasks = store.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, b.id);
}

#[tokio::test]
async fn test_reorder_keeps_other_categories_in_place() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    let a = store.create_task(&input("a", Category::Todo)).await.unwrap();
    let x = store.create_task(&input("x", Category::Done)).await.unwrap();
    let b = store.create_task(&input("b", Category::Todo)).await.unwrap();

    store
        .reorder_within_category(Category::Todo, &[b.id.clone(), a.id.clone()])
        .await
        .unwrap();

    let order: Vec<TaskId> = store.list_tasks().await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(order, vec![b.id, x.id, a.id]);
}

#[tokio::test]
async fn test_move_sets_category_and_order() {
    let dir = tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().join("tasks.json"));
    let a = store.create_task(&input("a", Category::Todo)).await.unwrap();
    let d = store.create_task(&input("d", Category::Done)).await.unwrap();

    store
        .move_across_category(&a.id, Category::Done, &[a.id.clone(), d.id.clone()])
        .await
        .unwrap();

    let tasks = store.list_tasks().await.unwrap();
    assert!(tasks.iter().all(|t| t.category == Category::Done));
    let order: Vec<&TaskId> = tasks.iter().map(|t| &t.id).collect();
    assert_eq!(order, vec![&a.id, &d.id]);
}

#[tokio::test]
async fn test_corrupt_file_is_transport_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileTaskStore::new(&path);
    assert!(store.list_tasks().await.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_failed_write_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let store = FileTaskStore::new(&path);
    store.create_task(&input("Keep me", Category::Todo)).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();
    assert!(!temp_path(&path).exists());

    // A directory in the way of the scratch file makes the next write fail.
    std::fs::create_dir(temp_path(&path)).unwrap();
    let err = store.create_task(&input("Lost", Category::Done)).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    let tasks = store.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Keep me");
}
