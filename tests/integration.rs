use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tempfile::tempdir;

use task_tracker::error::TrackerError;
use task_tracker::model::{Status, Task};
use task_tracker::service::TaskService;
use task_tracker::store::lock::FileLock;
use task_tracker::store::{JsonTaskStore, MemoryTaskStore, TaskRepository};

fn json_service(dir: &Path) -> TaskService<JsonTaskStore> {
    TaskService::new(JsonTaskStore::open(dir.join("tasks.json")))
}

fn ids(tasks: &[Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id).collect()
}

#[test]
fn test_full_workflow() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());

    let groceries = svc.create_task("Buy groceries", "Milk, bread, eggs").unwrap();
    let report = svc.create_task("Write report", "").unwrap();
    let call = svc.create_task("Call plumber", "").unwrap();
    assert_eq!(ids(&[groceries.clone(), report.clone(), call.clone()]), vec![1, 2, 3]);

    svc.mark_in_progress(report.id).unwrap();
    svc.mark_done(call.id).unwrap();
    let updated = svc
        .update_task(groceries.id, "", "Milk, bread, eggs, cheese")
        .unwrap();
    assert_eq!(updated.title, "Buy groceries");

    // A fresh service over the same file sees every change
    let reopened = json_service(dir.path());
    let all = reopened.get_all_tasks().unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3]);
    assert_eq!(all[0].description, "Milk, bread, eggs, cheese");
    assert_eq!(all[1].status, Status::InProgress);
    assert_eq!(all[2].status, Status::Done);

    assert_eq!(ids(&reopened.get_pending_tasks().unwrap()), vec![1, 2]);

    reopened.delete_task(call.id).unwrap();
    assert!(matches!(
        reopened.get_task(call.id).unwrap_err(),
        TrackerError::TaskNotFound(3)
    ));
    let next = reopened.create_task("Something new", "").unwrap();
    assert_eq!(next.id, 4);
}

#[test]
fn empty_title_persists_nothing() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());

    let err = svc.create_task("", "x").unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
    assert!(svc.get_all_tasks().unwrap().is_empty());
    assert!(!dir.path().join("tasks.json").exists());
}

#[test]
fn description_only_update_advances_updated_at() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());
    let task = svc.create_task("Title", "old").unwrap();

    let updated = svc.update_task(task.id, "", "new desc").unwrap();
    assert_eq!(updated.title, "Title");
    assert_eq!(updated.status, Status::Todo);
    assert_eq!(updated.description, "new desc");
    assert!(updated.updated_at > task.updated_at);
    assert_eq!(updated.created_at, task.created_at);

    // Persisted value matches what was returned
    assert_eq!(svc.get_task(task.id).unwrap(), updated);
}

#[test]
fn status_lists_follow_status_updates() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());
    let task = svc.create_task("A", "").unwrap();

    svc.update_task_status(task.id, "done").unwrap();
    assert_eq!(ids(&svc.get_tasks_by_status(Status::Done).unwrap()), vec![task.id]);
    assert!(svc.get_tasks_by_status(Status::Todo).unwrap().is_empty());

    let err = svc.update_task_status(task.id, "archived").unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[test]
fn pending_is_todo_then_in_progress_regardless_of_id() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());

    // A (todo) created before B (in progress)
    let a = svc.create_task("A", "").unwrap();
    let b = svc.create_task("B", "").unwrap();
    svc.mark_in_progress(b.id).unwrap();
    assert_eq!(ids(&svc.get_pending_tasks().unwrap()), vec![a.id, b.id]);

    // B' (in progress) created before A' (todo)
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());
    let b = svc.create_task("B", "").unwrap();
    let a = svc.create_task("A", "").unwrap();
    svc.mark_in_progress(b.id).unwrap();
    assert_eq!(ids(&svc.get_pending_tasks().unwrap()), vec![a.id, b.id]);
}

#[test]
fn saved_collection_reloads_field_for_field() {
    let dir = tempdir().unwrap();
    let store = JsonTaskStore::open(dir.path().join("tasks.json"));

    let mut done = Task::new(2, "Done thing", "notes: \"quoted\"\nsecond line");
    done.set_status(Status::Done);
    let tasks = vec![Task::new(1, "Empty description", ""), done];
    store.save(&tasks).unwrap();

    assert_eq!(store.load().unwrap(), tasks);
    assert_eq!(store.get_all().unwrap(), tasks);
}

#[test]
fn absent_and_empty_files_list_nothing() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());
    assert!(svc.get_all_tasks().unwrap().is_empty());

    fs::write(dir.path().join("tasks.json"), "").unwrap();
    assert!(svc.get_all_tasks().unwrap().is_empty());
    assert!(svc.get_pending_tasks().unwrap().is_empty());
}

#[test]
fn malformed_file_surfaces_as_corrupt_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "[{\"id\": 1, \"title\": ").unwrap();
    let svc = json_service(dir.path());

    let errors = [
        svc.get_all_tasks().unwrap_err(),
        svc.get_task(1).unwrap_err(),
        svc.get_pending_tasks().unwrap_err(),
        svc.create_task("A", "").unwrap_err(),
        svc.update_task(1, "x", "").unwrap_err(),
        svc.mark_done(1).unwrap_err(),
        svc.delete_task(1).unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.code(), "corrupt_store", "{err}");
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"id\": 1, \"title\": ");
}

#[test]
fn file_format_is_plain_task_array() {
    let dir = tempdir().unwrap();
    let svc = json_service(dir.path());
    svc.create_task("A", "").unwrap();
    svc.mark_in_progress(1).unwrap();

    let raw = fs::read_to_string(dir.path().join("tasks.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    assert_eq!(record["id"], 1);
    assert_eq!(record["title"], "A");
    assert_eq!(record["description"], "");
    assert_eq!(record["status"], "in-progress");
    assert!(record["created_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(record.as_object().unwrap().len(), 6);
}

#[test]
fn backends_are_interchangeable() {
    fn exercise<R: TaskRepository>(svc: TaskService<R>) -> Vec<u64> {
        let b = svc.create_task("B", "").unwrap();
        svc.create_task("A", "").unwrap();
        let c = svc.create_task("C", "").unwrap();
        svc.mark_in_progress(b.id).unwrap();
        svc.delete_task(c.id).unwrap();
        svc.create_task("D", "").unwrap();
        ids(&svc.get_pending_tasks().unwrap())
    }

    let dir = tempdir().unwrap();
    let from_file = exercise(json_service(dir.path()));
    let from_memory = exercise(TaskService::new(MemoryTaskStore::new()));
    assert_eq!(from_file, vec![2, 4, 1]);
    assert_eq!(from_file, from_memory);
}

#[test]
fn locked_store_fails_fast_when_contended() {
    let dir = tempdir().unwrap();
    let store = JsonTaskStore::open(dir.path().join("tasks.json")).with_locking(true);
    let svc = TaskService::new(store.clone());
    svc.create_task("A", "").unwrap();

    let _held = FileLock::acquire(store.lock_path()).unwrap();
    let err = svc.mark_done(1).unwrap_err();
    assert!(matches!(err, TrackerError::Locked(_)), "{err}");
}

#[test]
fn concurrent_creates_on_locked_stores_get_distinct_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let first = JsonTaskStore::open(&path).with_locking(true);
    let second = TaskService::new(JsonTaskStore::open(&path).with_locking(true));

    let (entered, wait_for_entry) = mpsc::channel();
    let writer = thread::spawn(move || {
        // Allocate, pause while holding the section, then store
        let section = first.exclusive().unwrap();
        let id = first.next_id().unwrap();
        entered.send(()).unwrap();
        thread::sleep(Duration::from_millis(150));
        first.create(&Task::new(id, "first", "")).unwrap();
        drop(section);
        id
    });

    wait_for_entry.recv().unwrap();
    let created = second.create_task("second", "").unwrap();
    let first_id = writer.join().unwrap();

    assert_eq!((first_id, created.id), (1, 2));
    assert_eq!(ids(&second.get_all_tasks().unwrap()), vec![1, 2]);
}

#[test]
fn status_change_waits_for_a_held_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let svc = TaskService::new(JsonTaskStore::open(&path).with_locking(true));
    svc.create_task("A", "").unwrap();

    let editor = JsonTaskStore::open(&path).with_locking(true);
    let (entered, wait_for_entry) = mpsc::channel();
    let handle = thread::spawn(move || {
        let _section = editor.exclusive().unwrap();
        let mut task = editor.get_by_id(1).unwrap();
        entered.send(()).unwrap();
        thread::sleep(Duration::from_millis(150));
        task.apply_update("renamed", "");
        editor.update(&task).unwrap();
    });

    wait_for_entry.recv().unwrap();
    let done = svc.mark_done(1).unwrap();
    handle.join().unwrap();

    // The status change read the rename instead of overwriting it
    assert_eq!(done.title, "renamed");
    assert_eq!(svc.get_task(1).unwrap().status, Status::Done);
    assert_eq!(svc.get_task(1).unwrap().title, "renamed");
}
