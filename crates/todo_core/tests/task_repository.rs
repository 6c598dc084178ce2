use rusqlite::params;
use std::collections::HashSet;
use todo_core::db::{open_db, open_db_in_memory};
use todo_core::{
    task_counts, visible_tasks, FilterMode, KeyValueStore, MemoryKeyValueStore, PersistentStore,
    RepoError, SqliteKeyValueStore, Task, TaskId, TaskRepository, TASKS_KEY,
};

fn open_repo(medium: &MemoryKeyValueStore) -> TaskRepository<&MemoryKeyValueStore> {
    TaskRepository::open(PersistentStore::new(medium)).unwrap()
}

fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.name.as_str()).collect()
}

#[test]
fn buy_milk_pay_rent_scenario() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);

    let a = repo.create("Buy milk", "2%").unwrap();
    let b = repo.create("Pay rent", "due the 1st").unwrap();
    assert_eq!(names(repo.all()), vec!["Pay rent", "Buy milk"]);

    repo.toggle_complete(&a.id).unwrap();
    let counts = task_counts(repo.all());
    assert_eq!((counts.active, counts.completed), (1, 1));

    let completed = visible_tasks(repo.all(), FilterMode::Completed);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, a.id);

    assert!(repo.delete(&b.id).unwrap());
    assert_eq!(names(repo.all()), vec!["Buy milk"]);
}

#[test]
fn create_adds_exactly_one_matching_active_task() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    repo.create("existing", "task").unwrap();

    let created = repo.create("Water plants", "balcony").unwrap();

    let matching: Vec<_> = repo
        .all()
        .iter()
        .filter(|task| task.name == "Water plants" && task.description == "balcony")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
    assert!(!matching[0].completed);
    assert_eq!(repo.all()[0].id, created.id);
}

#[test]
fn duplicate_creates_are_distinct_tasks() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);

    let first = repo.create("same", "text").unwrap();
    let second = repo.create("same", "text").unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(repo.len(), 2);
}

#[test]
fn toggle_flips_only_target_and_twice_restores() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    for index in 0..4 {
        repo.create(format!("task {index}"), "body").unwrap();
    }
    let before = repo.all().to_vec();
    let target = before[2].id.clone();

    let toggled = repo.toggle_complete(&target).unwrap();
    assert!(toggled.completed);
    for (old, new) in before.iter().zip(repo.all()) {
        if old.id == target {
            assert_eq!(
                Task {
                    completed: old.completed,
                    ..new.clone()
                },
                *old
            );
            assert_ne!(old.completed, new.completed);
        } else {
            assert_eq!(old, new);
        }
    }

    repo.toggle_complete(&target).unwrap();
    assert_eq!(repo.all(), before.as_slice());
}

#[test]
fn update_preserves_identity_timestamp_and_completion() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    let created = repo.create("draft", "old").unwrap();
    repo.toggle_complete(&created.id).unwrap();

    let updated = repo.update(&created.id, "final", "new").unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.completed);
    assert_eq!(updated.name, "final");
    assert_eq!(repo.get(&created.id), Some(&updated));
}

#[test]
fn update_unknown_id_leaves_collection_unchanged() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    repo.create("keep", "me").unwrap();
    let before = repo.all().to_vec();

    let missing = TaskId::from("missing");
    let err = repo.update(&missing, "x", "y").unwrap_err();

    assert!(matches!(err, RepoError::NotFound(ref id) if *id == missing));
    assert_eq!(repo.all(), before.as_slice());
}

#[test]
fn delete_removes_exactly_one_or_nothing() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    let keep = repo.create("keep", "1").unwrap();
    let drop_me = repo.create("drop", "2").unwrap();

    assert!(repo.delete(&drop_me.id).unwrap());
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.all()[0].id, keep.id);

    let before = repo.all().to_vec();
    assert!(!repo.delete(&drop_me.id).unwrap());
    assert_eq!(repo.all(), before.as_slice());
}

#[test]
fn ids_stay_unique_across_mutations() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    for index in 0..20 {
        let task = repo.create(format!("t{index}"), "d").unwrap();
        if index % 3 == 0 {
            repo.delete(&task.id).unwrap();
        }
    }

    let ids: HashSet<_> = repo.all().iter().map(|task| task.id.clone()).collect();
    assert_eq!(ids.len(), repo.len());
}

#[test]
fn every_mutation_is_visible_to_a_fresh_repository() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    let task = repo.create("persist", "me").unwrap();
    repo.toggle_complete(&task.id).unwrap();
    repo.update(&task.id, "persisted", "you").unwrap();

    let reopened = open_repo(&medium);
    assert_eq!(reopened.all(), repo.all());
}

#[test]
fn corrupt_slot_starts_empty_and_is_replaced_on_next_write() {
    let medium = MemoryKeyValueStore::new();
    medium.set(TASKS_KEY, "not json at all").unwrap();

    let mut repo = open_repo(&medium);
    assert!(repo.is_empty());

    repo.create("fresh", "start").unwrap();
    let raw = medium.get(TASKS_KEY).unwrap().unwrap();
    assert!(raw.starts_with('['));
    assert_eq!(open_repo(&medium).len(), 1);
}

#[test]
fn reads_collection_written_by_browser_client() {
    let medium = MemoryKeyValueStore::new();
    medium
        .set(
            TASKS_KEY,
            r#"[{"name":"Pay rent","description":"due the 1st","completed":true,"id":"9b2f5c1e-8d7a-4f3b-9c6e-1a2b3c4d5e6f","createdAt":"2024-05-01T09:30:00.000Z"}]"#,
        )
        .unwrap();

    let repo = open_repo(&medium);
    assert_eq!(repo.len(), 1);
    assert!(repo.all()[0].completed);
    assert_eq!(
        repo.all()[0].created_at.to_rfc3339(),
        "2024-05-01T09:30:00+00:00"
    );
}

#[test]
fn reload_picks_up_out_of_band_writes() {
    let medium = MemoryKeyValueStore::new();
    let mut first = open_repo(&medium);
    let mut second = open_repo(&medium);

    second.create("from another window", "x").unwrap();
    assert!(first.is_empty());

    first.reload().unwrap();
    assert_eq!(first.all(), second.all());
}

#[test]
fn sqlite_medium_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.sqlite3");

    let created = {
        let conn = open_db(&path).unwrap();
        let mut repo =
            TaskRepository::open(PersistentStore::new(SqliteKeyValueStore::new(&conn))).unwrap();
        repo.create("Buy milk", "2%").unwrap()
    };

    let conn = open_db(&path).unwrap();
    let repo = TaskRepository::open(PersistentStore::new(SqliteKeyValueStore::new(&conn))).unwrap();
    assert_eq!(repo.all(), &[created]);
}

#[test]
fn sqlite_medium_write_through_matches_memory() {
    let conn = open_db_in_memory().unwrap();
    let mut repo =
        TaskRepository::open(PersistentStore::new(SqliteKeyValueStore::new(&conn))).unwrap();
    let task = repo.create("a", "b").unwrap();
    repo.toggle_complete(&task.id).unwrap();

    let raw: String = conn
        .query_row(
            "SELECT value FROM kv_slots WHERE key = ?1;",
            params![TASKS_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let stored: Vec<Task> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.as_slice(), repo.all());
}

#[test]
fn non_uuid_ids_from_other_clients_survive_later_writes() {
    let medium = MemoryKeyValueStore::new();
    medium
        .set(
            TASKS_KEY,
            r#"[{"id":"task-1","name":"Keep me","description":"legacy id","completed":false,"createdAt":"2024-05-01T09:30:00.000Z"}]"#,
        )
        .unwrap();

    let mut repo = open_repo(&medium);
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.all()[0].id, TaskId::from("task-1"));

    repo.create("new", "task").unwrap();
    assert_eq!(names(repo.all()), vec!["new", "Keep me"]);

    let stored = medium.get(TASKS_KEY).unwrap().unwrap();
    assert!(stored.contains(r#""id":"task-1""#));
    assert!(stored.contains("Keep me"));

    let toggled = repo.toggle_complete(&TaskId::from("task-1")).unwrap();
    assert!(toggled.completed);
    assert!(repo.delete(&TaskId::from("task-1")).unwrap());
}

#[test]
fn reloading_and_resaving_task_slot_keeps_stored_bytes() {
    let medium = MemoryKeyValueStore::new();
    let mut repo = open_repo(&medium);
    let first = repo.create("Buy milk", "2%").unwrap();
    repo.create("Pay rent", "due the 1st").unwrap();
    repo.toggle_complete(&first.id).unwrap();
    let before = medium.get(TASKS_KEY).unwrap().unwrap();

    let store = PersistentStore::new(&medium);
    let loaded: Vec<Task> = store.load(TASKS_KEY, Vec::new()).unwrap();
    store.save(TASKS_KEY, &loaded).unwrap();

    assert_eq!(medium.get(TASKS_KEY).unwrap().unwrap(), before);
    assert_eq!(loaded.as_slice(), repo.all());
}
