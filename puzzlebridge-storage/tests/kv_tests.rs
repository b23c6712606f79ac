use puzzlebridge_storage::{FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

// ── MemoryStore ─────────────────────────────────────────────────

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty());

    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    assert_eq!(store.len(), 1);

    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn memory_store_remove_missing_is_noop() {
    let store = MemoryStore::new();
    store.remove("missing").unwrap();
}

#[test]
fn memory_store_overwrites() {
    let store = MemoryStore::new();
    store.set("k", "1").unwrap();
    store.set("k", "2").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
}

// ── FileStore ───────────────────────────────────────────────────

#[test]
fn file_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    let store = FileStore::open(&path).unwrap();
    store.set("playerId", "player_1_abcdefghi").unwrap();
    drop(store);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("playerId").unwrap().as_deref(),
        Some("player_1_abcdefghi")
    );
}

#[test]
fn file_store_remove_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    let store = FileStore::open(&path).unwrap();
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.remove("a").unwrap();
    drop(store);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("a").unwrap(), None);
    assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_store_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("absent.json")).unwrap();
    assert_eq!(store.get("anything").unwrap(), None);
}

#[test]
fn file_store_corrupt_file_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("playerId").unwrap(), None);

    store.set("playerId", "p").unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"playerId\""));
}

#[test]
fn file_store_open_in_dir_uses_default_name() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open_in(Some(dir.path())).unwrap();
    assert_eq!(store.path(), dir.path().join(FileStore::DEFAULT_FILE));
}
