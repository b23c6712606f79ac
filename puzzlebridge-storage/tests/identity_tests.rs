use puzzlebridge_storage::{keys, KeyValueStore, MemoryStore, PlayerIdentity};
use std::sync::Arc;

fn identity() -> (Arc<MemoryStore>, PlayerIdentity) {
    let store = Arc::new(MemoryStore::new());
    let identity = PlayerIdentity::new(store.clone());
    (store, identity)
}

#[test]
fn first_launch_generates_and_persists() {
    let (store, identity) = identity();
    assert_eq!(store.get(keys::PLAYER_ID).unwrap(), None);

    let id = identity.current().unwrap();
    assert!(id.is_generated());
    assert_eq!(store.get(keys::PLAYER_ID).unwrap().as_deref(), Some(id.as_str()));
}

#[test]
fn second_call_returns_same_id() {
    let (_, identity) = identity();
    let first = identity.current().unwrap();
    let second = identity.current().unwrap();
    assert_eq!(first, second);
}

#[test]
fn existing_id_is_loaded_not_regenerated() {
    let (store, identity) = identity();
    store.set(keys::PLAYER_ID, "player_99_zzzzzzzzz").unwrap();
    assert_eq!(identity.current().unwrap().as_str(), "player_99_zzzzzzzzz");
}

#[test]
fn id_survives_new_identity_over_same_store() {
    let store = Arc::new(MemoryStore::new());
    let first = PlayerIdentity::new(store.clone()).current().unwrap();
    let second = PlayerIdentity::new(store).current().unwrap();
    assert_eq!(first, second);
}

#[test]
fn blank_stored_id_is_replaced() {
    let (store, identity) = identity();
    store.set(keys::PLAYER_ID, "   ").unwrap();

    let id = identity.current().unwrap();
    assert!(id.is_generated());
    assert_eq!(store.get(keys::PLAYER_ID).unwrap().as_deref(), Some(id.as_str()));
}

#[test]
fn reset_mints_fresh_id() {
    let (store, identity) = identity();
    let before = identity.current().unwrap();

    let after = identity.reset().unwrap();
    assert_ne!(before, after);
    assert_eq!(identity.current().unwrap(), after);
    assert_eq!(store.get(keys::PLAYER_ID).unwrap().as_deref(), Some(after.as_str()));
}

#[test]
fn reset_leaves_snapshot_untouched() {
    let (store, identity) = identity();
    identity.current().unwrap();
    store.set(keys::PLAYER_PUZZLES, "{\"playerId\":\"x\",\"puzzles\":[]}").unwrap();

    identity.reset().unwrap();
    assert!(store.get(keys::PLAYER_PUZZLES).unwrap().is_some());
}
