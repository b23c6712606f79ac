use pretty_assertions::assert_eq;
use puzzlebridge_game::client::methods;
use puzzlebridge_game::mock::MockBackend;
use puzzlebridge_game::{GameBackend, GameError, PuzzleStateStore, StoreState};
use puzzlebridge_storage::{keys, KeyValueStore, MemoryStore, PlayerIdentity};
use puzzlebridge_types::{PlayerId, PuzzleId, PuzzleKind, PuzzleRecord, PuzzleSnapshot};
use serde_json::json;
use std::sync::Arc;

const PLAYER: &str = "player_1700000000000_abcdefghi";

fn puzzles() -> Vec<PuzzleRecord> {
    let mut second = PuzzleRecord::new("p2", "Locked door", PuzzleKind::PlainAnswer);
    second.is_locked = true;
    vec![
        PuzzleRecord::new("p1", "Riddle", PuzzleKind::PlainAnswer),
        second,
        PuzzleRecord::new("p3", "Notes", PuzzleKind::Informational),
    ]
}

struct Fixture {
    backend: Arc<MockBackend>,
    storage: Arc<MemoryStore>,
    identity: Arc<PlayerIdentity>,
}

impl Fixture {
    fn new() -> Self {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::PLAYER_ID, PLAYER).unwrap();
        Self {
            backend: Arc::new(MockBackend::new(puzzles())),
            identity: Arc::new(PlayerIdentity::new(storage.clone())),
            storage,
        }
    }

    fn persist(&self, raw: &str) {
        self.storage.set(keys::PLAYER_PUZZLES, raw).unwrap();
    }

    fn store(&self) -> PuzzleStateStore {
        PuzzleStateStore::new(
            self.backend.clone() as Arc<dyn GameBackend>,
            self.storage.clone(),
            self.identity.clone(),
        )
        .unwrap()
    }
}

fn snapshot_json(player: &str, puzzles: Vec<PuzzleRecord>) -> String {
    let snapshot = PuzzleSnapshot::new(PlayerId::parse(player).unwrap(), puzzles);
    serde_json::to_string(&snapshot).unwrap()
}

// ── Initialization ──────────────────────────────────────────────

#[tokio::test]
async fn starts_stale_without_persisted_snapshot() {
    let fx = Fixture::new();
    let store = fx.store();
    assert_eq!(store.state(), StoreState::Stale);
    assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn persisted_snapshot_for_current_player_round_trips() {
    let fx = Fixture::new();
    fx.persist(&snapshot_json(PLAYER, puzzles()));

    let mut store = fx.store();
    assert_eq!(store.state(), StoreState::TrustedLocal);

    let listed = store.puzzles().await.unwrap().to_vec();
    assert_eq!(listed, puzzles());
    assert!(fx.backend.calls().is_empty());
}

#[tokio::test]
async fn snapshot_of_other_player_is_stale_and_never_served() {
    let fx = Fixture::new();
    let mut foreign = PuzzleRecord::new("x9", "Someone else's", PuzzleKind::Informational);
    foreign.is_completed = true;
    fx.persist(&snapshot_json("player_1_zzzzzzzzz", vec![foreign]));

    let mut store = fx.store();
    assert_eq!(store.state(), StoreState::Stale);

    let ids: Vec<_> = store
        .puzzles()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert_eq!(fx.backend.count(methods::PLAYER_PUZZLES), 1);
}

#[tokio::test]
async fn corrupt_snapshot_is_cleared() {
    let fx = Fixture::new();
    fx.persist("{not json");

    let store = fx.store();
    assert_eq!(store.state(), StoreState::Stale);
    assert_eq!(fx.storage.get(keys::PLAYER_PUZZLES).unwrap(), None);
}

#[tokio::test]
async fn malformed_records_are_cleared() {
    let fx = Fixture::new();
    fx.persist(&json!({ "playerId": PLAYER, "puzzles": [{ "id": "p1" }] }).to_string());

    let store = fx.store();
    assert_eq!(store.state(), StoreState::Stale);
    assert_eq!(fx.storage.get(keys::PLAYER_PUZZLES).unwrap(), None);
}

#[tokio::test]
async fn scalar_puzzle_list_is_stale() {
    let fx = Fixture::new();
    fx.persist(&json!({ "playerId": PLAYER, "puzzles": 3 }).to_string());
    assert_eq!(fx.store().state(), StoreState::Stale);
}

#[tokio::test]
async fn empty_puzzle_list_is_stale() {
    let fx = Fixture::new();
    fx.persist(&snapshot_json(PLAYER, vec![]));
    assert_eq!(fx.store().state(), StoreState::Stale);
}

// ── Refresh and lookup ──────────────────────────────────────────

#[tokio::test]
async fn refresh_persists_snapshot_for_current_player() {
    let fx = Fixture::new();
    let mut store = fx.store();

    store.refresh().await.unwrap();
    assert_eq!(store.state(), StoreState::TrustedLocal);

    let raw = fx.storage.get(keys::PLAYER_PUZZLES).unwrap().unwrap();
    let persisted: PuzzleSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.player_id.as_str(), PLAYER);
    assert_eq!(persisted.puzzles, puzzles());
}

#[tokio::test]
async fn find_refreshes_when_stale() {
    let fx = Fixture::new();
    let mut store = fx.store();

    let found = store.find(&PuzzleId::new("p3")).await.unwrap().unwrap();
    assert_eq!(found.kind, PuzzleKind::Informational);
    assert_eq!(fx.backend.count(methods::PLAYER_PUZZLES), 1);

    store.find(&PuzzleId::new("p1")).await.unwrap();
    assert_eq!(fx.backend.count(methods::PLAYER_PUZZLES), 1);
}

#[tokio::test]
async fn find_unknown_id_is_none_not_error() {
    let fx = Fixture::new();
    let mut store = fx.store();
    assert_eq!(store.find(&PuzzleId::new("nope")).await.unwrap(), None);
    assert_eq!(store.state(), StoreState::TrustedLocal);
}

#[tokio::test]
async fn failed_refresh_leaves_store_stale() {
    let fx = Fixture::new();
    fx.backend.set_offline(true);
    let mut store = fx.store();

    let err = store.find(&PuzzleId::new("p1")).await.unwrap_err();
    assert!(matches!(err, GameError::Transport(_)));
    assert_eq!(store.state(), StoreState::Stale);
}

// ── Mutations ───────────────────────────────────────────────────

#[tokio::test]
async fn mark_completed_resyncs_from_backend() {
    let fx = Fixture::new();
    let mut store = fx.store();
    store.refresh().await.unwrap();

    store.mark_completed(&PuzzleId::new("p1")).await.unwrap();

    assert_eq!(
        fx.backend.calls(),
        vec![
            methods::PLAYER_PUZZLES,
            methods::COMPLETE_PUZZLE,
            methods::PLAYER_PUZZLES
        ]
    );
    let p1 = store.find(&PuzzleId::new("p1")).await.unwrap().unwrap();
    assert!(p1.is_completed);
}

#[tokio::test]
async fn unlock_all_then_reset_resync_each_time() {
    let fx = Fixture::new();
    let mut store = fx.store();

    store.unlock_all().await.unwrap();
    assert!(store.puzzles().await.unwrap().iter().all(|p| !p.is_locked));

    store.mark_completed(&PuzzleId::new("p2")).await.unwrap();
    store.reset_progress().await.unwrap();
    assert!(store.puzzles().await.unwrap().iter().all(|p| !p.is_completed));
    assert_eq!(fx.backend.count(methods::PLAYER_PUZZLES), 3);
}

#[tokio::test]
async fn switch_player_invalidates_snapshot() {
    let fx = Fixture::new();
    let mut store = fx.store();
    store.refresh().await.unwrap();

    let fresh = store.switch_player().unwrap();
    assert_ne!(fresh.as_str(), PLAYER);
    assert_eq!(store.state(), StoreState::Stale);

    store.puzzles().await.unwrap();
    assert_eq!(store.snapshot().unwrap().player_id, fresh);
}

#[tokio::test]
async fn identity_change_behind_the_store_forces_refresh() {
    let fx = Fixture::new();
    let mut store = fx.store();
    store.refresh().await.unwrap();

    let fresh = fx.identity.reset().unwrap();
    store.puzzles().await.unwrap();

    assert_eq!(store.snapshot().unwrap().player_id, fresh);
    assert_eq!(fx.backend.count(methods::PLAYER_PUZZLES), 2);
}
