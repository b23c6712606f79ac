use puzzlebridge_types::{PlayerId, PuzzleId, PLAYER_ID_PREFIX};
use std::collections::HashSet;
use std::str::FromStr;

// ── PlayerId ──────────────────────────────────────────────────────

#[test]
fn player_id_generate_has_prefix() {
    let id = PlayerId::generate();
    assert!(id.as_str().starts_with(PLAYER_ID_PREFIX));
    assert!(id.is_generated());
}

#[test]
fn player_id_generate_shape() {
    let id = PlayerId::generate();
    let rest = id.as_str().strip_prefix("player_").unwrap();
    let (millis, suffix) = rest.split_once('_').unwrap();
    assert!(millis.parse::<i64>().unwrap() > 0);
    assert_eq!(suffix.len(), 9);
    assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[test]
fn player_id_generate_is_unique() {
    let ids: HashSet<PlayerId> = (0..100).map(|_| PlayerId::generate()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn player_id_parse_trims() {
    let id = PlayerId::parse("  player_1_abcdefghi ").unwrap();
    assert_eq!(id.as_str(), "player_1_abcdefghi");
}

#[test]
fn player_id_parse_blank_is_error() {
    assert!(PlayerId::parse("").is_err());
    assert!(PlayerId::parse("   ").is_err());
}

#[test]
fn player_id_from_str_and_display() {
    let id = PlayerId::from_str("someone").unwrap();
    assert_eq!(id.to_string(), "someone");
    assert!(!id.is_generated());
}

#[test]
fn player_id_is_generated_rejects_malformed() {
    for raw in [
        "player_",
        "player_123",
        "player_abc_abcdefghi",
        "player_1_ABCDEFGHI",
        "user_1_abcdefghi",
    ] {
        assert!(!PlayerId::parse(raw).unwrap().is_generated(), "{raw}");
    }
}

#[test]
fn player_id_serde_is_transparent() {
    let id = PlayerId::parse("player_42_abcdefghi").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"player_42_abcdefghi\"");
    let back: PlayerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// ── PuzzleId ──────────────────────────────────────────────────────

#[test]
fn puzzle_id_deserializes_from_string() {
    let id: PuzzleId = serde_json::from_str("\"intro\"").unwrap();
    assert_eq!(id.as_str(), "intro");
}

#[test]
fn puzzle_id_deserializes_from_number() {
    let id: PuzzleId = serde_json::from_str("7").unwrap();
    assert_eq!(id, PuzzleId::from(7u64));
    assert_eq!(id.as_str(), "7");
}

#[test]
fn puzzle_id_serializes_as_string() {
    let id = PuzzleId::from(3u64);
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"3\"");
}

#[test]
fn puzzle_id_from_str_rejects_blank() {
    assert!(PuzzleId::from_str(" ").is_err());
    assert_eq!(PuzzleId::from_str(" 5 ").unwrap().as_str(), "5");
}

#[test]
fn puzzle_id_ordering() {
    let mut ids = vec![PuzzleId::new("b"), PuzzleId::new("a")];
    ids.sort();
    assert_eq!(ids[0].as_str(), "a");
}
