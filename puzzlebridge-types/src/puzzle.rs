//! Puzzle records and the per-player snapshot.
//!
//! The native host or the HTTP backend is authoritative for every field here;
//! local copies are a cache and are replaced wholesale on refresh.

use crate::ids::{PlayerId, PuzzleId};
use serde::{Deserialize, Serialize};

/// How a puzzle is presented and whether it takes an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PuzzleKind {
    /// A question answered with free text.
    #[serde(alias = "question")]
    PlainAnswer,
    /// Read-only content; nothing to answer.
    #[serde(alias = "info")]
    Informational,
    /// An HTML fragment loaded from `path`, optionally narrowed by `selector`.
    #[serde(rename = "embedded-html-subpuzzle", alias = "embedded-html", alias = "html")]
    EmbeddedHtml,
    /// A type this client does not know. Kept so one such record does not
    /// invalidate the rest of the list.
    #[serde(other)]
    Unsupported,
}

impl PuzzleKind {
    /// Whether opening this kind waits for an answer.
    #[must_use]
    pub const fn is_answerable(self) -> bool {
        matches!(self, Self::PlainAnswer)
    }
}

/// A single puzzle as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: PuzzleId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_message: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    /// Scene to advance to once the puzzle is solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scene: Option<String>,
}

impl PuzzleRecord {
    /// Creates an unlocked, uncompleted record with no type-specific fields.
    pub fn new(id: impl Into<PuzzleId>, title: impl Into<String>, kind: PuzzleKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            question: None,
            path: None,
            selector: None,
            is_locked: false,
            locked_message: None,
            is_completed: false,
            next_scene: None,
        }
    }
}

/// Puzzle list as returned by the backend: either a bare array or wrapped in
/// an object under `puzzles`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PuzzleList {
    Bare(Vec<PuzzleRecord>),
    Wrapped { puzzles: Vec<PuzzleRecord> },
}

impl PuzzleList {
    /// Unwraps into the ordered records.
    #[must_use]
    pub fn into_records(self) -> Vec<PuzzleRecord> {
        match self {
            Self::Bare(records) | Self::Wrapped { puzzles: records } => records,
        }
    }
}

/// Locally cached puzzle progress for exactly one player.
///
/// Persisted as `{"playerId": ..., "puzzles": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    pub player_id: PlayerId,
    pub puzzles: Vec<PuzzleRecord>,
}

impl PuzzleSnapshot {
    /// Creates a snapshot owned by `player_id`.
    #[must_use]
    pub fn new(player_id: PlayerId, puzzles: Vec<PuzzleRecord>) -> Self {
        Self { player_id, puzzles }
    }

    /// A snapshot is only usable by the player that owns it.
    #[must_use]
    pub fn is_owned_by(&self, player_id: &PlayerId) -> bool {
        &self.player_id == player_id
    }

    /// Finds a puzzle by id.
    #[must_use]
    pub fn find(&self, puzzle_id: &PuzzleId) -> Option<&PuzzleRecord> {
        self.puzzles.iter().find(|p| &p.id == puzzle_id)
    }
}

/// Backend verdict on a submitted answer. A wrong answer is a normal
/// negative result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerVerdict {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
