//! Collaborators on the presentation side of a puzzle session.

use crate::error::GameResult;
use async_trait::async_trait;
use puzzlebridge_types::{PuzzleId, PuzzleRecord};
use std::collections::HashMap;

/// Inline feedback for an answer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
}

impl Feedback {
    pub fn correct(message: impl Into<String>) -> Self {
        Self {
            correct: true,
            message: message.into(),
        }
    }

    pub fn incorrect(message: impl Into<String>) -> Self {
        Self {
            correct: false,
            message: message.into(),
        }
    }
}

/// Receives puzzle lifecycle events from the session controller.
///
/// Implementations render; they never call back into the controller.
pub trait PuzzleView: Send + Sync {
    /// The puzzle exists but is not yet available.
    fn show_locked(&self, record: &PuzzleRecord);

    /// The puzzle was already solved.
    fn show_completed(&self, record: &PuzzleRecord);

    /// A plain question waiting for an answer.
    fn show_question(&self, record: &PuzzleRecord);

    /// Read-only content.
    fn show_info(&self, record: &PuzzleRecord);

    /// Loaded HTML fragment for an embedded puzzle.
    fn show_embedded(&self, record: &PuzzleRecord, html: &str);

    /// An operation failed.
    fn show_error(&self, message: &str);

    /// Result of an answer attempt.
    fn show_feedback(&self, feedback: &Feedback);

    /// The puzzle is solved; offer to continue to `next_scene`.
    fn show_continue(&self, next_scene: Option<&str>);

    /// Close whatever is showing.
    fn hide(&self);
}

/// Loads the HTML fragment behind an embedded puzzle.
#[async_trait]
pub trait FragmentLoader: Send + Sync {
    /// Returns the fragment for `record` (its `path`, narrowed by `selector`).
    async fn load(&self, record: &PuzzleRecord) -> GameResult<String>;
}

/// Callback run after an embedded puzzle's fragment is shown.
pub type Initializer = Box<dyn Fn(&PuzzleRecord) + Send + Sync>;

/// Known per-puzzle initializers, keyed by puzzle id.
///
/// Puzzles without an entry simply have no initializer.
#[derive(Default)]
pub struct InitializerRegistry {
    entries: HashMap<PuzzleId, Initializer>,
}

impl InitializerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `init` for `puzzle`, replacing any previous entry.
    pub fn register<F>(&mut self, puzzle: impl Into<PuzzleId>, init: F)
    where
        F: Fn(&PuzzleRecord) + Send + Sync + 'static,
    {
        self.entries.insert(puzzle.into(), Box::new(init));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, puzzle: impl Into<PuzzleId>, init: F) -> Self
    where
        F: Fn(&PuzzleRecord) + Send + Sync + 'static,
    {
        self.register(puzzle, init);
        self
    }

    /// Runs the initializer for `record`, if one is registered.
    pub fn run(&self, record: &PuzzleRecord) -> bool {
        match self.entries.get(&record.id) {
            Some(init) => {
                init(record);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, puzzle: &PuzzleId) -> bool {
        self.entries.contains_key(puzzle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
