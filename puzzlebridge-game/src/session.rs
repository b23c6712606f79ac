//! Puzzle session state machine.
//!
//! ```text
//! Idle ──open──▶ Presenting ──(answerable)──▶ AwaitingAnswer ──correct──▶ Resolved
//!   ▲                │                              │                        │
//!   └────────────────┴──────────dismiss─────────────┴────────advance─────────┘
//! ```
//!
//! Informational and embedded puzzles stay in `Presenting` until dismissed.

use crate::client::GameBackend;
use crate::error::{GameError, GameResult};
use crate::store::PuzzleStateStore;
use crate::view::{Feedback, FragmentLoader, InitializerRegistry, PuzzleView};
use puzzlebridge_types::{PuzzleId, PuzzleKind, PuzzleRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

const EMPTY_ANSWER_MESSAGE: &str = "Please enter an answer.";
const INCORRECT_MESSAGE: &str = "Incorrect answer, try again.";
const CORRECT_MESSAGE: &str = "Correct!";

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Presenting {
        puzzle_id: PuzzleId,
    },
    AwaitingAnswer {
        puzzle_id: PuzzleId,
        /// Last normalized attempt, kept across wrong answers.
        last_attempt: Option<String>,
    },
    Resolved {
        puzzle_id: PuzzleId,
        next_scene: Option<String>,
    },
}

impl SessionState {
    /// The active puzzle, if any.
    #[must_use]
    pub fn puzzle_id(&self) -> Option<&PuzzleId> {
        match self {
            Self::Idle => None,
            Self::Presenting { puzzle_id }
            | Self::AwaitingAnswer { puzzle_id, .. }
            | Self::Resolved { puzzle_id, .. } => Some(puzzle_id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// What `open` showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Locked,
    Completed,
    Interactive(PuzzleKind),
    NotFound,
}

/// Result of an answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct {
        message: String,
        next_scene: Option<String>,
    },
    Incorrect {
        message: String,
    },
    /// Nothing left after normalization; no call was made.
    Empty,
}

/// Drives one puzzle at a time from open to dismissal.
pub struct PuzzleSessionController {
    store: PuzzleStateStore,
    backend: Arc<dyn GameBackend>,
    view: Arc<dyn PuzzleView>,
    fragments: Option<Arc<dyn FragmentLoader>>,
    initializers: InitializerRegistry,
    state: SessionState,
}

impl PuzzleSessionController {
    pub fn new(
        store: PuzzleStateStore,
        backend: Arc<dyn GameBackend>,
        view: Arc<dyn PuzzleView>,
    ) -> Self {
        Self {
            store,
            backend,
            view,
            fragments: None,
            initializers: InitializerRegistry::new(),
            state: SessionState::Idle,
        }
    }

    /// Sets the loader used for embedded puzzles.
    #[must_use]
    pub fn with_fragments(mut self, loader: Arc<dyn FragmentLoader>) -> Self {
        self.fragments = Some(loader);
        self
    }

    /// Sets the per-puzzle initializers run after an embedded fragment is shown.
    #[must_use]
    pub fn with_initializers(mut self, initializers: InitializerRegistry) -> Self {
        self.initializers = initializers;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &PuzzleStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PuzzleStateStore {
        &mut self.store
    }

    /// Opens a puzzle and shows the matching view.
    ///
    /// Lock and completion flags decide the view before the puzzle kind does.
    /// Failures are shown on the view and also returned.
    pub async fn open(&mut self, puzzle_id: &PuzzleId) -> GameResult<OpenOutcome> {
        self.state = SessionState::Idle;

        let record = match self.store.find(puzzle_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Puzzle {puzzle_id} not in the current list");
                self.view.show_error(&format!("Puzzle {puzzle_id} not found"));
                return Ok(OpenOutcome::NotFound);
            }
            Err(e) => return Err(self.fail(e)),
        };

        if record.is_locked {
            self.view.show_locked(&record);
            self.present(puzzle_id);
            return Ok(OpenOutcome::Locked);
        }
        if record.is_completed {
            self.view.show_completed(&record);
            self.present(puzzle_id);
            return Ok(OpenOutcome::Completed);
        }

        match record.kind {
            PuzzleKind::PlainAnswer => {
                self.view.show_question(&record);
                self.state = SessionState::AwaitingAnswer {
                    puzzle_id: puzzle_id.clone(),
                    last_attempt: None,
                };
            }
            PuzzleKind::Informational => {
                self.view.show_info(&record);
                self.present(puzzle_id);
            }
            PuzzleKind::EmbeddedHtml => {
                let html = match self.load_fragment(&record).await {
                    Ok(html) => html,
                    Err(e) => return Err(self.fail(e)),
                };
                self.view.show_embedded(&record, &html);
                if !self.initializers.run(&record) {
                    debug!("No initializer for puzzle {puzzle_id}");
                }
                self.present(puzzle_id);
            }
            PuzzleKind::Unsupported => {
                warn!("Puzzle {puzzle_id} has an unsupported type");
                self.view
                    .show_error(&format!("Puzzle {puzzle_id} cannot be shown by this client"));
                self.present(puzzle_id);
            }
        }

        Ok(OpenOutcome::Interactive(record.kind))
    }

    /// Submits an answer for the puzzle awaiting one.
    ///
    /// The answer is trimmed and lowercased first. A wrong answer keeps the
    /// session in `AwaitingAnswer`; a correct one moves to `Resolved` and
    /// re-syncs the store.
    pub async fn submit_answer(&mut self, raw: &str) -> GameResult<SubmitOutcome> {
        let puzzle_id = match &self.state {
            SessionState::AwaitingAnswer { puzzle_id, .. } => puzzle_id.clone(),
            SessionState::Idle => return Err(GameError::NoActivePuzzle),
            _ => return Err(GameError::InvalidState("puzzle is not awaiting an answer")),
        };

        let answer = normalize_answer(raw);
        if answer.is_empty() {
            self.view.show_feedback(&Feedback::incorrect(EMPTY_ANSWER_MESSAGE));
            return Ok(SubmitOutcome::Empty);
        }
        if let SessionState::AwaitingAnswer { last_attempt, .. } = &mut self.state {
            *last_attempt = Some(answer.clone());
        }

        let player = self.store.player()?;
        let verdict = match self.backend.submit_answer(&player, &puzzle_id, &answer).await {
            Ok(verdict) => verdict,
            Err(e) => return Err(self.fail(e)),
        };

        if !verdict.success {
            let message = non_empty_or(verdict.message, INCORRECT_MESSAGE);
            self.view.show_feedback(&Feedback::incorrect(&message));
            return Ok(SubmitOutcome::Incorrect { message });
        }

        let message = non_empty_or(verdict.message, CORRECT_MESSAGE);
        info!("Puzzle {puzzle_id} solved by {player}");
        self.view.show_feedback(&Feedback::correct(&message));

        let next_scene = self
            .store
            .snapshot()
            .and_then(|s| s.find(&puzzle_id))
            .and_then(|r| r.next_scene.clone());
        self.state = SessionState::Resolved {
            puzzle_id: puzzle_id.clone(),
            next_scene: next_scene.clone(),
        };

        // The backend already accepted the answer, so a failed reconciliation
        // is reported without undoing the resolution. If the completion call
        // fails the store keeps its old snapshot; if only the refresh fails
        // the store is left Stale.
        if let Err(e) = self.store.mark_completed(&puzzle_id).await {
            warn!("Failed to reconcile completion of {puzzle_id}: {e}");
            self.view.show_error(&e.user_message());
        }

        self.view.show_continue(next_scene.as_deref());
        Ok(SubmitOutcome::Correct {
            message,
            next_scene,
        })
    }

    /// Continues past a solved puzzle, returning the scene to move to.
    pub fn advance(&mut self) -> GameResult<Option<String>> {
        match std::mem::take(&mut self.state) {
            SessionState::Resolved { next_scene, .. } => {
                self.view.hide();
                Ok(next_scene)
            }
            other => {
                self.state = other;
                Err(GameError::InvalidState("no solved puzzle to continue from"))
            }
        }
    }

    /// Returns to `Idle`. Safe to call in any state.
    pub fn dismiss(&mut self) {
        if !self.state.is_idle() {
            self.view.hide();
        }
        self.state = SessionState::Idle;
    }

    fn present(&mut self, puzzle_id: &PuzzleId) {
        self.state = SessionState::Presenting {
            puzzle_id: puzzle_id.clone(),
        };
    }

    async fn load_fragment(&self, record: &PuzzleRecord) -> GameResult<String> {
        let loader = self
            .fragments
            .as_ref()
            .ok_or_else(|| GameError::Fragment("no fragment loader configured".into()))?;
        loader.load(record).await
    }

    fn fail(&self, error: GameError) -> GameError {
        warn!("Puzzle operation failed: {error}");
        self.view.show_error(&error.user_message());
        error
    }
}

/// Case-insensitive, whitespace-trimmed form sent to the backend.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
