//! In-memory collaborators for testing code built on the game layer.

use crate::client::{methods, GameBackend};
use crate::error::{GameError, GameResult};
use crate::view::{Feedback, FragmentLoader, PuzzleView};
use async_trait::async_trait;
use puzzlebridge_transport::TransportError;
use puzzlebridge_types::{AnswerVerdict, PlayerId, PuzzleId, PuzzleRecord};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct BackendState {
    puzzles: Vec<PuzzleRecord>,
    answers: HashMap<PuzzleId, String>,
    offline: bool,
    calls: Vec<String>,
}

/// A backend holding one shared puzzle list.
///
/// Answers are compared exactly against the normalized form; completing,
/// resetting and unlocking mutate the list the next refresh returns.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<BackendState>,
}

impl MockBackend {
    #[must_use]
    pub fn new(puzzles: Vec<PuzzleRecord>) -> Self {
        Self {
            state: Mutex::new(BackendState {
                puzzles,
                ..BackendState::default()
            }),
        }
    }

    /// Sets the expected answer for `puzzle`.
    #[must_use]
    pub fn with_answer(self, puzzle: impl Into<PuzzleId>, answer: &str) -> Self {
        self.lock().answers.insert(puzzle.into(), answer.to_string());
        self
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Replaces the served list.
    pub fn set_puzzles(&self, puzzles: Vec<PuzzleRecord>) {
        self.lock().puzzles = puzzles;
    }

    /// Bridge method names of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls to `method`.
    #[must_use]
    pub fn count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == method).count()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, method: &str) -> GameResult<MutexGuard<'_, BackendState>> {
        let mut state = self.lock();
        state.calls.push(method.to_string());
        if state.offline {
            return Err(TransportError::Network("backend offline".into()).into());
        }
        Ok(state)
    }
}

#[async_trait]
impl GameBackend for MockBackend {
    async fn player_puzzles(&self, _player: &PlayerId) -> GameResult<Vec<PuzzleRecord>> {
        Ok(self.enter(methods::PLAYER_PUZZLES)?.puzzles.clone())
    }

    async fn submit_answer(
        &self,
        _player: &PlayerId,
        puzzle: &PuzzleId,
        answer: &str,
    ) -> GameResult<AnswerVerdict> {
        let state = self.enter(methods::SUBMIT_ANSWER)?;
        let success = state.answers.get(puzzle).is_some_and(|a| a == answer);
        Ok(AnswerVerdict {
            success,
            message: if success { "Correct!" } else { "Incorrect" }.to_string(),
        })
    }

    async fn complete_puzzle(&self, _player: &PlayerId, puzzle: &PuzzleId) -> GameResult<Value> {
        let mut state = self.enter(methods::COMPLETE_PUZZLE)?;
        let record = state
            .puzzles
            .iter_mut()
            .find(|p| &p.id == puzzle)
            .ok_or(GameError::InvalidState("unknown puzzle"))?;
        record.is_completed = true;
        Ok(json!({ "success": true }))
    }

    async fn reset_progress(&self, _player: &PlayerId) -> GameResult<Value> {
        let mut state = self.enter(methods::RESET_GAME)?;
        for record in &mut state.puzzles {
            record.is_completed = false;
        }
        Ok(json!({ "success": true }))
    }

    async fn unlock_all(&self, _player: &PlayerId) -> GameResult<Value> {
        let mut state = self.enter(methods::UNLOCK_ALL)?;
        for record in &mut state.puzzles {
            record.is_locked = false;
        }
        Ok(json!({ "success": true }))
    }

    async fn game_info(&self) -> GameResult<Value> {
        let state = self.enter(methods::GAME_INFO)?;
        Ok(json!({ "title": "Mock Game", "totalPuzzles": state.puzzles.len() }))
    }
}

/// One event received by a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Locked(PuzzleId),
    Completed(PuzzleId),
    Question(PuzzleId),
    Info(PuzzleId),
    Embedded(PuzzleId, String),
    Error(String),
    Feedback(Feedback),
    Continue(Option<String>),
    Hide,
}

/// A view that records everything it is asked to show.
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, event: ViewEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl PuzzleView for RecordingView {
    fn show_locked(&self, record: &PuzzleRecord) {
        self.push(ViewEvent::Locked(record.id.clone()));
    }

    fn show_completed(&self, record: &PuzzleRecord) {
        self.push(ViewEvent::Completed(record.id.clone()));
    }

    fn show_question(&self, record: &PuzzleRecord) {
        self.push(ViewEvent::Question(record.id.clone()));
    }

    fn show_info(&self, record: &PuzzleRecord) {
        self.push(ViewEvent::Info(record.id.clone()));
    }

    fn show_embedded(&self, record: &PuzzleRecord, html: &str) {
        self.push(ViewEvent::Embedded(record.id.clone(), html.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }

    fn show_feedback(&self, feedback: &Feedback) {
        self.push(ViewEvent::Feedback(feedback.clone()));
    }

    fn show_continue(&self, next_scene: Option<&str>) {
        self.push(ViewEvent::Continue(next_scene.map(str::to_string)));
    }

    fn hide(&self) {
        self.push(ViewEvent::Hide);
    }
}

/// Fragments served from a fixed map keyed by record `path`.
#[derive(Default)]
pub struct StaticFragments {
    pages: HashMap<String, String>,
}

impl StaticFragments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: &str, html: &str) -> Self {
        self.pages.insert(path.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl FragmentLoader for StaticFragments {
    async fn load(&self, record: &PuzzleRecord) -> GameResult<String> {
        let path = record
            .path
            .as_deref()
            .ok_or_else(|| GameError::Fragment(format!("puzzle {} has no path", record.id)))?;
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| GameError::Fragment(format!("no fragment at {path}")))
    }
}
