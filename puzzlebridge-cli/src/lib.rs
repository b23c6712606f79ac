//! Console front end for the PuzzleBridge game core.
//!
//! Runs one [`Command`] per invocation against the HTTP backend, with player
//! state persisted in a [`FileStore`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Subcommand;
use puzzlebridge_game::{
    Feedback, FragmentLoader, GameBackend, GameClient, GameConfig, GameError, GameResult,
    OpenOutcome, PuzzleSessionController, PuzzleStateStore, PuzzleView, SubmitOutcome,
};
use puzzlebridge_storage::{FileStore, KeyValueStore, PlayerIdentity};
use puzzlebridge_types::{PuzzleId, PuzzleKind, PuzzleRecord};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show static game information
    Info,
    /// List puzzles and their status
    Puzzles,
    /// Open a puzzle
    Open { puzzle: String },
    /// Answer a question puzzle
    Answer { puzzle: String, answer: String },
    /// Reset all progress
    Reset,
    /// Unlock every puzzle
    UnlockAll,
    /// Print the current player id
    Whoami,
    /// Start over as a new player
    NewPlayer,
}

/// [`PuzzleView`] that prints to a line-oriented sink.
pub struct ConsoleView {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleView {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Writes one line. Output errors are ignored, as with `println!` on a
    /// closed pipe.
    pub fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl PuzzleView for ConsoleView {
    fn show_locked(&self, record: &PuzzleRecord) {
        let reason = record
            .locked_message
            .as_deref()
            .unwrap_or("This puzzle is locked.");
        self.line(&format!("[locked] {}: {reason}", record.title));
    }

    fn show_completed(&self, record: &PuzzleRecord) {
        self.line(&format!("[solved] {} is already complete.", record.title));
    }

    fn show_question(&self, record: &PuzzleRecord) {
        self.line(&record.title);
        if let Some(question) = &record.question {
            self.line(&format!("  {question}"));
        }
    }

    fn show_info(&self, record: &PuzzleRecord) {
        self.show_question(record);
    }

    fn show_embedded(&self, record: &PuzzleRecord, html: &str) {
        self.line(&record.title);
        self.line(html.trim_end());
    }

    fn show_error(&self, message: &str) {
        self.line(&format!("error: {message}"));
    }

    fn show_feedback(&self, feedback: &Feedback) {
        let mark = if feedback.correct { "correct" } else { "incorrect" };
        self.line(&format!("{mark}: {}", feedback.message));
    }

    fn show_continue(&self, next_scene: Option<&str>) {
        match next_scene {
            Some(scene) => self.line(&format!("Continue to {scene}")),
            None => self.line("Continue"),
        }
    }

    fn hide(&self) {}
}

/// Loads embedded fragments from files under a content directory.
///
/// The record's `selector` is not applied; the console shows whole files.
/// Paths must stay inside the content directory.
pub struct DirFragments {
    root: PathBuf,
}

impl DirFragments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FragmentLoader for DirFragments {
    async fn load(&self, record: &PuzzleRecord) -> GameResult<String> {
        let path = record
            .path
            .as_deref()
            .ok_or_else(|| GameError::Fragment(format!("puzzle {} has no path", record.id)))?;
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(GameError::Fragment(format!(
                "fragment path {path} is outside the content directory"
            )));
        }
        let full = self.root.join(relative);
        debug!("Loading fragment {}", full.display());
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| GameError::Fragment(format!("{}: {e}", full.display())))
    }
}

/// Everything one invocation needs, wired over HTTP.
pub struct App {
    backend: Arc<dyn GameBackend>,
    controller: PuzzleSessionController,
    view: Arc<ConsoleView>,
}

impl App {
    /// Opens persisted state and builds the game over `config`.
    pub fn new(config: &GameConfig, content_dir: PathBuf, view: Arc<ConsoleView>) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open_in(config.data_dir.as_deref()).context("Failed to open game storage")?,
        );
        Self::with_storage(config, storage, content_dir, view)
    }

    /// Builds the game over an already opened store.
    pub fn with_storage(
        config: &GameConfig,
        storage: Arc<dyn KeyValueStore>,
        content_dir: PathBuf,
        view: Arc<ConsoleView>,
    ) -> Result<Self> {
        let backend: Arc<dyn GameBackend> = Arc::new(GameClient::from_config(config, None));
        let identity = Arc::new(PlayerIdentity::new(storage.clone()));
        let store = PuzzleStateStore::new(backend.clone(), storage, identity)
            .context("Failed to initialize puzzle store")?;
        let puzzle_view: Arc<dyn PuzzleView> = view.clone();
        let controller = PuzzleSessionController::new(store, backend.clone(), puzzle_view)
            .with_fragments(Arc::new(DirFragments::new(content_dir)));
        Ok(Self {
            backend,
            controller,
            view,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        debug!("Running {command:?}");
        match command {
            Command::Info => {
                let info = self.backend.game_info().await?;
                self.view.line(&serde_json::to_string_pretty(&info)?);
            }
            Command::Puzzles => {
                let puzzles = self.controller.store_mut().puzzles().await?;
                for record in puzzles {
                    self.view.line(&format!(
                        "{:<12} {:<10} {:<14} {}",
                        record.id.as_str(),
                        status(record),
                        kind_label(record.kind),
                        record.title
                    ));
                }
            }
            Command::Open { puzzle } => {
                self.controller.open(&PuzzleId::new(puzzle)).await?;
                self.controller.dismiss();
            }
            Command::Answer { puzzle, answer } => {
                self.answer(PuzzleId::new(puzzle), &answer).await?;
            }
            Command::Reset => {
                self.controller.store_mut().reset_progress().await?;
                self.view.line("Progress reset.");
            }
            Command::UnlockAll => {
                self.controller.store_mut().unlock_all().await?;
                self.view.line("All puzzles unlocked.");
            }
            Command::Whoami => {
                let player = self.controller.store().player()?;
                self.view.line(player.as_str());
            }
            Command::NewPlayer => {
                let player = self.controller.store_mut().switch_player()?;
                info!("Now playing as {player}");
                self.view.line(player.as_str());
            }
        }
        Ok(())
    }

    async fn answer(&mut self, puzzle: PuzzleId, answer: &str) -> Result<()> {
        let outcome = self.controller.open(&puzzle).await?;
        if outcome != OpenOutcome::Interactive(PuzzleKind::PlainAnswer) {
            self.view.line(&format!("Puzzle {puzzle} is not waiting for an answer."));
            self.controller.dismiss();
            return Ok(());
        }

        match self.controller.submit_answer(answer).await? {
            SubmitOutcome::Correct { .. } => {
                self.controller.advance()?;
            }
            SubmitOutcome::Incorrect { .. } | SubmitOutcome::Empty => self.controller.dismiss(),
        }
        Ok(())
    }

    #[must_use]
    pub fn controller(&self) -> &PuzzleSessionController {
        &self.controller
    }
}

fn status(record: &PuzzleRecord) -> &'static str {
    if record.is_completed {
        "solved"
    } else if record.is_locked {
        "locked"
    } else {
        "open"
    }
}

fn kind_label(kind: PuzzleKind) -> &'static str {
    match kind {
        PuzzleKind::PlainAnswer => "question",
        PuzzleKind::Informational => "info",
        PuzzleKind::EmbeddedHtml => "embedded",
        PuzzleKind::Unsupported => "unsupported",
    }
}
