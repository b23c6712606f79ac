//! The concrete game operations.
//!
//! Each operation is exactly one call into the [`TransportRouter`], carrying
//! both the bridge-shaped arguments and the equivalent HTTP request.

use crate::config::GameConfig;
use crate::error::GameResult;
use async_trait::async_trait;
use puzzlebridge_transport::{HttpRequest, NativeHost, TransportKind, TransportRouter};
use puzzlebridge_types::{AnswerVerdict, PlayerId, PuzzleId, PuzzleList, PuzzleRecord};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use urlencoding::encode;

/// Operations the game needs from its source of record.
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Fetches the ordered puzzle list for `player`.
    async fn player_puzzles(&self, player: &PlayerId) -> GameResult<Vec<PuzzleRecord>>;

    /// Submits a normalized answer.
    async fn submit_answer(
        &self,
        player: &PlayerId,
        puzzle: &PuzzleId,
        answer: &str,
    ) -> GameResult<AnswerVerdict>;

    /// Marks a puzzle as completed.
    async fn complete_puzzle(&self, player: &PlayerId, puzzle: &PuzzleId) -> GameResult<Value>;

    /// Resets all progress for `player`.
    async fn reset_progress(&self, player: &PlayerId) -> GameResult<Value>;

    /// Unlocks every puzzle for `player`.
    async fn unlock_all(&self, player: &PlayerId) -> GameResult<Value>;

    /// Fetches static game information.
    async fn game_info(&self) -> GameResult<Value>;
}

/// Bridge method names exposed by the native host.
pub mod methods {
    pub const PLAYER_PUZZLES: &str = "getPlayerPuzzles";
    pub const SUBMIT_ANSWER: &str = "submitPuzzleAnswer";
    pub const COMPLETE_PUZZLE: &str = "completePuzzle";
    pub const RESET_GAME: &str = "resetGame";
    pub const UNLOCK_ALL: &str = "unlockAllPuzzles";
    pub const GAME_INFO: &str = "getGameInfo";
}

/// [`GameBackend`] over whichever transport the router selected.
pub struct GameClient {
    router: TransportRouter,
}

impl GameClient {
    /// Creates a client over `router`.
    pub fn new(router: TransportRouter) -> Self {
        Self { router }
    }

    /// Builds a client for the environment: native when `host` is present,
    /// HTTP against `config.http` otherwise.
    pub fn from_config(config: &GameConfig, host: Option<Arc<dyn NativeHost>>) -> Self {
        Self::new(TransportRouter::detect(
            host,
            config.bridge(),
            config.http.clone(),
        ))
    }

    /// Which transport serves calls.
    #[must_use]
    pub fn transport_kind(&self) -> TransportKind {
        self.router.kind()
    }

    /// The underlying router.
    #[must_use]
    pub fn router(&self) -> &TransportRouter {
        &self.router
    }
}

#[async_trait]
impl GameBackend for GameClient {
    async fn player_puzzles(&self, player: &PlayerId) -> GameResult<Vec<PuzzleRecord>> {
        let value = self
            .router
            .route(
                methods::PLAYER_PUZZLES,
                &[json!(player.as_str())],
                HttpRequest::get(format!("/puzzle/player/{}", encode(player.as_str()))),
            )
            .await?;
        let records = serde_json::from_value::<PuzzleList>(value)?.into_records();
        debug!("Fetched {} puzzles for {player}", records.len());
        Ok(records)
    }

    async fn submit_answer(
        &self,
        player: &PlayerId,
        puzzle: &PuzzleId,
        answer: &str,
    ) -> GameResult<AnswerVerdict> {
        let body = json!({
            "playerId": player.as_str(),
            "puzzleId": puzzle.as_str(),
            "answer": answer,
        });
        let value = self
            .router
            .route(
                methods::SUBMIT_ANSWER,
                &[body.clone()],
                HttpRequest::post("/puzzle/submit").json(body),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn complete_puzzle(&self, player: &PlayerId, puzzle: &PuzzleId) -> GameResult<Value> {
        let path = format!(
            "/game/complete-puzzle?playerId={}&puzzleId={}",
            encode(player.as_str()),
            encode(puzzle.as_str())
        );
        Ok(self
            .router
            .route(
                methods::COMPLETE_PUZZLE,
                &[json!(player.as_str()), json!(puzzle.as_str())],
                HttpRequest::post(path),
            )
            .await?)
    }

    async fn reset_progress(&self, player: &PlayerId) -> GameResult<Value> {
        Ok(self
            .router
            .route(
                methods::RESET_GAME,
                &[json!(player.as_str())],
                HttpRequest::post(format!("/game/reset/{}", encode(player.as_str()))),
            )
            .await?)
    }

    async fn unlock_all(&self, player: &PlayerId) -> GameResult<Value> {
        Ok(self
            .router
            .route(
                methods::UNLOCK_ALL,
                &[json!(player.as_str())],
                HttpRequest::post(format!("/game/unlock-all/{}", encode(player.as_str()))),
            )
            .await?)
    }

    async fn game_info(&self) -> GameResult<Value> {
        Ok(self
            .router
            .route(methods::GAME_INFO, &[], HttpRequest::get("/game/info"))
            .await?)
    }
}
