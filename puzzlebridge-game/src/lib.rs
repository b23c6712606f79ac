//! Game layer for PuzzleBridge.
//!
//! - [`GameClient`] maps the six game operations onto a
//!   [`TransportRouter`](puzzlebridge_transport::TransportRouter)
//! - [`PuzzleStateStore`] keeps an offline-first snapshot of the current
//!   player's puzzles and re-syncs it after every mutation
//! - [`PuzzleSessionController`] walks one puzzle from open to dismissal and
//!   reports to a [`PuzzleView`]

pub mod client;
pub mod config;
mod error;
pub mod mock;
pub mod session;
pub mod store;
pub mod view;

pub use client::{GameBackend, GameClient};
pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use session::{
    normalize_answer, OpenOutcome, PuzzleSessionController, SessionState, SubmitOutcome,
};
pub use store::{PuzzleStateStore, StoreState};
pub use view::{Feedback, FragmentLoader, Initializer, InitializerRegistry, PuzzleView};
