// Library surface for headless/integration tests and reuse.
// Rendering and terminal setup stay in the binary.
pub mod app_dirs;
pub mod best_time;
pub mod celebration;
pub mod config;
pub mod controls;
pub mod deck;
pub mod error;
pub mod feedback;
pub mod game;
pub mod logging;
pub mod runtime;
pub mod scoring;
pub mod util;

pub use error::{DeckError, GameError, StoreError};
pub use game::{Game, Phase};
