//! Alfiere: chess move search on top of shakmaty
//!
//! A move request asks the opening book first and falls back to either an
//! alpha-beta search with iterative deepening or Monte Carlo tree search.

pub mod board;
pub mod book;
pub mod engine;
pub mod error;
pub mod eval;
pub mod search;
pub mod time;
pub mod uci;

pub use engine::{Engine, EngineConfig, MoveSource, Strategy};
pub use error::{BookError, EngineError, EngineResult};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`)
///
/// Stdout is reserved for protocol output. Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
