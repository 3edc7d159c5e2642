//! Opponent move resolution: backends, retry and fallback.

mod backend;
mod llm;
mod prompt;
mod request;
mod resolver;
mod style;
mod uci;

pub use backend::{BackendError, EngineClient, GenerativeClient, OpponentBackend};
pub use llm::LlmOpponent;
pub use prompt::build_prompt;
pub use request::{AttemptError, MoveSource, OpponentRequest, Resolution};
pub use resolver::{OpponentMoveResolver, RetryPolicy};
pub use style::Style;
pub use uci::UciEngine;
