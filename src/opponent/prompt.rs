//! Prompt text for generative opponents.

use super::request::OpponentRequest;
use crate::llm_client::ChatPrompt;

const SYSTEM: &str = "You are a chess engine. You answer with exactly one move in UCI \
coordinate notation and nothing else.";

/// Builds the chat prompt for `request`.
///
/// The model is told which colour it plays, its style, the FEN and the legal
/// moves as a JSON array, and is asked for a single move from that list.
pub fn build_prompt(request: &OpponentRequest) -> ChatPrompt {
    let legal = serde_json::to_string(&request.legal_coordinates()).unwrap_or_default();
    let user = format!(
        "You are playing as {side}.\n\n\
         Your play style is \"{style}\" and the current board position is:\n\
         FEN: {fen}\n\n\
         Here is a list of all valid legal moves you are allowed to choose from:\n\
         {legal}\n\n\
         Pick the best move based on your style and strategy. Output only one move \
         as a UCI string (e.g., \"e7e5\").\n\n\
         IMPORTANT: Your answer must be one of the moves in the list above. \
         Do not include any explanation or extra text.",
        side = request.side(),
        style = request.style(),
        fen = request.position(),
        legal = legal,
    );
    ChatPrompt::new(SYSTEM, user, request.style().temperature())
}
