//! Live tests against the LLM providers. Run with `--features api`.

use strictly_chess::{GameStateMachine, Move, Side};
use strictly_chess_arena::{
    GenerativeClient, LlmClient, LlmConfig, LlmOpponent, LlmProvider, OpponentBackend,
    OpponentMoveResolver, OpponentRequest, RetryPolicy, Style,
};
use tracing::instrument;

fn request() -> OpponentRequest {
    let mut machine = GameStateMachine::standard();
    let mv = Move::from_coordinate("e2e4", Side::White).unwrap();
    machine.apply_move(mv).unwrap();
    OpponentRequest::from_machine(&machine, Style::Balanced, 0).unwrap()
}

fn client(provider: LlmProvider, model: &str) -> LlmClient {
    dotenvy::dotenv().ok();
    let api_key = std::env::var(provider.api_key_var())
        .unwrap_or_else(|_| panic!("{} not set", provider.api_key_var()));
    LlmClient::new(LlmConfig::new(provider, api_key, model.to_string(), 16))
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_proposes_a_move() {
    let opponent = LlmOpponent::new(client(LlmProvider::OpenAI, "gpt-4o"));
    let reply = opponent.propose(&request()).await.expect("Failed to propose");
    assert!(!reply.is_empty(), "Reply should not be empty");
    eprintln!("Reply: {}", reply);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_resolves_a_legal_move() {
    let opponent = LlmOpponent::new(client(LlmProvider::Anthropic, "claude-3-5-haiku-20241022"));
    let backend = OpponentBackend::Generative {
        client: Box::new(opponent),
    };
    let mut resolver = OpponentMoveResolver::new(backend, RetryPolicy::default());
    let request = request();

    let resolution = resolver.resolve(&request).await;
    assert!(request.legal_moves().contains(&resolution.mv()));
    eprintln!("Resolved {} via {}", resolution.mv(), resolution.source());
}
