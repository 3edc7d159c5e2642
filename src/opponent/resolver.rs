//! Fault-tolerant opponent move resolution.
//!
//! [`OpponentMoveResolver::resolve`] always produces a move from the
//! request's legal set. Backend failures of any kind are absorbed: the
//! generative backend is retried up to the attempt budget, the engine is
//! asked once, and a uniformly random legal move covers whatever is left.

use super::backend::OpponentBackend;
use super::request::{AttemptError, MoveSource, OpponentRequest, Resolution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use strictly_chess::Move;
use tracing::{debug, info, instrument, warn};

/// Attempt budget and per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A zero budget is raised to one attempt.
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
        }
    }

    /// Maximum backend calls per request.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Timeout applied to each call.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}

/// Resolves opponent moves through a backend with retry and fallback.
#[derive(Debug)]
pub struct OpponentMoveResolver {
    backend: OpponentBackend,
    policy: RetryPolicy,
    rng: StdRng,
}

impl OpponentMoveResolver {
    /// Creates a resolver with an OS-seeded fallback RNG.
    pub fn new(backend: OpponentBackend, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reseeds the fallback RNG for reproducible choices.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The active policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Backend label.
    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Resolves a legal move for `request`. Never fails.
    #[instrument(
        skip(self, request),
        fields(
            backend = self.backend.kind(),
            side = %request.side(),
            generation = request.generation(),
            legal = request.legal_moves().len()
        )
    )]
    pub async fn resolve(&mut self, request: &OpponentRequest) -> Resolution {
        let budget = match self.backend {
            OpponentBackend::Engine { .. } => 1,
            OpponentBackend::Generative { .. } => self.policy.max_attempts,
        };

        for attempt in 1..=budget {
            match self.attempt(request).await {
                Ok(mv) => {
                    info!(%mv, attempt, "Opponent move accepted");
                    return Resolution::new(mv, attempt, MoveSource::Backend);
                }
                Err(error) => {
                    warn!(attempt, budget, %error, "OpponentMoveInvalid");
                }
            }
        }

        let mv = self.fallback(request);
        warn!(attempts = budget, %mv, "OpponentUnavailable, using random legal move");
        Resolution::new(mv, budget, MoveSource::Fallback)
    }

    async fn attempt(&mut self, request: &OpponentRequest) -> Result<Move, AttemptError> {
        let timeout = self.policy.attempt_timeout;
        let call = async {
            match &mut self.backend {
                OpponentBackend::Engine { client, depth } => {
                    client.best_move(request.position(), *depth).await
                }
                OpponentBackend::Generative { client } => client.propose(request).await,
            }
        };

        let reply = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| AttemptError::TimedOut(timeout))?
            .map_err(AttemptError::Backend)?;
        debug!(reply = %reply.trim(), "Backend replied");
        request.accept(&reply)
    }

    fn fallback(&mut self, request: &OpponentRequest) -> Move {
        let legal = request.legal_moves();
        // Requests are never empty, so the range is never empty.
        legal[self.rng.random_range(0..legal.len())]
    }
}
