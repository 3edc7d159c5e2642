//! Arena configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use crate::opponent::{RetryPolicy, Style};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strictly_chess::Side;
use strum::{Display as StrumDisplay, EnumString};
use tracing::{debug, info, instrument};

/// Which opponent backend a session uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// Generative model ("easy").
    #[default]
    Llm,
    /// UCI engine ("hard").
    Engine,
}

/// Generative backend settings.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct LlmSection {
    /// Provider (openai or anthropic).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens per reply. A coordinate move needs very few.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

/// UCI engine settings.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct EngineSection {
    /// Command line that starts the engine.
    #[serde(default = "default_engine_command")]
    command: Vec<String>,

    /// Search depth passed to `go depth`.
    #[serde(default = "default_depth")]
    depth: u32,
}

/// Retry settings for generative backends.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ResolverSection {
    /// Backend calls before falling back to a random legal move.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Per-attempt timeout in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    attempt_timeout_secs: u64,

    /// Fallback RNG seed. Random when absent.
    #[serde(default)]
    #[setters(strip_option)]
    seed: Option<u64>,
}

/// Top-level configuration for a chess session.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ArenaConfig {
    /// Name recorded on the leaderboard.
    #[serde(default = "default_player_name")]
    player_name: String,

    /// Side the human plays.
    #[serde(default = "default_human_side")]
    human_side: Side,

    /// Opponent playing style.
    #[serde(default)]
    style: Style,

    /// Opponent backend.
    #[serde(default)]
    backend: BackendKind,

    /// SQLite database path. In-memory leaderboard when absent.
    #[serde(default)]
    #[setters(strip_option)]
    database: Option<PathBuf>,

    /// Generative backend settings.
    #[serde(default)]
    llm: LlmSection,

    /// Engine backend settings.
    #[serde(default)]
    engine: EngineSection,

    /// Retry settings.
    #[serde(default)]
    resolver: ResolverSection,
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    16
}

fn default_engine_command() -> Vec<String> {
    vec!["stockfish".to_string()]
}

fn default_depth() -> u32 {
    15
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_human_side() -> Side {
    Side::White
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            depth: default_depth(),
        }
    }
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            seed: None,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            human_side: default_human_side(),
            style: Style::default(),
            backend: BackendKind::default(),
            database: None,
            llm: LlmSection::default(),
            engine: EngineSection::default(),
            resolver: ResolverSection::default(),
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or invalid values.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.player_name = Self::checked_player_name(&config.player_name)?;
        if config.resolver.max_attempts == 0 {
            return Err(ConfigError::new(
                "resolver.max_attempts must be at least 1".to_string(),
            ));
        }
        info!(
            player = %config.player_name,
            backend = %config.backend,
            style = %config.style,
            "Config loaded"
        );
        Ok(config)
    }

    /// Trims a player name, rejecting one that is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if nothing but whitespace remains.
    pub fn checked_player_name(name: &str) -> Result<String, ConfigError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::new("player_name must not be blank".to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Builds LLM settings, reading the provider's API key from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key variable is unset.
    #[instrument(skip(self), fields(provider = %self.llm.provider, model = %self.llm.model))]
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.llm.provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;
        Ok(LlmConfig::new(
            self.llm.provider,
            api_key,
            self.llm.model.clone(),
            self.llm.max_tokens,
        ))
    }

    /// Retry policy for the opponent resolver.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.resolver.max_attempts,
            Duration::from_secs(self.resolver.attempt_timeout_secs),
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
