//! Opponent playing styles.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Style the opponent is asked to play in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Style {
    /// Default style.
    #[default]
    Balanced,
    /// Prefers sharp, attacking play.
    Aggressive,
    /// Prefers solid, safe play.
    Defensive,
    /// Unpredictable; sampled at a higher temperature.
    Chaotic,
}

impl Style {
    /// Sampling temperature for generative backends.
    pub fn temperature(self) -> f32 {
        match self {
            Style::Chaotic => 1.2,
            Style::Balanced | Style::Aggressive | Style::Defensive => 0.3,
        }
    }
}
