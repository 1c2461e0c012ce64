//! Interview orchestrator configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::PipelineSettings;

use super::error::ValidationError;

/// Orchestrator tunables
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Most recent turns sent to the generator
    #[serde(default = "default_max_transcript_turns")]
    pub max_transcript_turns: usize,

    /// Upper bound on one generator call, in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Generate the interviewer's greeting when a session starts
    #[serde(default = "default_opening_turn")]
    pub opening_turn: bool,
}

impl OrchestratorConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Settings for the turn pipeline.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            max_transcript_turns: self.max_transcript_turns,
            generation_timeout: self.generation_timeout(),
            opening_turn: self.opening_turn,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_transcript_turns < 2 {
            return Err(ValidationError::TranscriptWindowTooSmall);
        }
        if self.generation_timeout_secs == 0 || self.generation_timeout_secs > 300 {
            return Err(ValidationError::InvalidGenerationTimeout);
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_transcript_turns: default_max_transcript_turns(),
            generation_timeout_secs: default_generation_timeout(),
            opening_turn: default_opening_turn(),
        }
    }
}

fn default_max_transcript_turns() -> usize {
    40
}

fn default_generation_timeout() -> u64 {
    45
}

fn default_opening_turn() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let settings = OrchestratorConfig::default().pipeline_settings();
        let expected = PipelineSettings::default();
        assert_eq!(settings.max_transcript_turns, expected.max_transcript_turns);
        assert_eq!(settings.generation_timeout, expected.generation_timeout);
        assert_eq!(settings.opening_turn, expected.opening_turn);
    }

    #[test]
    fn window_must_hold_two_turns() {
        let config = OrchestratorConfig {
            max_transcript_turns: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::TranscriptWindowTooSmall));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = OrchestratorConfig {
            generation_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGenerationTimeout));
    }
}
