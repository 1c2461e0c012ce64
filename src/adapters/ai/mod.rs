//! AI adapters - Implementations of the TurnGenerator port.
//!
//! - `OpenAITurnGenerator` - OpenAI-compatible chat completions API
//! - `MockTurnGenerator` - Scripted generator for tests and local runs

mod mock_generator;
mod openai_generator;

pub use mock_generator::{MockResponse, MockTurnGenerator, DEFAULT_MOCK_TURN};
pub use openai_generator::{OpenAIConfig, OpenAITurnGenerator};
