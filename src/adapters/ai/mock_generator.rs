//! Mock Turn Generator for testing.
//!
//! Provides a scripted implementation of the TurnGenerator port so the
//! orchestrator can be exercised without calling a real model.
//!
//! # Features
//!
//! - Pre-configured turns, consumed in order
//! - Simulated latency for single-flight and timeout testing
//! - Error injection for retry testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockTurnGenerator::new()
//!     .with_turn("Hi! How do you know Sam?")
//!     .with_error(TurnGenerationError::timeout(30));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::QuestionId;
use crate::ports::{GeneratedTurn, GeneratorInfo, TurnGenerationError, TurnGenerator, TurnRequest};

/// Text returned once the script is exhausted.
pub const DEFAULT_MOCK_TURN: &str = "Thanks for sharing. Could you tell me more?";

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Turn(GeneratedTurn),
    Error(TurnGenerationError),
}

/// Mock turn generator for testing.
#[derive(Debug, Clone)]
pub struct MockTurnGenerator {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: GeneratorInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<TurnRequest>>>,
}

impl Default for MockTurnGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTurnGenerator {
    /// Creates a new mock generator with an empty script.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: GeneratorInfo::new("mock", "mock-interviewer-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a plain turn.
    pub fn with_turn(self, text: impl Into<String>) -> Self {
        self.push(MockResponse::Turn(GeneratedTurn::text(text)))
    }

    /// Queues a turn linked to a template question.
    pub fn with_question_turn(self, text: impl Into<String>, question_id: QuestionId) -> Self {
        self.push(MockResponse::Turn(
            GeneratedTurn::text(text).with_question(question_id),
        ))
    }

    /// Queues an error.
    pub fn with_error(self, error: TurnGenerationError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a response on an already shared generator.
    pub fn enqueue(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Returns the number of calls made to this generator.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<TurnRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the most recent call, if any.
    pub fn last_call(&self) -> Option<TurnRequest> {
        lock(&self.calls).last().cloned()
    }

    fn push(self, response: MockResponse) -> Self {
        self.enqueue(response);
        self
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Turn(GeneratedTurn::text(DEFAULT_MOCK_TURN)))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl TurnGenerator for MockTurnGenerator {
    async fn generate_turn(
        &self,
        request: TurnRequest,
    ) -> Result<GeneratedTurn, TurnGenerationError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Turn(turn) => Ok(turn),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn generator_info(&self) -> GeneratorInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    fn request() -> TurnRequest {
        TurnRequest::opening(SessionId::new(), "ctx".to_string(), "Begin.")
    }

    #[tokio::test]
    async fn returns_turns_in_order_then_default() {
        let generator = MockTurnGenerator::new().with_turn("First").with_turn("Second");

        assert_eq!(generator.generate_turn(request()).await.unwrap().text, "First");
        assert_eq!(generator.generate_turn(request()).await.unwrap().text, "Second");
        assert_eq!(
            generator.generate_turn(request()).await.unwrap().text,
            DEFAULT_MOCK_TURN
        );
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let generator = MockTurnGenerator::new().with_error(TurnGenerationError::timeout(5));

        let err = generator.generate_turn(request()).await.unwrap_err();
        assert_eq!(err, TurnGenerationError::Timeout { timeout_secs: 5 });
    }

    #[tokio::test]
    async fn question_turns_carry_link() {
        let generator = MockTurnGenerator::new()
            .with_question_turn("Any strengths?", QuestionId::new("strengths").unwrap());

        let turn = generator.generate_turn(request()).await.unwrap();
        assert_eq!(turn.question_id.unwrap().as_str(), "strengths");
    }

    #[tokio::test]
    async fn tracks_calls_across_clones() {
        let generator = MockTurnGenerator::new();
        let shared = generator.clone();

        shared.generate_turn(request()).await.unwrap();
        assert_eq!(generator.call_count(), 1);
        assert!(generator.last_call().unwrap().is_opening());
    }

    #[tokio::test]
    async fn respects_delay() {
        let generator = MockTurnGenerator::new().with_delay(Duration::from_millis(30));

        let start = std::time::Instant::now();
        generator.generate_turn(request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
