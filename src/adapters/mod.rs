//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process storage (tests, database-less runs)
//! - `postgres` - PostgreSQL storage via sqlx
//! - `ai` - Turn generators (OpenAI-compatible HTTP, scripted mock)
//! - `rate_limiter` - Sliding-window limiter and its janitor
//! - `summary` - Completion hand-off
//! - `http` - axum REST surface

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod summary;
