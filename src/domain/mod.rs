//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `session` - Interview session lifecycle and moderation
//! - `interview` - Turns, templates, context building, and output sanitizing

pub mod foundation;
pub mod interview;
pub mod session;
