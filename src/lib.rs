//! Feedback Interviews - Conversational 360-degree feedback sessions.
//!
//! Each respondent receives a tokenized invitation and is interviewed by a
//! model-driven interviewer about one subject. This crate owns the session
//! lifecycle, the ordered turn log, turn generation and sanitizing, and
//! per-session admission control.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
