//! Parlance - Service API for conversational AI applications
//!
//! This crate exposes the token-authenticated service API surface of the
//! platform: message history, message feedback, suggested follow-up
//! questions, and audio transcription/synthesis.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
