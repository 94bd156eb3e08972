//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod elevenlabs;
pub mod openai;
pub mod ports;
