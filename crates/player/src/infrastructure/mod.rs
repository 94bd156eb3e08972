//! Infrastructure adapters for the player.

pub mod config;
pub mod turn_client;
