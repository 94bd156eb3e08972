//! Improv Studio Shared - types shared by the Engine and the Player
//!
//! - `requests` / `responses` - the turn endpoint wire contract
//! - `audio` - self-contained `data:` audio references
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **Camel-case JSON** - matches the field names clients already send

pub mod audio;
pub mod requests;
pub mod responses;

pub use audio::{decode_data_url, encode_data_url, AudioRefError, InlineAudio};
pub use requests::TurnRequest;
pub use responses::{ErrorCode, ErrorResponse, TurnResponse};

/// Path of the turn endpoint, relative to the engine base URL.
pub const TURN_PATH: &str = "/api/turn";

/// Synthetic command issued by auto-continue.
pub const CONTINUE_COMMAND: &str = "continue";
