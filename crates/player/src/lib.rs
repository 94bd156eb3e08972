//! Improv Studio Player.
//!
//! Client side of the studio: submits turns to the engine, plays each turn's
//! new lines in order and drives auto-continue.
//!
//! - `ports` - the turn endpoint boundary
//! - `infrastructure` - configuration and the HTTP turn client
//! - `playback` - the playback sequencer and audio sinks
//! - `studio` - the session loop
//! - `cli` - terminal input and rendering

pub mod cli;
pub mod infrastructure;
pub mod playback;
pub mod ports;
pub mod studio;

pub use studio::{StudioEvent, StudioHandle, StudioInput, StudioSession};
