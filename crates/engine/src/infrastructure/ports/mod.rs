//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - LLM calls (could swap OpenAI -> a local OpenAI-compatible server)
//! - Speech synthesis (could swap ElevenLabs -> other)
//! - Clock (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, SpeechPort,
    SpeechRequest, SynthesizedAudio, TokenUsage,
};

#[cfg(test)]
pub use external::{MockLlmPort, MockSpeechPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, SpeechError};
