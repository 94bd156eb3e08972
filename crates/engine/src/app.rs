//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    elevenlabs::ElevenLabsClient,
    openai::OpenAiClient,
    ports::{ClockPort, LlmPort, SpeechPort},
};
use crate::use_cases::turn::{DialogueGenerator, ProcessTurn, StartScene, TurnUseCases};

/// Main application state.
///
/// Holds all use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub turn: TurnUseCases,
}

impl App {
    /// Wire use cases from port implementations.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        speech: Arc<dyn SpeechPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let generator = Arc::new(DialogueGenerator::new(llm));
        let process = Arc::new(ProcessTurn::new(generator, speech, clock.clone()));
        let start_scene = Arc::new(StartScene::new(clock));

        Self {
            use_cases: UseCases {
                turn: TurnUseCases::new(process, start_scene),
            },
        }
    }

    /// Wire the production adapters from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let llm = OpenAiClient::new(&config.llm);
        if !llm.is_configured() {
            tracing::warn!("LLM_API_KEY is missing or a placeholder; turns will fail until it is set");
        }

        let speech = ElevenLabsClient::new(&config.tts);
        if !speech.is_configured() {
            tracing::warn!("TTS_API_KEY is missing or a placeholder; lines will have no audio");
        }

        Self::new(Arc::new(llm), Arc::new(speech), Arc::new(SystemClock::new()))
    }
}
