//! Improv Studio Player - terminal client.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use improvstudio_player::cli::{self, CliAction};
use improvstudio_player::infrastructure::config::PlayerConfig;
use improvstudio_player::infrastructure::turn_client::HttpTurnClient;
use improvstudio_player::playback::{AudioSink, PlaybackSequencer};
use improvstudio_player::StudioSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Logs go to stderr so they don't interleave with the script.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "improvstudio_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PlayerConfig::from_env();
    let turns = Arc::new(HttpTurnClient::new(&config.engine_url)?);
    tracing::info!(
        turn_url = %turns.turn_url(),
        auto_continue = config.auto_continue,
        "Starting Improv Studio Player"
    );

    let sequencer = PlaybackSequencer::new(audio_sink(), config.playback);
    let (session, handle, mut events) =
        StudioSession::new(turns, sequencer, config.auto_continue);
    let session = tokio::spawn(session.run());

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(text) = cli::render_event(&event) {
                println!("{text}");
            }
        }
    });

    println!("Type a stage direction. Controls: /stop, /auto on|off, /quit");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        match cli::parse_line(&line) {
            Some(CliAction::Send(input)) => {
                if handle.send(input).await.is_err() {
                    break;
                }
            }
            Some(CliAction::Quit) => break,
            Some(CliAction::Unknown(control)) => println!("Unknown control: {control}"),
            None => {}
        }
    }

    drop(handle);
    let scene = session.await?;
    printer.await?;

    if let Some(scene) = scene {
        tracing::info!(
            scene_id = %scene.id,
            lines = scene.lines().len(),
            "Scene ended"
        );
    }

    Ok(())
}

#[cfg(feature = "speaker")]
fn audio_sink() -> Arc<dyn AudioSink> {
    match improvstudio_player::playback::SpeakerSink::new() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output, lines will play silently");
            Arc::new(improvstudio_player::playback::NullAudioSink)
        }
    }
}

#[cfg(not(feature = "speaker"))]
fn audio_sink() -> Arc<dyn AudioSink> {
    tracing::info!("Built without the speaker feature, lines will play silently");
    Arc::new(improvstudio_player::playback::NullAudioSink)
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
