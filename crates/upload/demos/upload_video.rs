//! Uploads one video to the editor backend and prints progress.
//!
//! ```text
//! cargo run -p reelsend-upload --example upload_video -- <file> <video-id>
//! ```
//!
//! Ctrl-C cancels the upload. Set `RUST_LOG=reelsend_upload=debug` for
//! transport-level logs.

use anyhow::{Context, bail};
use reelsend_upload::{UploadCoordinator, UploadEvent, UploadState, UploaderConfig, VideoFile};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(video_id)) = (args.next(), args.next()) else {
        bail!("usage: upload_video <file> <video-id>");
    };

    let file = VideoFile::open(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;

    let mut coordinator = UploadCoordinator::http(UploaderConfig::default())?;
    let mut events = coordinator
        .take_events()
        .context("event receiver already taken")?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match &event {
                UploadEvent::Progress(percent) => println!("progress: {percent}%"),
                _ => {
                    if let Some(notice) = event.notification() {
                        println!("{}: {}", notice.title, notice.message);
                    }
                }
            }
        }
    });

    let canceller = coordinator.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let mut state = UploadState::Idle;
    coordinator.select_file(&mut state, Some(file))?;
    let outcome = coordinator.submit(&mut state, video_id).await?;

    drop(coordinator);
    let _ = printer.await;

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
