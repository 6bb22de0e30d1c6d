use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dubsync::audio::ClipStore;
use dubsync::export::{export_wav, ExportRequest, OfflineRenderer};
use dubsync::kernel::time::SimulatedClock;
use dubsync::outputs::TracingSink;
use dubsync::timeline::Timeline;
use dubsync::{EngineConfig, Reactor};

const USAGE: &str = "usage:
  dubsync export <timeline.json> <clips-dir> <out.wav> [duration-secs]
  dubsync play <timeline.json> <clips-dir> [from-secs] [for-secs]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = EngineConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("export") => export(&args[1..], &config).await,
        Some("play") => play(&args[1..], config).await,
        _ => bail!("{USAGE}"),
    }
}

fn optional_secs(arg: Option<&String>, name: &str) -> anyhow::Result<Option<f64>> {
    arg.map(|s| s.parse::<f64>().with_context(|| format!("{name} must be a number of seconds")))
        .transpose()
}

async fn export(args: &[String], config: &EngineConfig) -> anyhow::Result<()> {
    let [timeline_path, clips_dir, out_path, rest @ ..] = args else {
        bail!("{USAGE}");
    };
    let duration = optional_secs(rest.first(), "duration")?;

    let timeline = Timeline::load(timeline_path)?;
    let clips = ClipStore::load_dir(clips_dir, &timeline);
    let renderer = OfflineRenderer::from_config(config);

    let mix = export_wav(
        renderer,
        timeline,
        clips,
        ExportRequest { duration },
        PathBuf::from(out_path),
    )
    .await
    .context("export failed")?;

    tracing::info!("Wrote {} ({} segments placed)", out_path, mix.placed);
    Ok(())
}

async fn play(args: &[String], config: EngineConfig) -> anyhow::Result<()> {
    let [timeline_path, clips_dir, rest @ ..] = args else {
        bail!("{USAGE}");
    };
    let from = optional_secs(rest.first(), "from")?.unwrap_or(0.0);

    let timeline = Timeline::load(timeline_path)?;
    let clips = ClipStore::load_dir(clips_dir, &timeline);
    let media_end = timeline.end_time().unwrap_or(0.0) + config.export_tail_secs;
    let run_for = optional_secs(rest.get(1), "for")?
        .unwrap_or(media_end - from)
        .max(0.0);

    // 2. Setup Reactor + Channels
    let (tx, rx) = mpsc::channel(256);
    let mut reactor = Reactor::new(rx, tx, config);
    reactor.replace_timeline(timeline);
    reactor.clips = clips;

    let clock = SimulatedClock::new(Some(media_end));
    clock.seek(from);
    clock.play();

    let shutdown = CancellationToken::new();
    let timer = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(run_for)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        timer.cancel();
    });

    // 3. Run Kernel
    tracing::info!("Headless playback from {:.2}s for {:.2}s", from, run_for);
    let mut sink = TracingSink;
    reactor.run(&clock, &mut sink, shutdown).await;

    let snap = reactor.telemetry.snapshot();
    tracing::info!(
        "Sources started: {}, finished: {}, stale decodes: {}, decode failures: {}",
        snap.source_stats.started,
        snap.source_stats.finished,
        snap.decode_stats.stale_discarded,
        snap.decode_stats.failed
    );
    Ok(())
}
