use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use sandman::driver::SimulatedGpio;
use sandman::kernel::telemetry::TelemetryRecorder;
use sandman::kernel::{FinishReason, KernelEvent};
use sandman::outputs::phrases;
use sandman::{ActuationController, EventSink, IntentDispatcher, RoutineEngine, SandmanConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SANDMAN_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sandman.json"))
}

fn speak(text: &str) {
    // Stand-in for the text-to-speech collaborator.
    println!("[SPEAK] {}", text);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sandman=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    tracing::info!("Starting Sandman...");

    // 2. Configuration (fatal on any error)
    let path = config_path();
    let config = if path.exists() {
        SandmanConfig::load(&path)?
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using the default bed");
        SandmanConfig::bedside_default()
    };
    let registries = config.build().context("invalid configuration")?;

    // 3. Kernel
    let driver = Arc::new(SimulatedGpio::new(&registries.parts)?);
    let (events, mut event_rx) = EventSink::channel();
    let controller = ActuationController::new(registries.parts.clone(), driver, events.clone());
    let engine = RoutineEngine::new(registries.routines.clone(), controller.clone(), events);
    let dispatcher = IntentDispatcher::new(controller.clone(), engine.clone());
    let mut telemetry = TelemetryRecorder::new();

    if !config.startup_delay().is_zero() {
        tracing::info!(delay_sec = config.startup_delay_sec, "Waiting before accepting intents");
        tokio::time::sleep(config.startup_delay()).await;
    }

    // 4. Intent reader: one JSON payload per line on stdin
    let (intent_tx, mut intent_rx) = mpsc::channel::<String>(100);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if intent_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    speak("Sandman initialized.");
    tracing::info!(
        parts = registries.parts.len(),
        routines = registries.routines.len(),
        "Sandman active. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            Some(payload) = intent_rx.recv() => {
                let response = dispatcher.handle_json(&payload).await;
                speak(&response);
            }
            Some(event) = event_rx.recv() => {
                if let KernelEvent::RoutineFinished {
                    name,
                    reason: FinishReason::Completed,
                    ..
                } = &event
                {
                    speak(&phrases::routine_finished(name));
                }
                telemetry.record(event);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    engine.stop_all().await;
    controller.stop_all().await;

    while let Ok(event) = event_rx.try_recv() {
        telemetry.record(event);
    }
    let snapshot = telemetry.snapshot();
    tracing::info!(
        moves = snapshot.actuation_stats.started,
        preempted = snapshot.actuation_stats.preempted,
        driver_faults = snapshot.actuation_stats.driver_faults,
        routines = snapshot.routine_stats.started,
        routines_completed = snapshot.routine_stats.completed,
        "Session summary"
    );

    Ok(())
}
