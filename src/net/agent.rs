use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::backends::{self, BackendKind};
use crate::profile::{DelayRange, SessionConfig};
use crate::protocol::{AgentReport, AgentState, Command};
use crate::rng::RandomSource;
use crate::runner::{self, SessionOptions, SessionOutcome};

#[derive(Debug, Clone, Copy)]
pub struct AgentOptions {
    pub backend: BackendKind,
    /// Base session config; the delay range is overridden per command.
    pub config: SessionConfig,
    pub countdown_secs: u64,
}

/// Connect to a controller and type on its behalf.
///
/// The agent reports `ready` once, then loops on commands: `start_typing`
/// runs a session on a blocking worker (ignored with a log line while one
/// is already running), `stop_typing` raises the shared stop flag. There is
/// no reconnection; a dropped link ends the agent.
pub async fn run_agent(url: &str, opts: AgentOptions) -> Result<()> {
    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!("connected to controller at {url}");

    let (mut ws_tx, mut ws_rx) = ws.split();

    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<AgentReport>();
    let writer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            let json = match serde_json::to_string(&report) {
                Ok(json) => json,
                Err(err) => {
                    warn!("failed to encode report: {err}");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
    });

    let _ = report_tx.send(AgentReport::Ready);

    let busy = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(AtomicBool::new(false));

    while let Some(msg) = ws_rx.next().await {
        let msg = msg.context("websocket receive failed")?;
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let command: Command = match serde_json::from_str(&text) {
            Ok(command) => command,
            Err(err) => {
                warn!("ignoring malformed command: {err}");
                continue;
            }
        };

        match command {
            Command::StartTyping {
                text,
                min_delay,
                max_delay,
                mouse_movement,
                idle_scroll,
            } => {
                if busy.load(Ordering::SeqCst) {
                    info!("busy, ignoring start_typing");
                    continue;
                }

                info!(
                    chars = text.len(),
                    min_delay, max_delay, "starting typing session"
                );

                let mut cfg = opts.config;
                cfg.delays = DelayRange {
                    min_ms: min_delay,
                    max_ms: max_delay,
                };

                stop.store(false, Ordering::SeqCst);
                busy.store(true, Ordering::SeqCst);
                let _ = report_tx.send(AgentReport::Status {
                    status: AgentState::Busy,
                });

                let stop = stop.clone();
                let busy = busy.clone();
                let report_tx = report_tx.clone();
                let backend = opts.backend;
                let countdown_secs = opts.countdown_secs;

                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || {
                        typing_job(
                            &text,
                            &cfg,
                            backend,
                            countdown_secs,
                            mouse_movement,
                            idle_scroll,
                            stop,
                        )
                    })
                    .await;

                    match result {
                        Ok(Ok(outcome)) => info!(
                            completed = outcome.completed,
                            chars = outcome.chars_typed,
                            "typing session finished"
                        ),
                        Ok(Err(err)) => warn!("typing session failed: {err:#}"),
                        Err(err) => warn!("typing task panicked: {err}"),
                    }

                    busy.store(false, Ordering::SeqCst);
                    let _ = report_tx.send(AgentReport::Status {
                        status: AgentState::Free,
                    });
                });
            }
            Command::StopTyping => {
                info!("stop command received");
                stop.store(true, Ordering::SeqCst);
            }
        }
    }

    writer.abort();
    Ok(())
}

fn typing_job(
    text: &str,
    cfg: &SessionConfig,
    backend: BackendKind,
    countdown_secs: u64,
    mouse_movement: bool,
    idle_scroll: bool,
    stop: Arc<AtomicBool>,
) -> Result<SessionOutcome> {
    let mut sink = backends::create_sink(backend)?;
    let jitter_mouse = if mouse_movement {
        backends::create_mouse(backend)?
    } else {
        None
    };
    let idle_mouse = if idle_scroll {
        backends::create_mouse(backend)?
    } else {
        None
    };

    let opts = SessionOptions {
        countdown_secs,
        progress: false,
    };

    runner::run_session(
        text,
        cfg,
        RandomSource::from_entropy(),
        sink.as_mut(),
        jitter_mouse,
        idle_mouse,
        stop,
        &opts,
    )
}
