use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::protocol::{AgentReport, AgentState, Command};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub text: String,
    pub min_delay: u64,
    pub max_delay: u64,
    pub mouse_movement: bool,
    pub idle_scroll: bool,
}

impl ControllerSettings {
    fn start_command(&self) -> Command {
        Command::StartTyping {
            text: self.text.clone(),
            min_delay: self.min_delay,
            max_delay: self.max_delay,
            mouse_movement: self.mouse_movement,
            idle_scroll: self.idle_scroll,
        }
    }
}

/// Listen for typing agents and dispatch the configured text to each one
/// that reports ready. Ctrl+C broadcasts `stop_typing` to every connected
/// agent and shuts the controller down.
pub async fn run_controller(bind: &str, settings: ControllerSettings) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {bind}; waiting for agents");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let accept_shutdown = shutdown_tx.clone();
    let accept = async {
        loop {
            let (stream, peer) = listener.accept().await.context("accept failed")?;
            info!("agent connected: {peer}");
            let settings = settings.clone();
            let shutdown = accept_shutdown.subscribe();
            tokio::spawn(async move {
                if let Err(err) = handle_agent(stream, settings, shutdown).await {
                    warn!("agent {peer} ended with error: {err:#}");
                } else {
                    info!("agent {peer} disconnected");
                }
            });
        }
    };

    tokio::select! {
        result = accept => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down, stopping agents");
            let _ = shutdown_tx.send(());
            // Give the stop command a moment to flush.
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(())
        }
    }
}

async fn handle_agent(
    stream: TcpStream,
    settings: ControllerSettings,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let ws = accept_async(stream)
        .await
        .context("websocket handshake failed")?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let Some(msg) = msg else { return Ok(()) };
                let msg = msg.context("websocket receive failed")?;
                let text = match msg {
                    Message::Text(text) => text,
                    Message::Close(_) => return Ok(()),
                    _ => continue,
                };

                let report: AgentReport = match serde_json::from_str(&text) {
                    Ok(report) => report,
                    Err(err) => {
                        warn!("ignoring malformed report: {err}");
                        continue;
                    }
                };

                match report {
                    AgentReport::Ready => {
                        info!("agent ready, sending text ({} chars)", settings.text.len());
                        let json = serde_json::to_string(&settings.start_command())
                            .context("failed to encode command")?;
                        ws_tx
                            .send(Message::Text(json.into()))
                            .await
                            .context("failed to send start command")?;
                    }
                    AgentReport::Status { status } => match status {
                        AgentState::Busy => info!("agent is typing"),
                        AgentState::Free => info!("agent finished"),
                    },
                }
            }
            _ = shutdown.recv() => {
                let json = serde_json::to_string(&Command::StopTyping)
                    .context("failed to encode stop command")?;
                let _ = ws_tx.send(Message::Text(json.into())).await;
                let _ = ws_tx.send(Message::Close(None)).await;
                return Ok(());
            }
        }
    }
}
