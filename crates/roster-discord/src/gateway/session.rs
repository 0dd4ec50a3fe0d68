//! Gateway session: hello → identify → heartbeat + dispatch loop.
//!
//! No resume support. When the gateway asks for a reconnect, invalidates the
//! session, misses a heartbeat ack, or drops the socket, [`run_gateway`] opens a
//! fresh connection and identifies again. Only fatal close codes (bad token,
//! disallowed intents) stop the bot.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::mpsc,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use roster_core::{errors::Error, Result};

use super::{GatewayMessage, HelloPayload, IdentifyPayload, OpCode};
use crate::models::{Interaction, Ready};

/// Pause before identifying on a new connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Close codes after which identifying again cannot succeed.
const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

/// Dispatch events the bot consumes.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(Ready),
    InteractionCreate(Box<Interaction>),
}

/// What the socket loop should do after an incoming frame or a heartbeat tick.
#[derive(Debug)]
pub enum Step {
    Ignore,
    Identify { heartbeat_interval: Duration },
    SendHeartbeat,
    Emit(GatewayEvent),
    /// Drop this connection and identify on a new one.
    Reconnect(String),
    /// Stop the bot.
    Fatal(String),
}

/// Why a session ended without a fatal error.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Reconnect(String),
    /// The event receiver was dropped.
    Stopped,
}

/// Per-connection protocol state, kept free of I/O.
#[derive(Debug, Default)]
pub struct SessionState {
    sequence: Option<u64>,
    awaiting_ack: bool,
    identified: bool,
}

impl SessionState {
    /// Last dispatch sequence number seen.
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// Decode a text frame. Frames that don't parse (unknown ops included) are skipped.
    pub fn on_text(&mut self, text: &str) -> Step {
        match serde_json::from_str::<GatewayMessage>(text) {
            Ok(msg) => self.on_message(msg),
            Err(e) => {
                tracing::debug!(error = %e, frame = %text, "skipping unreadable gateway frame");
                Step::Ignore
            }
        }
    }

    pub fn on_message(&mut self, msg: GatewayMessage) -> Step {
        match msg.op {
            OpCode::Hello => {
                if self.identified {
                    return Step::Ignore;
                }
                let hello = msg
                    .d
                    .and_then(|d| serde_json::from_value::<HelloPayload>(d).ok());
                let Some(hello) = hello else {
                    return Step::Fatal("malformed hello payload".to_string());
                };
                self.identified = true;
                Step::Identify {
                    heartbeat_interval: Duration::from_millis(hello.heartbeat_interval.max(1)),
                }
            }
            OpCode::Dispatch => {
                if let Some(s) = msg.s {
                    self.sequence = Some(s);
                }
                Self::dispatch(msg.t.as_deref().unwrap_or_default(), msg.d)
            }
            OpCode::Heartbeat => Step::SendHeartbeat,
            OpCode::HeartbeatAck => {
                self.awaiting_ack = false;
                Step::Ignore
            }
            OpCode::Reconnect => Step::Reconnect("gateway requested reconnect".to_string()),
            OpCode::InvalidSession => Step::Reconnect("gateway invalidated the session".to_string()),
            other => {
                tracing::debug!(op = %other, "ignoring gateway op");
                Step::Ignore
            }
        }
    }

    /// Heartbeat timer fired. A beat that was never acknowledged means a zombie connection.
    pub fn heartbeat_due(&mut self) -> Step {
        if self.awaiting_ack {
            return Step::Reconnect("heartbeat not acknowledged".to_string());
        }
        self.awaiting_ack = true;
        Step::SendHeartbeat
    }

    /// The socket closed, with the close code when the peer sent one.
    pub fn on_close(code: Option<u16>) -> Step {
        match code {
            Some(code) if FATAL_CLOSE_CODES.contains(&code) => {
                Step::Fatal(format!("gateway closed with fatal code {code}"))
            }
            Some(code) => Step::Reconnect(format!("gateway closed with code {code}")),
            None => Step::Reconnect("gateway connection closed".to_string()),
        }
    }

    fn dispatch(event: &str, data: Option<serde_json::Value>) -> Step {
        let Some(data) = data else {
            return Step::Ignore;
        };
        match event {
            "READY" => match serde_json::from_value::<Ready>(data) {
                Ok(ready) => Step::Emit(GatewayEvent::Ready(ready)),
                Err(e) => Step::Fatal(format!("malformed READY payload: {e}")),
            },
            "INTERACTION_CREATE" => match serde_json::from_value::<Interaction>(data) {
                Ok(interaction) => Step::Emit(GatewayEvent::InteractionCreate(Box::new(interaction))),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed interaction");
                    Step::Ignore
                }
            },
            _ => Step::Ignore,
        }
    }
}

/// Keep a gateway connection up until the event receiver is dropped.
///
/// Each reconnectable end starts a fresh session with a new Identify. Fatal
/// close codes and failed connection attempts are returned as errors.
pub async fn run_gateway(
    url: &str,
    identify: IdentifyPayload,
    events: mpsc::Sender<GatewayEvent>,
) -> Result<()> {
    loop {
        match run_session(url, &identify, &events).await? {
            SessionEnd::Stopped => return Ok(()),
            SessionEnd::Reconnect(reason) => {
                tracing::warn!(reason = %reason, "gateway session ended; reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// One connection: connect, identify, and forward dispatch events until it ends.
pub async fn run_session(
    url: &str,
    identify: &IdentifyPayload,
    events: &mpsc::Sender<GatewayEvent>,
) -> Result<SessionEnd> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| Error::External(format!("gateway connect failed: {e}")))?;
    let (mut sink, mut stream) = ws.split();
    tracing::info!("gateway connected");

    let mut state = SessionState::default();
    let mut heartbeat: Option<Interval> = None;

    loop {
        let tick = async {
            match heartbeat.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        let step = tokio::select! {
            _ = tick => state.heartbeat_due(),
            frame = stream.next() => match frame {
                None => SessionState::on_close(None),
                Some(Err(e)) => Step::Reconnect(format!("gateway websocket error: {e}")),
                Some(Ok(WsMessage::Text(text))) => state.on_text(&text),
                Some(Ok(WsMessage::Close(frame))) => {
                    SessionState::on_close(frame.map(|f| u16::from(f.code)))
                }
                Some(Ok(_)) => Step::Ignore,
            },
        };

        let outgoing = match step {
            Step::Ignore => None,
            Step::Identify { heartbeat_interval } => {
                tracing::info!(
                    heartbeat_ms = heartbeat_interval.as_millis() as u64,
                    "gateway hello; identifying"
                );
                let mut interval =
                    interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                heartbeat = Some(interval);
                Some(GatewayMessage::identify(identify)?)
            }
            Step::SendHeartbeat => Some(GatewayMessage::heartbeat(state.sequence())),
            Step::Emit(event) => {
                if events.send(event).await.is_err() {
                    return Ok(SessionEnd::Stopped);
                }
                None
            }
            Step::Reconnect(reason) => return Ok(SessionEnd::Reconnect(reason)),
            Step::Fatal(reason) => return Err(Error::External(reason)),
        };

        if let Some(msg) = outgoing {
            let text = serde_json::to_string(&msg)?;
            if let Err(e) = sink.send(WsMessage::Text(text)).await {
                return Ok(SessionEnd::Reconnect(format!("gateway send failed: {e}")));
            }
        }
    }
}
