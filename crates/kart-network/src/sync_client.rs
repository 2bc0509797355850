//! WebSocket client for the name server.
//!
//! One background task owns the socket. It reports to the controller over
//! a single-consumer event queue, so frames are handled strictly in arrival
//! order, and publishes its [`ConnectionState`] on a watch channel so that
//! outbound commands can check readiness without awaiting.
//!
//! There is no reconnect, heartbeat or acknowledgement: once the
//! connection is `Closed` or `Errored` the session is over.

use futures_util::{SinkExt, StreamExt};
use kart_protocol::{ClientCommand, ConnectionState, NameList};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::SyncError;

const EVENT_QUEUE_CAPACITY: usize = 256;

/// Build `ws://<host>:<port>`.
pub fn sync_url(host: &str, port: u16) -> Result<Url, SyncError> {
    parse_sync_url(&format!("ws://{host}:{port}"))
}

/// Parse an explicit endpoint, accepting only `ws` and `wss` schemes.
pub fn parse_sync_url(raw: &str) -> Result<Url, SyncError> {
    let url = Url::parse(raw).map_err(|e| SyncError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(SyncError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// What the connection task reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Handshake completed; commands may now be sent.
    Opened,
    /// A full replacement name list.
    Names(NameList),
    /// The connection ended in `state` (`Closed` or `Errored`).
    ConnectionLost {
        state: ConnectionState,
        reason: String,
    },
}

impl SyncEvent {
    pub fn lost_error(&self) -> Option<SyncError> {
        match self {
            SyncEvent::ConnectionLost { reason, .. } => {
                Some(SyncError::ConnectionLost(reason.clone()))
            }
            _ => None,
        }
    }
}

/// Cheap handle for sending commands and reading connection state.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    state: watch::Receiver<ConnectionState>,
    commands: mpsc::UnboundedSender<ClientCommand>,
}

impl SyncHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Ask the server to reshuffle. Silently ignored unless the connection
    /// is open; returns whether the command was queued for sending. Nothing
    /// changes locally until the server's resulting name frame arrives.
    pub fn scramble(&self) -> bool {
        self.send(ClientCommand::Scramble)
    }

    pub fn send(&self, command: ClientCommand) -> bool {
        if !self.is_open() {
            tracing::debug!(
                command = command.as_frame(),
                state = self.state().as_str(),
                "Connection not open, dropping command"
            );
            return false;
        }
        self.commands.send(command).is_ok()
    }
}

/// The connection task.
pub struct SyncClient {
    url: Url,
    state: watch::Sender<ConnectionState>,
    events: mpsc::Sender<SyncEvent>,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
}

impl SyncClient {
    /// Spawn the connection task and return its handle plus the event queue.
    /// Must be called from within a tokio runtime.
    pub fn connect(url: Url) -> (SyncHandle, mpsc::Receiver<SyncEvent>) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let client = SyncClient {
            url,
            state: state_tx,
            events: event_tx,
            commands: command_rx,
        };
        tokio::spawn(client.run());

        let handle = SyncHandle {
            state: state_rx,
            commands: command_tx,
        };
        (handle, event_rx)
    }

    fn transition(&self, next: ConnectionState) {
        let current = *self.state.borrow();
        if !current.can_transition_to(next) {
            tracing::warn!(
                from = current.as_str(),
                to = next.as_str(),
                "Ignoring illegal connection transition"
            );
            return;
        }
        tracing::debug!(from = current.as_str(), to = next.as_str(), "Connection state");
        self.state.send_replace(next);
    }

    async fn lose(&self, state: ConnectionState, reason: String) {
        self.transition(state);
        tracing::warn!(url = %self.url, state = state.as_str(), %reason, "Name server connection lost");
        let _ = self
            .events
            .send(SyncEvent::ConnectionLost { state, reason })
            .await;
    }

    async fn run(mut self) {
        self.transition(ConnectionState::Connecting);

        let ws = match tokio_tungstenite::connect_async(self.url.as_str()).await {
            Ok((ws, _response)) => ws,
            Err(e) => {
                self.lose(ConnectionState::Errored, format!("handshake failed: {e}"))
                    .await;
                return;
            }
        };

        self.transition(ConnectionState::Open);
        tracing::info!(url = %self.url, "Connected to name server");
        if self.events.send(SyncEvent::Opened).await.is_err() {
            return;
        }

        let (mut write, mut read) = ws.split();
        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let names = NameList::parse(text.as_str());
                        tracing::debug!(count = names.len(), "Received name frame");
                        if self.events.send(SyncEvent::Names(names)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        // Flush tungstenite's queued close reply.
                        let _ = write.close().await;
                        let reason = match frame {
                            Some(frame) => format!(
                                "closed by server ({}) {}",
                                u16::from(frame.code),
                                frame.reason.as_str()
                            ),
                            None => "closed by server".to_string(),
                        };
                        self.lose(ConnectionState::Closed, reason.trim_end().to_string())
                            .await;
                        return;
                    }
                    Some(Ok(other)) => {
                        tracing::trace!(kind = ?other, "Ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        self.lose(ConnectionState::Errored, e.to_string()).await;
                        return;
                    }
                    None => {
                        self.lose(ConnectionState::Closed, "stream ended".to_string())
                            .await;
                        return;
                    }
                },
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    tracing::info!(command = command.as_frame(), "Sending command");
                    if let Err(e) = write.send(Message::text(command.as_frame().to_string())).await {
                        self.lose(ConnectionState::Errored, format!("send failed: {e}"))
                            .await;
                        return;
                    }
                }
            }
        }

        // Owner went away: close politely.
        let _ = write.send(Message::Close(None)).await;
        self.transition(ConnectionState::Closed);
    }
}
