//! WebSocket Transport
//!
//! Connects to the remote simulation engine and pumps traffic between
//! the socket and the sync engine's channels. One connection spawns
//! two tasks: a writer that drains the command channel, and a reader
//! that decodes inbound text frames into [`EngineEvent`]s.
//!
//! Every event is tagged with the [`ConnectionId`] minted for this
//! connection, so the engine can discard late traffic after the
//! connection has been superseded. Dropping the command sender closes
//! the writer, which closes the socket.

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::engine::{CommandSender, ConnectionId, EngineEvent};
use crate::protocol::{self, ServerMessage};

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The WebSocket handshake failed
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Endpoint that was attempted
        url: String,
        /// Underlying handshake error
        #[source]
        source: tungstenite::Error,
    },
}

/// A live connection: the command sender to hand to the sync engine
/// and the event stream to drain in the main loop.
pub struct Connection {
    /// Identity of this connection
    pub id: ConnectionId,
    /// Outbound command channel (exclusively owned by the engine)
    pub commands: CommandSender,
    /// Inbound events, already tagged with `id`
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

/// Open a connection to the experiment endpoint.
///
/// Resolves once the transport reports open; the returned event
/// stream starts with an `Opened` event and ends with `Closed` when
/// the socket goes away for any reason. No automatic reconnect:
/// a fresh session is always an explicit caller decision.
pub async fn connect(url: &str) -> Result<Connection, TransportError> {
    let (stream, _response) =
        connect_async(url)
            .await
            .map_err(|source| TransportError::Connect {
                url: url.to_string(),
                source,
            })?;

    let id = ConnectionId::next();
    tracing::info!(%id, url, "websocket open");

    let (mut sink, mut source) = stream.split();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let _ = event_tx.send(EngineEvent::Opened { conn: id });

    // Writer: serialize and send until the engine drops the sender.
    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            let text = match protocol::encode(&command) {
                Ok(text) => text,
                Err(error) => {
                    tracing::error!(%error, "unencodable command dropped");
                    continue;
                }
            };
            if let Err(error) = sink.send(Message::Text(text)).await {
                tracing::warn!(%id, %error, "websocket send failed");
                break;
            }
        }
        let _ = sink.close().await;
        tracing::debug!(%id, "writer task done");
    });

    // Reader: decode text frames into engine events until the socket
    // closes. A malformed payload becomes a displayable error event,
    // never a fault.
    tokio::spawn(async move {
        while let Some(result) = source.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let msg = match protocol::decode(&text) {
                        Ok(msg) => msg,
                        Err(error) => {
                            tracing::warn!(%id, %error, "ignoring malformed message");
                            ServerMessage::Error {
                                message: format!("unreadable server message: {error}"),
                            }
                        }
                    };
                    if event_tx.send(EngineEvent::Message { conn: id, msg }).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                // Pings are answered by the library; binary frames are
                // not part of this protocol.
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%id, %error, "websocket receive failed");
                    break;
                }
            }
        }
        let _ = event_tx.send(EngineEvent::Closed { conn: id });
        tracing::debug!(%id, "reader task done");
    });

    Ok(Connection {
        id,
        commands: command_tx,
        events: event_rx,
    })
}
