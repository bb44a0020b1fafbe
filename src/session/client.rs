//! WebSocket client for the platform streaming endpoint
//!
//! Thin wrapper over a single `tokio-tungstenite` connection: connect,
//! receive, keepalive, close. Frame interpretation beyond the protocol
//! level belongs to the session.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Protocol-level event surfaced to the receive loop
#[derive(Debug)]
pub(crate) enum SocketEvent {
    /// A text payload ready for dispatch
    Text(String),
    /// The peer closed the connection
    Closed { code: u16, reason: String },
}

/// WebSocket client for a single connection
pub(crate) struct FeedSocket {
    stream: Option<WsStream>,
    endpoint: String,
}

impl FeedSocket {
    pub(crate) fn new(endpoint: &str) -> Self {
        Self {
            stream: None,
            endpoint: endpoint.to_string(),
        }
    }

    /// Connect to the streaming endpoint.
    ///
    /// For `wss://` endpoints the TLS handshake performs full peer
    /// certificate validation and hostname verification against the
    /// platform trust store. The feed carries authenticated trading state,
    /// so there is deliberately no switch to relax either check.
    pub(crate) async fn connect(&mut self) -> Result<()> {
        info!(endpoint = %self.endpoint, "Connecting to streaming endpoint");

        let (ws_stream, response) = connect_async(&self.endpoint).await.map_err(|e| {
            FeedError::WebSocketConnection(format!("Failed to connect: {}", e))
        })?;

        info!(status = ?response.status(), "WebSocket connected");
        self.stream = Some(ws_stream);

        Ok(())
    }

    /// Receive the next event.
    ///
    /// Returns `Ok(None)` for frames with nothing to dispatch (ping, pong).
    /// Binary frames are decoded lossily and treated as text.
    pub(crate) async fn recv(&mut self) -> Result<Option<SocketEvent>> {
        let stream = self.stream.as_mut().ok_or(FeedError::NotConnected)?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(len = text.len(), "Received text frame");
                Ok(Some(SocketEvent::Text(text)))
            }
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8_lossy(&data).to_string();
                Ok(Some(SocketEvent::Text(text)))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Some(stream) = self.stream.as_mut() {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => Ok(None),
            Some(Ok(Message::Close(frame))) => {
                warn!(frame = ?frame, "Received close frame");
                self.stream = None;
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.to_string()))
                    .unwrap_or((1005, String::new()));
                Ok(Some(SocketEvent::Closed { code, reason }))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                self.stream = None;
                Err(FeedError::WebSocketMessage(e.to_string()))
            }
            None => {
                warn!("WebSocket stream ended");
                self.stream = None;
                Ok(Some(SocketEvent::Closed {
                    code: 1006,
                    reason: "stream ended".to_string(),
                }))
            }
        }
    }

    /// Send a ping to keep the connection alive
    pub(crate) async fn ping(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream
                .send(Message::Ping(vec![]))
                .await
                .map_err(|e| FeedError::WebSocketMessage(e.to_string()))?;
        }
        Ok(())
    }

    /// Close the connection
    pub(crate) async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}
