//! Connection session
//!
//! Owns the socket lifecycle and the background receive loop. Status
//! transitions are driven solely by the loop's callbacks into
//! [`SessionState`]; reconnection policy belongs to the caller.

mod client;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{FeedError, Result};
use crate::router::EventRouter;
use crate::state::SessionState;
use crate::FeedContext;

use client::{FeedSocket, SocketEvent};

/// Keepalive ping interval
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// A single long-lived streaming session.
///
/// `open` spawns the receive loop and returns immediately; progress is
/// observed through [`SessionState::snapshot`]. `close` terminates the
/// loop promptly: the dispatch in flight finishes and no handler is
/// interrupted.
pub struct ConnectionSession {
    endpoint: String,
    state: Arc<SessionState>,
    router: Arc<EventRouter>,
    ctx: Arc<FeedContext>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionSession {
    /// Create a session; no connection is attempted yet
    pub fn new(endpoint: impl Into<String>, ctx: Arc<FeedContext>, router: EventRouter) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            endpoint: endpoint.into(),
            state: Arc::new(SessionState::new()),
            router: Arc::new(router),
            ctx,
            shutdown,
            task: None,
        }
    }

    /// Handle to the shared status surface
    pub fn state(&self) -> Arc<SessionState> {
        Arc::clone(&self.state)
    }

    /// Establish the connection in a background task.
    ///
    /// Non-blocking: returns once the receive loop is scheduled, without
    /// waiting for the `Connected` transition. Connect failures surface as
    /// the `Error` status with `last_error` set.
    pub fn open(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Err(FeedError::AlreadyOpen);
        }

        self.state.set_connecting();

        let (shutdown, shutdown_rx) = watch::channel(false);
        self.shutdown = shutdown;

        let endpoint = self.endpoint.clone();
        let state = Arc::clone(&self.state);
        let router = Arc::clone(&self.router);
        let ctx = Arc::clone(&self.ctx);
        self.task = Some(tokio::spawn(receive_loop(
            endpoint,
            state,
            router,
            ctx,
            shutdown_rx,
        )));

        Ok(())
    }

    /// Terminate the receive loop and transition to `Disconnected`.
    ///
    /// The currently dispatching message runs to completion; diagnostics
    /// (`last_error`, `last_close`) recorded earlier stay readable.
    pub async fn close(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        if self.state.status() != crate::state::ConnectionStatus::Disconnected {
            self.state.on_close(1000, "client shutdown");
        }
    }
}

async fn receive_loop(
    endpoint: String,
    state: Arc<SessionState>,
    router: Arc<EventRouter>,
    ctx: Arc<FeedContext>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut socket = FeedSocket::new(&endpoint);
    if let Err(e) = socket.connect().await {
        state.on_error(&e.to_string());
        return;
    }
    state.on_open();

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // first tick fires immediately

    enum LoopEvent {
        Shutdown,
        Ping,
        Socket(Result<Option<SocketEvent>>),
    }

    loop {
        // Branch handlers only label the wakeup; the socket is used below,
        // after the recv future has been dropped.
        let loop_event = tokio::select! {
            _ = shutdown_rx.changed() => LoopEvent::Shutdown,
            _ = ping_interval.tick() => LoopEvent::Ping,
            event = socket.recv() => LoopEvent::Socket(event),
        };

        match loop_event {
            LoopEvent::Shutdown => {
                info!("Session shutdown requested");
                socket.close().await;
                state.on_close(1000, "client shutdown");
                break;
            }
            LoopEvent::Ping => {
                if let Err(e) = socket.ping().await {
                    warn!(error = %e, "Keepalive ping failed");
                }
            }
            LoopEvent::Socket(Ok(Some(SocketEvent::Text(text)))) => {
                // Advisory only: readers must not treat this flag as a
                // lock, the caches carry their own synchronization.
                state.begin_dispatch();
                router.dispatch(&ctx, &text);
                state.end_dispatch();
            }
            LoopEvent::Socket(Ok(Some(SocketEvent::Closed { code, reason }))) => {
                warn!(code, reason = %reason, "Connection closed by peer");
                state.on_close(code, &reason);
                break;
            }
            LoopEvent::Socket(Ok(None)) => {}
            LoopEvent::Socket(Err(e)) => {
                state.on_error(&e.to_string());
                break;
            }
        }
    }
    info!("Receive loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::default_registry;
    use crate::state::{CloseInfo, ConnectionStatus};
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::Message;

    async fn wait_for_status(state: &SessionState, wanted: ConnectionStatus) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.status() != wanted {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("status transition timed out");
    }

    fn test_session(addr: std::net::SocketAddr) -> (ConnectionSession, Arc<FeedContext>) {
        let ctx = Arc::new(FeedContext::new(&Config::default()));
        let router = EventRouter::new(default_registry());
        let session = ConnectionSession::new(format!("ws://{addr}"), Arc::clone(&ctx), router);
        (session, ctx)
    }

    #[tokio::test]
    async fn test_lifecycle_open_dispatch_close() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(
                r#"{"name":"timeSync","msg":1672531200000}"#.to_string(),
            ))
            .await
            .unwrap();
            // A malformed frame must be dropped without disturbing status.
            ws.send(Message::Text("{broken".to_string())).await.unwrap();
            ws.send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "normal".into(),
            })))
            .await
            .unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (mut session, ctx) = test_session(addr);
        assert_eq!(session.state().status(), ConnectionStatus::Disconnected);

        session.open().unwrap();
        let status = session.state().status();
        assert!(
            status == ConnectionStatus::Connecting || status == ConnectionStatus::Connected,
            "open must not wait for Connected, got {status:?}"
        );

        wait_for_status(&session.state(), ConnectionStatus::Disconnected).await;

        let snap = session.state().snapshot();
        assert_eq!(
            snap.last_close,
            Some(CloseInfo {
                code: 1000,
                reason: "normal".to_string()
            })
        );
        assert_eq!(snap.last_error, None);
        assert!(!snap.dispatch_in_flight);
        assert_eq!(ctx.market.read().server_time_ms, Some(1672531200000));

        server.await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn test_close_terminates_receive_loop() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Send nothing; just wait for the client-initiated close.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (mut session, _ctx) = test_session(addr);
        session.open().unwrap();
        wait_for_status(&session.state(), ConnectionStatus::Connected).await;

        session.close().await;
        let snap = session.state().snapshot();
        assert_eq!(snap.status, ConnectionStatus::Disconnected);
        assert_eq!(
            snap.last_close,
            Some(CloseInfo {
                code: 1000,
                reason: "client shutdown".to_string()
            })
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_sets_error_status() {
        // Nothing is listening on this port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let ctx = Arc::new(FeedContext::new(&Config::default()));
        let router = EventRouter::new(default_registry());
        let mut session = ConnectionSession::new(format!("ws://{addr}"), ctx, router);

        session.open().unwrap();
        wait_for_status(&session.state(), ConnectionStatus::Error).await;
        assert!(session.state().snapshot().last_error.is_some());
        session.close().await;
        assert_eq!(session.state().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_double_open_is_rejected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (mut session, _ctx) = test_session(addr);
        session.open().unwrap();
        assert!(matches!(session.open(), Err(FeedError::AlreadyOpen)));
        session.close().await;
        server.await.unwrap();
    }
}
