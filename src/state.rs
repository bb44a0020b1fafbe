//! Session status surface
//!
//! Replaces the legacy process-wide mutable flags with one owned state
//! object. Only the session's internal callbacks mutate it; everyone else
//! reads an immutable [`StatusSnapshot`].

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Connection status of the streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ConnectionStatus::Connecting,
            2 => ConnectionStatus::Connected,
            3 => ConnectionStatus::Error,
            _ => ConnectionStatus::Disconnected,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ConnectionStatus::Disconnected => 0,
            ConnectionStatus::Connecting => 1,
            ConnectionStatus::Connected => 2,
            ConnectionStatus::Error => 3,
        }
    }
}

/// Close code and reason from the last close frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// Shared connectivity state, written by session callbacks only.
///
/// Status and the advisory flag are atomics so `snapshot` never blocks on
/// the dispatch task; the error/close records take a short read lock.
#[derive(Debug, Default)]
pub struct SessionState {
    status: AtomicU8,
    /// Advisory "a dispatch is in flight" signal. Not a mutual-exclusion
    /// primitive: real synchronization lives in the locks around each
    /// cache, and nothing in this crate may block on this flag.
    dispatch_in_flight: AtomicBool,
    last_error: RwLock<Option<String>>,
    last_close: RwLock<Option<CloseInfo>>,
}

/// Owned, immutable view of the session state at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub status: ConnectionStatus,
    pub last_error: Option<String>,
    pub last_close: Option<CloseInfo>,
    pub dispatch_in_flight: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status and diagnostics as an owned snapshot
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status(),
            last_error: self.last_error.read().clone(),
            last_close: self.last_close.read().clone(),
            dispatch_in_flight: self.dispatch_in_flight.load(Ordering::Acquire),
        }
    }

    /// Current status only
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_connecting(&self) {
        self.status
            .store(ConnectionStatus::Connecting.as_u8(), Ordering::Release);
    }

    pub(crate) fn on_open(&self) {
        self.status
            .store(ConnectionStatus::Connected.as_u8(), Ordering::Release);
    }

    pub(crate) fn on_error(&self, reason: &str) {
        *self.last_error.write() = Some(reason.to_string());
        self.status
            .store(ConnectionStatus::Error.as_u8(), Ordering::Release);
    }

    pub(crate) fn on_close(&self, code: u16, reason: &str) {
        *self.last_close.write() = Some(CloseInfo {
            code,
            reason: reason.to_string(),
        });
        self.status
            .store(ConnectionStatus::Disconnected.as_u8(), Ordering::Release);
    }

    pub(crate) fn begin_dispatch(&self) {
        self.dispatch_in_flight.store(true, Ordering::Release);
    }

    pub(crate) fn end_dispatch(&self) {
        self.dispatch_in_flight.store(false, Ordering::Release);
    }
}
