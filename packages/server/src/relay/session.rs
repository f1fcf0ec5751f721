//! Per-connection session: a duplex pump between one client connection and
//! the room.
//!
//! ## ライフサイクル
//!
//! ```text
//! Joining ─▶ Active ─▶ Draining ─▶ Closed
//! ```
//!
//! - Joining: 接続を受け付け、表示名を割り当てた直後（Room には未登録）
//! - Active: Room に登録済み。受信ポンプと送信ポンプが動作中
//! - Draining: どちらかのポンプが終了を検知し、もう一方を停止中
//! - Closed: 両方のポンプが停止し、Room から削除され、接続を閉じた状態
//!
//! The inbound pump runs on the task that called [`Session::run`]; the
//! outbound pump is spawned and owned by it. Cancelling the session's token
//! stops the inbound pump, and its exit always removes the session from the
//! room and stops the outbound pump.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};

use futures_util::stream::{Stream, StreamExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatMessage, DisplayName, Frame, FrameSink, ProtocolError, RoomError},
    infrastructure::dto::websocket::{ClientCommand, decode_inbound},
};

use super::{
    outbound_queue::{DEFAULT_QUEUE_CAPACITY, OutboundQueue},
    room::Room,
};

/// Interval between keep-alive pings sent to the client.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// How long a close handshake may take before the connection is dropped.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-session tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Undelivered messages allowed before the client is disconnected.
    pub queue_capacity: usize,
    /// Ping interval. A peer silent for a whole interval is disconnected.
    pub heartbeat_interval: Duration,
    /// Deadline for sending the close frame. A client that is not reading
    /// never completes the handshake, so the connection is dropped instead.
    pub close_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Joining = 0,
    Active = 1,
    Draining = 2,
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Joining,
            1 => SessionState::Active,
            2 => SessionState::Draining,
            _ => SessionState::Closed,
        }
    }
}

/// Why [`Session::run`] finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame.
    PeerClosed,
    /// The frame stream ended without a close frame.
    StreamEnded,
    /// The transport reported an error.
    Transport(String),
    /// A frame could not be dispatched to the room.
    Failed(String),
    /// The session was stopped: evicted, a write failed, the heartbeat
    /// timed out, or the server is shutting down.
    Stopped,
}

pub struct Session {
    name: DisplayName,
    queue: OutboundQueue,
    heartbeat_interval: Duration,
    close_timeout: Duration,
    cancel: CancellationToken,
    peer_alive: AtomicBool,
    state: AtomicU8,
}

impl Session {
    pub fn new(name: DisplayName, config: &SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            name,
            queue: OutboundQueue::with_capacity(config.queue_capacity),
            heartbeat_interval: config.heartbeat_interval,
            close_timeout: config.close_timeout,
            cancel: CancellationToken::new(),
            peer_alive: AtomicBool::new(true),
            state: AtomicU8::new(SessionState::Joining as u8),
        })
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Messages waiting to be written to this client.
    pub fn outbound(&self) -> &OutboundQueue {
        &self.queue
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive the session until the connection ends or the session is stopped.
    ///
    /// Joins `room`, pumps `frames` into it and the outbound queue into
    /// `sink`. On every exit path the session leaves the room exactly once,
    /// the outbound pump is stopped and awaited, and the connection is
    /// closed, or dropped if the close frame cannot be sent within
    /// `close_timeout`. Only fails if the session could not join the room.
    pub async fn run<S, K>(
        self: &Arc<Self>,
        room: &Room,
        frames: S,
        mut sink: K,
    ) -> Result<CloseReason, RoomError>
    where
        S: Stream<Item = Frame> + Unpin,
        K: FrameSink + 'static,
    {
        let membership = match Membership::enter(room, self) {
            Ok(membership) => membership,
            Err(e) => {
                self.set_state(SessionState::Closed);
                self.close_sink(&mut sink).await;
                return Err(e);
            }
        };
        self.set_state(SessionState::Active);

        let writer = tokio::spawn(
            Arc::clone(self).outbound_pump(sink, membership.writer.clone()),
        );

        let reason = self.inbound_pump(room, frames).await;
        tracing::debug!("Reader stopped: {} ({:?})", self.name, reason);

        drop(membership);

        match writer.await {
            Ok(mut sink) => self.close_sink(&mut sink).await,
            Err(e) => tracing::error!("Writer task of '{}' failed: {}", self.name, e),
        }

        self.queue.clear();
        self.set_state(SessionState::Closed);
        Ok(reason)
    }

    /// Queue a message for this client without blocking.
    ///
    /// A client that has fallen `queue_capacity` messages behind is stopped
    /// instead; the message is dropped and the caller is not told.
    pub fn send(&self, message: String) {
        if let Err(full) = self.queue.push(message) {
            if !self.is_stopped() {
                tracing::info!(
                    "Disconnecting '{}' because it was too slow ({} messages pending)",
                    self.name,
                    full.capacity
                );
            }
            self.stop();
        }
    }

    /// Stop the session. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    async fn close_sink<K: FrameSink>(&self, sink: &mut K) {
        match time::timeout(self.close_timeout, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!("Closing connection of '{}' failed: {}", self.name, e);
            }
            Err(_) => tracing::info!(
                "'{}' did not accept the close frame within {:?}, dropping the connection",
                self.name,
                self.close_timeout
            ),
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    async fn inbound_pump<S>(&self, room: &Room, mut frames: S) -> CloseReason
    where
        S: Stream<Item = Frame> + Unpin,
    {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return CloseReason::Stopped,
                frame = frames.next() => frame,
            };
            let Some(frame) = frame else {
                return CloseReason::StreamEnded;
            };
            self.peer_alive.store(true, Ordering::Release);

            match frame {
                Frame::Text(text) => {
                    if let Err(e) = self.dispatch(room, &text) {
                        tracing::error!("Error within session '{}': {}", self.name, e);
                        return CloseReason::Failed(e.to_string());
                    }
                }
                Frame::Close => {
                    tracing::info!("'{}' closed the connection", self.name);
                    return CloseReason::PeerClosed;
                }
                Frame::Error(e) => {
                    tracing::error!(
                        "WebSocket connection of '{}' closed with error: {}",
                        self.name,
                        e
                    );
                    return CloseReason::Transport(e);
                }
                Frame::Pong | Frame::Other => {}
            }
        }
    }

    fn dispatch(&self, room: &Room, text: &str) -> Result<(), ProtocolError> {
        match decode_inbound(text) {
            Ok(ClientCommand::Message(body)) => {
                let message = ChatMessage::from_user(&self.name, body);
                room.relay_from(self, &message)?;
            }
            Ok(ClientCommand::Unknown(kind)) => {
                tracing::warn!("Invalid data type from '{}': {}", self.name, kind);
            }
            Err(e) => {
                tracing::warn!("Discarding frame from '{}': {}", self.name, e);
            }
        }
        Ok(())
    }

    async fn outbound_pump<K: FrameSink>(
        self: Arc<Self>,
        mut sink: K,
        cancel: CancellationToken,
    ) -> K {
        let period = self.heartbeat_interval;
        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = heartbeat.tick() => {
                    if !self.peer_alive.swap(false, Ordering::AcqRel) {
                        tracing::warn!("'{}' missed the heartbeat, disconnecting", self.name);
                        self.stop();
                        break;
                    }
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        result = sink.ping() => result,
                    }
                }
                message = self.queue.pop() => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        result = sink.send_text(message) => result,
                    }
                }
            };

            if let Err(e) = result {
                tracing::error!("Error writing to '{}': {}", self.name, e);
                self.stop();
                break;
            }
        }

        tracing::debug!("Writer stopped: {}", self.name);
        sink
    }
}

/// Room membership of a running session.
///
/// Dropping it leaves the room and stops the outbound pump, so this runs
/// even when the `run` future itself is dropped.
struct Membership<'a> {
    room: &'a Room,
    session: &'a Arc<Session>,
    writer: CancellationToken,
}

impl<'a> Membership<'a> {
    fn enter(room: &'a Room, session: &'a Arc<Session>) -> Result<Self, RoomError> {
        room.join(session)?;
        Ok(Self {
            room,
            session,
            writer: session.cancel.child_token(),
        })
    }
}

impl Drop for Membership<'_> {
    fn drop(&mut self) {
        self.session.set_state(SessionState::Draining);
        if let Err(e) = self.room.leave(self.session) {
            tracing::error!("{}", e);
        }
        self.writer.cancel();
    }
}
