//! In-memory connection fakes shared by the relay tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{DisplayName, Frame, FrameSink, RoomError, TransportError},
    infrastructure::dto::websocket::OutboundMessage,
};

use super::{CloseReason, Room, Session, SessionConfig};

const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// `FrameSink` that forwards text frames into a channel.
pub(crate) struct ChannelSink {
    sent: mpsc::UnboundedSender<String>,
    pings: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sent
            .send(text)
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        self.pings.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

pub(crate) fn channel_sink() -> (
    ChannelSink,
    mpsc::UnboundedReceiver<String>,
    Arc<AtomicUsize>,
    Arc<AtomicBool>,
) {
    let (sent, received) = mpsc::unbounded_channel();
    let pings = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    let sink = ChannelSink {
        sent,
        pings: pings.clone(),
        closed: closed.clone(),
    };
    (sink, received, pings, closed)
}

/// `FrameSink` for a client that stopped reading: writes and pings never
/// complete. `close` records the attempt and, unless `close_completes`, hangs
/// as well.
pub(crate) struct StalledSink {
    close_attempted: Arc<AtomicBool>,
    close_completes: bool,
}

impl StalledSink {
    pub fn new(close_completes: bool) -> (Self, Arc<AtomicBool>) {
        let close_attempted = Arc::new(AtomicBool::new(false));
        let sink = Self {
            close_attempted: close_attempted.clone(),
            close_completes,
        };
        (sink, close_attempted)
    }
}

#[async_trait]
impl FrameSink for StalledSink {
    async fn send_text(&mut self, _text: String) -> Result<(), TransportError> {
        std::future::pending().await
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.close_attempted.store(true, Ordering::Release);
        if !self.close_completes {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

/// A frame stream fed by the returned sender. Ends when the sender is dropped.
pub(crate) fn frame_channel() -> (
    mpsc::UnboundedSender<Frame>,
    impl Stream<Item = Frame> + Send + Unpin + 'static,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    (tx, stream::poll_fn(move |cx| rx.poll_recv(cx)))
}

/// Await `future`, failing the test if it takes longer than a couple of seconds.
pub(crate) async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("timed out")
}

/// Wait until the room has exactly `count` members.
pub(crate) async fn wait_for_members(room: &Room, count: usize) {
    within(async {
        while room.session_count() != count {
            tokio::task::yield_now().await;
        }
    })
    .await
}

/// A session running on its own task, driven through in-memory channels.
pub(crate) struct TestClient {
    pub session: Arc<Session>,
    pub frames: mpsc::UnboundedSender<Frame>,
    pub pings: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
    received: mpsc::UnboundedReceiver<String>,
    handle: JoinHandle<Result<CloseReason, RoomError>>,
}

impl TestClient {
    pub fn connect(room: &Arc<Room>, sequence: u64, config: &SessionConfig) -> Self {
        let session = Session::new(DisplayName::from_sequence(sequence), config);
        let (frames, stream) = frame_channel();
        let (sink, received, pings, closed) = channel_sink();

        let handle = {
            let room = room.clone();
            let session = session.clone();
            tokio::spawn(async move { session.run(&room, stream, sink).await })
        };

        Self {
            session,
            frames,
            pings,
            closed,
            received,
            handle,
        }
    }

    pub fn say(&self, text: &str) {
        let frame = serde_json::json!({ "type": "message", "message": text });
        self.send_raw(&frame.to_string());
    }

    pub fn send_raw(&self, text: &str) {
        self.frames
            .send(Frame::Text(text.to_string()))
            .expect("session stopped reading");
    }

    pub async fn next_message(&mut self) -> OutboundMessage {
        let json = within(self.received.recv())
            .await
            .expect("connection closed");
        serde_json::from_str(&json).expect("invalid outbound message")
    }

    pub async fn finished(&mut self) -> Result<CloseReason, RoomError> {
        within(&mut self.handle).await.expect("session task panicked")
    }
}
