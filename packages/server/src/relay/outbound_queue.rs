//! Bounded FIFO of messages waiting to be written to one client.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;
use tokio::sync::Notify;

/// Number of undelivered messages a client may fall behind by.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Returned by [`OutboundQueue::push`] when the queue is at capacity.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("outbound queue is full ({capacity} messages)")]
pub struct QueueFull {
    pub capacity: usize,
}

/// Outbound queue of a single session.
///
/// Any number of producers may `push`; exactly one consumer (the session's
/// outbound pump) may `pop`. A push onto an empty queue stores a wake-up
/// permit, so a consumer that checks the queue and then waits can never
/// miss it.
#[derive(Debug)]
pub struct OutboundQueue {
    messages: Mutex<VecDeque<String>>,
    ready: Notify,
    capacity: usize,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Notify::new(),
            capacity,
        }
    }

    /// Append a message without blocking.
    ///
    /// At capacity the message is dropped and `QueueFull` is returned; the
    /// queue never grows past its bound.
    pub fn push(&self, message: String) -> Result<(), QueueFull> {
        let was_empty = {
            let mut messages = self.lock();
            if messages.len() >= self.capacity {
                return Err(QueueFull {
                    capacity: self.capacity,
                });
            }
            let was_empty = messages.is_empty();
            messages.push_back(message);
            was_empty
        };

        if was_empty {
            self.ready.notify_one();
        }
        Ok(())
    }

    /// Wait until a message is available, then remove and return the head.
    ///
    /// Cancel safe: a message is only removed in the poll that returns it.
    pub async fn pop(&self) -> String {
        loop {
            if let Some(message) = self.try_pop() {
                return message;
            }
            self.ready.notified().await;
        }
    }

    pub fn try_pop(&self) -> Option<String> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every pending message.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}
