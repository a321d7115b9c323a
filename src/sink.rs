use std::fmt;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::trace;

use crate::protocol::ServerMessage;

pub trait OutboundSink: Send + Sync {
    /// Returns `false` when the message could not be queued.
    fn send(&self, message: &ServerMessage) -> bool;

    fn close(&self, _code: u16, _reason: &str) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

/// Sink backed by a bounded update queue plus an unbounded control lane.
/// `dead`, `error` and close requests go through the control lane so a slow
/// client's full queue cannot swallow them.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<OutboundMessage>,
    control: mpsc::UnboundedSender<OutboundMessage>,
}

#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::Receiver<OutboundMessage>,
    control: mpsc::UnboundedReceiver<OutboundMessage>,
}

pub fn outbound_channel(capacity: usize) -> (ChannelSink, OutboundQueue) {
    let (tx, rx) = mpsc::channel(capacity);
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    (
        ChannelSink {
            tx,
            control: control_tx,
        },
        OutboundQueue {
            rx,
            control: control_rx,
        },
    )
}

fn is_control(message: &ServerMessage) -> bool {
    matches!(message, ServerMessage::Dead | ServerMessage::Error { .. })
}

impl OutboundSink for ChannelSink {
    fn send(&self, message: &ServerMessage) -> bool {
        let outbound = OutboundMessage::Text(message.to_json());
        if is_control(message) {
            return self.control.send(outbound).is_ok();
        }
        match self.tx.try_send(outbound) {
            Ok(()) => true,
            Err(err) => {
                trace!(kind = message.kind(), %err, "outbound message dropped");
                false
            }
        }
    }

    fn close(&self, code: u16, reason: &str) {
        let _ = self.control.send(OutboundMessage::Close {
            code,
            reason: reason.to_string(),
        });
    }
}

impl fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSink")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl OutboundQueue {
    /// Control messages win over queued updates. Returns `None` once every
    /// sink clone is gone and both lanes are empty.
    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        tokio::select! {
            biased;
            Some(message) = self.control.recv() => Some(message),
            Some(message) = self.rx.recv() => Some(message),
            else => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ServerMessage>>,
    closed: Mutex<Option<(u16, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ServerMessage> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<ServerMessage> {
        self.messages
            .lock()
            .ok()
            .and_then(|guard| guard.last().cloned())
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.messages
            .lock()
            .map(|guard| guard.iter().filter(|m| m.kind() == kind).count())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.clear();
        }
    }

    pub fn closed(&self) -> Option<(u16, String)> {
        self.closed.lock().ok().and_then(|guard| guard.clone())
    }
}

impl OutboundSink for RecordingSink {
    fn send(&self, message: &ServerMessage) -> bool {
        match self.messages.lock() {
            Ok(mut guard) => {
                guard.push(message.clone());
                true
            }
            Err(_) => false,
        }
    }

    fn close(&self, code: u16, reason: &str) {
        if let Ok(mut guard) = self.closed.lock() {
            *guard = Some((code, reason.to_string()));
        }
    }
}
