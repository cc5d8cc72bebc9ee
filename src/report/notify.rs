//! Wireless notification sink
//!
//! The wireless transport itself (connection handshake, characteristic
//! encoding) is outside this crate; the boundary is a bounded channel of
//! formatted messages plus a shared connection flag owned by the transport.
//! Publishing while no peer is connected fails sink-locally; the driver
//! loop is never affected.

use crate::report::{ReportSink, Severity, SinkError};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outbound message queue depth
pub const NOTIFY_QUEUE_DEPTH: usize = 32;

/// A connection lifecycle edge observed by [`ConnectionWatch::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEdge {
    Connected,
    Disconnected,
}

/// Poll-based view of the peer connection lifecycle
///
/// The transport flips the shared flag from its own callbacks; the driver
/// polls once per loop iteration and reacts to edges (a disconnect requests
/// an advertising restart). Polling never interrupts an in-progress step.
#[derive(Debug)]
pub struct ConnectionWatch {
    connected: Arc<AtomicBool>,
    was_connected: bool,
    advertising_restarts: u64,
}

impl ConnectionWatch {
    pub fn new(connected: Arc<AtomicBool>) -> Self {
        Self {
            connected,
            was_connected: false,
            advertising_restarts: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Observe the flag and report an edge if one occurred since last poll
    pub fn poll(&mut self) -> Option<ConnectionEdge> {
        let now = self.is_connected();
        let edge = match (self.was_connected, now) {
            (false, true) => Some(ConnectionEdge::Connected),
            (true, false) => {
                self.advertising_restarts += 1;
                tracing::info!("Peer disconnected, restarting advertising");
                Some(ConnectionEdge::Disconnected)
            }
            _ => None,
        };
        self.was_connected = now;
        edge
    }

    /// Number of advertising restarts requested so far
    pub fn advertising_restarts(&self) -> u64 {
        self.advertising_restarts
    }
}

/// Notification sink publishing into the transport channel
pub struct NotifySink {
    tx: Sender<String>,
    connected: Arc<AtomicBool>,
}

impl NotifySink {
    /// Create the sink and the receiving end of the transport boundary
    ///
    /// The transport drains the receiver and owns the `connected` flag.
    pub fn channel(connected: Arc<AtomicBool>) -> (Self, Receiver<String>) {
        let (tx, rx) = crossbeam_channel::bounded(NOTIFY_QUEUE_DEPTH);
        (Self { tx, connected }, rx)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn send(&self, message: String) -> Result<(), SinkError> {
        if !self.is_connected() {
            return Err(SinkError::NotConnected);
        }
        match self.tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SinkError::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(SinkError::ChannelClosed),
        }
    }
}

impl ReportSink for NotifySink {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn present(&mut self, main: &str, sub: &str, severity: Severity) -> Result<(), SinkError> {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let prefix = match severity {
            Severity::Error => "ERROR: ",
            Severity::Warning => "WARN: ",
            _ => "",
        };
        let message = if sub.is_empty() {
            format!("[{}] {}{}", timestamp, prefix, main)
        } else {
            format!("[{}] {}{} - {}", timestamp, prefix, main, sub)
        };
        self.send(message)
    }

    fn progress(&mut self, current: usize, total: usize, label: &str) -> Result<(), SinkError> {
        let percent = (current.min(total) * 100) / total.max(1);
        self.send(format!(
            "Recording: {}% ({}/{}) - {}",
            percent, current, total, label
        ))
    }

    fn publish(&mut self, message: &str) -> Result<(), SinkError> {
        self.send(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_sink() -> (NotifySink, Receiver<String>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(true));
        let (sink, rx) = NotifySink::channel(Arc::clone(&flag));
        (sink, rx, flag)
    }

    #[test]
    fn test_publish_delivers() {
        let (mut sink, rx, _flag) = connected_sink();
        sink.publish("hello").unwrap();
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_publish_without_peer_fails() {
        let (mut sink, rx, flag) = connected_sink();
        flag.store(false, Ordering::Relaxed);
        assert!(matches!(
            sink.publish("hello"),
            Err(SinkError::NotConnected)
        ));
        assert!(rx.try_recv().is_err(), "Nothing may be queued while disconnected");
    }

    #[test]
    fn test_present_formats_severity_prefix() {
        let (mut sink, rx, _flag) = connected_sink();
        sink.present("Classification failed", "", Severity::Error)
            .unwrap();
        let message = rx.try_recv().unwrap();
        assert!(message.contains("ERROR: Classification failed"), "{}", message);
    }

    #[test]
    fn test_progress_message_shape() {
        let (mut sink, rx, _flag) = connected_sink();
        sink.progress(24000, 48000, "440Hz Sine").unwrap();
        let message = rx.try_recv().unwrap();
        assert!(message.contains("50%"), "{}", message);
        assert!(message.contains("(24000/48000)"), "{}", message);
    }

    #[test]
    fn test_full_queue_reports_error() {
        let (mut sink, _rx, _flag) = connected_sink();
        for _ in 0..NOTIFY_QUEUE_DEPTH {
            sink.publish("fill").unwrap();
        }
        assert!(matches!(sink.publish("over"), Err(SinkError::ChannelFull)));
    }

    #[test]
    fn test_connection_watch_edges() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut watch = ConnectionWatch::new(Arc::clone(&flag));

        assert_eq!(watch.poll(), None, "No edge while disconnected");

        flag.store(true, Ordering::Relaxed);
        assert_eq!(watch.poll(), Some(ConnectionEdge::Connected));
        assert_eq!(watch.poll(), None, "Level does not repeat the edge");

        flag.store(false, Ordering::Relaxed);
        assert_eq!(watch.poll(), Some(ConnectionEdge::Disconnected));
        assert_eq!(watch.advertising_restarts(), 1);
    }
}
