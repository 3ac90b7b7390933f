use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const SUBSCRIBER_BUFFER: usize = 256;

/// tracing target every entry is mirrored under
pub const LOG_TARGET: &str = "log_sink";

/// Filter used when RUST_LOG is unset; keeps the mirrored entries visible
pub const DEFAULT_LOG_FILTER: &str = "coreum_issuer=info,log_sink=info";

/// One line of the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    /// Position in the session log, starting at 0
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEvent {
    /// Console form of the entry
    pub fn render(&self) -> String {
        format!("> {}", self.message)
    }
}

/// Append-only, ordered log of everything the session did
///
/// Cloning yields another handle onto the same log. Entries are never
/// removed or reordered and live only as long as the process.
#[derive(Clone)]
pub struct LogSink {
    entries: Arc<Mutex<Vec<LogEvent>>>,
    notifier: broadcast::Sender<LogEvent>,
}

impl LogSink {
    pub fn new() -> Self {
        let (notifier, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            notifier,
        }
    }

    /// Append a message and notify subscribers
    pub fn append(&self, message: impl Into<String>) -> LogEvent {
        let message = message.into();
        let event = {
            let mut entries = self.lock();
            let event = LogEvent {
                seq: entries.len() as u64,
                timestamp: Utc::now(),
                message,
            };
            entries.push(event.clone());
            event
        };

        tracing::info!(target: LOG_TARGET, seq = event.seq, "{}", event.message);
        // No subscribers is fine
        let _ = self.notifier.send(event.clone());
        event
    }

    /// Snapshot of the full ordered log
    pub fn entries(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Entries appended at or after position `seq`
    pub fn entries_since(&self, seq: u64) -> Vec<LogEvent> {
        let entries = self.lock();
        let start = (seq as usize).min(entries.len());
        entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole log as console text, one entry per line
    pub fn render(&self) -> String {
        self.lock()
            .iter()
            .map(LogEvent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Receive every entry appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.notifier.subscribe()
    }

    /// True if any entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| e.message.contains(needle))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").field("len", &self.len()).finish()
    }
}
