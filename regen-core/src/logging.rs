use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: LogLevel,
    pub run_id: Option<String>,
    pub attempt: Option<u32>,
    pub message: String,
    pub fields: HashMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            level,
            run_id: None,
            attempt: None,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_field(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.fields.insert(k.into(), v.into());
        self
    }
}

pub trait EventLogger: Send + Sync {
    fn log(&self, event: LogEvent);
}

pub type SharedEventLogger = Arc<dyn EventLogger>;

#[derive(Default)]
pub struct NoopEventLogger;

impl EventLogger for NoopEventLogger {
    fn log(&self, _event: LogEvent) {}
}

/// Bounded in-memory event buffer with a global sequence. Consumers poll
/// with `events_since`; nothing is persisted.
pub struct BufferedEventLogger {
    seq: AtomicU64,
    max_events: usize,
    events: Mutex<VecDeque<(u64, LogEvent)>>,
}

impl BufferedEventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            seq: AtomicU64::new(0),
            max_events: max_events.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn events_since(&self, last_seq: u64) -> (u64, Vec<LogEvent>) {
        let events = self.events.lock().unwrap();
        let mut out = Vec::new();
        let mut new_last = last_seq;
        for (seq, ev) in events.iter() {
            if *seq > last_seq {
                out.push(ev.clone());
                new_last = new_last.max(*seq);
            }
        }
        (new_last, out)
    }
}

impl EventLogger for BufferedEventLogger {
    fn log(&self, event: LogEvent) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;

        let mut events = self.events.lock().unwrap();
        events.push_back((seq, event));
        while events.len() > self.max_events {
            events.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_logger_caps_and_sequences_events() {
        let logger = BufferedEventLogger::new(3);
        for i in 0..5 {
            logger.log(
                LogEvent::new(LogLevel::Info, format!("event-{i}")).with_run("run-1"),
            );
        }

        let (last, events) = logger.events_since(0);
        assert_eq!(last, 5);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].message, "event-2");
        assert_eq!(events[2].run_id.as_deref(), Some("run-1"));
    }
}
