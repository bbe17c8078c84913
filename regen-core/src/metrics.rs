use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_succeeded: u64,
    pub runs_failed: u64,
    pub attempts_started: u64,
    pub syntax_pass: u64,
    pub syntax_fail: u64,
    pub reflection_pass: u64,
    pub reflection_fail: u64,
}

pub trait Metrics: Send + Sync {
    fn inc_run_started(&self);
    fn inc_run_succeeded(&self);
    fn inc_run_failed(&self);
    fn inc_attempt_started(&self);
    fn record_syntax_pass(&self);
    fn record_syntax_fail(&self);
    fn record_reflection_pass(&self);
    fn record_reflection_fail(&self);
    fn snapshot(&self) -> MetricsSnapshot;
}

pub struct InMemoryMetrics {
    runs_started: AtomicU64,
    runs_succeeded: AtomicU64,
    runs_failed: AtomicU64,
    attempts_started: AtomicU64,
    syntax_pass: AtomicU64,
    syntax_fail: AtomicU64,
    reflection_pass: AtomicU64,
    reflection_fail: AtomicU64,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_succeeded: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            attempts_started: AtomicU64::new(0),
            syntax_pass: AtomicU64::new(0),
            syntax_fail: AtomicU64::new(0),
            reflection_pass: AtomicU64::new(0),
            reflection_fail: AtomicU64::new(0),
        }
    }
}

impl Default for InMemoryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics for InMemoryMetrics {
    fn inc_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }
    fn inc_run_succeeded(&self) {
        self.runs_succeeded.fetch_add(1, Ordering::Relaxed);
    }
    fn inc_run_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }
    fn inc_attempt_started(&self) {
        self.attempts_started.fetch_add(1, Ordering::Relaxed);
    }
    fn record_syntax_pass(&self) {
        self.syntax_pass.fetch_add(1, Ordering::Relaxed);
    }
    fn record_syntax_fail(&self) {
        self.syntax_fail.fetch_add(1, Ordering::Relaxed);
    }
    fn record_reflection_pass(&self) {
        self.reflection_pass.fetch_add(1, Ordering::Relaxed);
    }
    fn record_reflection_fail(&self) {
        self.reflection_fail.fetch_add(1, Ordering::Relaxed);
    }
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_succeeded: self.runs_succeeded.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            attempts_started: self.attempts_started.load(Ordering::Relaxed),
            syntax_pass: self.syntax_pass.load(Ordering::Relaxed),
            syntax_fail: self.syntax_fail.load(Ordering::Relaxed),
            reflection_pass: self.reflection_pass.load(Ordering::Relaxed),
            reflection_fail: self.reflection_fail.load(Ordering::Relaxed),
        }
    }
}
