//! Progress and error reporting.
//!
//! Workers never touch the sinks directly. Every outcome goes through
//! [`Reporter::record`], which updates the run tally and calls the sinks
//! while holding a single lock, so sink implementations need no
//! synchronization of their own.

use parking_lot::Mutex;

use super::summary::{DownloadOutcome, OutcomeStatus, RunSummary};

/// Receives progress of a run.
pub trait ProgressSink: Send {
    /// A phase with `total` steps begins.
    fn start(&mut self, total: usize, label: &str);

    /// One step completed.
    fn update(&mut self, message: &str);

    /// The phase is finished.
    fn done(&mut self);
}

/// Receives human-readable error messages.
pub trait ErrorSink: Send {
    /// Report one error.
    fn report(&mut self, message: &str);
}

/// A type acting as both progress and error sink.
pub trait Sink: ProgressSink + ErrorSink {}

impl<T: ProgressSink + ErrorSink> Sink for T {}

/// Adapter combining two separate sinks.
struct Split {
    progress: Box<dyn ProgressSink>,
    errors: Box<dyn ErrorSink>,
}

impl ProgressSink for Split {
    fn start(&mut self, total: usize, label: &str) {
        self.progress.start(total, label);
    }

    fn update(&mut self, message: &str) {
        self.progress.update(message);
    }

    fn done(&mut self) {
        self.progress.done();
    }
}

impl ErrorSink for Split {
    fn report(&mut self, message: &str) {
        self.errors.report(message);
    }
}

struct ReporterState {
    sink: Box<dyn Sink>,
    summary: RunSummary,
}

/// Thread-safe front for the sinks and the outcome tally.
pub struct Reporter {
    state: Mutex<ReporterState>,
}

impl Reporter {
    /// Create a reporter from separate progress and error sinks.
    pub fn new(progress: Box<dyn ProgressSink>, errors: Box<dyn ErrorSink>) -> Self {
        Self::combined(Box::new(Split { progress, errors }))
    }

    /// Create a reporter from one sink handling both concerns.
    pub fn combined(sink: Box<dyn Sink>) -> Self {
        Self {
            state: Mutex::new(ReporterState {
                sink,
                summary: RunSummary::default(),
            }),
        }
    }

    /// Start a phase of `total` steps and reset the tally.
    pub fn begin(&self, total: usize, label: &str) {
        let mut state = self.state.lock();
        state.summary = RunSummary::default();
        state.sink.start(total, label);
    }

    /// Send a free-form progress message.
    pub fn update(&self, message: &str) {
        self.state.lock().sink.update(message);
    }

    /// Report an error outside of any task outcome.
    pub fn error(&self, message: &str) {
        self.state.lock().sink.report(message);
    }

    /// Record a task outcome: tally it and notify the sinks.
    pub fn record(&self, outcome: &DownloadOutcome) {
        let mut state = self.state.lock();
        state.summary.record(outcome);

        let name = &outcome.task.full_name;
        match &outcome.status {
            OutcomeStatus::Fetched { .. } => state.sink.update(name),
            OutcomeStatus::Skipped => state.sink.update(&format!("{} (present)", name)),
            OutcomeStatus::Failed(error) => {
                state.sink.report(&format!("{}: {}", name, error));
                state.sink.update(&format!("{} (failed)", name));
            }
        }
    }

    /// Finish the current phase.
    pub fn done(&self) {
        self.state.lock().sink.done();
    }

    /// Take the tally accumulated since the last [`begin`](Self::begin).
    pub fn take_summary(&self) -> RunSummary {
        std::mem::take(&mut self.state.lock().summary)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::combined(Box::new(TracingReporter))
    }
}

/// Sink that writes progress and errors to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressSink for TracingReporter {
    fn start(&mut self, total: usize, label: &str) {
        tracing::info!(total = total, "{}", label);
    }

    fn update(&mut self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn done(&mut self) {
        tracing::info!("Done");
    }
}

impl ErrorSink for TracingReporter {
    fn report(&mut self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn start(&mut self, _total: usize, _label: &str) {}
    fn update(&mut self, _message: &str) {}
    fn done(&mut self) {}
}

impl ErrorSink for NullSink {
    fn report(&mut self, _message: &str) {}
}
