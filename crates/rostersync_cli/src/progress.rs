//! Sync progress for the terminal.
//!
//! On a TTY each provider gets an indicatif spinner ([`InteractiveReporter`]);
//! anywhere else every [`SyncProgress`] event becomes a tracing event
//! ([`LoggingReporter`]).

mod interactive;
mod logging;

use std::sync::Arc;

use rostersync::sync::{ProgressCallback, SyncProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

pub enum ProgressReporter {
    Interactive(InteractiveReporter),
    /// CI, pipes, cron.
    Logging(LoggingReporter),
}

impl ProgressReporter {
    pub fn new(interactive: bool) -> Self {
        if interactive {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// A callback for [`rostersync::SyncEngine`] that forwards to this reporter.
    pub fn as_callback(self: &Arc<Self>) -> Arc<ProgressCallback> {
        let reporter = Arc::clone(self);
        Arc::new(Box::new(move |event| reporter.handle(event)))
    }

    /// Clear any spinners still on screen.
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}
