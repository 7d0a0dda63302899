//! Tracing initialisation for tests.
//!
//! Bootstrap code logs through the `turbod_client` span; call
//! [`init_test_tracing`] at the top of a test to see those events in the
//! harness output. Initialisation happens at most once per process.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::Subscriber;
use tracing::span::{Attributes, Id};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Install a subscriber writing to the test-harness writer.
///
/// Respects `RUST_LOG`, defaulting to `debug` for the turbod crates so path
/// resolution shows up when a test fails. Later calls are ignored.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,turbod_core=debug")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_test_writer()
        .try_init();
}

/// Root span to pass as the caller's logger in bootstrap tests.
pub fn test_span(name: &'static str) -> tracing::Span {
    tracing::info_span!("test", case = name)
}

/// A span seen by [`SpanRecorder`], with the span it was opened under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpan {
    pub id: Id,
    pub name: &'static str,
    pub parent_id: Option<Id>,
    pub parent_name: Option<&'static str>,
}

/// Layer remembering every span created while it is installed.
///
/// Stack it on `tracing_subscriber::registry()` under a scoped default to
/// check span parentage. Clones share one record.
#[derive(Debug, Clone, Default)]
pub struct SpanRecorder {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
}

impl SpanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded span with this id, if any.
    pub fn span(&self, id: &Id) -> Option<RecordedSpan> {
        self.lock().iter().find(|span| &span.id == id).cloned()
    }

    pub fn spans(&self) -> Vec<RecordedSpan> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedSpan>> {
        self.spans.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S> Layer<S> for SpanRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let parent = ctx.span(id).and_then(|span| span.parent());
        self.lock().push(RecordedSpan {
            id: id.clone(),
            name: attrs.metadata().name(),
            parent_id: parent.as_ref().map(|p| p.id()),
            parent_name: parent.as_ref().map(|p| p.name()),
        });
    }
}
