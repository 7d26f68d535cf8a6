//! Tracing capture for log assertions
//!
//! Installs a [`tracing_subscriber::Layer`] that records every event as
//! plain text so tests can assert on what a sweep logged. Structured
//! fields are rendered after the message (`Error processing movie
//! title=Broken error=...`) and match as plain substrings.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One captured event
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    /// Message followed by `key=value` pairs for the event's fields
    pub rendered: String,
}

/// Capturing layer; clones share the same record buffer
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    /// True if any record contains `pattern`
    pub fn contains(&self, pattern: &str) -> bool {
        self.records().iter().any(|r| r.rendered.contains(pattern))
    }

    /// Number of records containing `pattern`
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| r.rendered.contains(pattern))
            .count()
    }

    /// Number of error-level records containing `pattern`
    pub fn errors_matching(&self, pattern: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| r.level == Level::ERROR && r.rendered.contains(pattern))
            .count()
    }
}

impl<S> tracing_subscriber::Layer<S> for LogCapture
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = RenderVisitor::default();
        event.record(&mut visitor);

        self.records.lock().unwrap().push(LogRecord {
            level: *event.metadata().level(),
            rendered: visitor.into_rendered(),
        });
    }
}

/// Renders the message first, then every other field as `key=value`
#[derive(Default)]
struct RenderVisitor {
    message: String,
    fields: String,
}

impl RenderVisitor {
    fn into_rendered(self) -> String {
        format!("{}{}", self.message, self.fields)
    }
}

impl Visit for RenderVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
            // str messages arrive quoted; strip the quotes so patterns
            // match the text as written
            if self.message.len() >= 2
                && self.message.starts_with('"')
                && self.message.ends_with('"')
            {
                self.message = self.message[1..self.message.len() - 1].to_string();
            }
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Install the capture layer on the global subscriber and return the
/// shared capture.
///
/// The global subscriber installs at most once per test binary, so
/// every caller gets the same capture and sees events from any test
/// running after the first call.
pub fn init_test_logging() -> LogCapture {
    static CAPTURE: OnceLock<LogCapture> = OnceLock::new();

    let capture = CAPTURE.get_or_init(LogCapture::new).clone();
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sweeparr=debug".into()))
        .with(capture.clone())
        .try_init();
    capture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_message_and_fields() {
        let capture = LogCapture::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(title = "Heat", "Keeping movie");
            tracing::error!(title = "Sneakers", error = "timeout", "Error processing movie");
        });

        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::INFO);
        assert!(capture.contains("title=\"Heat\""));
        assert_eq!(capture.count_matching("movie"), 2);
        assert_eq!(capture.errors_matching("Sneakers"), 1);
        assert_eq!(capture.errors_matching("Heat"), 0);
    }

    #[test]
    fn renders_display_fields_unquoted() {
        let capture = LogCapture::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        let title = String::from("Léon");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(title = %title, "Skipping");
        });

        assert!(capture.contains("title=Léon"));
    }

    #[test]
    fn init_returns_shared_capture() {
        let first = init_test_logging();
        let second = init_test_logging();
        assert!(Arc::ptr_eq(&first.records, &second.records));
    }
}
