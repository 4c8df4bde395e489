use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for the unit's undecorated output lines.
///
/// Injected at construction so the caller decides where raw output goes;
/// diagnostics still flow through `tracing` separately.
pub trait OutputSink: Send + Sync {
    /// Emit one line, no decoration.
    fn emit(&self, line: &str);
}

/// Default sink: one line to process stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

/// Sink that buffers emitted lines so tests can assert on them without
/// capturing process-wide streams.
#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: Mutex<Vec<String>>,
}

impl CaptureSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl OutputSink for CaptureSink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
