use std::sync::Arc;

use tracing::debug;

use crate::config::{UnitConfig, UnitOptions};
use crate::sink::{OutputSink, StdoutSink};

/// A small stateful unit configured from defaults overlaid with caller
/// options.
///
/// Each instance owns its own field values; two units built from identical
/// options share nothing, and mutating one never affects the other.
pub struct ConfigurableUnit {
    param1: String,
    param2: i64,
    param3: i64,
    // Snapshot of param2 * param2 taken at construction; increment() leaves
    // it untouched.
    param2_squared: i64,
    sink: Arc<dyn OutputSink>,
}

impl ConfigurableUnit {
    /// Build a unit from caller options, filling gaps with the defaults.
    /// Output goes to stdout.
    pub fn new(options: UnitOptions) -> Self {
        Self::with_sink(options, Arc::new(StdoutSink))
    }

    /// Build a unit that emits through the given sink.
    pub fn with_sink(options: UnitOptions, sink: Arc<dyn OutputSink>) -> Self {
        let cfg = UnitConfig::resolve(options);
        debug!(
            param1 = %cfg.param1,
            param2 = cfg.param2,
            param3 = cfg.param3,
            "configurable unit constructed"
        );

        Self {
            param2_squared: cfg.param2 * cfg.param2,
            param1: cfg.param1,
            param2: cfg.param2,
            param3: cfg.param3,
            sink,
        }
    }

    /// Current primary value.
    pub fn primary(&self) -> &str {
        &self.param1
    }

    pub fn param2(&self) -> i64 {
        self.param2
    }

    pub fn param3(&self) -> i64 {
        self.param3
    }

    /// Construction-time snapshot of `param2 * param2`.
    pub fn param2_squared(&self) -> i64 {
        self.param2_squared
    }

    /// Emit the primary value as one raw line on the unit's sink.
    pub fn log_primary(&self) {
        self.sink.emit(&self.param1);
    }

    /// Add `amount` to `param2`. Positive, negative, and zero amounts are
    /// all accepted; `param2_squared` keeps its construction-time snapshot.
    pub fn increment(&mut self, amount: i64) {
        self.param2 += amount;
        debug!(amount, param2 = self.param2, "param2 incremented");
    }

    /// Resolve to `1` on a later scheduler tick.
    ///
    /// The returned future suspends on its first poll, so completion is
    /// never observable within the caller's current synchronous turn. There
    /// is no failure path.
    pub async fn fetch_data(&self) -> i64 {
        tokio::task::yield_now().await;
        1
    }
}
