//! A small stateful unit configured from built-in defaults overlaid with
//! caller-supplied options, plus the sink seam its output goes through.

pub mod config;
pub mod error;
pub mod sink;
pub mod unit;

pub use config::{UnitConfig, UnitOptions};
pub use error::ConfigError;
pub use sink::{CaptureSink, OutputSink, StdoutSink};
pub use unit::ConfigurableUnit;
