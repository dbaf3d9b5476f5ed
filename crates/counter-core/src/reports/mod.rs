//! Report rollups: record shapes, persistence sinks, the aggregator that
//! builds rollups from epoch snapshots, and the wall-clock scheduler.

pub mod aggregator;
pub mod record;
pub mod schedule;
pub mod sink;

pub use aggregator::ReportAggregator;
pub use record::{ReportKind, ReportRecord};
pub use sink::{DailyFileSink, MemorySink, ReportError, ReportSink};
