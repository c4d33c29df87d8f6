//! Report formatting and output routing.
//!
//! - [`format`]: numeric rendering of report cells
//! - [`sink`]: sink keys, naming and writer factories
//! - [`writer`]: header/record layout and sink-by-sink writing

pub mod format;
pub mod sink;
pub mod writer;

pub use format::format_value;
pub use sink::{
    sink_name, DirectoryWriterFactory, MemoryWriterFactory, OutputLayout, SinkKey, SinkKind,
    WriterFactory,
};
pub use writer::{BandReport, ReportRow, ReportWriter};
