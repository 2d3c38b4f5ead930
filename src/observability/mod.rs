//! Span export to a local JSON lines file.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK tracer provider → JsonLinesExporter → <data_dir>/folio-spans.jsonl
//! ```
//!
//! Every repository operation runs in a span (`#[tracing::instrument]`), and
//! log events inside it are attached to that span, so one line in the file
//! describes one operation end to end. The file rotates at 10 MB into
//! numbered backups (`.1`, `.2`, `.3`).
//!
//! Tracing is optional: the library logs through `tracing` either way, and
//! nothing is written until [`init_tracing`] installs the subscriber.

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, SERVICE_NAME, SPAN_FILE_NAME};
