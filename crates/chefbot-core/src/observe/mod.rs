//! Observed operations.
//!
//! Every ChefBot step opens a [`Span`] carrying a name, tags inherited from
//! its parent, free-form metadata and a level. Finished spans are handed to
//! the [`SpanSink`]s registered on the [`Tracer`]: structured log events,
//! a plain-text run file, or an in-memory buffer for tests.

mod sink;
mod span;
mod tracer;

pub use sink::{FileSink, LogSink, MemorySink, SpanSink};
pub use span::{Span, SpanKind, SpanLevel, SpanRecord, RAW_PREVIEW_CHARS};
pub use tracer::Tracer;
