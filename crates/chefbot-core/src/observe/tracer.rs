use super::sink::SpanSink;
use super::span::{Span, SpanRecord};
use std::sync::Arc;

/// Cheap-to-clone handle that starts root spans and fans finished spans out
/// to its sinks. A tracer without sinks discards everything.
#[derive(Clone, Default)]
pub struct Tracer {
    sinks: Arc<Vec<Arc<dyn SpanSink>>>,
    base_tags: Arc<Vec<String>>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn SpanSink>) -> Self {
        Arc::make_mut(&mut self.sinks).push(sink);
        self
    }

    /// Tags attached to every root span, e.g. the group name.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let base = Arc::make_mut(&mut self.base_tags);
        for tag in tags {
            let tag = tag.into();
            if !base.contains(&tag) {
                base.push(tag);
            }
        }
        self
    }

    pub fn start(&self, name: impl Into<String>) -> Span {
        Span::new(
            self.clone(),
            SpanRecord::root(name, self.base_tags.as_ref().clone()),
        )
    }

    pub fn trace(&self, line: &str) {
        for sink in self.sinks.iter() {
            sink.on_line(line);
        }
    }

    pub fn flush(&self) {
        for sink in self.sinks.iter() {
            sink.flush();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub(crate) fn record(&self, span: &SpanRecord) {
        for sink in self.sinks.iter() {
            sink.on_span_end(span);
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("sinks", &self.sinks.len())
            .field("base_tags", &self.base_tags)
            .finish()
    }
}
