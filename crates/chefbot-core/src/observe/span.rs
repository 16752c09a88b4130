use super::tracer::Tracer;
use crate::types::{Metadata, SpanId, Timestamp, TraceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// How much of a raw model reply is kept on an error span.
pub const RAW_PREVIEW_CHARS: usize = 800;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    #[default]
    Span,
    Chain,
    Generation,
    Tool,
    Agent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanLevel {
    Debug,
    #[default]
    Default,
    Warning,
    Error,
}

impl SpanLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanLevel::Debug => "DEBUG",
            SpanLevel::Default => "DEFAULT",
            SpanLevel::Warning => "WARNING",
            SpanLevel::Error => "ERROR",
        }
    }
}

/// The data of a span, as delivered to sinks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpanRecord {
    pub id: SpanId,
    pub trace_id: TraceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpanId>,
    pub name: String,
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub level: SpanLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub started_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,
}

impl SpanRecord {
    pub(crate) fn root(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: SpanId::new(),
            trace_id: TraceId::new(),
            parent_id: None,
            name: name.into(),
            kind: SpanKind::default(),
            tags,
            metadata: Metadata::new(),
            level: SpanLevel::default(),
            status_message: None,
            input: None,
            output: None,
            started_at: Timestamp::now(),
            ended_at: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == SpanLevel::Error
    }

    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end.duration_since(&self.started_at))
    }

    /// One human-readable line, used by the run file.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "[span] {} {} trace={} kind={:?}",
            self.level.as_str(),
            self.name,
            self.trace_id.short(),
            self.kind
        );
        if !self.tags.is_empty() {
            line.push_str(&format!(" tags=[{}]", self.tags.join(",")));
        }
        if !self.metadata.is_empty() {
            line.push_str(&format!(" metadata={}", self.metadata.to_value()));
        }
        if let Some(msg) = &self.status_message {
            line.push_str(&format!(" status=\"{}\"", msg));
        }
        if let Some(d) = self.duration() {
            line.push_str(&format!(" ({} ms)", d.as_millis()));
        }
        line
    }
}

/// A live span. It is delivered to the sinks when ended or dropped.
pub struct Span {
    record: SpanRecord,
    tracer: Tracer,
    ended: bool,
}

impl Span {
    pub(crate) fn new(tracer: Tracer, record: SpanRecord) -> Self {
        Self {
            record,
            tracer,
            ended: false,
        }
    }

    pub fn id(&self) -> SpanId {
        self.record.id
    }

    pub fn trace_id(&self) -> TraceId {
        self.record.trace_id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn tags(&self) -> &[String] {
        &self.record.tags
    }

    pub fn metadata(&self) -> &Metadata {
        &self.record.metadata
    }

    pub fn level(&self) -> SpanLevel {
        self.record.level
    }

    pub fn is_error(&self) -> bool {
        self.record.is_error()
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Starts a span nested under this one. Tags propagate to the child.
    pub fn child(&self, name: impl Into<String>) -> Span {
        let mut record = SpanRecord::root(name, self.record.tags.clone());
        record.trace_id = self.record.trace_id;
        record.parent_id = Some(self.record.id);
        Span::new(self.tracer.clone(), record)
    }

    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.record.kind = kind;
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.record.tags.contains(&tag) {
                self.record.tags.push(tag);
            }
        }
        self
    }

    pub fn with_input<V: Serialize>(mut self, input: V) -> Self {
        self.record.input = serde_json::to_value(input).ok();
        self
    }

    pub fn set_metadata<V: Serialize>(&mut self, key: impl Into<String>, value: V) {
        self.record.metadata.insert(key, value);
    }

    pub fn update_metadata(&mut self, metadata: Metadata) {
        self.record.metadata.extend(metadata);
    }

    pub fn set_output<V: Serialize>(&mut self, output: V) {
        self.record.output = serde_json::to_value(output).ok();
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        if self.record.level < SpanLevel::Warning {
            self.record.level = SpanLevel::Warning;
        }
        self.record.status_message = Some(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record.level = SpanLevel::Error;
        self.record.status_message = Some(message.into());
    }

    /// Marks the span as failed and keeps a bounded preview of the raw text
    /// that could not be used.
    pub fn error_with_raw(&mut self, message: impl Into<String>, key: &str, raw: &str) {
        self.error(message);
        let preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        self.set_metadata(key, preview);
    }

    /// Writes a free-form line to the run file, if one is configured.
    pub fn trace(&self, line: &str) {
        self.tracer.trace(line);
    }

    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.record.ended_at = Some(Timestamp::now());
        self.tracer.record(&self.record);
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("name", &self.record.name)
            .field("trace_id", &self.record.trace_id)
            .field("level", &self.record.level)
            .field("ended", &self.ended)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::MemorySink;
    use std::sync::Arc;

    #[test]
    fn test_child_inherits_trace_and_tags() {
        let sink = Arc::new(MemorySink::new());
        let tracer = Tracer::new().with_sink(sink.clone());

        let root = tracer
            .start("Groupe_Partie_2")
            .with_kind(SpanKind::Chain)
            .with_tags(["Partie_2", "Groupe"]);
        let child = root.child("plan").with_tags(["plan"]);

        assert_eq!(child.trace_id(), root.trace_id());
        assert_eq!(child.tags(), ["Partie_2", "Groupe", "plan"]);

        child.end();
        root.end();

        let spans = sink.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, "plan");
        assert_eq!(spans[0].parent_id, Some(spans[1].id));
        assert_eq!(spans[1].kind, SpanKind::Chain);
    }

    #[test]
    fn test_error_with_raw_truncates_preview() {
        let sink = Arc::new(MemorySink::new());
        let tracer = Tracer::new().with_sink(sink.clone());

        let mut span = tracer.start("plan");
        let raw = "x".repeat(2000);
        span.error_with_raw("Structure JSON invalide", "raw", &raw);
        assert!(span.is_error());
        drop(span);

        let record = &sink.spans()[0];
        assert_eq!(record.level, SpanLevel::Error);
        assert_eq!(record.status_message.as_deref(), Some("Structure JSON invalide"));
        assert_eq!(
            record.metadata.get::<String>("raw").map(|s| s.len()),
            Some(RAW_PREVIEW_CHARS)
        );
    }

    #[test]
    fn test_warn_does_not_downgrade_error() {
        let tracer = Tracer::new();
        let mut span = tracer.start("execute_step");
        span.error("boom");
        span.warn("minor");
        assert_eq!(span.level(), SpanLevel::Error);
    }

    #[test]
    fn test_summary_line_mentions_level_and_tags() {
        let mut record = SpanRecord::root("synthesis", vec!["Partie_2".into()]);
        record.level = SpanLevel::Error;
        record.status_message = Some("JSON final invalide".into());
        let line = record.summary_line();
        assert!(line.contains("ERROR synthesis"));
        assert!(line.contains("tags=[Partie_2]"));
        assert!(line.contains("JSON final invalide"));
    }
}
