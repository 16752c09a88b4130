use super::span::{SpanLevel, SpanRecord};
use crate::types::Timestamp;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

pub trait SpanSink: Send + Sync {
    fn on_span_end(&self, span: &SpanRecord);

    fn on_line(&self, _line: &str) {}

    fn flush(&self) {}
}

/// Emits finished spans as structured `tracing` events.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl SpanSink for LogSink {
    fn on_span_end(&self, span: &SpanRecord) {
        let duration_ms = span.duration().map(|d| d.as_millis() as u64).unwrap_or(0);
        let metadata = span.metadata.to_value().to_string();
        let tags = span.tags.join(",");
        match span.level {
            SpanLevel::Error | SpanLevel::Warning => warn!(
                span = %span.name,
                trace_id = %span.trace_id,
                level = span.level.as_str(),
                status = span.status_message.as_deref().unwrap_or(""),
                tags = %tags,
                metadata = %metadata,
                duration_ms,
                "span finished"
            ),
            SpanLevel::Default => info!(
                span = %span.name,
                trace_id = %span.trace_id,
                tags = %tags,
                metadata = %metadata,
                duration_ms,
                "span finished"
            ),
            SpanLevel::Debug => debug!(span = %span.name, duration_ms, "span finished"),
        }
    }

    fn on_line(&self, line: &str) {
        debug!(target: "chefbot::trace", "{}", line);
    }
}

/// Appends span summaries and free-form lines to a plain-text run file.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// `dir/run_YYYYmmdd_HHMMSS.txt`
    pub fn timestamped(dir: impl AsRef<Path>) -> io::Result<Self> {
        let name = format!("run_{}.txt", Timestamp::now().format_local("%Y%m%d_%H%M%S"));
        Self::create(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{}", line.trim_end()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write trace line");
        }
    }
}

impl SpanSink for FileSink {
    fn on_span_end(&self, span: &SpanRecord) {
        self.write_line(&span.summary_line());
    }

    fn on_line(&self, line: &str) {
        self.write_line(line);
    }

    fn flush(&self) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.flush() {
            warn!(path = %self.path.display(), error = %e, "Failed to flush trace file");
        }
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    spans: Mutex<Vec<SpanRecord>>,
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn find(&self, name: &str) -> Vec<SpanRecord> {
        self.spans()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpanSink for MemorySink {
    fn on_span_end(&self, span: &SpanRecord) {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(span.clone());
    }

    fn on_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::Tracer;
    use std::sync::Arc;

    #[test]
    fn test_file_sink_appends_lines_and_spans() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FileSink::create(dir.path().join("trace.txt")).unwrap());
        let tracer = Tracer::new().with_sink(sink.clone());

        tracer.trace("RESTAURANT INTELLIGENT - RUN TRACE   ");
        let mut span = tracer.start("menu_database");
        span.set_metadata("results", 3);
        span.end();
        tracer.flush();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "RESTAURANT INTELLIGENT - RUN TRACE");
        assert!(lines[1].contains("menu_database"));
        assert!(lines[1].contains("\"results\":3"));
    }

    #[test]
    fn test_timestamped_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::timestamped(dir.path()).unwrap();
        let name = sink.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("run_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_log_sink_accepts_all_levels() {
        let tracer = Tracer::new().with_sink(Arc::new(LogSink::new()));
        let mut span = tracer.start("plan");
        span.error("boom");
        span.end();
        tracer.start("execute_step").end();
    }
}
