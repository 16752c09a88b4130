pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod observe;
pub mod tool;
pub mod types;

pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
pub use message::{ContentBlock, Message, Role};
pub use observe::{Span, SpanKind, SpanLevel, SpanRecord, SpanSink, Tracer};
pub use tool::{ToolCall, ToolCallStatus, ToolDefinition, ToolParameter};
pub use types::{Id, Metadata, MessageId, SessionId, SpanId, Timestamp, ToolCallId, TraceId};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::Context;
    pub use crate::error::{Error, Result};
    pub use crate::message::{ContentBlock, Message, Role, ToolResult, ToolUse};
    pub use crate::observe::{
        FileSink, LogSink, MemorySink, Span, SpanKind, SpanLevel, SpanRecord, SpanSink, Tracer,
    };
    pub use crate::tool::{ToolCall, ToolCallStatus, ToolDefinition, ToolParameter};
    pub use crate::types::{Id, Metadata, MessageId, SessionId, SpanId, Timestamp, ToolCallId, TraceId};
}
