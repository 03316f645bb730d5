pub mod frontmatter;
pub mod id;
pub mod manager;
pub mod pipeline;
pub mod types;

pub use frontmatter::{parse_structured, Category, IncrementalParser, ParsedResult};
pub use id::generate_clip_id;
pub use manager::{clear_event_sink, emit_event, register_clip, remove_clip, set_event_sink, CLIP_MANAGER};
pub use pipeline::{resolve_request, run_clip};
pub use types::{ClipEvent, ClipEventSink, ClipOutcome, ClipRequest};
