use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use lazy_static::lazy_static;

use super::types::{ClipEvent, ClipEventSink};

/// Per-clip state. Each clip (one per tab/operation) gets its own sink slot
/// and sequence counter; nothing else is shared between clips.
pub struct ClipContext {
    pub clip_id: String,
    pub created_at: u64,
    pub event_sink: Arc<StdMutex<Option<Arc<dyn ClipEventSink>>>>,
    pub event_seq: Arc<StdMutex<i64>>,
}

impl ClipContext {
    pub fn new(clip_id: String) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            clip_id,
            created_at: now,
            event_sink: Arc::new(StdMutex::new(None)),
            event_seq: Arc::new(StdMutex::new(0)),
        }
    }
}

pub struct ClipManager {
    clips: HashMap<String, ClipContext>,
}

impl ClipManager {
    pub fn new() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }

    pub fn get(&self, clip_id: &str) -> Option<&ClipContext> {
        self.clips.get(clip_id)
    }

    /// Registers `clip_id` unless it already exists.
    pub fn register(&mut self, clip_id: &str) -> &ClipContext {
        self.clips
            .entry(clip_id.to_string())
            .or_insert_with(|| ClipContext::new(clip_id.to_string()))
    }

    pub fn remove(&mut self, clip_id: &str) -> Option<ClipContext> {
        self.clips.remove(clip_id)
    }
}

impl Default for ClipManager {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref CLIP_MANAGER: StdMutex<ClipManager> = StdMutex::new(ClipManager::new());
}

pub fn register_clip(clip_id: &str) {
    if let Ok(mut manager) = CLIP_MANAGER.lock() {
        manager.register(clip_id);
    }
}

pub fn remove_clip(clip_id: &str) -> bool {
    CLIP_MANAGER
        .lock()
        .map(|mut manager| manager.remove(clip_id).is_some())
        .unwrap_or(false)
}

pub fn set_event_sink(clip_id: &str, sink: Arc<dyn ClipEventSink>) -> bool {
    if let Ok(manager) = CLIP_MANAGER.lock() {
        if let Some(ctx) = manager.get(clip_id) {
            if let Ok(mut guard) = ctx.event_sink.lock() {
                *guard = Some(sink);
            }
            if let Ok(mut seq) = ctx.event_seq.lock() {
                *seq = 0;
            }
            return true;
        }
    }
    false
}

pub fn clear_event_sink(clip_id: &str) {
    if let Ok(manager) = CLIP_MANAGER.lock() {
        if let Some(ctx) = manager.get(clip_id) {
            if let Ok(mut guard) = ctx.event_sink.lock() {
                *guard = None;
            }
        }
    }
}

fn sink_and_seq(clip_id: &str) -> Option<(Arc<dyn ClipEventSink>, i64)> {
    let manager = CLIP_MANAGER.lock().ok()?;
    let ctx = manager.get(clip_id)?;
    let sink = ctx.event_sink.lock().ok()?.as_ref().map(Arc::clone)?;
    let mut seq = ctx.event_seq.lock().ok()?;
    *seq = seq.saturating_add(1);
    Some((sink, *seq))
}

/// Fire-and-forget delivery. A missing or disconnected consumer is not an
/// error for the pipeline.
pub fn emit_event(clip_id: &str, event: ClipEvent) {
    let Some((sink, seq)) = sink_and_seq(clip_id) else {
        log::trace!("No sink for clip {}, dropping {}", clip_id, event.type_tag());
        return;
    };
    let tag = event.type_tag();
    if let Err(e) = sink.emit(seq, event) {
        log::debug!("Clip {} consumer rejected {} #{}: {}", clip_id, tag, seq, e);
    }
}
