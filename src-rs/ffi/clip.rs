use napi::bindgen_prelude::*;
use napi::threadsafe_function::{ErrorStrategy, ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi::{JsFunction, Status};
use napi_derive::napi;
use std::sync::Arc;

use crate::clip::types::{ClipEvent, ClipEventSink};
use crate::clip::{clear_event_sink, generate_clip_id, register_clip, remove_clip, run_clip, set_event_sink};
use crate::config::AppConfig;
use crate::init_logger;

use super::types::{JsClipEvent, JsClipOutcome, JsClipRequest};

struct ThreadsafeSink {
    clip_id: String,
    handler: ThreadsafeFunction<JsClipEvent, ErrorStrategy::CalleeHandled>,
}

impl ClipEventSink for ThreadsafeSink {
    fn emit(&self, seq: i64, event: ClipEvent) -> anyhow::Result<()> {
        let event = JsClipEvent::new(&self.clip_id, seq, event);
        let status = self
            .handler
            .call(Ok(event), ThreadsafeFunctionCallMode::NonBlocking);
        if status != Status::Ok {
            anyhow::bail!("event delivery failed with status {:?}", status);
        }
        Ok(())
    }
}

/// One clip operation as seen from JavaScript. Each tab creates its own.
#[napi]
pub struct ClipSession {
    clip_id: String,
}

#[napi]
impl ClipSession {
    #[napi(factory)]
    pub fn create() -> Self {
        init_logger();
        let clip_id = generate_clip_id();
        register_clip(&clip_id);
        Self { clip_id }
    }

    #[napi(getter)]
    pub fn clip_id(&self) -> String {
        self.clip_id.clone()
    }

    #[napi]
    pub fn subscribe(&self, on_event: JsFunction) -> Result<()> {
        let handler: ThreadsafeFunction<JsClipEvent, ErrorStrategy::CalleeHandled> =
            on_event.create_threadsafe_function(0, |ctx| Ok(vec![ctx.value]))?;

        let sink = ThreadsafeSink {
            clip_id: self.clip_id.clone(),
            handler,
        };
        if !set_event_sink(&self.clip_id, Arc::new(sink)) {
            return Err(Error::from_reason("Clip session not found"));
        }
        Ok(())
    }

    #[napi]
    pub fn unsubscribe(&self) -> Result<()> {
        clear_event_sink(&self.clip_id);
        Ok(())
    }

    #[napi]
    pub async fn execute(&self, request: JsClipRequest) -> Result<JsClipOutcome> {
        let settings = AppConfig::load()
            .map_err(|e| Error::from_reason(format!("Failed to load config: {}", e)))?;
        let request = request.into_request()?;
        let outcome = run_clip(&self.clip_id, request, &settings)
            .await
            .map_err(|e| Error::from_reason(e.to_string()))?;
        Ok(outcome.into())
    }

    #[napi]
    pub fn close(&self) -> bool {
        remove_clip(&self.clip_id)
    }
}
