// Vendor wire formats and the unified streaming client

pub mod provider_handle;
pub mod provider_base;
pub mod claude;
pub mod gemini;
pub mod openai;
