// Node bindings, built with the `node` feature

pub mod clip;
pub mod settings;
pub mod types;

pub use clip::ClipSession;
pub use settings::*;
pub use types::*;
