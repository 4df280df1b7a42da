//! Core module
//!
//! Application loop, configuration, errors and frame timing

mod config;
mod debug;
mod engine;
mod error;
mod time;

pub use config::ViewerConfig;
pub use debug::{DebugInfo, FrameStats};
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use error::{ConfigError, EngineError};
pub use time::Time;
