//! Input handling module
//!
//! Raw input state tracking and key-to-action bindings.

mod bindings;
mod state;

pub use bindings::{InputMapper, ViewerAction};
pub use state::{Input, PIXELS_PER_SCROLL_LINE};
