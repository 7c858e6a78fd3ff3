//! Widget placement: desktop embedding, edge peeking and screen tracking

mod embedder;
pub mod geometry;
pub mod peek;
mod state;

pub use embedder::WindowEmbedder;
pub use geometry::ScreenGeometryWatcher;
pub use peek::{PeekContext, PeekController, PeekEffect, PeekState, PeekTransition};
pub use state::{WindowMode, WindowState};
