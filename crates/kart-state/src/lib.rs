//! Kart State - the rendered grid and the names painted onto it.

pub mod app_state;
pub mod cache;
pub mod error;
pub mod grid;
pub mod names;

pub use app_state::{AppState, LogCategory, LogEntry};
pub use cache::{FileCache, NameCache};
pub use error::StateError;
pub use grid::{GridCell, RenderedGrid, SpotElement};
pub use names::{paint, NameSource, NameState};
