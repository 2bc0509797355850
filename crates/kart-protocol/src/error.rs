use thiserror::Error;

/// Errors raised while obtaining or parsing a layout source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout could not be fetched, decoded, or contained nothing to render.
    #[error("layout unavailable: {0}")]
    Unavailable(String),
}
