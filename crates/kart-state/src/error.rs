use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// More names arrived than there are spots to hold them. Labels within
    /// range were still applied.
    #[error("render mismatch: {names} names for {spots} spots")]
    RenderMismatch { names: usize, spots: usize },
}
