//! Kart Protocol - layout grammar and wire frames
//!
//! Defines how a textual seating layout turns into an ordered sequence of
//! cells, and the text frames exchanged with the name server.

pub mod connection;
pub mod constants;
pub mod error;
pub mod frame;
pub mod layout;

pub use connection::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use layout::*;
