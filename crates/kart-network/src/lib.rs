//! Kart Network - everything that crosses a process boundary.
//!
//! - [`layout_fetch`]: one-shot read of the layout source from disk or HTTP.
//! - [`sync_client`]: the single WebSocket connection to the name server.

pub mod error;
pub mod layout_fetch;
pub mod sync_client;

pub use error::SyncError;
pub use layout_fetch::{fetch_layout, load_layout};
pub use sync_client::{parse_sync_url, sync_url, SyncClient, SyncEvent, SyncHandle};
