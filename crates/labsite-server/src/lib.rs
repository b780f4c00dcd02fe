//! Preview server with live reload for labsite.
//!
//! Serves the output directory over local HTTP, watches the site inputs and
//! rebuilds on change, then tells connected browsers to reload.

pub mod rebuild;
pub mod server;
pub mod watcher;
pub mod websocket;

pub use rebuild::rebuild_loop;
pub use server::{PreviewServer, PreviewServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchTarget};
pub use websocket::{ReloadHub, ReloadMessage};
