//! Development server with live reload for quire blogs.
//!
//! Builds the site, serves the output directory and rebuilds whenever the
//! content directory changes, telling connected browsers to reload.

pub mod livereload;
pub mod server;
pub mod watcher;

pub use livereload::{ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
