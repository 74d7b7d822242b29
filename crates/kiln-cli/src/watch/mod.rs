//! Development watch mode: file watching and the rebuild loop.

mod session;
mod watcher;

pub use session::WatchSession;
pub use watcher::{FileChange, FileWatcher, IgnoreRules};
