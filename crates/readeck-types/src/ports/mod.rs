//! Port interfaces for the external collaborators spec.md §1 places outside
//! the core: persistent storage, the background job queue, and the logging
//! sink a caller-supplied `tracing` layer ultimately backs.
//!
//! Mirrors the `riptide-types::ports` pattern: backend-agnostic traits here,
//! concrete adapters (a SQL-backed `BookmarkStore`, a queue-backed
//! `TaskRunner`) live outside this workspace.

mod bookmark_store;
mod log_sink;
mod task_runner;

pub use bookmark_store::{Bookmark, BookmarkState, BookmarkStore};
pub use log_sink::LogSink;
pub use task_runner::{TaskHandle, TaskRunner};
