use async_trait::async_trait;

/// Handle to a task submitted to a `TaskRunner`, used for cancellation
/// (spec.md §5: "Cancellation is by unique task id").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub String);

/// Runs extraction tasks off the request path, serially per bookmark id,
/// over a bounded worker pool (spec.md §5). This core never implements a
/// `TaskRunner` — it only calls into the engine synchronously; a host binary
/// wires a real pool (e.g. a `tokio::sync::Semaphore`-bounded set of workers,
/// sized `num_cpus::get()` per SPEC_FULL.md §5) around `readeck-engine`.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Submits an extraction for `bookmark_id`. At most one task per
    /// bookmark id may be in flight at a time.
    async fn submit(&self, bookmark_id: String) -> anyhow::Result<TaskHandle>;

    /// Cancels a previously submitted task. A cancelled task must leave the
    /// bookmark in a final state (`Error` or `Loaded`), never `Loading`.
    async fn cancel(&self, handle: &TaskHandle) -> anyhow::Result<()>;
}
