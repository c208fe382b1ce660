//! Progress reporting for [`Portfolio::run_batch`](super::batch::Portfolio::run_batch).
//!
//! A sink is passed per call and lives only for that batch. Callbacks may
//! arrive from several rayon workers at once, hence the `Sync` bound;
//! `completed` is a running count and is never repeated within a batch.

/// Receives batch progress events.
pub trait ProgressSink: Sync {
    /// Called once before any security is processed.
    fn started(&self, _operation: &str, _total: usize) {}

    /// Called after each security finishes, successfully or not.
    fn advanced(&self, security: &str, completed: usize, total: usize);

    /// Called once after every security has finished.
    fn finished(&self, _operation: &str) {}
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advanced(&self, _: &str, _: usize, _: usize) {}
}

/// Adapts a closure `(security, completed, total)` into a [`ProgressSink`].
#[derive(Debug, Clone, Copy)]
pub struct FnProgress<F>(pub F);

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(&str, usize, usize) + Sync,
{
    fn advanced(&self, security: &str, completed: usize, total: usize) {
        (self.0)(security, completed, total)
    }
}
