// ─── Cancellable Tasks ───
// Long-running operations run on a background worker and observe a
// cooperative cancellation signal at phase boundaries, never in the middle of
// a single file write.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{InstallerError, InstallerResult};

/// Discriminated result of a background operation. Cancellation is its own
/// outcome and must be presented differently from a failure.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Completed(T),
    Cancelled,
    Failed(InstallerError),
}

impl<T> TaskOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }
}

/// Phase-boundary cancellation check.
#[inline]
pub fn ensure_active(token: &CancellationToken) -> InstallerResult<()> {
    if token.is_cancelled() {
        Err(InstallerError::Cancelled)
    } else {
        Ok(())
    }
}

/// Run a cancellable operation on a background task and fold its result into
/// a [`TaskOutcome`].
///
/// The future is never dropped mid-flight on cancellation: it is expected to
/// observe its token cooperatively, perform its own phase rollback, and
/// surface [`InstallerError::Cancelled`], which is converted to the distinct
/// `Cancelled` outcome here. A panic inside the work surfaces as `Failed`.
pub async fn run_cancellable<T, F>(work: F) -> TaskOutcome<T>
where
    F: Future<Output = InstallerResult<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(Ok(value)) => TaskOutcome::Completed(value),
        Ok(Err(InstallerError::Cancelled)) => TaskOutcome::Cancelled,
        Ok(Err(error)) => TaskOutcome::Failed(error),
        Err(join_error) => TaskOutcome::Failed(InstallerError::Other(format!(
            "background task aborted unexpectedly: {join_error}"
        ))),
    }
}
