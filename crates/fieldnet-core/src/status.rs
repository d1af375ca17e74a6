// Status publication shared by the switch and the access point.

use tokio::sync::watch;

/// Publishes an in-progress status for the lifetime of an operation.
///
/// [`finish`](Self::finish) publishes the outcome. Dropping the guard
/// without finishing, as happens when the operation's future is cancelled,
/// puts back the status seen on entry.
pub(crate) struct StatusGuard<'a, S> {
    status: &'a watch::Sender<S>,
    previous: Option<S>,
}

impl<'a, S> StatusGuard<'a, S> {
    pub(crate) fn enter(status: &'a watch::Sender<S>, in_progress: S) -> Self {
        let previous = status.send_replace(in_progress);
        Self {
            status,
            previous: Some(previous),
        }
    }

    pub(crate) fn finish(mut self, outcome: S) {
        self.previous = None;
        self.status.send_replace(outcome);
    }
}

impl<S> Drop for StatusGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.status.send_replace(previous);
        }
    }
}
