use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Holds at most one pending call. Scheduling a new call cancels the pending one, so
/// only the last call within a quiet period of `delay` runs.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call<F>(&mut self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => fire(),
            }
        });

        self.pending = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
