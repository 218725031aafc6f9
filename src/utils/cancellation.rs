use tokio::sync::watch;

// ============================================================================
// Cooperative Cancellation
// ============================================================================
//
// Cycles poll `is_cancelled()` between aggregate operations; tickers await
// `cancelled()` next to their interval. A write already in flight is never
// interrupted, callers only stop before starting the next step.
//
// ============================================================================

/// Owning side; firing it is irreversible
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken { rx: self.tx.subscribe() }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// A token that never fires
    pub fn none() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // Sender dropped without firing: never resolve
        if rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
