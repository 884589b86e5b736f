//! PresenterHandle - one presenter behind an isolated queue and worker task

use std::sync::Arc;

use contracts::{CompositeFrame, Presenter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::metrics::PresenterMetrics;

/// Handle to a running presenter worker
pub struct PresenterHandle {
    name: String,
    tx: mpsc::Sender<Arc<CompositeFrame>>,
    metrics: Arc<PresenterMetrics>,
    worker_handle: JoinHandle<()>,
}

impl PresenterHandle {
    /// Spawn the worker task. Must be called inside a tokio runtime.
    pub fn spawn<P: Presenter + Send + 'static>(presenter: P, queue_capacity: usize) -> Self {
        let name = presenter.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(PresenterMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            presenter_worker(presenter, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<PresenterMetrics> {
        &self.metrics
    }

    /// Queue a frame without waiting
    ///
    /// Returns false when the queue is full (frame dropped) or the worker is gone.
    pub fn try_send(&self, frame: Arc<CompositeFrame>) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => {
                let depth = self.tx.max_capacity() - self.tx.capacity();
                self.metrics.record_enqueued(depth);
                observability::metrics::record_presenter_queue_depth(&self.name, depth);
                true
            }
            Err(mpsc::error::TrySendError::Full(frame)) => {
                self.metrics.record_drop();
                observability::metrics::record_frame_dropped(&self.name);
                warn!(
                    presenter = %self.name,
                    kind = frame.kind_name(),
                    "Queue full, frame dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(presenter = %self.name, "Presenter worker closed unexpectedly");
                false
            }
        }
    }

    /// Drain the queue, close the presenter and wait for the worker
    #[instrument(name = "presenter_handle_shutdown", skip(self), fields(presenter = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(presenter = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(presenter = %self.name, "PresenterHandle shutdown complete");
    }
}

#[instrument(
    name = "presenter_worker_loop",
    skip(presenter, rx, metrics),
    fields(presenter = %name)
)]
async fn presenter_worker<P: Presenter>(
    mut presenter: P,
    mut rx: mpsc::Receiver<Arc<CompositeFrame>>,
    metrics: Arc<PresenterMetrics>,
    name: String,
) {
    debug!(presenter = %name, "Presenter worker started");

    while let Some(frame) = rx.recv().await {
        metrics.record_dequeued(rx.len());

        match presenter.present(&frame).await {
            Ok(()) => {
                metrics.record_presented();
                observability::metrics::record_frame_presented(&name, true);
            }
            Err(e) => {
                metrics.record_failure();
                observability::metrics::record_frame_presented(&name, false);
                error!(
                    presenter = %name,
                    kind = frame.kind_name(),
                    error = %e,
                    "Present failed"
                );
            }
        }
    }

    if let Err(e) = presenter.close().await {
        error!(presenter = %name, error = %e, "Close failed on shutdown");
    }

    debug!(presenter = %name, "Presenter worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ContractError, ImageData};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct MockPresenter {
        name: String,
        presented: Arc<AtomicU64>,
        closed: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockPresenter {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                presented: Arc::new(AtomicU64::new(0)),
                closed: Arc::new(AtomicU64::new(0)),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl Presenter for MockPresenter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn present(&mut self, _frame: &CompositeFrame) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::presenter(&self.name, "mock failure"));
            }
            self.presented.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn frame() -> Arc<CompositeFrame> {
        Arc::new(CompositeFrame::Image(ImageData {
            width: 2,
            height: 1,
            data: Bytes::from(vec![0u8; 6]),
        }))
    }

    #[tokio::test]
    async fn test_presenter_handle_basic() {
        let presenter = MockPresenter::new("test");
        let presented = Arc::clone(&presenter.presented);
        let closed = Arc::clone(&presenter.closed);

        let handle = PresenterHandle::spawn(presenter, 10);
        for _ in 0..5 {
            assert!(handle.try_send(frame()));
        }

        handle.shutdown().await;
        assert_eq!(presented.load(Ordering::Relaxed), 5);
        assert_eq!(closed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_presenter_handle_queue_full() {
        let mut presenter = MockPresenter::new("slow");
        presenter.delay_ms = 100;

        let handle = PresenterHandle::spawn(presenter, 2);
        for _ in 0..10 {
            handle.try_send(frame());
        }

        assert!(handle.metrics().drops() > 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_presenter_handle_failure_isolation() {
        let mut presenter = MockPresenter::new("failing");
        presenter.should_fail = true;

        let handle = PresenterHandle::spawn(presenter, 10);
        for _ in 0..3 {
            handle.try_send(frame());
        }

        sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.metrics().failures(), 3);

        handle.shutdown().await;
    }
}
