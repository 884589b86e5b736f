//! PresenterHub - fans each composite frame out to every presenter

use std::sync::Arc;

use contracts::{CompositeFrame, PresenterConfig, PresenterType};
use tracing::{debug, info, instrument};

use crate::error::{PresenterError, Result};
use crate::handle::PresenterHandle;
use crate::metrics::MetricsSnapshot;
use crate::presenters::{FilePresenter, LogPresenter};
use crate::quit::QuitSignal;

/// All presenters of a run
///
/// `present` never waits: a presenter whose queue is full drops the frame, the others
/// still get it.
pub struct PresenterHub {
    handles: Vec<PresenterHandle>,
    frames: u64,
}

impl PresenterHub {
    /// Build and start every configured presenter. Must be called inside a tokio runtime.
    #[instrument(
        name = "presenter_hub_build",
        skip(configs, quit),
        fields(presenter_count = configs.len())
    )]
    pub fn from_configs(configs: &[PresenterConfig], quit: &QuitSignal) -> Result<Self> {
        let handles = configs
            .iter()
            .map(|config| create_presenter_handle(config, quit))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_handles(handles))
    }

    pub fn with_handles(handles: Vec<PresenterHandle>) -> Self {
        Self { handles, frames: 0 }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Hand one frame to every presenter
    ///
    /// # Returns
    /// Number of presenters that accepted the frame
    pub fn present(&mut self, frame: CompositeFrame) -> usize {
        self.frames += 1;
        let frame = Arc::new(frame);
        let accepted = self
            .handles
            .iter()
            .filter(|handle| handle.try_send(Arc::clone(&frame)))
            .count();

        if self.frames.is_multiple_of(100) {
            debug!(frames = self.frames, "Presenter hub progress");
        }
        accepted
    }

    /// Counters for every presenter
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Drain and close every presenter
    #[instrument(name = "presenter_hub_shutdown", skip(self), fields(frames = self.frames))]
    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.shutdown().await;
        }
        info!(frames = self.frames, "Presenters closed");
    }
}

#[instrument(
    name = "presenter_create_handle",
    skip(config, quit),
    fields(presenter = %config.name, presenter_type = ?config.presenter_type)
)]
fn create_presenter_handle(config: &PresenterConfig, quit: &QuitSignal) -> Result<PresenterHandle> {
    match config.presenter_type {
        PresenterType::Log => {
            let presenter = LogPresenter::new(&config.name);
            Ok(PresenterHandle::spawn(presenter, config.queue_capacity))
        }
        PresenterType::File => {
            let presenter = FilePresenter::from_params(&config.name, &config.params, quit.clone())
                .map_err(|e| PresenterError::creation(&config.name, e.to_string()))?;
            Ok(PresenterHandle::spawn(presenter, config.queue_capacity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Dashboard;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn dashboard() -> CompositeFrame {
        CompositeFrame::Dashboard(Dashboard {
            width: 680,
            height: 360,
            tick: None,
            fields: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_hub_fanout() {
        let handles = vec![
            PresenterHandle::spawn(LogPresenter::new("a"), 10),
            PresenterHandle::spawn(LogPresenter::new("b"), 10),
        ];
        let mut hub = PresenterHub::with_handles(handles);

        for _ in 0..3 {
            assert_eq!(hub.present(dashboard()), 2);
        }
        let metrics = hub.metrics();
        assert_eq!(metrics.len(), 2);
        hub.shutdown().await;
    }

    #[tokio::test]
    async fn test_hub_from_configs() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "base_path".to_string(),
            dir.path().to_string_lossy().into_owned(),
        );
        params.insert("max_frames".to_string(), "1".to_string());

        let configs = vec![
            PresenterConfig {
                name: "console".to_string(),
                presenter_type: PresenterType::Log,
                queue_capacity: 4,
                params: HashMap::new(),
            },
            PresenterConfig {
                name: "disk".to_string(),
                presenter_type: PresenterType::File,
                queue_capacity: 4,
                params,
            },
        ];

        let quit = QuitSignal::new();
        let mut hub = PresenterHub::from_configs(&configs, &quit).unwrap();
        assert_eq!(hub.len(), 2);

        hub.present(dashboard());
        hub.shutdown().await;
        assert!(quit.is_raised());
    }

    #[tokio::test]
    async fn test_hub_rejects_bad_params() {
        let mut params = HashMap::new();
        params.insert("max_frames".to_string(), "-1".to_string());
        let configs = vec![PresenterConfig {
            name: "disk".to_string(),
            presenter_type: PresenterType::File,
            queue_capacity: 4,
            params,
        }];

        let err = PresenterHub::from_configs(&configs, &QuitSignal::new())
            .err()
            .unwrap();
        assert!(matches!(err, PresenterError::Creation { ref name, .. } if name == "disk"));
    }
}
