//! LogPresenter - frame summaries through tracing

use contracts::{CompositeFrame, ContractError, Presenter};
use tracing::{info, instrument};

/// Logs one line per frame; the stand-in display for headless runs
pub struct LogPresenter {
    name: String,
    frames: u64,
}

impl LogPresenter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn log_frame_summary(&self, frame: &CompositeFrame) {
        let (width, height) = frame.dimensions();
        match frame {
            CompositeFrame::Image(_) => {
                info!(
                    presenter = %self.name,
                    frame = self.frames,
                    width,
                    height,
                    "Image frame"
                );
            }
            CompositeFrame::Dashboard(dashboard) => {
                let lines: Vec<&str> = dashboard.fields.iter().map(|f| f.text.as_str()).collect();
                info!(
                    presenter = %self.name,
                    frame = self.frames,
                    tick = ?dashboard.tick,
                    fields = ?lines,
                    "Dashboard frame"
                );
            }
        }
    }
}

impl Presenter for LogPresenter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_presenter_present",
        skip(self, frame),
        fields(presenter = %self.name, kind = frame.kind_name())
    )]
    async fn present(&mut self, frame: &CompositeFrame) -> Result<(), ContractError> {
        self.frames += 1;
        self.log_frame_summary(frame);
        Ok(())
    }

    #[instrument(name = "log_presenter_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(presenter = %self.name, frames = self.frames, "LogPresenter closed");
        Ok(())
    }
}
