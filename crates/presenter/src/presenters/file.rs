//! FilePresenter - writes composite frames to a per-run directory

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use contracts::{CompositeFrame, ContractError, Dashboard, ImageData, Presenter};
use image::{ExtendedColorType, ImageFormat};
use tracing::{debug, error, info, instrument};

use crate::quit::QuitSignal;

/// Configuration for FilePresenter
#[derive(Debug, Clone)]
pub struct FilePresenterConfig {
    /// A `run_<timestamp>` directory is created under this path
    pub base_path: PathBuf,

    /// Raise quit after writing this many frames
    pub max_frames: Option<u64>,
}

impl FilePresenterConfig {
    /// Read `base_path` (default `./output`) and `max_frames` from presenter params
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        let max_frames = params
            .get("max_frames")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|e| format!("invalid max_frames '{}': {}", v, e))
            })
            .transpose()?;

        Ok(Self {
            base_path,
            max_frames,
        })
    }
}

/// Writes image frames as PNG and dashboards as a JSON field list
///
/// Files are numbered by arrival: `frame_000001.png`, `frame_000002.json`, ...
pub struct FilePresenter {
    name: String,
    config: FilePresenterConfig,
    run_dir: PathBuf,
    written: u64,
    quit: QuitSignal,
}

impl FilePresenter {
    pub fn new(
        name: impl Into<String>,
        config: FilePresenterConfig,
        quit: QuitSignal,
    ) -> std::io::Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let run_dir = config.base_path.join(format!("run_{}", stamp));
        fs::create_dir_all(&run_dir)?;

        let name = name.into();
        info!(presenter = %name, dir = %run_dir.display(), "FilePresenter writing frames");

        Ok(Self {
            name,
            config,
            run_dir,
            written: 0,
            quit,
        })
    }

    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        quit: QuitSignal,
    ) -> std::io::Result<Self> {
        let config = FilePresenterConfig::from_params(params)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Self::new(name, config, quit)
    }

    /// Directory this run writes into
    pub fn output_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_frame_to_disk(&self, index: u64, frame: &CompositeFrame) -> std::io::Result<()> {
        let stem = format!("frame_{:06}", index);
        match frame {
            CompositeFrame::Image(image) => self.save_image(&stem, image),
            CompositeFrame::Dashboard(dashboard) => self.save_dashboard(&stem, dashboard),
        }
    }

    fn save_image(&self, stem: &str, image: &ImageData) -> std::io::Result<()> {
        if !image.is_well_formed() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "{}x{} image with {} bytes",
                    image.width,
                    image.height,
                    image.data.len()
                ),
            ));
        }
        let path = self.run_dir.join(format!("{}.png", stem));
        image::save_buffer_with_format(
            path,
            &image.data,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
            ImageFormat::Png,
        )
        .map_err(std::io::Error::other)
    }

    fn save_dashboard(&self, stem: &str, dashboard: &Dashboard) -> std::io::Result<()> {
        let file = File::create(self.run_dir.join(format!("{}.json", stem)))?;
        serde_json::to_writer_pretty(file, dashboard)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl Presenter for FilePresenter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_presenter_present",
        skip(self, frame),
        fields(presenter = %self.name, kind = frame.kind_name())
    )]
    async fn present(&mut self, frame: &CompositeFrame) -> Result<(), ContractError> {
        let index = self.written + 1;
        self.write_frame_to_disk(index, frame).map_err(|e| {
            error!(presenter = %self.name, frame = index, error = %e, "Write failed");
            ContractError::presenter(&self.name, e.to_string())
        })?;
        self.written = index;

        if self
            .config
            .max_frames
            .is_some_and(|max| self.written >= max)
            && self.quit.raise()
        {
            info!(presenter = %self.name, frames = self.written, "Frame limit reached, quitting");
        }
        Ok(())
    }

    #[instrument(name = "file_presenter_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(presenter = %self.name, frames = self.written, "FilePresenter closed");
        Ok(())
    }
}
