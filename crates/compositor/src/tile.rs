//! Camera tile lookup shared by the grid and single views

use contracts::{FrameSnapshot, ImageData, SensorPayload};

use crate::error::{CompositorError, Result};

/// Camera image held under `name`, checked for a well-formed buffer
pub(crate) fn camera_tile<'a>(snapshot: &'a FrameSnapshot, name: &str) -> Result<&'a ImageData> {
    let sample = snapshot
        .get(name)
        .ok_or_else(|| CompositorError::MissingTile {
            tile: name.to_string(),
        })?;

    let SensorPayload::Camera(image) = &sample.payload else {
        return Err(CompositorError::NotACamera {
            tile: name.to_string(),
        });
    };

    let expected = ImageData::expected_len(image.width, image.height);
    if image.data.len() != expected {
        return Err(CompositorError::BufferSize {
            tile: name.to_string(),
            expected,
            actual: image.data.len(),
        });
    }

    Ok(image)
}
