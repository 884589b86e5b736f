use std::sync::Arc;

use bytes::Bytes;
use contracts::{FrameSnapshot, ImageData, SensorName, SensorPayload, SensorSample};

/// Camera sample filled with one gray level
pub fn camera_sample(width: u32, height: u32, fill: u8) -> SensorSample {
    SensorSample {
        frame: 1,
        timestamp: 0.05,
        payload: SensorPayload::Camera(ImageData {
            width,
            height,
            data: Bytes::from(vec![fill; ImageData::expected_len(width, height)]),
        }),
    }
}

/// Camera sample where every pixel is unique: red and green hold the low bits of x and
/// y, blue holds `tile` in its high nibble and the high bits of x and y below it
pub fn gradient_sample(width: u32, height: u32, tile: u8) -> SensorSample {
    let mut data = Vec::with_capacity(ImageData::expected_len(width, height));
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                (x & 0xff) as u8,
                (y & 0xff) as u8,
                (tile << 4) | ((x >> 8) as u8) << 2 | (y >> 8) as u8,
            ]);
        }
    }
    SensorSample {
        frame: 1,
        timestamp: 0.05,
        payload: SensorPayload::Camera(ImageData {
            width,
            height,
            data: Bytes::from(data),
        }),
    }
}

pub fn snapshot_of(samples: Vec<(&str, SensorSample)>) -> FrameSnapshot {
    FrameSnapshot {
        samples: samples
            .into_iter()
            .map(|(name, sample)| (SensorName::from(name), Arc::new(sample)))
            .collect(),
        complete: true,
        missing: Vec::new(),
        tick: Some(1),
    }
}
