//! Single camera pass-through

use contracts::{FrameSnapshot, ImageData};

use crate::error::Result;
use crate::tile::camera_tile;

/// The named camera's latest image, unchanged
pub fn compose_single(snapshot: &FrameSnapshot, camera: &str) -> Result<ImageData> {
    camera_tile(snapshot, camera).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{camera_sample, snapshot_of};
    use crate::CompositorError;
    use bytes::Bytes;
    use contracts::{SensorPayload, SensorSample};

    #[test]
    fn test_single_passes_image_through() {
        let snapshot = snapshot_of(vec![("chase", camera_sample(800, 600, 7))]);
        let image = compose_single(&snapshot, "chase").unwrap();
        assert_eq!((image.width, image.height), (800, 600));
        assert_eq!(image.data[0], 7);
    }

    #[test]
    fn test_single_rejects_short_buffer() {
        let broken = SensorSample {
            frame: 3,
            timestamp: 0.15,
            payload: SensorPayload::Camera(ImageData {
                width: 2,
                height: 2,
                data: Bytes::from(vec![0u8; 5]),
            }),
        };
        let snapshot = snapshot_of(vec![("chase", broken)]);

        let err = compose_single(&snapshot, "chase").unwrap_err();
        assert_eq!(
            err,
            CompositorError::BufferSize {
                tile: "chase".into(),
                expected: 12,
                actual: 5,
            }
        );
    }
}
