//! 2x2 camera grid

use bytes::Bytes;
use contracts::{FrameSnapshot, ImageData};
use image::{imageops, ImageBuffer, Rgb, RgbImage};

use crate::error::{CompositorError, Result};
use crate::tile::camera_tile;

/// Tile names of a grid, one per side of the vehicle
#[derive(Debug, Clone, Copy)]
pub struct GridTiles<'a> {
    pub front: &'a str,
    pub right: &'a str,
    pub rear: &'a str,
    pub left: &'a str,
}

/// Stitch four equally-sized camera images
///
/// Layout:
/// ```text
/// +-------+-------+
/// | front | right |
/// +-------+-------+
/// | left  | rear  |
/// +-------+-------+
/// ```
/// The first tile that is missing, not a camera, malformed, or sized differently from
/// `front` aborts the composition.
pub fn compose_grid(snapshot: &FrameSnapshot, tiles: GridTiles<'_>) -> Result<ImageData> {
    let front = camera_tile(snapshot, tiles.front)?;
    let right = camera_tile(snapshot, tiles.right)?;
    let rear = camera_tile(snapshot, tiles.rear)?;
    let left = camera_tile(snapshot, tiles.left)?;

    let (w, h) = (front.width, front.height);
    for (name, image) in [(tiles.right, right), (tiles.rear, rear), (tiles.left, left)] {
        if (image.width, image.height) != (w, h) {
            return Err(CompositorError::DimensionMismatch {
                tile: name.to_string(),
                expected: (w, h),
                actual: (image.width, image.height),
            });
        }
    }

    let mut canvas = RgbImage::new(w * 2, h * 2);
    let placements = [
        (tiles.front, front, 0, 0),
        (tiles.right, right, w, 0),
        (tiles.left, left, 0, h),
        (tiles.rear, rear, w, h),
    ];
    for (name, image, x, y) in placements {
        let tile = as_view(name, image)?;
        imageops::replace(&mut canvas, &tile, i64::from(x), i64::from(y));
    }

    Ok(ImageData {
        width: w * 2,
        height: h * 2,
        data: Bytes::from(canvas.into_raw()),
    })
}

/// Borrow an image buffer without copying
fn as_view<'a>(tile: &str, image: &'a ImageData) -> Result<ImageBuffer<Rgb<u8>, &'a [u8]>> {
    ImageBuffer::from_raw(image.width, image.height, &image.data[..]).ok_or_else(|| {
        CompositorError::BufferSize {
            tile: tile.to_string(),
            expected: ImageData::expected_len(image.width, image.height),
            actual: image.data.len(),
        }
    })
}
