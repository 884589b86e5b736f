//! # Compositor
//!
//! Builds one `CompositeFrame` per cycle from a `FrameSnapshot`.
//!
//! Pure functions: no I/O, no shared state. Errors name the tile or sensor at fault.

mod dashboard;
mod error;
mod grid;
mod single;
mod tile;

#[cfg(test)]
mod test_support;

use contracts::{CompositeFrame, FrameSnapshot, ViewMode};
use tracing::trace;

pub use dashboard::{compose_dashboard, DASHBOARD_HEIGHT, DASHBOARD_WIDTH};
pub use error::{CompositorError, Result};
pub use grid::{compose_grid, GridTiles};
pub use single::compose_single;

/// Compose the configured view
///
/// # Returns
/// `None` for a headless view
pub fn compose(view: &ViewMode, snapshot: &FrameSnapshot) -> Result<Option<CompositeFrame>> {
    let frame = match view {
        ViewMode::Grid {
            front,
            right,
            rear,
            left,
        } => {
            let tiles = GridTiles {
                front,
                right,
                rear,
                left,
            };
            CompositeFrame::Image(compose_grid(snapshot, tiles)?)
        }
        ViewMode::Single { camera } => CompositeFrame::Image(compose_single(snapshot, camera)?),
        ViewMode::Dashboard { gnss, imu } => CompositeFrame::Dashboard(compose_dashboard(
            snapshot,
            gnss.as_deref(),
            imu.as_deref(),
        )?),
        ViewMode::Headless => return Ok(None),
    };

    trace!(
        kind = frame.kind_name(),
        dimensions = ?frame.dimensions(),
        tick = ?snapshot.tick,
        "Frame composed"
    );
    Ok(Some(frame))
}
