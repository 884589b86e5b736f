//! Presenter trait - where composite frames end up

use crate::{CompositeFrame, ContractError};

/// Display surface for composite frames
///
/// Presenters run on their own worker task; a slow presenter only ever delays itself.
#[trait_variant::make(Presenter: Send)]
pub trait LocalPresenter {
    /// Presenter name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Show one composite frame
    ///
    /// # Errors
    /// Returns a presenter error naming this presenter
    async fn present(&mut self, frame: &CompositeFrame) -> Result<(), ContractError>;

    /// Release the surface
    async fn close(&mut self) -> Result<(), ContractError>;
}
