//! # Presenter
//!
//! Where composite frames end up.
//!
//! - One worker task and bounded queue per presenter
//! - Fan-out through `PresenterHub`; a slow presenter drops its own frames only
//! - `QuitSignal` shared with the main loop

pub mod error;
pub mod handle;
pub mod hub;
pub mod metrics;
pub mod presenters;
pub mod quit;

pub use contracts::{CompositeFrame, Presenter};
pub use error::{PresenterError, Result};
pub use handle::PresenterHandle;
pub use hub::PresenterHub;
pub use metrics::{MetricsSnapshot, PresenterMetrics};
pub use presenters::{FilePresenter, FilePresenterConfig, LogPresenter};
pub use quit::QuitSignal;
