//! Presenter implementations

mod file;
mod log;

pub use self::file::{FilePresenter, FilePresenterConfig};
pub use self::log::LogPresenter;
