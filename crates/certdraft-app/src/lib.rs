//! CertDraft Application
//!
//! The application shell: runs an editor session from UI actions, loads
//! background images on a worker thread, and writes exports.

mod app;
mod loader;
mod ui;

pub use app::{App, AppConfig, AppError};
pub use loader::BackgroundLoader;
pub use ui::{UiAction, UiState, UiStatus};
