//! CertDraft Core Library
//!
//! Platform-agnostic scene model and editor session for laying out
//! certificate templates from CSV sample data.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod factory;
pub mod format;
pub mod layers;
pub mod panel;
pub mod pending;
pub mod sample;
pub mod scene;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_support;

pub use canvas::{Canvas, CanvasToken, SceneEvent};
pub use config::EditorConfig;
pub use editor::{BackgroundOutcome, Editor, EditorError};
pub use factory::LayerFactory;
pub use format::{Format, FormatError, select_format};
pub use layers::{Layer, LayerId, TextMeasure};
pub use panel::{LayerEntry, LayersPanel};
pub use pending::{BackgroundRequest, DecodedBackground};
pub use sample::{SampleError, SampleRow, parse_sample, parse_sample_bytes};
pub use scene::Scene;
pub use selection::Selection;
