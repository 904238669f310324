//! Recording module: serialized diagnostic capture and zip export
//!
//! Records API calls, database queries, screen navigation and UI-test
//! actions as plain-text files under a per-app directory, and exports that
//! directory as an optionally password-protected archive.

pub mod entry;
pub mod export;
pub mod manager;
pub mod screen;
pub mod settings;
pub(crate) mod writer;

pub use entry::ControlKind;
pub use export::{RecordedFileInfo, RecordingInfo};
pub use manager::Recorder;
pub use screen::record_screen;
pub use settings::RecorderSettings;
