//! On-device diagnostic recorder
//!
//! Records API responses, database queries, screen navigation and UI-test
//! actions as plain-text files under a per-app `Recording` directory, and
//! exports that directory as an optionally password-protected zip archive
//! for support handoff.
//!
//! Recording is fire-and-forget: formatting happens on the caller's
//! thread, persistence on a dedicated writer so no two writes interleave,
//! and a recording failure is reported through `tracing` without ever
//! reaching the host application.

pub mod logging;
pub mod recording;

pub use recording::{
    record_screen, ControlKind, RecordedFileInfo, Recorder, RecorderSettings, RecordingInfo,
};
