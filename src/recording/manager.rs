//! Recorder: single owner of the logging root
//!
//! Public logging surface of the crate. Formatting is delegated to
//! [`entry`](super::entry), persistence to the serialized
//! [`writer`](super::writer), archiving to [`export`](super::export).
//! Every operation is best-effort: a recording failure is reported through
//! the diagnostics channel and never reaches the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

use super::entry::{self, ControlKind};
use super::export::{self, RecordingInfo};
use super::settings::RecorderSettings;
use super::writer::{self, WriteMode, WriteWorker};

/// Fixed subfolder for per-call API logs
pub(crate) const RESPONSES_FOLDER: &str = "Responses";
/// Fixed subfolder for the continuous navigation log
pub(crate) const VIEW_CONTROLLERS_FOLDER: &str = "View Controllers";
/// Fixed subfolder for per-call database logs
pub(crate) const DATABASE_FOLDER: &str = "Database Logs";
/// Fixed subfolder for the continuous UI-test log
pub(crate) const UI_TESTS_FOLDER: &str = "UITests";

/// Every subfolder of the logging root
pub(crate) const SUBFOLDERS: [&str; 4] = [
    RESPONSES_FOLDER,
    VIEW_CONTROLLERS_FOLDER,
    DATABASE_FOLDER,
    UI_TESTS_FOLDER,
];

const NAVIGATION_LOG_FILE: &str = "ViewControllerLogs.txt";
const UI_TESTS_LOG_FILE: &str = "UITestsLogs.txt";

static SHARED: OnceLock<Recorder> = OnceLock::new();

/// Diagnostic recorder bound to one logging root.
#[derive(Clone)]
pub struct Recorder {
    settings: RecorderSettings,
    root: PathBuf,
    writer: WriteWorker,
}

impl Recorder {
    /// Create a recorder for the root described by `settings` and make
    /// sure the base directories exist. Directory-creation failure is
    /// non-fatal; the affected writes will report their own failures.
    pub fn new(settings: RecorderSettings) -> Self {
        let root = settings.resolve_root();
        for folder in SUBFOLDERS {
            writer::ensure_folder_exists(&root, folder);
        }
        tracing::debug!("App recording directory: {}", root.display());

        let writer = WriteWorker::spawn(root.clone());
        Self {
            settings,
            root,
            writer,
        }
    }

    /// Process-wide recorder under the default document-directory root.
    pub fn shared() -> &'static Recorder {
        SHARED.get_or_init(|| Recorder::new(RecorderSettings::default()))
    }

    /// Logging root this recorder writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record one API call as a per-call file under `Responses`.
    ///
    /// Sensitive parameter values are masked before anything is serialized;
    /// the caller's mapping is left untouched. Headers, parameters and
    /// response render as pretty JSON where possible, with a plain-text
    /// fallback for values that do not serialize.
    #[allow(clippy::too_many_arguments)]
    pub fn log_response<T>(
        &self,
        api_name: &str,
        parameters: Option<&Map<String, Value>>,
        request_time: DateTime<Local>,
        headers: Option<&BTreeMap<String, String>>,
        response: Option<&T>,
        response_time: DateTime<Local>,
        status_code: u16,
    ) where
        T: Serialize + fmt::Debug,
    {
        let content = entry::format_api_entry(
            api_name,
            parameters,
            request_time,
            headers,
            response,
            response_time,
            status_code,
        );
        let filename = entry::per_call_filename(Local::now(), api_name);
        self.writer
            .submit(RESPONSES_FOLDER, &filename, content, WriteMode::Overwrite);
    }

    /// Record one database query as a per-call file under `Database Logs`.
    pub fn log_database_response<T>(
        &self,
        db_name: &str,
        predicate: Option<&str>,
        limit: Option<usize>,
        count: usize,
        response: Option<&T>,
    ) where
        T: Serialize + fmt::Debug,
    {
        let now = Local::now();
        let content = entry::format_database_entry(now, db_name, predicate, limit, count, response);
        let filename = entry::per_call_filename(now, db_name);
        self.writer
            .submit(DATABASE_FOLDER, &filename, content, WriteMode::Overwrite);
    }

    /// Record a screen-navigation event in the continuous navigation log.
    pub fn log_navigation(&self, description: &str, title: &str) {
        let content = entry::format_navigation_entry(Local::now(), description, title);
        self.writer.submit(
            VIEW_CONTROLLERS_FOLDER,
            NAVIGATION_LOG_FILE,
            content,
            WriteMode::Append,
        );
    }

    /// Record one UI-test action in the continuous UI-test log.
    pub fn log_ui_test_action(&self, kind: ControlKind, identifier: &str, into: Option<&str>) {
        let content = entry::ui_test_command(kind, identifier, into);
        self.writer
            .submit(UI_TESTS_FOLDER, UI_TESTS_LOG_FILE, content, WriteMode::Append);
    }

    /// Record that a screen became visible. Convenience over
    /// [`log_navigation`](Self::log_navigation) using the screen name for
    /// both title and description.
    pub fn record_screen(&self, name: &str) {
        self.log_navigation(name, name);
    }

    /// Wait until every queued write has reached the filesystem.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Bundle the logging root into `<root>.zip` and, on success, hand the
    /// archive to the platform file browser.
    ///
    /// Pending writes are flushed first so the archive is a consistent
    /// snapshot. Archive creation runs off the caller's interactive
    /// thread; the future resumes only once the archive exists (or the
    /// attempt failed). Returns whether the archive was created.
    pub async fn export_all_recordings(&self, password: Option<&str>) -> bool {
        self.flush().await;

        let root = self.root.clone();
        let password = password.map(|p| p.to_string());
        let archive = export::archive_path(&root);

        let outcome =
            tokio::task::spawn_blocking(move || export::create_archive(&root, password.as_deref()))
                .await;

        match outcome {
            Ok(Ok(())) => {
                tracing::debug!("Recordings exported to {}", archive.display());
                if self.settings.reveal_on_export {
                    export::reveal_in_file_manager(&archive);
                }
                true
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to create recordings archive: {:#}", e);
                false
            }
            Err(e) => {
                tracing::error!("Recordings export task failed: {}", e);
                false
            }
        }
    }

    /// Inventory of everything currently recorded under the root.
    pub fn recording_info(&self) -> RecordingInfo {
        export::recording_info(&self.root)
    }

    /// Open the logging root in the platform file browser.
    pub fn reveal_recordings(&self) {
        export::reveal_in_file_manager(&self.root);
    }

    /// Delete every recorded file, keeping the folder structure. Returns
    /// the number of files removed.
    pub async fn clear_all_recordings(&self) -> usize {
        self.flush().await;
        export::clear_recordings(&self.root)
    }
}
