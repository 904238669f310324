//! Serialized write worker
//!
//! A single dedicated thread owns every file mutation under the logging
//! root, so no two writes interleave their file-handle operations. Jobs are
//! queued over a channel; a failed write is reported through the
//! diagnostics channel and never reaches the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{Context, Result};

/// How a job's content lands in the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Replace any existing file (per-call logs)
    Overwrite,
    /// Append to the file, creating it when missing (continuous logs)
    Append,
}

pub(crate) enum WriteJob {
    Write {
        folder: String,
        filename: String,
        content: String,
        mode: WriteMode,
    },
    /// Acknowledge once every previously queued job has completed
    Flush(tokio::sync::oneshot::Sender<()>),
}

/// Handle to the write worker. Cheap to clone; the worker drains its queue
/// and exits once every handle is gone.
#[derive(Clone)]
pub(crate) struct WriteWorker {
    sender: Sender<WriteJob>,
}

impl WriteWorker {
    /// Spawn the worker thread owning all writes under `root`.
    pub(crate) fn spawn(root: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel::<WriteJob>();

        let spawned = thread::Builder::new()
            .name("recording-writer".to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    match job {
                        WriteJob::Write {
                            folder,
                            filename,
                            content,
                            mode,
                        } => {
                            let directory = ensure_folder_exists(&root, &folder);
                            let path = directory.join(&filename);
                            match perform_write(&path, &content, mode) {
                                Ok(()) => tracing::debug!("Recorded {}", path.display()),
                                Err(e) => {
                                    tracing::error!("Failed to write {}: {:#}", path.display(), e)
                                }
                            }
                        }
                        WriteJob::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to start recording writer: {}", e);
        }

        Self { sender }
    }

    /// Queue a write. Never blocks and never fails the caller.
    pub(crate) fn submit(&self, folder: &str, filename: &str, content: String, mode: WriteMode) {
        let job = WriteJob::Write {
            folder: folder.to_string(),
            filename: filename.to_string(),
            content,
            mode,
        };
        if self.sender.send(job).is_err() {
            tracing::error!("Recording writer is gone, dropping {} entry", folder);
        }
    }

    /// Wait until every previously queued write has hit the filesystem.
    pub(crate) async fn flush(&self) {
        let (ack, done) = tokio::sync::oneshot::channel();
        if self.sender.send(WriteJob::Flush(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }
}

/// Make sure `folder` exists under `root`, creating intermediate
/// directories as needed. Creation failure is logged and left for the
/// write attempt to surface again.
pub(crate) fn ensure_folder_exists(root: &Path, folder: &str) -> PathBuf {
    let directory = root.join(folder);
    if !directory.exists() {
        match fs::create_dir_all(&directory) {
            Ok(()) => tracing::debug!("Created folder: {}", directory.display()),
            Err(e) => tracing::error!("Failed to create folder {}: {}", folder, e),
        }
    }
    directory
}

fn perform_write(path: &Path, content: &str, mode: WriteMode) -> Result<()> {
    match mode {
        WriteMode::Overwrite => {
            // write-then-rename so a reader never sees a half-written file
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
            fs::rename(&tmp, path)
                .with_context(|| format!("replacing {}", path.display()))?;
        }
        WriteMode::Append => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("appending to {}", path.display()))?;
        }
    }
    Ok(())
}
