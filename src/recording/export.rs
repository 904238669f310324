//! Recording export and inventory
//!
//! Bundles the logging root into a zip archive (optionally password
//! protected) and provides the inventory, reveal and cleanup operations
//! around it.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::write::{FileOptions, SimpleFileOptions};
use zip::{AesMode, CompressionMethod, ZipWriter};

use super::manager::SUBFOLDERS;

/// Snapshot of what is currently recorded under the logging root.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordingInfo {
    pub directory: String,
    pub total_size_bytes: u64,
    pub total_size_human: String,
    pub file_count: usize,
    pub files: Vec<RecordedFileInfo>,
}

/// One recorded file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordedFileInfo {
    pub folder: String,
    pub name: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub modified: Option<String>,
}

/// Format bytes into a human-readable string
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Path of the archive produced for `root`: the root path with a `.zip`
/// extension appended.
pub(crate) fn archive_path(root: &Path) -> PathBuf {
    let mut path = root.as_os_str().to_owned();
    path.push(".zip");
    PathBuf::from(path)
}

/// Create `<root>.zip` from the current contents of `root`.
///
/// Any pre-existing archive is removed first, best-effort. With a password
/// the archive entries are AES-256 encrypted. Directory entries are
/// preserved, so an empty root still yields a valid archive.
pub(crate) fn create_archive(root: &Path, password: Option<&str>) -> Result<()> {
    let target = archive_path(root);
    if let Err(e) = std::fs::remove_file(&target) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove stale archive {}: {}", target.display(), e);
        }
    }

    let file =
        File::create(&target).with_context(|| format!("creating {}", target.display()))?;
    let mut zip = ZipWriter::new(file);

    let base = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6));
    let options: FileOptions<'_, ()> = match password {
        Some(password) => base.with_aes_encryption(AesMode::Aes256, password),
        None => base,
    };

    add_directory_contents(&mut zip, root, Path::new(""), &options)?;

    zip.finish().context("finishing archive")?;
    Ok(())
}

fn add_directory_contents(
    zip: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &Path,
    options: &FileOptions<'_, ()>,
) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = prefix.join(entry.file_name());
        let name_in_archive = name.to_string_lossy().replace('\\', "/");

        if path.is_dir() {
            zip.add_directory(name_in_archive.as_str(), options.clone())
                .with_context(|| format!("adding directory {}", name_in_archive))?;
            add_directory_contents(zip, &path, &name, options)?;
        } else {
            let mut contents = Vec::new();
            File::open(&path)
                .with_context(|| format!("opening {}", path.display()))?
                .read_to_end(&mut contents)
                .with_context(|| format!("reading {}", path.display()))?;

            zip.start_file(name_in_archive.as_str(), options.clone())
                .with_context(|| format!("adding file {}", name_in_archive))?;
            zip.write_all(&contents)
                .with_context(|| format!("writing {}", name_in_archive))?;
        }
    }

    Ok(())
}

/// Collect an inventory of every recorded file under the fixed subfolders.
pub(crate) fn recording_info(root: &Path) -> RecordingInfo {
    let mut files = Vec::new();

    for folder in SUBFOLDERS {
        let Ok(entries) = std::fs::read_dir(root.join(folder)) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(metadata) = path.metadata() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().to_string();
            let modified = metadata.modified().ok().map(|t| {
                let datetime: chrono::DateTime<chrono::Local> = t.into();
                datetime.format("%Y-%m-%d %H:%M:%S").to_string()
            });

            files.push(RecordedFileInfo {
                folder: folder.to_string(),
                name,
                size_bytes: metadata.len(),
                size_human: format_bytes(metadata.len()),
                modified,
            });
        }
    }

    // newest first
    files.sort_by(|a, b| b.modified.cmp(&a.modified));

    let total_size_bytes: u64 = files.iter().map(|f| f.size_bytes).sum();

    RecordingInfo {
        directory: root.to_string_lossy().to_string(),
        total_size_bytes,
        total_size_human: format_bytes(total_size_bytes),
        file_count: files.len(),
        files,
    }
}

/// Delete every recorded file under the fixed subfolders, keeping the
/// folder structure in place. Returns the number of files removed.
pub(crate) fn clear_recordings(root: &Path) -> usize {
    let mut deleted = 0;

    for folder in SUBFOLDERS {
        let Ok(entries) = std::fs::read_dir(root.join(folder)) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to delete {}: {}", path.display(), e);
            } else {
                deleted += 1;
            }
        }
    }

    tracing::debug!("Cleared {} recorded files", deleted);
    deleted
}

/// Hand a path to the platform file browser. Best-effort: failure to
/// launch the browser is logged and ignored.
pub(crate) fn reveal_in_file_manager(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("explorer").arg(path).spawn();

    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(path).spawn();

    #[cfg(target_os = "linux")]
    let result = std::process::Command::new("xdg-open").arg(path).spawn();

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    let result: std::io::Result<std::process::Child> = Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "no file browser available",
    ));

    match result {
        Ok(_) => tracing::debug!("Opened {} in file browser", path.display()),
        Err(e) => tracing::error!("Failed to open file browser: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seeded_root(dir: &Path) -> PathBuf {
        let root = dir.join("Recording");
        for folder in SUBFOLDERS {
            std::fs::create_dir_all(root.join(folder)).unwrap();
        }
        root
    }

    #[test]
    fn test_archive_path_appends_zip_extension() {
        assert_eq!(
            archive_path(Path::new("/data/app/Recording")),
            PathBuf::from("/data/app/Recording.zip")
        );
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024 * 3 / 2), "1.50 MB");
    }

    #[test]
    fn test_empty_root_archives_successfully() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());

        create_archive(&root, None).unwrap();

        let archive =
            zip::ZipArchive::new(File::open(archive_path(&root)).unwrap()).unwrap();
        // the four (empty) subfolders survive as directory entries
        assert_eq!(archive.len(), 4);
    }

    #[test]
    fn test_archive_roundtrip_without_password() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());
        std::fs::write(root.join("Responses/call.txt"), "Status Code: 200\n").unwrap();

        create_archive(&root, None).unwrap();

        let mut archive =
            zip::ZipArchive::new(File::open(archive_path(&root)).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("Responses/call.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "Status Code: 200\n");
    }

    #[test]
    fn test_password_protected_archive_requires_password() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());
        std::fs::write(root.join("Responses/call.txt"), "Status Code: 200\n").unwrap();

        create_archive(&root, Some("secret")).unwrap();

        let mut archive =
            zip::ZipArchive::new(File::open(archive_path(&root)).unwrap()).unwrap();
        assert!(archive.by_name("Responses/call.txt").is_err());
        assert!(archive
            .by_name_decrypt("Responses/call.txt", b"wrong-password")
            .is_err());

        let mut content = String::new();
        archive
            .by_name_decrypt("Responses/call.txt", b"secret")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "Status Code: 200\n");
    }

    #[test]
    fn test_export_replaces_previous_archive() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());

        std::fs::write(root.join("UITests/UITestsLogs.txt"), "app.tap(\"a\")\n").unwrap();
        create_archive(&root, None).unwrap();

        std::fs::remove_file(root.join("UITests/UITestsLogs.txt")).unwrap();
        create_archive(&root, None).unwrap();

        let mut archive =
            zip::ZipArchive::new(File::open(archive_path(&root)).unwrap()).unwrap();
        assert!(archive.by_name("UITests/UITestsLogs.txt").is_err());
    }

    #[test]
    fn test_recording_info_counts_files() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());
        std::fs::write(root.join("Responses/a.txt"), "aaaa").unwrap();
        std::fs::write(root.join("Database Logs/b.txt"), "bb").unwrap();

        let info = recording_info(&root);
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size_bytes, 6);
        assert_eq!(info.total_size_human, "6 bytes");
        assert!(info.files.iter().any(|f| f.folder == "Responses" && f.name == "a.txt"));
    }

    #[test]
    fn test_clear_recordings_keeps_folders() {
        let dir = tempdir().unwrap();
        let root = seeded_root(dir.path());
        std::fs::write(root.join("Responses/a.txt"), "aaaa").unwrap();
        std::fs::write(root.join("UITests/UITestsLogs.txt"), "app.tap(\"a\")\n").unwrap();

        assert_eq!(clear_recordings(&root), 2);
        for folder in SUBFOLDERS {
            assert!(root.join(folder).is_dir());
        }
        assert_eq!(recording_info(&root).file_count, 0);
    }
}
