//! File gatekeeper: confined create/read/list/delete/info operations.

mod encoding;
mod error;
mod path;

use agentos_rs_config::{ConfigError, FilesConfig};
use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobMatcher};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

pub use encoding::TextEncoding;
pub use error::FileError;
pub use path::PathSanitizer;

/// Extensions accepted by `create`, lower-case with a leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".txt", ".json", ".csv", ".md", ".py", ".js", ".html", ".css", ".xml", ".yml", ".yaml",
    ".log", ".conf", ".cfg", ".ini",
];

/// Immutable file policy, built once from [`FilesConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePolicy {
    pub max_file_size_bytes: u64,
    pub allowed_extensions: BTreeSet<String>,
    pub base_directory: PathBuf,
}

impl FilePolicy {
    pub fn from_config(config: &FilesConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_file_size_bytes: config.max_file_size_bytes()?,
            allowed_extensions: ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            base_directory: config.base_directory.clone(),
        })
    }

    /// Whether the extension of `name` (case-insensitive) is allowed.
    pub fn extension_allowed(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }
}

/// Payload of a successful `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Payload of a successful `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub path: PathBuf,
    pub content: String,
    /// Size on disk, not the size of the returned content.
    pub size: u64,
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the base directory, `/` separated.
    pub name: String,
    pub size: u64,
}

/// Payload of a successful `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
    pub count: usize,
}

/// Payload of a successful `delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedFile {
    pub path: PathBuf,
    pub size_freed: u64,
}

/// Payload of a successful `info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Seconds since the unix epoch.
    pub modified: f64,
    pub modified_iso: String,
    pub mime: Option<String>,
}

/// Exposes file operations confined to [`FilePolicy::base_directory`].
///
/// Operations are not serialised against each other; concurrent writers to
/// the same sanitised name race and the last write wins.
#[derive(Debug, Clone)]
pub struct FileGatekeeper {
    policy: FilePolicy,
    sanitizer: PathSanitizer,
}

impl FileGatekeeper {
    /// Build a gatekeeper, creating the base directory if needed.
    pub fn new(policy: FilePolicy) -> Result<Self, FileError> {
        fs::create_dir_all(&policy.base_directory)?;
        info!(
            "file gatekeeper ready (base_directory={}, max_file_size_bytes={})",
            policy.base_directory.display(),
            policy.max_file_size_bytes
        );
        Ok(Self {
            sanitizer: PathSanitizer::new(policy.base_directory.clone()),
            policy,
        })
    }

    /// Build a gatekeeper from config.
    pub fn from_config(config: &FilesConfig) -> Result<Self, FileError> {
        Self::new(FilePolicy::from_config(config)?)
    }

    pub fn policy(&self) -> &FilePolicy {
        &self.policy
    }

    pub fn sanitizer(&self) -> &PathSanitizer {
        &self.sanitizer
    }

    /// Write `content` to the sanitised path, replacing any existing file.
    pub fn create(
        &self,
        filename: &str,
        content: &str,
        encoding: TextEncoding,
    ) -> Result<CreatedFile, FileError> {
        let name = PathSanitizer::sanitize_name(filename)?;
        if !self.policy.extension_allowed(&name) {
            warn!("file create rejected (reason=extension, name={name})");
            return Err(FileError::ExtensionNotAllowed);
        }
        let bytes = encoding.encode(content)?;
        let size = bytes.len() as u64;
        let limit = self.policy.max_file_size_bytes;
        if size > limit {
            warn!("file create rejected (reason=size, size={size}, limit={limit})");
            return Err(FileError::ContentTooLarge { size, limit });
        }
        let path = self.sanitizer.base().join(&name);
        if path.is_dir() {
            return Err(FileError::NotAFile(name));
        }
        fs::write(&path, &bytes)?;
        info!("file created (name={name}, size={size}, encoding={encoding})");
        Ok(CreatedFile { path, size })
    }

    /// Read a file, optionally only its first `max_lines` lines.
    ///
    /// The on-disk size is checked before any content is read. `max_lines`
    /// of `None` or `0` reads everything.
    pub fn read(
        &self,
        filename: &str,
        encoding: TextEncoding,
        max_lines: Option<usize>,
    ) -> Result<FileContent, FileError> {
        let (path, size) = self.existing_file(filename)?;
        let limit = self.policy.max_file_size_bytes;
        if size > limit {
            warn!("file read rejected (reason=size, size={size}, limit={limit})");
            return Err(FileError::FileTooLarge { size, limit });
        }
        let content = match max_lines.filter(|lines| *lines > 0) {
            Some(max_lines) => read_lines(&path, encoding, max_lines)?,
            None => encoding.decode(&fs::read(&path)?)?,
        };
        debug!(
            "file read (size={size}, chars={}, max_lines={max_lines:?})",
            content.chars().count()
        );
        Ok(FileContent {
            path,
            content,
            size,
        })
    }

    /// Regular files under the base directory matching a glob, sorted by name.
    ///
    /// Patterns containing `/` or `**` match against paths relative to the
    /// base directory and recurse; others only see the top level.
    pub fn list(&self, pattern: Option<&str>) -> Result<FileListing, FileError> {
        let pattern = pattern.map(str::trim).filter(|p| !p.is_empty()).unwrap_or("*");
        if pattern.contains("..") || pattern.starts_with('/') || pattern.starts_with('\\') {
            warn!("file list rejected (reason=pattern)");
            return Err(FileError::InvalidPattern(pattern.to_string()));
        }
        let matcher: GlobMatcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| FileError::InvalidPattern(err.to_string()))?
            .compile_matcher();
        let recursive = pattern.contains('/') || pattern.contains("**");
        let base = self.sanitizer.base();

        let mut walker = WalkDir::new(base).min_depth(1).follow_links(false);
        if !recursive {
            walker = walker.max_depth(1);
        }
        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|err| {
                FileError::Io(
                    err.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(base) else {
                continue;
            };
            if !matcher.is_match(relative) {
                continue;
            }
            files.push(FileEntry {
                name: relative.to_string_lossy().replace('\\', "/"),
                size: entry.metadata().map_err(|err| {
                    FileError::Io(
                        err.into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("metadata failed")),
                    )
                })?.len(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("file list (pattern={pattern}, count={})", files.len());
        Ok(FileListing {
            count: files.len(),
            files,
        })
    }

    /// Remove a file and report the bytes freed.
    pub fn delete(&self, filename: &str) -> Result<DeletedFile, FileError> {
        let (path, size) = self.existing_file(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(FileError::NotFound),
            Err(err) => return Err(err.into()),
        }
        info!("file deleted (size_freed={size})");
        Ok(DeletedFile {
            path,
            size_freed: size,
        })
    }

    /// Name, size, modification time and best-effort MIME type.
    pub fn info(&self, filename: &str) -> Result<FileInfo, FileError> {
        let name = PathSanitizer::sanitize_name(filename)?;
        let (path, size) = self.existing_file(filename)?;
        let modified = fs::metadata(&path)?.modified()?;
        let modified_secs = modified
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();
        let modified_iso = DateTime::<Utc>::from(modified).to_rfc3339();
        let mime = mime_guess::from_path(&name)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Ok(FileInfo {
            name,
            size,
            modified: modified_secs,
            modified_iso,
            mime,
        })
    }

    /// Sanitised path of an existing regular file and its size.
    fn existing_file(&self, filename: &str) -> Result<(PathBuf, u64), FileError> {
        let path = self.sanitizer.resolve(filename)?;
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file not found (path={})", path.display());
                return Err(FileError::NotFound);
            }
            Err(err) => return Err(err.into()),
        };
        if !metadata.is_file() {
            return Err(FileError::NotAFile(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ));
        }
        Ok((path, metadata.len()))
    }
}

/// First `max_lines` lines with terminators stripped, joined by `\n`.
fn read_lines(path: &Path, encoding: TextEncoding, max_lines: usize) -> Result<String, FileError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    while lines.len() < max_lines {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        lines.push(encoding.decode(&buf)?);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::{FileError, FileGatekeeper, FilePolicy, TextEncoding};
    use agentos_rs_config::FilesConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn gatekeeper(max_file_size: &str) -> (FileGatekeeper, TempDir) {
        let dir = tempdir().expect("tempdir");
        let config = FilesConfig {
            max_file_size: max_file_size.to_string(),
            base_directory: dir.path().join("files"),
        };
        let policy = FilePolicy::from_config(&config).expect("policy");
        (FileGatekeeper::new(policy).expect("gatekeeper"), dir)
    }

    #[test]
    fn create_then_read_round_trips() {
        let (files, _dir) = gatekeeper("1KB");
        let created = files
            .create("notes.txt", "hello", TextEncoding::Utf8)
            .expect("create");
        assert_eq!(created.size, 5);
        let read = files
            .read("notes.txt", TextEncoding::Utf8, None)
            .expect("read");
        assert_eq!(read.content, "hello");
        assert_eq!(read.size, 5);
        assert_eq!(read.path, created.path);
    }

    #[test]
    fn create_overwrites_existing_content() {
        let (files, _dir) = gatekeeper("1KB");
        files.create("a.md", "first version", TextEncoding::Utf8).expect("create");
        files.create("a.md", "second", TextEncoding::Utf8).expect("create");
        let read = files.read("a.md", TextEncoding::Utf8, None).expect("read");
        assert_eq!(read.content, "second");
    }

    #[test]
    fn extension_whitelist_is_case_insensitive() {
        let (files, _dir) = gatekeeper("1KB");
        assert!(matches!(
            files.create("notes.exe", "x", TextEncoding::Utf8),
            Err(FileError::ExtensionNotAllowed)
        ));
        assert!(matches!(
            files.create("Makefile", "x", TextEncoding::Utf8),
            Err(FileError::ExtensionNotAllowed)
        ));
        files
            .create("REPORT.JSON", "{}", TextEncoding::Utf8)
            .expect("upper-case extension");
    }

    #[test]
    fn size_boundary_is_inclusive() {
        let (files, _dir) = gatekeeper("10");
        files
            .create("exact.txt", &"a".repeat(10), TextEncoding::Utf8)
            .expect("exactly at limit");
        let err = files
            .create("over.txt", &"a".repeat(11), TextEncoding::Utf8)
            .unwrap_err();
        assert_eq!(err.to_string(), "Content size 11 exceeds max 10");
    }

    #[test]
    fn encoded_size_counts_against_limit() {
        let (files, _dir) = gatekeeper("4");
        assert!(matches!(
            files.create("cafe.txt", "café", TextEncoding::Utf8),
            Err(FileError::ContentTooLarge { size: 5, limit: 4 })
        ));
        files
            .create("cafe.txt", "café", TextEncoding::Latin1)
            .expect("latin-1 fits");
    }

    #[test]
    fn read_checks_disk_size_before_reading() {
        let (files, _dir) = gatekeeper("8");
        fs::write(files.policy().base_directory.join("big.txt"), "0123456789")
            .expect("seed");
        let err = files
            .read("big.txt", TextEncoding::Utf8, Some(1))
            .unwrap_err();
        assert_eq!(err.to_string(), "File too large: 10 bytes exceeds max 8");
    }

    #[test]
    fn read_limits_lines() {
        let (files, _dir) = gatekeeper("1KB");
        fs::write(
            files.policy().base_directory.join("lines.txt"),
            "one\r\ntwo\nthree\nfour\n",
        )
        .expect("seed");
        let read = files
            .read("lines.txt", TextEncoding::Utf8, Some(2))
            .expect("read");
        assert_eq!(read.content, "one\ntwo");
        assert_eq!(read.size, 20);

        let all = files
            .read("lines.txt", TextEncoding::Utf8, Some(0))
            .expect("read");
        assert_eq!(all.content, "one\r\ntwo\nthree\nfour\n");
    }

    #[test]
    fn missing_and_directory_targets() {
        let (files, _dir) = gatekeeper("1KB");
        assert!(matches!(
            files.read("ghost.txt", TextEncoding::Utf8, None),
            Err(FileError::NotFound)
        ));
        fs::create_dir(files.policy().base_directory.join("sub.txt")).expect("dir");
        assert!(matches!(
            files.read("sub.txt", TextEncoding::Utf8, None),
            Err(FileError::NotAFile(_))
        ));
        assert!(matches!(
            files.create("sub.txt", "x", TextEncoding::Utf8),
            Err(FileError::NotAFile(_))
        ));
    }

    #[test]
    fn delete_is_idempotent_error() {
        let (files, _dir) = gatekeeper("1KB");
        files.create("gone.log", "abc", TextEncoding::Utf8).expect("create");
        let deleted = files.delete("gone.log").expect("delete");
        assert_eq!(deleted.size_freed, 3);
        assert!(matches!(files.delete("gone.log"), Err(FileError::NotFound)));
    }

    #[test]
    fn traversal_names_stay_inside_base() {
        let (files, dir) = gatekeeper("1KB");
        let created = files
            .create("../../escape.txt", "x", TextEncoding::Utf8)
            .expect("create");
        assert_eq!(
            created.path,
            files.policy().base_directory.join("__escape.txt")
        );
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn list_filters_sorts_and_recurses_on_request() {
        let (files, _dir) = gatekeeper("1KB");
        let base = files.policy().base_directory.clone();
        fs::write(base.join("b.txt"), "bb").expect("seed");
        fs::write(base.join("a.txt"), "a").expect("seed");
        fs::write(base.join("c.md"), "ccc").expect("seed");
        fs::create_dir(base.join("nested")).expect("dir");
        fs::write(base.join("nested").join("d.txt"), "dddd").expect("seed");

        let top = files.list(None).expect("list");
        let names: Vec<_> = top.files.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.md"]);
        assert_eq!(top.count, 3);

        let txt = files.list(Some("*.txt")).expect("list");
        assert_eq!(txt.count, 2);
        assert_eq!(txt.files[1].size, 2);

        let deep = files.list(Some("**/*.txt")).expect("list");
        let names: Vec<_> = deep.files.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "nested/d.txt"]);

        assert!(matches!(
            files.list(Some("../*")),
            Err(FileError::InvalidPattern(_))
        ));
        assert!(matches!(
            files.list(Some("/etc/*")),
            Err(FileError::InvalidPattern(_))
        ));
    }

    #[test]
    fn info_reports_metadata() {
        let (files, _dir) = gatekeeper("1KB");
        files
            .create("data.json", "{\"a\":1}", TextEncoding::Utf8)
            .expect("create");
        let info = files.info("data.json").expect("info");
        assert_eq!(info.name, "data.json");
        assert_eq!(info.size, 7);
        assert_eq!(info.mime.as_deref(), Some("application/json"));
        assert!(info.modified > 0.0);
        assert!(info.modified_iso.contains('T'));
        assert!(matches!(files.info("nope.txt"), Err(FileError::NotFound)));
    }
}
