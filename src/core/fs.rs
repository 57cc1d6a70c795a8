//! File-system capability and the `LocaleFile` probe.
//!
//! Every lookup the resolver performs goes through [`FileSystem`] so the
//! plugin can layer the editor's unsaved buffers over the disk, and tests can
//! work against a temporary directory.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

/// What a stat call found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

/// Synchronous, idempotent file-system access.
pub trait FileSystem: Send + Sync {
    /// Stat `path` without following a final symlink. `None` if nothing is there.
    fn stat(&self, path: &Path) -> Option<FileKind>;

    /// Resolve every symlink in `path`.
    fn real_path(&self, path: &Path) -> Option<PathBuf>;

    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn stat(&self, path: &Path) -> Option<FileKind> {
        let meta = fs::symlink_metadata(path).ok()?;
        let kind = if meta.file_type().is_symlink() {
            FileKind::Symlink
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        };
        Some(kind)
    }

    fn real_path(&self, path: &Path) -> Option<PathBuf> {
        fs::canonicalize(path).ok()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }
}

/// One probe of a locale path.
///
/// Created by [`LocaleFile::probe`] and never mutated afterwards. A failed
/// resolution is a `LocaleFile` with `exists == false`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    /// Path of the file (the symlink target when the probe hit a symlink).
    pub path: PathBuf,
    /// Directory that relative include directives resolve against.
    pub directory: PathBuf,
    /// File content; empty for directories and missing files.
    pub raw_text: String,
    pub exists: bool,
    pub is_directory: bool,
}

impl LocaleFile {
    /// Stat `path` and read it when it is a regular file.
    ///
    /// Symlinks are resolved by probing their target; the symlink itself is
    /// discarded.
    pub fn probe(fs: &dyn FileSystem, path: &Path) -> Self {
        match fs.stat(path) {
            None => Self::missing(path),
            Some(FileKind::Symlink) => match fs.real_path(path) {
                Some(real) if real != path && fs.stat(&real) != Some(FileKind::Symlink) => {
                    Self::probe(fs, &real)
                }
                _ => Self::missing(path),
            },
            Some(FileKind::Directory) => Self {
                is_directory: true,
                exists: true,
                ..Self::missing(path)
            },
            Some(FileKind::File) => match fs.read_to_string(path) {
                Ok(raw_text) => Self {
                    raw_text,
                    exists: true,
                    ..Self::missing(path)
                },
                Err(err) => {
                    debug!(file = %path.display(), "unreadable locale file: {err:#}");
                    Self::missing(path)
                }
            },
        }
    }

    /// A file whose text is supplied by the caller (an editor buffer).
    pub fn with_text(path: impl Into<PathBuf>, raw_text: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            raw_text: raw_text.into(),
            exists: true,
            ..Self::missing(&path)
        }
    }

    pub fn missing(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            raw_text: String::new(),
            exists: false,
            is_directory: false,
        }
    }

    /// True for an existing regular file.
    pub fn is_file(&self) -> bool {
        self.exists && !self.is_directory
    }
}

/// Probe `candidate`, falling back to `index.<ext>` inside a directory or
/// `<candidate><ext>` for a missing file, for each extension in order.
///
/// Returns the first existing regular file, else the original probe.
pub fn resolve_file(fs: &dyn FileSystem, candidate: &Path, extensions: &[String]) -> LocaleFile {
    let file = LocaleFile::probe(fs, candidate);

    if file.is_directory {
        for ext in extensions {
            let index = LocaleFile::probe(fs, &file.path.join(format!("index{}", ext)));
            if index.is_file() {
                return index;
            }
        }
    } else if !file.exists {
        let current_ext = file
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()));
        for ext in extensions {
            if current_ext.as_deref() == Some(ext.as_str()) {
                continue;
            }
            let with_ext = LocaleFile::probe(fs, &append_extension(&file.path, ext));
            if with_ext.is_file() {
                return with_ext;
            }
        }
    }

    file
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(ext);
    PathBuf::from(name)
}
