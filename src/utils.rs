//! Common path helpers shared across the codebase.
//!
//! Locale paths travel between the host (which speaks forward-slash strings)
//! and the file system (which speaks `Path`). These helpers keep both sides
//! comparable.

use std::path::{Component, Path, PathBuf};

/// Render a path with forward slashes, the form the host uses for file names.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Join `file` onto `context` unless it is already absolute, then fold `.`
/// and `..` segments lexically.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use locale_keys::utils::join_normalized;
///
/// assert_eq!(
///     join_normalized(Path::new("/proj/locales"), "../shared/./a.yml"),
///     PathBuf::from("/proj/shared/a.yml")
/// );
/// assert_eq!(
///     join_normalized(Path::new("/proj"), "/abs/b.yml"),
///     PathBuf::from("/abs/b.yml")
/// );
/// ```
pub fn join_normalized(context: &Path, file: impl AsRef<Path>) -> PathBuf {
    let file = file.as_ref();
    if file.is_absolute() {
        normalize(file)
    } else {
        normalize(&context.join(file))
    }
}

/// Fold `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                let after_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if after_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// File name without its last extension (`messages.en.yml` -> `messages.en`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` relative to `base` when it lives under it, forward-slashed.
pub fn relative_to(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => to_slash(rel),
        Err(_) => to_slash(path),
    }
}
