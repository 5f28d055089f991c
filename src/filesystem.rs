use std::env::current_dir;
use std::io;
use std::path::{Path, PathBuf};

use normpath::PathExt;

/// Resolve `path` against the current working directory without requiring
/// it to exist on disk (used for `-abs`, spec.md §4.5 "attempt to resolve
/// to absolute; on failure, emit the path as received").
pub fn path_absolute_form(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let path = path.strip_prefix(".").unwrap_or(path);
    current_dir().map(|path_buf| path_buf.join(path))
}

/// Like `path_absolute_form`, but also collapses `.`/`..` components via
/// `normpath` rather than leaving them in place, the same normalization the
/// teacher applies before printing an absolute path.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let path_buf = path_absolute_form(path)?;
    let path_buf = match path_buf.normalize() {
        Ok(normalized) => normalized.into_path_buf(),
        Err(_) => path_buf,
    };

    #[cfg(windows)]
    let path_buf = Path::new(
        path_buf
            .as_path()
            .to_string_lossy()
            .trim_start_matches(r"\\?\"),
    )
    .to_path_buf();

    Ok(path_buf)
}

/// Remove the `./` prefix from a path.
pub fn strip_current_dir(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::strip_current_dir;
    use std::path::Path;

    #[test]
    fn strip_current_dir_basic() {
        assert_eq!(strip_current_dir(Path::new("./foo")), Path::new("foo"));
        assert_eq!(strip_current_dir(Path::new("foo")), Path::new("foo"));
        assert_eq!(
            strip_current_dir(Path::new("./foo/bar/baz")),
            Path::new("foo/bar/baz")
        );
        assert_eq!(
            strip_current_dir(Path::new("foo/bar/baz")),
            Path::new("foo/bar/baz")
        );
    }
}
