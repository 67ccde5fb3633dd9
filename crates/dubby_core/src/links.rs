//! Symlink primitives shared by the projections and the notes linker.
//!
//! # Invariants
//! - Nothing here follows a link when deciding whether to remove it.
//! - Removal only ever touches symlinks, never real files or directories.

use std::io;
use std::path::Path;

/// Creates `link` pointing at `target`.
pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Removes `link` if it is a symlink. Returns whether anything was removed.
pub fn remove_symlink(link: &Path) -> io::Result<bool> {
    if !link.is_symlink() {
        return Ok(false);
    }
    std::fs::remove_file(link)?;
    Ok(true)
}

/// Whether `link` is a symlink whose stored target equals `target`.
pub fn points_to(link: &Path, target: &Path) -> bool {
    link.is_symlink()
        && std::fs::read_link(link)
            .map(|current| current == target)
            .unwrap_or(false)
}

/// Whether `link` is a symlink whose target no longer resolves to a file.
pub fn is_dangling_file_link(link: &Path) -> bool {
    link.is_symlink() && !link.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::{is_dangling_file_link, points_to, remove_symlink, symlink};

    #[test]
    fn remove_symlink_leaves_regular_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("real.md");
        std::fs::write(&file, "x").unwrap();

        assert!(!remove_symlink(&file).unwrap());
        assert!(file.is_file());

        let link = dir.path().join("link.md");
        symlink(&file, &link).unwrap();
        assert!(points_to(&link, &file));
        assert!(!is_dangling_file_link(&link));

        std::fs::remove_file(&file).unwrap();
        assert!(is_dangling_file_link(&link));
        assert!(remove_symlink(&link).unwrap());
        assert!(!link.is_symlink());
    }
}
