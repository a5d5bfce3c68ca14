//! Image discovery.
//!
//! Walks the input folder recursively and returns every file whose
//! extension is in the configured list, in a stable order (sorted by path
//! relative to the root) so two runs over the same folder ask questions in
//! the same sequence.
//!
//! Skipped:
//! - directories and anything that is not a regular file
//! - AppleDouble resource forks (`._IMG_0001.JPG`) that macOS leaves on
//!   non-HFS volumes; they carry the image extension but no image
//!
//! Symlinks are not followed.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input folder does not exist or is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// An image file found under the input folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Path relative to the scanned root, with `/` separators.
    pub relative: String,
    /// Bare filename, the key used by the elicited-data store.
    pub filename: String,
}

/// Find all images under `root` with one of `extensions` (lower-case, no dot).
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<Candidate>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        if filename.starts_with("._") || !has_extension(entry.path(), extensions) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        candidates.push(Candidate {
            path: entry.path().to_path_buf(),
            relative,
            filename,
        });
    }

    candidates.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(candidates)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|x| *x == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        ["jpg", "jpeg", "nef"].into_iter().map(String::from).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn relatives(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.relative.as_str()).collect()
    }

    #[test]
    fn finds_images_recursively_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.jpg");
        touch(tmp.path(), "trip/day2/c.NEF");
        touch(tmp.path(), "a.jpeg");
        touch(tmp.path(), "trip/a.JPG");

        let found = scan(tmp.path(), &exts()).unwrap();
        assert_eq!(relatives(&found), vec!["a.jpeg", "b.jpg", "trip/a.JPG", "trip/day2/c.NEF"]);
    }

    #[test]
    fn filename_is_bare_name() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "trip/IMG_0001.JPG");
        let found = scan(tmp.path(), &exts()).unwrap();
        assert_eq!(found[0].filename, "IMG_0001.JPG");
        assert_eq!(found[0].path, tmp.path().join("trip").join("IMG_0001.JPG"));
    }

    #[test]
    fn skips_other_extensions_and_resource_forks() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        touch(tmp.path(), "._photo.jpg");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "noext");
        touch(tmp.path(), "movie.mp4");

        let found = scan(tmp.path(), &exts()).unwrap();
        assert_eq!(relatives(&found), vec!["photo.jpg"]);
    }

    #[test]
    fn directory_with_image_extension_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("folder.jpg")).unwrap();
        assert!(scan(tmp.path(), &exts()).unwrap().is_empty());
    }

    #[test]
    fn empty_folder_finds_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(tmp.path(), &exts()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&tmp.path().join("nope"), &exts());
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }
}
