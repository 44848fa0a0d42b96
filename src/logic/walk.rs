// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Enumerate the files that go into a new archive.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

/// A file on disk together with the name it receives inside the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `/`-separated path relative to the source's parent directory.
    pub archive_name: String,
    pub size: u64,
}

/// Collect the files under `source`.
///
/// A single file yields one entry named after the file. A directory is walked
/// recursively (sorted by name) and every regular file is kept with a name
/// relative to the directory's parent, so the directory itself becomes the
/// archive's top-level folder. Empty directories are not recorded.
///
/// `exclude` is skipped when found in the tree; pass the output archive so
/// writing into the source directory does not archive itself.
pub fn collect_sources(source: &Path, exclude: Option<&Path>) -> Result<Vec<SourceFile>> {
    if !source.exists() {
        bail!("Source path not found: {}", source.display());
    }

    if source.is_file() {
        let size = fs::metadata(source)
            .with_context(|| format!("Failed to read metadata for {:?}", source))?
            .len();
        let archive_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        return Ok(vec![SourceFile {
            path: source.to_path_buf(),
            archive_name,
            size,
        }]);
    }

    let base = source.parent().unwrap_or(source);
    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", source))?;
        let path = entry.path();
        // Follows symlinks so linked files are archived by content.
        if !path.is_file() {
            continue;
        }
        if let Some(excluded) = &excluded
            && fs::canonicalize(path).ok().as_ref() == Some(excluded)
        {
            tracing::debug!(path = %path.display(), "skipping output archive inside source");
            continue;
        }

        let relative = path.strip_prefix(base).unwrap_or(path);
        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for {:?}", path))?
            .len();
        files.push(SourceFile {
            path: path.to_path_buf(),
            archive_name: to_archive_name(relative),
            size,
        });
    }

    Ok(files)
}

/// Join normal path components with `/` regardless of platform.
fn to_archive_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn single_file_uses_its_name() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("report.txt");
        fs::write(&file, b"hello").unwrap();

        let files = collect_sources(&file, None).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].archive_name, "report.txt");
        assert_eq!(files[0].size, 5);
    }

    #[test]
    fn directory_names_are_relative_to_parent_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("b.txt"), b"bb").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("src/nested/main.rs"), b"fn main() {}").unwrap();

        let files = collect_sources(&root, None).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.archive_name.as_str()).collect();

        assert_eq!(
            names,
            vec!["project/a.txt", "project/b.txt", "project/src/nested/main.rs"]
        );
        assert_eq!(files.iter().map(|f| f.size).sum::<u64>(), 15);
    }

    #[test]
    fn excluded_output_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("keep.txt"), b"x").unwrap();
        let output = root.join("data.zip");
        fs::write(&output, b"partial").unwrap();

        let files = collect_sources(&root, Some(&output)).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].archive_name, "data/keep.txt");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_archived_by_content() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside.txt");
        fs::write(&outside, b"linked body").unwrap();
        let root = tmp.path().join("data");
        fs::create_dir_all(&root).unwrap();
        symlink(&outside, root.join("link.txt")).unwrap();
        symlink(tmp.path().join("gone.txt"), root.join("dangling.txt")).unwrap();

        let files = collect_sources(&root, None).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].archive_name, "data/link.txt");
        assert_eq!(files[0].size, 11);
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let err = collect_sources(&missing, None).unwrap_err();

        assert!(err.to_string().starts_with("Source path not found:"));
    }
}
