// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Directory listing model backing the file browser (UI-agnostic).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::logic::ArchiveFormat;

/// What a browser row points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// The synthetic `..` row.
    Parent,
    Folder,
    File,
}

/// One row of the directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Size in bytes; `None` for folders.
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl DirEntry {
    /// Value for the "Type" column: `Folder`, the upper-cased extension, or `File`.
    pub fn type_label(&self) -> String {
        match self.kind {
            EntryKind::Parent | EntryKind::Folder => "Folder".to_string(),
            EntryKind::File => self
                .path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_uppercase())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "File".to_string()),
        }
    }

    /// Modification time formatted as `YYYY-MM-DD HH:MM` in local time.
    pub fn modified_label(&self) -> String {
        self.modified
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }

    /// Whether double-clicking this row should offer extraction.
    pub fn is_archive(&self) -> bool {
        self.kind == EntryKind::File && ArchiveFormat::from_path(&self.path).is_some()
    }
}

/// List `dir`: a `..` row when a parent exists, then folders, then files,
/// each group sorted case-insensitively. Entries whose metadata cannot be
/// read are skipped.
pub fn read_directory(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut items = Vec::new();
    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        // Follows symlinks so linked folders stay navigable.
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        let is_dir = meta.is_dir();
        items.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            kind: if is_dir {
                EntryKind::Folder
            } else {
                EntryKind::File
            },
            size: (!is_dir).then(|| meta.len()),
            modified: meta.modified().ok(),
        });
    }

    items.sort_by_cached_key(|e| (e.kind != EntryKind::Folder, e.name.to_lowercase()));

    if let Some(parent) = dir.parent() {
        items.insert(
            0,
            DirEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                kind: EntryKind::Parent,
                size: None,
                modified: None,
            },
        );
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn folders_first_then_files_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("beta")).unwrap();
        fs::create_dir(tmp.path().join("Alpha")).unwrap();
        fs::write(tmp.path().join("b.txt"), b"1").unwrap();
        fs::write(tmp.path().join("A.zip"), b"22").unwrap();

        let entries = read_directory(tmp.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["..", "Alpha", "beta", "A.zip", "b.txt"]);
        assert_eq!(entries[0].kind, EntryKind::Parent);
        assert_eq!(entries[3].size, Some(2));
        assert!(entries[1].size.is_none());
    }

    #[test]
    fn type_labels_follow_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("backup.tar.gz"), b"").unwrap();
        fs::write(tmp.path().join("Makefile"), b"").unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();

        let entries = read_directory(tmp.path()).unwrap();
        let label = |name: &str| {
            entries
                .iter()
                .find(|e| e.name == name)
                .map(DirEntry::type_label)
                .unwrap()
        };

        assert_eq!(label("backup.tar.gz"), "GZ");
        assert_eq!(label("Makefile"), "File");
        assert_eq!(label("docs"), "Folder");
    }

    #[test]
    fn archives_are_flagged() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("photos.7z"), b"").unwrap();
        fs::write(tmp.path().join("notes.md"), b"").unwrap();

        let entries = read_directory(tmp.path()).unwrap();

        assert!(entries.iter().find(|e| e.name == "photos.7z").unwrap().is_archive());
        assert!(!entries.iter().find(|e| e.name == "notes.md").unwrap().is_archive());
        assert!(!entries[0].is_archive());
    }

    #[test]
    fn missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(read_directory(&tmp.path().join("missing")).is_err());
    }
}
