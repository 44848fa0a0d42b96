// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges
//! Phosphor icon mapping for file browser rows.
//!
//! UI-agnostic: it only looks at the path, so logic code and tests can call
//! it without an egui context. Archives are matched by extension first so
//! compound names such as `*.tar.bz2` get the archive icon rather than a
//! generic binary one.

use std::path::Path;

use crate::logic::ArchiveFormat;

/// Return a Phosphor icon for a browser entry.
pub fn icon_for(path: &Path, is_dir: bool) -> &'static str {
    if is_dir {
        return egui_phosphor::regular::FOLDER;
    }
    if ArchiveFormat::from_path(path).is_some() {
        return egui_phosphor::regular::FILE_ZIP;
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    if matches!(ext.as_str(), "gz" | "bz2" | "xz" | "zst" | "lz4") {
        return egui_phosphor::regular::FILE_ARCHIVE;
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("image", _) => egui_phosphor::regular::FILE_IMAGE,
        ("video", _) => egui_phosphor::regular::FILE_VIDEO,
        ("audio", _) => egui_phosphor::regular::FILE_AUDIO,
        ("application", "pdf") => egui_phosphor::regular::FILE_PDF,
        ("text", "csv") => egui_phosphor::regular::FILE_CSV,
        ("text", "html") => egui_phosphor::regular::FILE_HTML,
        ("text", "markdown") => egui_phosphor::regular::FILE_MD,
        ("application", "json") | ("application", "xml") | ("text", "xml") => {
            egui_phosphor::regular::FILE_CODE
        }
        ("text", _) => egui_phosphor::regular::FILE_TXT,
        _ => match ext.as_str() {
            "rs" => egui_phosphor::regular::FILE_RS,
            "py" => egui_phosphor::regular::FILE_PY,
            "md" => egui_phosphor::regular::FILE_MD,
            "c" | "h" => egui_phosphor::regular::FILE_C,
            "cpp" | "cc" | "cxx" => egui_phosphor::regular::FILE_CPP,
            _ => egui_phosphor::regular::FILE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::icon_for;
    use std::path::Path;

    #[test]
    fn folders_and_archives_get_dedicated_icons() {
        assert_eq!(
            icon_for(Path::new("src"), true),
            egui_phosphor::regular::FOLDER
        );
        assert_eq!(
            icon_for(Path::new("dist.tar.bz2"), false),
            egui_phosphor::regular::FILE_ZIP
        );
        assert_eq!(
            icon_for(Path::new("dump.gz"), false),
            egui_phosphor::regular::FILE_ARCHIVE
        );
    }

    #[test]
    fn falls_back_to_mime_and_extension() {
        assert_eq!(
            icon_for(Path::new("photo.JPG"), false),
            egui_phosphor::regular::FILE_IMAGE
        );
        assert_eq!(
            icon_for(Path::new("notes.txt"), false),
            egui_phosphor::regular::FILE_TXT
        );
        assert_eq!(
            icon_for(Path::new("blob.unknownext"), false),
            egui_phosphor::regular::FILE
        );
    }
}
