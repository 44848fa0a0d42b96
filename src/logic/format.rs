// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Archive format dispatch table.
//!
//! Maps user-facing format names (`zip`, `tar.gz`, ...) and archive file
//! extensions onto [`ArchiveFormat`], and sniffs TAR compression from magic
//! bytes so misnamed tarballs still open.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every archive format the application knows how to dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[default]
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar")]
    Tar,
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "tar.bz2")]
    TarBz2,
    #[serde(rename = "tar.xz")]
    TarXz,
    #[serde(rename = "7z")]
    SevenZ,
    #[serde(rename = "rar")]
    Rar,
}

/// Errors raised while resolving a format name or archive extension.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported compression format: {0}")]
    UnsupportedCompression(String),
    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),
}

/// Compression wrapped around a TAR stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCodec {
    None,
    Gzip,
    Bzip2,
    Xz,
}

/// Suffix table ordered so multi-part extensions win over their tails.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::TarGz),
    (".tgz", ArchiveFormat::TarGz),
    (".tar.bz2", ArchiveFormat::TarBz2),
    (".tbz2", ArchiveFormat::TarBz2),
    (".tbz", ArchiveFormat::TarBz2),
    (".tar.xz", ArchiveFormat::TarXz),
    (".txz", ArchiveFormat::TarXz),
    (".tar", ArchiveFormat::Tar),
    (".zip", ArchiveFormat::Zip),
    (".7z", ArchiveFormat::SevenZ),
    (".rar", ArchiveFormat::Rar),
];

impl ArchiveFormat {
    /// Formats offered in the "Add to Archive" dialog, in menu order.
    pub const COMPRESSIBLE: [ArchiveFormat; 5] = [
        ArchiveFormat::Zip,
        ArchiveFormat::TarGz,
        ArchiveFormat::TarBz2,
        ArchiveFormat::TarXz,
        ArchiveFormat::SevenZ,
    ];

    /// Canonical lowercase format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Rar => "rar",
        }
    }

    /// Upper-case name used in progress messages.
    pub fn label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// File extension (without leading dot) written for this format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Whether archives of this format can be created.
    pub fn can_compress(&self) -> bool {
        Self::COMPRESSIBLE.contains(self)
    }

    /// Detect a format from the file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
            .map(|(_, format)| *format)
    }

    /// Like [`ArchiveFormat::from_path`], but reports the unrecognised extension.
    pub fn detect(path: &Path) -> Result<Self, FormatError> {
        Self::from_path(path).ok_or_else(|| FormatError::UnsupportedArchive(all_suffixes(path)))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar" => Ok(ArchiveFormat::Tar),
            "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            "tar.bz2" | "tbz2" => Ok(ArchiveFormat::TarBz2),
            "tar.xz" | "txz" => Ok(ArchiveFormat::TarXz),
            "7z" => Ok(ArchiveFormat::SevenZ),
            "rar" => Ok(ArchiveFormat::Rar),
            _ => Err(FormatError::UnsupportedCompression(name.to_string())),
        }
    }
}

/// Every suffix of the file name joined together (`.backup.tar.gz`), lowercased.
fn all_suffixes(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let trimmed = name.trim_start_matches('.');
    match trimmed.find('.') {
        Some(pos) => trimmed[pos..].to_string(),
        None => String::new(),
    }
}

/// Remove a recognised archive extension from a file name.
///
/// Returns the name unchanged when no known extension matches.
pub fn strip_archive_extension(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.len() > suffix.len() && lower.ends_with(suffix))
        .map(|(suffix, _)| &file_name[..file_name.len() - suffix.len()])
        .unwrap_or(file_name)
}

/// Force the format's extension onto a path, replacing any recognised archive extension.
pub fn ensure_archive_extension(path: PathBuf, format: ArchiveFormat) -> PathBuf {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return path;
    };
    if ArchiveFormat::from_path(&path) == Some(format) {
        return path;
    }
    let base = strip_archive_extension(&name);
    path.with_file_name(format!("{base}.{}", format.extension()))
}

/// Classify TAR compression from the leading bytes of the stream.
pub fn sniff_tar_codec(header: &[u8]) -> TarCodec {
    match header {
        [0x1F, 0x8B, ..] => TarCodec::Gzip,
        [b'B', b'Z', b'h', ..] => TarCodec::Bzip2,
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => TarCodec::Xz,
        _ => TarCodec::None,
    }
}

/// Read the first bytes of a file and classify its TAR compression.
pub fn sniff_tar_file(path: &Path) -> io::Result<TarCodec> {
    let mut header = Vec::with_capacity(6);
    File::open(path)?.take(6).read_to_end(&mut header)?;
    Ok(sniff_tar_codec(&header))
}
