// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Archive extraction dispatched by file extension.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

use crate::logic::format::{ArchiveFormat, TarCodec, sniff_tar_file, strip_archive_extension};
use crate::logic::report::{ExtractReport, Stats};

/// Directory an archive unpacks into when the user did not pick one:
/// a sibling named after the archive without its extension.
pub fn default_output_dir(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_archive_extension(&name);
    let stem = if stem.is_empty() || stem == name {
        "extracted"
    } else {
        stem
    };
    archive.parent().unwrap_or_else(|| Path::new(".")).join(stem)
}

/// Extract `archive` into `output_dir`, or into [`default_output_dir`] when `None`.
///
/// The output directory is created with all parents. Every archive member
/// (directories included) is counted and announced as `Extracting: <name>`.
/// Members whose paths would escape the output directory are skipped.
pub fn extract(
    archive: &Path,
    output_dir: Option<&Path>,
    progress: &mut dyn FnMut(String),
) -> Result<ExtractReport> {
    let mut stats = Stats::default();

    if !archive.exists() {
        bail!("Archive not found: {}", archive.display());
    }
    let format = ArchiveFormat::detect(archive)?;

    let output = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(archive));
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {:?}", output))?;

    tracing::info!(
        archive = %archive.display(),
        output = %output.display(),
        %format,
        "starting extraction"
    );
    progress("Starting extraction...".to_string());

    match format {
        ArchiveFormat::Zip => extract_zip(archive, &output, &mut stats, progress)?,
        ArchiveFormat::Rar => extract_rar(archive, &output, &mut stats, progress)?,
        ArchiveFormat::SevenZ => extract_7z(archive, &output, &mut stats, progress)?,
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz => {
            extract_tar(archive, &output, &mut stats, progress)?
        }
    }

    let output_path = std::path::absolute(&output).unwrap_or(output);
    tracing::info!(files = stats.files, output = %output_path.display(), "extraction finished");
    Ok(ExtractReport {
        files: stats.files,
        output_path,
    })
}

/// Open a TAR archive, picking the decompressor from the file's magic bytes.
pub(crate) fn open_tar(archive: &Path) -> Result<tar::Archive<Box<dyn Read>>> {
    let codec = sniff_tar_file(archive)
        .with_context(|| format!("Failed to read archive header {:?}", archive))?;
    tracing::debug!(?codec, archive = %archive.display(), "detected tar compression");

    let file =
        File::open(archive).with_context(|| format!("Failed to open archive {:?}", archive))?;
    let reader = BufReader::new(file);
    let reader: Box<dyn Read> = match codec {
        TarCodec::None => Box::new(reader),
        TarCodec::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        TarCodec::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
        TarCodec::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
    };
    Ok(tar::Archive::new(reader))
}

/// Turn an archive member name into a relative path, rejecting anything
/// absolute or containing `..`.
pub(crate) fn enclosed_path(name: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for part in name.split(['/', '\\']) {
        let part_path = Path::new(part);
        match part_path.components().next() {
            None => {}
            Some(Component::Normal(_)) => out.push(part),
            Some(Component::CurDir) => {}
            Some(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn extract_zip(
    archive: &Path,
    output: &Path,
    stats: &mut Stats,
    progress: &mut dyn FnMut(String),
) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("Failed to open archive {:?}", archive))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to read ZIP archive {:?}", archive))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .with_context(|| format!("Failed to read entry {index} of {:?}", archive))?;
        let name = entry.name().to_string();
        progress(format!("Extracting: {name}"));
        stats.record(entry.size());

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(%name, "skipping zip entry outside output directory");
            continue;
        };
        let target = output.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let mode = entry.unix_mode();
        let mut out =
            File::create(&target).with_context(|| format!("Failed to write {:?}", target))?;
        io::copy(&mut entry, &mut out).with_context(|| format!("Failed to extract {name}"))?;

        #[cfg(unix)]
        if let Some(mode) = mode {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))
                .with_context(|| format!("Failed to set permissions on {:?}", target))?;
        }
        #[cfg(not(unix))]
        let _ = mode;
    }
    Ok(())
}

fn extract_tar(
    archive: &Path,
    output: &Path,
    stats: &mut Stats,
    progress: &mut dyn FnMut(String),
) -> Result<()> {
    let mut tar = open_tar(archive)?;
    let entries = tar
        .entries()
        .with_context(|| format!("Failed to read TAR archive {:?}", archive))?;

    for entry in entries {
        let mut entry = entry.with_context(|| format!("Failed to read TAR archive {:?}", archive))?;
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<invalid path>".to_string());
        progress(format!("Extracting: {name}"));
        stats.record(entry.size());

        let unpacked = entry
            .unpack_in(output)
            .with_context(|| format!("Failed to extract {name}"))?;
        if !unpacked {
            tracing::warn!(%name, "skipping tar entry outside output directory");
        }
    }
    Ok(())
}

fn extract_7z(
    archive: &Path,
    output: &Path,
    stats: &mut Stats,
    progress: &mut dyn FnMut(String),
) -> Result<()> {
    let mut reader = sevenz_rust::SevenZReader::open(archive, sevenz_rust::Password::empty())
        .map_err(|e| anyhow!("Failed to read 7z archive {:?}: {e}", archive))?;

    let mut failure: Option<anyhow::Error> = None;
    reader
        .for_each_entries(|entry, data| {
            progress(format!("Extracting: {}", entry.name));
            stats.record(entry.size);
            match write_7z_entry(&entry.name, entry.is_directory, data, output) {
                Ok(()) => Ok(true),
                Err(err) => {
                    failure = Some(err);
                    Ok(false)
                }
            }
        })
        .map_err(|e| anyhow!("Failed to extract 7z archive {:?}: {e}", archive))?;

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn write_7z_entry(name: &str, is_dir: bool, data: &mut dyn Read, output: &Path) -> Result<()> {
    let Some(relative) = enclosed_path(name) else {
        tracing::warn!(%name, "skipping 7z entry outside output directory");
        io::copy(data, &mut io::sink())?;
        return Ok(());
    };
    let target = output.join(relative);

    if is_dir {
        fs::create_dir_all(&target)
            .with_context(|| format!("Failed to create directory {:?}", target))?;
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let mut out = File::create(&target).with_context(|| format!("Failed to write {:?}", target))?;
    io::copy(data, &mut out).with_context(|| format!("Failed to extract {name}"))?;
    Ok(())
}

fn extract_rar(
    archive: &Path,
    output: &Path,
    stats: &mut Stats,
    progress: &mut dyn FnMut(String),
) -> Result<()> {
    let mut open = unrar::Archive::new(archive)
        .open_for_processing()
        .map_err(|e| anyhow!("Failed to read RAR archive {:?}: {e}", archive))?;

    while let Some(header) = open
        .read_header()
        .map_err(|e| anyhow!("Failed to read RAR archive {:?}: {e}", archive))?
    {
        let (name, is_file, size) = {
            let entry = header.entry();
            (
                entry.filename.to_string_lossy().into_owned(),
                entry.is_file(),
                entry.unpacked_size,
            )
        };
        progress(format!("Extracting: {name}"));
        stats.record(size);

        let relative = enclosed_path(&name);
        open = match relative {
            Some(_) if is_file => header.extract_with_base(output),
            Some(relative) => {
                let dir = output.join(relative);
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory {:?}", dir))?;
                header.skip()
            }
            None => {
                tracing::warn!(%name, "skipping rar entry outside output directory");
                header.skip()
            }
        }
        .map_err(|e| anyhow!("Failed to extract {name}: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn default_output_dir_strips_archive_extension() {
        assert_eq!(
            default_output_dir(Path::new("/data/photos.tar.gz")),
            PathBuf::from("/data/photos")
        );
        assert_eq!(
            default_output_dir(Path::new("/data/Backup.ZIP")),
            PathBuf::from("/data/Backup")
        );
        assert_eq!(
            default_output_dir(Path::new("/data/unknown.bin")),
            PathBuf::from("/data/extracted")
        );
    }

    #[test]
    fn enclosed_path_rejects_traversal() {
        assert_eq!(enclosed_path("a/b.txt"), Some(PathBuf::from("a").join("b.txt")));
        assert_eq!(enclosed_path("./a\\b.txt"), Some(PathBuf::from("a").join("b.txt")));
        assert_eq!(enclosed_path("../etc/passwd"), None);
        assert_eq!(enclosed_path("/abs"), Some(PathBuf::from("abs")));
        assert_eq!(enclosed_path(""), None);
    }

    #[test]
    fn zip_extracts_into_default_directory_and_counts_members() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("bundle.zip");
        write_zip(
            &archive,
            &[("bundle/", b""), ("bundle/a.txt", b"alpha"), ("bundle/b.txt", b"beta")],
        );

        let mut messages = Vec::new();
        let report = extract(&archive, None, &mut |m| messages.push(m)).unwrap();

        assert_eq!(report.files, 3);
        assert!(report.output_path.is_absolute());
        assert!(report.output_path.ends_with("bundle"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("bundle/bundle/a.txt")).unwrap(),
            "alpha"
        );
        assert_eq!(messages[0], "Starting extraction...");
        assert!(messages.contains(&"Extracting: bundle/b.txt".to_string()));
    }

    #[test]
    fn zip_slip_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"x"), ("ok.txt", b"y")]);
        let out = tmp.path().join("out");

        let report = extract(&archive, Some(&out), &mut |_| {}).unwrap();

        assert_eq!(report.files, 2);
        assert!(out.join("ok.txt").exists());
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn misnamed_gzip_tarball_is_sniffed() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("logs.tar");
        let encoder = flate2::write::GzEncoder::new(
            File::create(&archive).unwrap(),
            flate2::Compression::fast(),
        );
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "logs/app.log", &b"hello"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let out = tmp.path().join("out");
        let report = extract(&archive, Some(&out), &mut |_| {}).unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(fs::read_to_string(out.join("logs/app.log")).unwrap(), "hello");
    }

    #[test]
    fn missing_archive_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = extract(&tmp.path().join("nope.zip"), None, &mut |_| {}).unwrap_err();
        assert!(err.to_string().starts_with("Archive not found:"));
    }

    #[test]
    fn unknown_extension_is_rejected_without_creating_output() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("data.gz");
        fs::write(&archive, b"\x1f\x8b").unwrap();

        let err = extract(&archive, None, &mut |_| {}).unwrap_err();

        assert_eq!(err.to_string(), "Unsupported archive format: .gz");
        assert!(!tmp.path().join("extracted").exists());
    }

    #[test]
    fn corrupt_zip_surfaces_library_error() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract(&archive, Some(&tmp.path().join("out")), &mut |_| {}).unwrap_err();

        assert!(err.to_string().contains("Failed to read ZIP archive"));
    }
}
