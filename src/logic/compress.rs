// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Archive creation: walk the source and hand each file to the chosen codec.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Local, Timelike};
use zip::{CompressionMethod, write::FileOptions};

use crate::logic::format::{ArchiveFormat, FormatError};
use crate::logic::report::{CompressReport, Stats};
use crate::logic::walk::{SourceFile, collect_sources};

/// Compress `source` (a file or directory) into `output` using `format`.
///
/// Emits one progress message when starting and one per archived file:
/// `Added: <name>` for a single-file source, `Adding: <name>` while walking a
/// directory. Missing parent directories of `output` are created.
///
/// # Errors
///
/// Fails when the source is missing, the format cannot be written
/// (`tar`, `rar`), or the underlying codec reports an I/O error.
///
/// # Examples
///
/// ```text
/// let report = compress(
///     Path::new("photos"),
///     Path::new("photos.tar.xz"),
///     ArchiveFormat::TarXz,
///     &mut |msg| println!("{msg}"),
/// )?;
/// println!("{}", report.summary());
/// ```
pub fn compress(
    source: &Path,
    output: &Path,
    format: ArchiveFormat,
    progress: &mut dyn FnMut(String),
) -> Result<CompressReport> {
    let mut stats = Stats::default();

    if !source.exists() {
        bail!("Source path not found: {}", source.display());
    }
    if !format.can_compress() {
        return Err(FormatError::UnsupportedCompression(format.to_string()).into());
    }

    tracing::info!(
        source = %source.display(),
        output = %output.display(),
        %format,
        "starting compression"
    );
    progress(format!("Starting compression to {}...", format.label()));

    let files = collect_sources(source, Some(output))?;
    let single = source.is_file();

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let mut on_added = |file: &SourceFile| {
        stats.record(file.size);
        tracing::debug!(name = %file.archive_name, size = file.size, "archived file");
        let verb = if single { "Added" } else { "Adding" };
        progress(format!("{verb}: {}", file.archive_name));
    };

    match format {
        ArchiveFormat::Zip => write_zip(output, &files, &mut on_added)?,
        ArchiveFormat::TarGz => {
            let encoder = flate2::write::GzEncoder::new(
                create_output(output)?,
                flate2::Compression::default(),
            );
            let mut out = write_tar(encoder, &files, &mut on_added)?
                .finish()
                .context("Failed to finish gzip stream")?;
            out.flush()?;
        }
        ArchiveFormat::TarBz2 => {
            let encoder =
                bzip2::write::BzEncoder::new(create_output(output)?, bzip2::Compression::default());
            let mut out = write_tar(encoder, &files, &mut on_added)?
                .finish()
                .context("Failed to finish bzip2 stream")?;
            out.flush()?;
        }
        ArchiveFormat::TarXz => {
            let encoder = xz2::write::XzEncoder::new(create_output(output)?, 6);
            let mut out = write_tar(encoder, &files, &mut on_added)?
                .finish()
                .context("Failed to finish xz stream")?;
            out.flush()?;
        }
        ArchiveFormat::SevenZ => write_7z(output, &files, &mut on_added)?,
        ArchiveFormat::Tar | ArchiveFormat::Rar => {
            return Err(FormatError::UnsupportedCompression(format.to_string()).into());
        }
    }

    let compressed_size = fs::metadata(output)
        .with_context(|| format!("Failed to read archive size {:?}", output))?
        .len();

    let report = CompressReport {
        files: stats.files,
        original_size: stats.size,
        compressed_size,
        output: output.to_path_buf(),
    };
    tracing::info!(
        files = report.files,
        original = report.original_size,
        compressed = report.compressed_size,
        "compression finished"
    );
    Ok(report)
}

fn create_output(output: &Path) -> Result<BufWriter<File>> {
    let file = File::create(output)
        .with_context(|| format!("Failed to write archive file {:?}", output))?;
    Ok(BufWriter::new(file))
}

fn write_zip(
    output: &Path,
    files: &[SourceFile],
    on_added: &mut dyn FnMut(&SourceFile),
) -> Result<()> {
    let mut zip = zip::ZipWriter::new(create_output(output)?);

    for file in files {
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(file.size >= u64::from(u32::MAX));
        let options = match zip_timestamp(&file.path) {
            Some(stamp) => options.last_modified_time(stamp),
            None => options,
        };
        #[cfg(unix)]
        let options = {
            use std::os::unix::fs::PermissionsExt;
            match fs::metadata(&file.path) {
                Ok(meta) => options.unix_permissions(meta.permissions().mode() & 0o777),
                Err(_) => options,
            }
        };

        zip.start_file(file.archive_name.as_str(), options)
            .with_context(|| format!("Failed to add file {} to archive", file.archive_name))?;
        let mut reader = File::open(&file.path)
            .with_context(|| format!("Failed to read {:?}", file.path))?;
        io::copy(&mut reader, &mut zip)
            .with_context(|| format!("Failed to compress {:?}", file.path))?;
        on_added(file);
    }

    let mut out = zip.finish().context("Failed to finalize ZIP archive")?;
    out.flush()?;
    Ok(())
}

/// Local modification time of `path` as a ZIP timestamp. `None` when the
/// time is unreadable or outside the DOS range (1980-2107).
fn zip_timestamp(path: &Path) -> Option<zip::DateTime> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let local = chrono::DateTime::<Local>::from(modified);
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

/// Append every file to a TAR stream and hand back the wrapped writer so the
/// caller can finish its compression layer.
fn write_tar<W: Write>(
    writer: W,
    files: &[SourceFile],
    on_added: &mut dyn FnMut(&SourceFile),
) -> Result<W> {
    let mut builder = tar::Builder::new(writer);
    for file in files {
        builder
            .append_path_with_name(&file.path, &file.archive_name)
            .with_context(|| format!("Failed to add file {} to archive", file.archive_name))?;
        on_added(file);
    }
    builder.into_inner().context("Failed to finalize TAR stream")
}

fn write_7z(
    output: &Path,
    files: &[SourceFile],
    on_added: &mut dyn FnMut(&SourceFile),
) -> Result<()> {
    let mut writer = sevenz_rust::SevenZWriter::create(output)
        .map_err(|e| anyhow!("Failed to write archive file {:?}: {e}", output))?;

    for file in files {
        let entry = sevenz_rust::SevenZArchiveEntry::from_path(&file.path, file.archive_name.clone());
        let reader = File::open(&file.path)
            .with_context(|| format!("Failed to read {:?}", file.path))?;
        writer
            .push_archive_entry(entry, Some(reader))
            .map_err(|e| anyhow!("Failed to add file {} to archive: {e}", file.archive_name))?;
        on_added(file);
    }

    writer
        .finish()
        .map_err(|e| anyhow!("Failed to finalize 7z archive: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::extract::extract;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) -> std::path::PathBuf {
        let dir = root.join("docs");
        fs::create_dir_all(dir.join("img")).unwrap();
        fs::write(dir.join("readme.md"), "# Title\n".repeat(64)).unwrap();
        fs::write(dir.join("img/logo.svg"), "<svg/>").unwrap();
        dir
    }

    fn roundtrip(format: ArchiveFormat) {
        let tmp = TempDir::new().unwrap();
        let source = sample_tree(tmp.path());
        let output = tmp.path().join(format!("out/docs.{}", format.extension()));

        let mut messages = Vec::new();
        let report = compress(&source, &output, format, &mut |m| messages.push(m)).unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.original_size, 8 * 64 + 6);
        assert!(output.exists());
        assert_eq!(
            messages[0],
            format!("Starting compression to {}...", format.label())
        );
        assert!(messages.contains(&"Adding: docs/readme.md".to_string()));

        let target = tmp.path().join("unpacked");
        extract(&output, Some(&target), &mut |_| {}).unwrap();
        assert_eq!(
            fs::read_to_string(target.join("docs/readme.md")).unwrap(),
            "# Title\n".repeat(64)
        );
        assert_eq!(
            fs::read_to_string(target.join("docs/img/logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn zip_roundtrip_keeps_tree() {
        roundtrip(ArchiveFormat::Zip);
    }

    #[test]
    fn tar_gz_roundtrip_keeps_tree() {
        roundtrip(ArchiveFormat::TarGz);
    }

    #[test]
    fn tar_bz2_roundtrip_keeps_tree() {
        roundtrip(ArchiveFormat::TarBz2);
    }

    #[test]
    fn tar_xz_roundtrip_keeps_tree() {
        roundtrip(ArchiveFormat::TarXz);
    }

    #[test]
    fn seven_zip_roundtrip_keeps_tree() {
        roundtrip(ArchiveFormat::SevenZ);
    }

    #[test]
    fn zip_entries_keep_modification_time() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        let modified = fs::metadata(&file).unwrap().modified().unwrap();
        let expected = chrono::DateTime::<Local>::from(modified);
        let output = tmp.path().join("a.zip");

        compress(&file, &output, ArchiveFormat::Zip, &mut |_| {}).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let stamp = zip.by_index(0).unwrap().last_modified().unwrap();
        assert_ne!(stamp, zip::DateTime::default());
        assert_eq!(i32::from(stamp.year()), expected.year());
        assert_eq!(u32::from(stamp.month()), expected.month());
        assert_eq!(u32::from(stamp.day()), expected.day());
    }

    #[test]
    fn single_file_reports_added() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        fs::write(&file, b"abc").unwrap();
        let output = tmp.path().join("notes.zip");

        let mut messages = Vec::new();
        let report = compress(&file, &output, ArchiveFormat::Zip, &mut |m| messages.push(m)).unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.original_size, 3);
        assert_eq!(messages.last().map(String::as_str), Some("Added: notes.txt"));
    }

    #[test]
    fn rar_cannot_be_created() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"a").unwrap();

        let err = compress(&file, &tmp.path().join("a.rar"), ArchiveFormat::Rar, &mut |_| {})
            .unwrap_err();

        assert_eq!(err.to_string(), "Unsupported compression format: rar");
        assert!(!tmp.path().join("a.rar").exists());
    }

    #[test]
    fn missing_source_fails_before_writing() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("x.zip");

        let err = compress(&tmp.path().join("gone"), &output, ArchiveFormat::Zip, &mut |_| {})
            .unwrap_err();

        assert!(err.to_string().starts_with("Source path not found:"));
        assert!(!output.exists());
    }

    #[test]
    fn empty_directory_has_zero_ratio() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        let output = tmp.path().join("empty.tar.gz");

        let report = compress(&empty, &output, ArchiveFormat::TarGz, &mut |_| {}).unwrap();

        assert_eq!(report.files, 0);
        assert_eq!(report.ratio(), 0.0);
    }

    #[test]
    fn output_inside_source_is_not_archived() {
        let tmp = TempDir::new().unwrap();
        let source = sample_tree(tmp.path());
        let output = source.join("self.zip");
        fs::write(&output, b"stale").unwrap();

        let report = compress(&source, &output, ArchiveFormat::Zip, &mut |_| {}).unwrap();

        assert_eq!(report.files, 2);
    }
}
