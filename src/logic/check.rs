// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! "Test archive": decode every member and discard the output.
//!
//! Checksums and stream errors come from the codec crates themselves; a
//! failure is surfaced exactly as the library reports it.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use crate::logic::extract::open_tar;
use crate::logic::format::ArchiveFormat;
use crate::logic::report::TestReport;

/// Read every member of `archive` to the end, announcing `Testing: <name>`.
pub fn test_archive(archive: &Path, progress: &mut dyn FnMut(String)) -> Result<TestReport> {
    if !archive.exists() {
        bail!("Archive not found: {}", archive.display());
    }
    let format = ArchiveFormat::detect(archive)?;
    tracing::info!(archive = %archive.display(), %format, "testing archive");
    progress("Testing archive...".to_string());

    let entries = match format {
        ArchiveFormat::Zip => test_zip(archive, progress)?,
        ArchiveFormat::SevenZ => test_7z(archive, progress)?,
        ArchiveFormat::Rar => test_rar(archive, progress)?,
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz => {
            test_tar(archive, progress)?
        }
    };

    tracing::info!(entries, "archive test passed");
    Ok(TestReport {
        archive: archive.to_path_buf(),
        entries,
    })
}

fn test_zip(archive: &Path, progress: &mut dyn FnMut(String)) -> Result<u64> {
    let file =
        File::open(archive).with_context(|| format!("Failed to open archive {:?}", archive))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to read ZIP archive {:?}", archive))?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_string();
        progress(format!("Testing: {name}"));
        io::copy(&mut entry, &mut io::sink()).with_context(|| format!("Entry {name} is damaged"))?;
    }
    Ok(zip.len() as u64)
}

fn test_tar(archive: &Path, progress: &mut dyn FnMut(String)) -> Result<u64> {
    let mut tar = open_tar(archive)?;
    let mut count = 0;
    for entry in tar.entries()? {
        let mut entry = entry.with_context(|| format!("Failed to read TAR archive {:?}", archive))?;
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        progress(format!("Testing: {name}"));
        io::copy(&mut entry, &mut io::sink()).with_context(|| format!("Entry {name} is damaged"))?;
        count += 1;
    }
    Ok(count)
}

fn test_7z(archive: &Path, progress: &mut dyn FnMut(String)) -> Result<u64> {
    let mut reader = sevenz_rust::SevenZReader::open(archive, sevenz_rust::Password::empty())
        .map_err(|e| anyhow!("Failed to read 7z archive {:?}: {e}", archive))?;

    let mut count = 0;
    let mut failure: Option<io::Error> = None;
    reader
        .for_each_entries(|entry, data| {
            progress(format!("Testing: {}", entry.name));
            count += 1;
            match io::copy(data, &mut io::sink()) {
                Ok(_) => Ok(true),
                Err(err) => {
                    failure = Some(err);
                    Ok(false)
                }
            }
        })
        .map_err(|e| anyhow!("Failed to test 7z archive {:?}: {e}", archive))?;

    if let Some(err) = failure {
        return Err(anyhow!("7z archive {:?} is damaged: {err}", archive));
    }
    Ok(count)
}

fn test_rar(archive: &Path, progress: &mut dyn FnMut(String)) -> Result<u64> {
    let mut open = unrar::Archive::new(archive)
        .open_for_processing()
        .map_err(|e| anyhow!("Failed to read RAR archive {:?}: {e}", archive))?;

    let mut count = 0;
    while let Some(header) = open
        .read_header()
        .map_err(|e| anyhow!("Failed to read RAR archive {:?}: {e}", archive))?
    {
        let name = header.entry().filename.to_string_lossy().into_owned();
        progress(format!("Testing: {name}"));
        count += 1;
        open = if header.entry().is_file() {
            header.test()
        } else {
            header.skip()
        }
        .map_err(|e| anyhow!("Entry {name} is damaged: {e}"))?;
    }
    Ok(count)
}
