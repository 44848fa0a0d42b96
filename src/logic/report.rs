// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Per-operation statistics and the summaries shown when a job finishes.

use std::path::PathBuf;

use crate::utils::format_size;

/// Running file/byte counters, reset at the start of every operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub files: u64,
    pub size: u64,
}

impl Stats {
    /// Count one file of `size` bytes.
    pub fn record(&mut self, size: u64) {
        self.files += 1;
        self.size += size;
    }
}

/// Outcome of a successful compression.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressReport {
    pub files: u64,
    pub original_size: u64,
    pub compressed_size: u64,
    pub output: PathBuf,
}

impl CompressReport {
    /// Space saved in percent; zero when nothing was read.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }

    /// Multi-line summary for the completion dialog.
    pub fn summary(&self) -> String {
        format!(
            "Compression complete!\n\n\
             Files: {}\n\
             Original size: {}\n\
             Compressed size: {}\n\
             Compression ratio: {:.1}%\n\
             \nArchive saved to:\n{}",
            self.files,
            format_size(self.original_size),
            format_size(self.compressed_size),
            self.ratio(),
            self.output.display()
        )
    }
}

/// Outcome of a successful extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractReport {
    /// Number of archive members, directories included.
    pub files: u64,
    /// Absolute directory the archive was unpacked into.
    pub output_path: PathBuf,
}

impl ExtractReport {
    pub fn summary(&self) -> String {
        format!(
            "Extraction complete!\n\nFiles extracted: {}\nOutput directory:\n{}",
            self.files,
            self.output_path.display()
        )
    }
}

/// Outcome of decoding every member of an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestReport {
    pub archive: PathBuf,
    pub entries: u64,
}

impl TestReport {
    pub fn summary(&self) -> String {
        format!(
            "Archive OK: {} entries tested.\n\n{}",
            self.entries,
            self.archive.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_zero_for_empty_input() {
        let report = CompressReport {
            files: 0,
            original_size: 0,
            compressed_size: 22,
            output: PathBuf::from("empty.zip"),
        };
        assert_eq!(report.ratio(), 0.0);
    }

    #[test]
    fn ratio_reports_saved_percentage() {
        let report = CompressReport {
            files: 2,
            original_size: 1000,
            compressed_size: 250,
            output: PathBuf::from("out.tar.gz"),
        };
        assert!((report.ratio() - 75.0).abs() < f64::EPSILON);
        let text = report.summary();
        assert!(text.starts_with("Compression complete!"));
        assert!(text.contains("Files: 2"));
        assert!(text.contains("Original size: 1000.00 B"));
        assert!(text.contains("Compressed size: 250.00 B"));
        assert!(text.contains("Compression ratio: 75.0%"));
        assert!(text.ends_with("out.tar.gz"));
    }

    #[test]
    fn stats_record_accumulates() {
        let mut stats = Stats::default();
        stats.record(10);
        stats.record(5);
        assert_eq!(stats, Stats { files: 2, size: 15 });
    }

    #[test]
    fn extract_summary_lists_count_and_directory() {
        let report = ExtractReport {
            files: 3,
            output_path: PathBuf::from("/data/out"),
        };
        assert_eq!(
            report.summary(),
            "Extraction complete!\n\nFiles extracted: 3\nOutput directory:\n/data/out"
        );
    }
}
