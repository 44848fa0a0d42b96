// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Archive business logic: format dispatch, tree walking, and the thin
//! drivers around the third-party codecs.

pub mod check;
pub mod compress;
pub mod extract;
pub mod format;
pub mod report;
pub mod walk;

pub use check::test_archive;
pub use compress::compress;
pub use extract::extract;
pub use format::{ArchiveFormat, ensure_archive_extension};
pub use report::{CompressReport, ExtractReport, TestReport};
