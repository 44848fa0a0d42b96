// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and business logic.

pub mod file_icons;
pub mod sanitize_component;
pub mod size;

/// Select a Phosphor icon for a browser entry.
pub use file_icons::icon_for;
/// Sanitize user-provided strings into filesystem-safe path components.
pub use sanitize_component::sanitize_component;
/// Format byte counts for display.
pub use size::format_size;
