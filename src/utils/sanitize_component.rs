// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Filesystem-safe names for suggested archive files.

const FALLBACK: &str = "archive";

const RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Produce a filesystem-safe path component for an archive name.
///
/// # Steps
/// - Transliterate Unicode to ASCII with `deunicode` ("Å" → "A").
/// - Keep ASCII alphanumerics plus `-`, `_` and `.`; everything else becomes `_`.
/// - Collapse runs of `_` and `.`, drop `_` right before a dot, trim trailing dots.
/// - Fall back to `archive` for empty or dot-only names and suffix Windows
///   device names (`CON` → `CON_`).
pub fn sanitize_component(value: &str) -> String {
    let transliterated = deunicode::deunicode(value);
    let mut out = String::with_capacity(transliterated.len());

    for ch in transliterated.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            ch
        } else {
            '_'
        };
        let repeated = matches!(mapped, '_' | '.') && out.ends_with(mapped);
        if !repeated {
            out.push(mapped);
        }
    }

    while let Some(pos) = out.find("_.") {
        out.remove(pos);
    }
    let out = out.trim_end_matches(['.', ' ', '_']).to_string();

    if out.is_empty() || out.chars().all(|c| c == '.') {
        return FALLBACK.to_string();
    }

    let (base, ext) = match out.split_once('.') {
        Some((base, ext)) if !base.is_empty() => (base, Some(ext)),
        _ => (out.as_str(), None),
    };
    if RESERVED.contains(&base.to_ascii_uppercase().as_str()) {
        return match ext {
            Some(ext) => format!("{base}_.{ext}"),
            None => format!("{base}_"),
        };
    }

    out
}
