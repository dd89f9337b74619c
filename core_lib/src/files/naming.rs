//! Name validation for lookups and sanitization for incoming uploads.

use super::error::StoreError;

pub const MAX_FILE_NAME_LENGTH: usize = 255;

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks that `name` addresses an entry directly under the root directory.
///
/// Runs before any filesystem access. Names are otherwise taken as-is, so
/// files placed in the directory by other means can still be looked up.
pub fn validate_file_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(StoreError::invalid_name(name));
    }

    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StoreError::invalid_name(name));
    }

    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(StoreError::invalid_name(name));
    }

    Ok(())
}

/// Derives a storage name from a client supplied hint.
///
/// Returns `None` when nothing usable is left. The result never contains a
/// path separator, never starts with a dot and never exceeds
/// [`MAX_FILE_NAME_LENGTH`] bytes.
pub fn sanitize_file_name(hint: &str) -> Option<String> {
    let base = hint.rsplit(['/', '\\']).next().unwrap_or(hint);

    let replaced: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = replaced
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end();
    if trimmed.is_empty() {
        return None;
    }

    let stem = trimmed.split('.').next().unwrap_or(trimmed).to_ascii_uppercase();
    let mut name = if RESERVED_NAMES.contains(&stem.as_str()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if name.len() > MAX_FILE_NAME_LENGTH {
        let mut cut = MAX_FILE_NAME_LENGTH;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
    }

    Some(name)
}
