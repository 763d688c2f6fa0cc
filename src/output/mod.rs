// Output formatting: terminal display and JSON export.

pub mod terminal;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Write a value as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(())
}
