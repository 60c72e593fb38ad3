//! General utility functions for esm360
//!
//! Helpers shared by the command-line tool: size formatting, filter
//! matching and plugin discovery for batch conversion.

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// Format a byte count in human-readable form (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Create a glob matcher from a pattern string
///
/// Plain text without wildcards becomes a substring search so that
/// `--filter Anchorage` matches `DLC_Anchorage.esm`.
pub fn create_glob_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = if !pattern.contains('*') && !pattern.contains('?') {
        format!("*{}*", pattern)
    } else {
        pattern.to_string()
    };
    let glob = Glob::new(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// Check if a name matches the optional filter
pub fn matches_filter(name: &str, matcher: Option<&GlobMatcher>) -> bool {
    match matcher {
        Some(m) => m.is_match(name),
        None => true,
    }
}

/// Collect all plugin files (`.esm`/`.esp`) under a directory.
pub fn collect_plugins(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut plugins = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)
            .with_context(|| format!("Failed to read {}", current.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_plugin(&path) {
                plugins.push(path);
            }
        }
    }
    plugins.sort();
    Ok(plugins)
}

fn is_plugin(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("esm") || ext.eq_ignore_ascii_case("esp")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_substring_filter() {
        let m = create_glob_matcher("Anchorage").unwrap();
        assert!(m.is_match("DLC_Anchorage.esm"));
        assert!(!m.is_match("Fallout3.esm"));
    }

    #[test]
    fn test_plugin_extension() {
        assert!(is_plugin(Path::new("a/Fallout3.esm")));
        assert!(is_plugin(Path::new("a/Mod.ESP")));
        assert!(!is_plugin(Path::new("a/readme.txt")));
    }
}
