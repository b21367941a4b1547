#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// True when the file name ends with `suffix` (".gz" by default).
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.len() > suffix.len() && name.ends_with(suffix))
        .unwrap_or(false)
}

/// Output path for a decompressed file: the input with `suffix` removed.
/// `None` when the name does not carry the suffix.
pub fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if name.len() <= suffix.len() || !name.ends_with(suffix) {
        return None;
    }
    Some(path.with_file_name(&name[..name.len() - suffix.len()]))
}

pub fn format_size(size: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{:.0} {}", size, UNITS[unit_idx])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}

/// Space saved by compression, gzip style: 1 - compressed/uncompressed.
pub fn format_ratio(compressed: usize, uncompressed: usize) -> String {
    if uncompressed == 0 {
        "0.0%".to_string()
    } else {
        let saved = (1.0 - compressed as f64 / uncompressed as f64) * 100.0;
        format!("{:.1}%", saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_suffix() {
        assert!(has_suffix(Path::new("file.txt.gz"), ".gz"));
        assert!(!has_suffix(Path::new("file.txt"), ".gz"));
        assert!(!has_suffix(Path::new(".gz"), ".gz"));
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(
            strip_suffix(Path::new("dir/file.txt.gz"), ".gz"),
            Some(PathBuf::from("dir/file.txt"))
        );
        assert_eq!(strip_suffix(Path::new("file.txt"), ".gz"), None);
        assert_eq!(strip_suffix(Path::new(".gz"), ".gz"), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(25, 100), "75.0%");
        assert_eq!(format_ratio(100, 0), "0.0%");
    }
}
