#![allow(dead_code)]

use std::{fs, path::Path};

/// Reads the log file at `path` as lines.
pub fn log_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read log {path:?}: {e}"))
        .lines()
        .map(str::to_string)
        .collect()
}

/// Lines of `lines` containing `needle`.
pub fn matching<'a>(lines: &'a [String], needle: &str) -> Vec<&'a String> {
    lines.iter().filter(|line| line.contains(needle)).collect()
}
