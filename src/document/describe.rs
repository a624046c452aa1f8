use super::mime::is_indexable;
use super::selection::SelectedFile;

/// One-line summary of the current selection, e.g. `notes.txt (1.2 KB, text/plain)`.
pub fn describe_selection(file: &SelectedFile) -> String {
    let mut line = format!(
        "{} ({}, {})",
        file.name,
        human_size(file.size()),
        file.mime_type
    );
    if !is_indexable(&file.mime_type) {
        line.push_str(" [may not be indexed as text]");
    }
    line
}

fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
