/// Guess MIME type from filename extension.
pub fn guess_mime_type(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "application/octet-stream",
    };
    match ext.as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}

/// Whether the backend is expected to index this kind of document as text.
///
/// The backend loads PDFs with a PDF loader and everything else as text, so
/// anything outside `text/*` and PDF is likely to produce an empty index.
pub fn is_indexable(mime_type: &str) -> bool {
    mime_type.starts_with("text/")
        || matches!(
            mime_type,
            "application/pdf" | "application/json" | "application/xml"
        )
}
