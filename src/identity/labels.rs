//! Human-readable labels for fields, sources and sheets.

/// Label of a field or source: its caption in brackets, or the bracketed raw
/// name when there is no caption.
///
/// A `]` inside a caption is doubled, which is how calculations spell it.
#[must_use]
pub fn caption_label(bracketed_name: &str, caption: &str) -> String {
    if caption.is_empty() {
        bracketed_name.to_string()
    } else {
        format!("[{}]", caption.replace(']', "]]"))
    }
}

/// Label of a worksheet.
#[must_use]
pub fn sheet_label(name: &str) -> String {
    format!("[{name}]")
}
