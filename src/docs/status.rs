use http::StatusCode;

/// Label used for status codes without a standard reason phrase.
pub const UNKNOWN_STATUS_TEXT: &str = "Unknown";

/// Reverse an HTTP status code into its label.
///
/// An explicit, non-empty `text` always wins over the standard reason phrase.
pub fn status_text_by_code(status_code: u16, text: Option<&str>) -> String {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        return text.to_string();
    }

    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or(UNKNOWN_STATUS_TEXT)
        .to_string()
}
