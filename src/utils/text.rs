//! Text normalization and HTML escaping utilities.

/// Collapse all whitespace runs (including newlines) to single spaces and
/// trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The substring after the first `:`, trimmed. Used for labeled fields
/// like "Дата оприлюднення: 01 січня 2024".
pub fn after_colon(s: &str) -> Option<String> {
    s.split_once(':').map(|(_, rest)| rest.trim().to_string())
}

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
