//! Escaping of text content for embedding in vector markup.

/// Escape `text` for a `<text>` element.
///
/// The markup doubles as a `data:` URL payload, so URL-significant characters
/// are percent-encoded alongside the XML ones. Ampersands go first so the
/// entities introduced by later steps are never escaped again.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('%', "%25")
        .replace('#', "%23")
        .replace(' ', "&#160;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
