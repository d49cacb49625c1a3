/// Allow-list HTML sanitizer applied to post bodies.
pub trait ContentSanitizer: Send + Sync {
    /// Return `html` with every disallowed tag, attribute, and URL scheme removed.
    fn sanitize(&self, html: &str) -> String;
}
