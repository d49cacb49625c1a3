//! Allow-list HTML sanitizer for post bodies.

use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;
use quire_core::ports::ContentSanitizer;

static SHARED: LazyLock<HtmlSanitizer> = LazyLock::new(HtmlSanitizer::new);

/// Ammonia builder restricted to the markup the editor can produce.
pub struct HtmlSanitizer {
    builder: Builder<'static>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();

        let tags: HashSet<&'static str> = HashSet::from([
            "a", "b", "br", "col", "colgroup", "del", "div", "em", "i", "img", "input", "label",
            "li", "ol", "p", "s", "span", "strike", "strong", "table", "tbody", "td", "th",
            "thead", "tr", "ul",
        ]);
        builder.tags(tags);
        builder.generic_attributes(HashSet::new());

        builder.add_tag_attributes("a", &["target"]);
        builder.add_tag_attributes("img", &["alt", "title"]);
        builder.add_tag_attributes("ul", &["data-type"]);
        builder.add_tag_attributes("li", &["data-type", "data-checked"]);
        builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
        builder.add_tag_attributes("th", &["colspan", "rowspan"]);
        builder.add_tag_attributes("td", &["colspan", "rowspan"]);

        builder.url_schemes(HashSet::from(["http", "https", "mailto"]));
        builder.link_rel(Some("noopener noreferrer nofollow"));

        Self { builder }
    }

    /// Process-wide instance used by the document parser.
    pub fn shared() -> &'static HtmlSanitizer {
        &SHARED
    }

    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSanitizer for HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.clean(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_event_handlers() {
        let html = HtmlSanitizer::new()
            .clean(r#"<p onclick="steal()">Hi<script>alert(1)</script></p>"#);
        assert_eq!(html, "<p>Hi</p>");
    }

    #[test]
    fn drops_javascript_urls() {
        let html = HtmlSanitizer::new().clean(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!html.contains("javascript"));
        assert!(html.contains(">x</a>"));
    }

    #[test]
    fn keeps_editor_markup() {
        let sanitizer = HtmlSanitizer::new();
        let task = r#"<ul data-type="taskList"><li data-checked="true" data-type="taskItem">x</li></ul>"#;
        assert_eq!(sanitizer.clean(task), task);

        let html = sanitizer.clean(r#"<p><s>old</s> <img src="https://a.example/x.png" alt="x"></p>"#);
        assert!(html.contains("<s>old</s>"));
        assert!(html.contains(r#"src="https://a.example/x.png""#));
    }

    #[test]
    fn links_get_safe_rel() {
        let html = HtmlSanitizer::new().clean(r#"<a href="https://a.example" rel="opener">x</a>"#);
        assert!(html.contains(r#"rel="noopener noreferrer nofollow""#));
        assert!(!html.contains(r#"rel="opener""#));
    }

    #[test]
    fn headings_collapse_to_their_text() {
        let html = HtmlSanitizer::new().clean("<h1>Title</h1>");
        assert_eq!(html, "Title");
    }

    #[test]
    fn sanitizer_port_matches_clean() {
        let sanitizer = HtmlSanitizer::new();
        let input = "<p>a<iframe src=\"x\"></iframe></p>";
        assert_eq!(sanitizer.sanitize(input), sanitizer.clean(input));
    }
}
