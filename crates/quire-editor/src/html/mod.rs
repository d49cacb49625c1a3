//! HTML codec for [`Document`].

pub mod entities;
mod parse;
mod render;

use crate::document::Document;
use crate::error::EditorError;

impl Document {
    /// Parse a post body. The markup is sanitized before it is read.
    pub fn from_html(html: &str) -> Result<Self, EditorError> {
        parse::parse(html)
    }

    /// Serialize to canonical HTML.
    pub fn to_html(&self) -> String {
        render::render(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;

    fn round_trip(html: &str) {
        let doc = Document::from_html(html).unwrap();
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn canonical_markup_round_trips() {
        round_trip("<p></p>");
        round_trip("<p>Hello <strong>bold</strong> and <em>italic</em> and <s>gone</s></p>");
        round_trip("<p><strong>a<em>b</em></strong><em>c</em></p>");
        round_trip(
            "<p><a target=\"_blank\" rel=\"noopener noreferrer nofollow\" href=\"https://quire.example/a?b=1&amp;c=2\">link <strong>bold</strong></a></p>",
        );
        round_trip("<p>one<br>two <img src=\"https://quire.example/x.png\" alt=\"x\"></p>");
        round_trip("<p>Tom &amp; Jerry &lt;3&nbsp;</p>");
    }

    #[test]
    fn canonical_lists_round_trip() {
        round_trip("<ul><li><p>a</p></li><li><p>b</p><ol><li><p>c</p></li></ol></li></ul>");
        round_trip(
            "<ul data-type=\"taskList\"><li data-checked=\"true\" data-type=\"taskItem\"><label><input type=\"checkbox\" checked=\"checked\"><span></span></label><div><p>done</p></div></li><li data-checked=\"false\" data-type=\"taskItem\"><label><input type=\"checkbox\"><span></span></label><div><p>todo</p><ul data-type=\"taskList\"><li data-checked=\"false\" data-type=\"taskItem\"><label><input type=\"checkbox\"><span></span></label><div><p>nested</p></div></li></ul></div></li></ul>",
        );
    }

    #[test]
    fn canonical_tables_round_trip() {
        round_trip(
            "<table><tbody><tr><th><p>h1</p></th><th><p>h2</p></th></tr><tr><td><p>a</p></td><td><p></p></td></tr></tbody></table>",
        );
    }

    #[test]
    fn loose_markup_is_normalized() {
        let doc = Document::from_html("<b>bold</b> text<ul><li>item</li></ul>").unwrap();
        assert_eq!(
            doc.to_html(),
            "<p><strong>bold</strong> text</p><ul><li><p>item</p></li></ul>"
        );

        let doc = Document::from_html("<p><a href=\"https://quire.example\" rel=\"opener\">x</a></p>")
            .unwrap();
        assert_eq!(
            doc.to_html(),
            "<p><a target=\"_blank\" rel=\"noopener noreferrer nofollow\" href=\"https://quire.example\">x</a></p>"
        );
    }
}
