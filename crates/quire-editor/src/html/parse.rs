//! HTML to [`Document`].
//!
//! The input is sanitized first, so every non-void element arrives with an
//! explicit end tag. `lol_html` streams the result into a light element tree,
//! which is then folded into the document model.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::EndTag;
use lol_html::{RewriteStrSettings, doc_text, element, rewrite_str};

use super::entities::decode;
use crate::document::{
    Block, Document, Inline, List, ListItem, ListKind, Marks, Paragraph, Table, TableCell,
    TableRow, non_empty,
};
use crate::error::EditorError;
use crate::sanitize::HtmlSanitizer;

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

/// Open-element stack fed by rewriter callbacks.
struct TreeBuilder {
    stack: Vec<Element>,
    pending_text: String,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::default()],
            pending_text: String::new(),
        }
    }

    fn top(&mut self) -> &mut Element {
        if self.stack.is_empty() {
            self.stack.push(Element::default());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = decode(&std::mem::take(&mut self.pending_text));
        let top = self.top();
        match top.children.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(&text),
            _ => top.children.push(Node::Text(text)),
        }
    }

    fn open(&mut self, element: Element, void: bool) {
        self.flush_text();
        if void {
            self.top().children.push(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn close(&mut self) {
        self.flush_text();
        if self.stack.len() > 1 {
            if let Some(done) = self.stack.pop() {
                self.top().children.push(Node::Element(done));
            }
        }
    }

    fn finish(mut self) -> Element {
        self.flush_text();
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack.pop().unwrap_or_default()
    }
}

/// Parse sanitized-on-entry HTML into a document.
pub fn parse(html: &str) -> Result<Document, EditorError> {
    let clean = HtmlSanitizer::shared().clean(html);
    let root = build_tree(&clean)?;
    Ok(Document::new(blocks_from(&root.children)))
}

fn build_tree(html: &str) -> Result<Element, EditorError> {
    let builder = Rc::new(RefCell::new(TreeBuilder::new()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", {
                let builder = Rc::clone(&builder);
                move |el| {
                    let element = Element {
                        tag: el.tag_name().to_ascii_lowercase(),
                        attrs: el
                            .attributes()
                            .iter()
                            .map(|a| (a.name(), decode(&a.value())))
                            .collect(),
                        children: Vec::new(),
                    };

                    match el.end_tag_handlers() {
                        Some(handlers) => {
                            builder.borrow_mut().open(element, false);
                            let builder = Rc::clone(&builder);
                            handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                                builder.borrow_mut().close();
                                Ok(())
                            }) as _);
                        }
                        None => builder.borrow_mut().open(element, true),
                    }
                    Ok(())
                }
            })],
            document_content_handlers: vec![doc_text!({
                let builder = Rc::clone(&builder);
                move |chunk| {
                    let mut builder = builder.borrow_mut();
                    builder.pending_text.push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        builder.flush_text();
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| EditorError::Parse(err.to_string()))?;

    let builder = Rc::try_unwrap(builder)
        .map(RefCell::into_inner)
        .map_err(|_| EditorError::Parse("rewriter kept a handler alive".to_string()))?;
    Ok(builder.finish())
}

/// Collapse runs of HTML whitespace to a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c'))
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "ul" | "ol" | "li" | "table" | "thead" | "tbody" | "tr" | "th" | "td"
    )
}

/// Fold a container's children into blocks.
fn blocks_from<'a>(children: impl IntoIterator<Item = &'a Node>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut stray: Option<Paragraph> = None;

    fn flush(blocks: &mut Vec<Block>, stray: &mut Option<Paragraph>) {
        if let Some(paragraph) = stray.take() {
            blocks.push(Block::Paragraph(paragraph));
        }
    }

    for child in children {
        match child {
            Node::Text(text) => {
                if let Some(paragraph) = stray.as_mut() {
                    paragraph.push(Inline::text(collapse_whitespace(text), Marks::default()));
                } else if !is_blank(text) {
                    let mut paragraph = Paragraph::default();
                    let text = collapse_whitespace(text);
                    paragraph.push(Inline::text(text.trim_start(), Marks::default()));
                    stray = Some(paragraph);
                }
            }
            Node::Element(el) if is_block_tag(&el.tag) => {
                flush(&mut blocks, &mut stray);
                match el.tag.as_str() {
                    "p" => {
                        let mut paragraph = Paragraph::default();
                        collect_inlines(&el.children, &Marks::default(), &mut paragraph);
                        blocks.push(Block::Paragraph(paragraph));
                    }
                    "ul" | "ol" => blocks.push(Block::List(list_from(el))),
                    "table" => {
                        if let Some(table) = table_from(el) {
                            blocks.push(Block::Table(table));
                        }
                    }
                    // Bare structural tags outside their parent are unwrapped.
                    _ => blocks.extend(blocks_from(&el.children)),
                }
            }
            Node::Element(el) => {
                let paragraph = stray.get_or_insert_with(Paragraph::default);
                collect_inline(el, &Marks::default(), paragraph);
            }
        }
    }

    flush(&mut blocks, &mut stray);
    blocks
}

fn collect_inlines(nodes: &[Node], marks: &Marks, out: &mut Paragraph) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Inline::text(collapse_whitespace(text), marks.clone())),
            Node::Element(el) => collect_inline(el, marks, out),
        }
    }
}

fn collect_inline(el: &Element, marks: &Marks, out: &mut Paragraph) {
    let mut marks = marks.clone();
    match el.tag.as_str() {
        "strong" | "b" => marks.bold = true,
        "em" | "i" => marks.italic = true,
        "s" | "strike" | "del" => marks.strike = true,
        "a" => {
            if let Some(href) = el.attr("href") {
                marks.link = Some(href.to_string());
            }
        }
        "img" => {
            if let Some(src) = el.attr("src") {
                out.push(Inline::Image {
                    src: src.to_string(),
                    alt: el.attr("alt").map(str::to_string),
                });
            }
            return;
        }
        "br" => {
            out.push(Inline::HardBreak);
            return;
        }
        "input" | "col" | "colgroup" => return,
        _ => {}
    }
    collect_inlines(&el.children, &marks, out);
}

fn list_from(el: &Element) -> List {
    let kind = match (el.tag.as_str(), el.attr("data-type")) {
        ("ul", Some("taskList")) => ListKind::Task,
        ("ol", _) => ListKind::Ordered,
        _ => ListKind::Bullet,
    };

    let mut items = Vec::new();
    for child in &el.children {
        let Node::Element(item) = child else {
            continue;
        };
        if item.tag != "li" {
            items.push(ListItem::new(blocks_from([child])));
            continue;
        }

        let mut list_item = if kind == ListKind::Task {
            // The checkbox label is presentation; the content lives beside it.
            ListItem::new(blocks_from(
                item.children
                    .iter()
                    .filter(|n| !matches!(n, Node::Element(e) if e.tag == "label")),
            ))
        } else {
            ListItem::new(blocks_from(&item.children))
        };
        list_item.checked = kind == ListKind::Task && item.attr("data-checked") == Some("true");
        items.push(list_item);
    }

    if items.is_empty() {
        items.push(ListItem::new(Vec::new()));
    }
    List { kind, items }
}

fn table_from(el: &Element) -> Option<Table> {
    let mut rows = Vec::new();
    collect_rows(el, &mut rows);
    if rows.is_empty() {
        return None;
    }
    Some(Table { rows }.normalized())
}

fn collect_rows(el: &Element, rows: &mut Vec<TableRow>) {
    for child in &el.children {
        let Node::Element(child) = child else {
            continue;
        };
        match child.tag.as_str() {
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            "tr" => {
                let cells: Vec<TableCell> = child
                    .children
                    .iter()
                    .filter_map(|n| match n {
                        Node::Element(cell) if cell.tag == "th" || cell.tag == "td" => {
                            Some(TableCell {
                                header: cell.tag == "th",
                                blocks: non_empty(blocks_from(&cell.children)),
                            })
                        }
                        _ => None,
                    })
                    .collect();
                if !cells.is_empty() {
                    rows.push(TableRow { cells });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(doc: &Document, index: usize) -> String {
        let paths = doc.text_blocks();
        doc.paragraph(&paths[index]).map(Paragraph::plain_text).unwrap_or_default()
    }

    #[test]
    fn empty_input_is_one_empty_paragraph() {
        let doc = parse("").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn stray_text_becomes_a_paragraph() {
        let doc = parse("hello <strong>there</strong>").unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(text(&doc, 0), "hello there");
    }

    #[test]
    fn whitespace_between_blocks_is_ignored() {
        let doc = parse("<p>a</p>\n  <p>b</p>\n").unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(text(&doc, 1), "b");
    }

    #[test]
    fn decodes_entities_in_text_and_attributes() {
        let doc = parse(r#"<p>Tom &amp; Jerry <a href="https://a.example/?a=1&amp;b=2">x</a></p>"#)
            .unwrap();
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(p.plain_text(), "Tom & Jerry x");
        let Inline::Text { marks, .. } = &p.inlines[1] else {
            panic!("expected link text");
        };
        assert_eq!(marks.link.as_deref(), Some("https://a.example/?a=1&b=2"));
    }

    #[test]
    fn nested_marks_combine() {
        let doc = parse("<p><strong><em>x</em></strong></p>").unwrap();
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            p.inlines,
            vec![Inline::text(
                "x",
                Marks {
                    bold: true,
                    italic: true,
                    ..Marks::default()
                }
            )]
        );
    }

    #[test]
    fn task_items_read_checked_state() {
        let doc = parse(
            r#"<ul data-type="taskList"><li data-checked="true" data-type="taskItem"><label><input type="checkbox" checked="checked"><span></span></label><div><p>done</p></div></li><li data-checked="false" data-type="taskItem"><label><input type="checkbox"><span></span></label><div><p>todo</p></div></li></ul>"#,
        )
        .unwrap();
        let Block::List(list) = &doc.blocks[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.kind, ListKind::Task);
        assert!(list.items[0].checked);
        assert!(!list.items[1].checked);
        assert_eq!(text(&doc, 1), "todo");
    }

    #[test]
    fn ragged_tables_are_padded() {
        let doc = parse(
            "<table><tbody><tr><th>a</th><th>b</th></tr><tr><td>c</td></tr></tbody></table>",
        )
        .unwrap();
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[1].cells.len(), 2);
        assert!(table.rows[0].cells[0].header);
        assert_eq!(doc.text_blocks().len(), 4);
    }

    #[test]
    fn headings_collapse_into_paragraphs() {
        let doc = parse("<h2>Title</h2><p>Body</p>").unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(text(&doc, 0), "Title");
    }

    #[test]
    fn scripts_never_reach_the_document() {
        let doc = parse("<p>a<script>alert(1)</script></p>").unwrap();
        assert_eq!(text(&doc, 0), "a");
    }
}
