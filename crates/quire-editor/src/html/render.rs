//! [`Document`] to canonical HTML.

use super::entities::{escape_attr, escape_text};
use crate::document::{Block, Document, Inline, List, ListKind, Marks, Paragraph, Table};

const LINK_REL: &str = "noopener noreferrer nofollow";

/// Marks in nesting order, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Open {
    Link(String),
    Bold,
    Italic,
    Strike,
}

impl Open {
    fn start(&self, out: &mut String) {
        match self {
            Open::Link(href) => {
                out.push_str("<a target=\"_blank\" rel=\"");
                out.push_str(LINK_REL);
                out.push_str("\" href=\"");
                escape_attr(href, out);
                out.push_str("\">");
            }
            Open::Bold => out.push_str("<strong>"),
            Open::Italic => out.push_str("<em>"),
            Open::Strike => out.push_str("<s>"),
        }
    }

    fn end(&self, out: &mut String) {
        out.push_str(match self {
            Open::Link(_) => "</a>",
            Open::Bold => "</strong>",
            Open::Italic => "</em>",
            Open::Strike => "</s>",
        });
    }
}

fn wanted(marks: &Marks) -> Vec<Open> {
    let mut stack = Vec::with_capacity(4);
    if let Some(href) = &marks.link {
        stack.push(Open::Link(href.clone()));
    }
    if marks.bold {
        stack.push(Open::Bold);
    }
    if marks.italic {
        stack.push(Open::Italic);
    }
    if marks.strike {
        stack.push(Open::Strike);
    }
    stack
}

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    render_blocks(&doc.blocks, &mut out);
    out
}

fn render_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => render_paragraph(p, out),
            Block::List(list) => render_list(list, out),
            Block::Table(table) => render_table(table, out),
        }
    }
}

fn render_paragraph(paragraph: &Paragraph, out: &mut String) {
    out.push_str("<p>");
    let mut open: Vec<Open> = Vec::new();

    for inline in &paragraph.inlines {
        let want = match inline {
            Inline::Text { marks, .. } => wanted(marks),
            _ => Vec::new(),
        };

        // Keep the shared prefix open, close and reopen the rest.
        let keep = open
            .iter()
            .zip(&want)
            .take_while(|(a, b)| a == b)
            .count();
        while open.len() > keep {
            if let Some(mark) = open.pop() {
                mark.end(out);
            }
        }
        for mark in &want[keep..] {
            mark.start(out);
            open.push(mark.clone());
        }

        match inline {
            Inline::Text { text, .. } => escape_text(text, out),
            Inline::Image { src, alt } => {
                out.push_str("<img src=\"");
                escape_attr(src, out);
                out.push('"');
                if let Some(alt) = alt {
                    out.push_str(" alt=\"");
                    escape_attr(alt, out);
                    out.push('"');
                }
                out.push('>');
            }
            Inline::HardBreak => out.push_str("<br>"),
        }
    }

    while let Some(mark) = open.pop() {
        mark.end(out);
    }
    out.push_str("</p>");
}

fn render_list(list: &List, out: &mut String) {
    let (open, close) = match list.kind {
        ListKind::Bullet => ("<ul>", "</ul>"),
        ListKind::Ordered => ("<ol>", "</ol>"),
        ListKind::Task => ("<ul data-type=\"taskList\">", "</ul>"),
    };
    out.push_str(open);
    for item in &list.items {
        if list.kind == ListKind::Task {
            out.push_str(if item.checked {
                "<li data-checked=\"true\" data-type=\"taskItem\"><label><input type=\"checkbox\" checked=\"checked\">"
            } else {
                "<li data-checked=\"false\" data-type=\"taskItem\"><label><input type=\"checkbox\">"
            });
            out.push_str("<span></span></label><div>");
            render_blocks(&item.blocks, out);
            out.push_str("</div></li>");
        } else {
            out.push_str("<li>");
            render_blocks(&item.blocks, out);
            out.push_str("</li>");
        }
    }
    out.push_str(close);
}

fn render_table(table: &Table, out: &mut String) {
    out.push_str("<table><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in &row.cells {
            let tag = if cell.header { "th" } else { "td" };
            out.push('<');
            out.push_str(tag);
            out.push('>');
            render_blocks(&cell.blocks, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}
