//! # Quire Editor
//!
//! Headless rich-text editor for post bodies.
//!
//! A post body is an HTML string. The editor parses it (through the allow-list
//! sanitizer) into a [`Document`], applies [`Command`]s against a
//! [`Selection`], and serializes the result back to canonical HTML.
//!
//! The supported feature set is the fixed [`Capability`] list: bold, italic,
//! strike, bullet/ordered/task lists, links, inline images, tables, a
//! placeholder, and an optional character count.

pub mod capability;
pub mod commands;
pub mod document;
pub mod editor;
pub mod error;
pub mod html;
pub mod sanitize;

pub use capability::Capability;
pub use commands::{Command, EditorState, Selection};
pub use document::{
    Block, Document, Inline, List, ListItem, ListKind, Mark, Marks, Paragraph, Table, TableCell,
    TableRow,
};
pub use editor::{CharacterCount, Editor, EditorConfig, EditorView, ToolbarAction, ToolbarButton};
pub use error::EditorError;
pub use sanitize::HtmlSanitizer;

/// Character limit used by the admin post forms.
pub const DEFAULT_CHARACTER_LIMIT: usize = 5000;
