//! Template contexts for the server-rendered pages.

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use askama::Template;
use chrono::{DateTime, Utc};
use quire_core::domain::Post;
use quire_editor::{Editor, EditorConfig, ToolbarAction, ToolbarButton};

const EXCERPT_CHARS: usize = 200;
const FORM_PLACEHOLDER: &str = "Start typing here...";

/// Render `template` with `status`, or a plain 500 if rendering fails.
pub fn render<T: Template>(template: &T, status: StatusCode) -> HttpResponse {
    match template.render() {
        Ok(html) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(html),
        Err(err) => {
            tracing::error!(error = %err, "Template rendering failed");
            HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("Template rendering failed")
        }
    }
}

/// Plain-text preview of a post body: tags stripped, first 200 characters.
pub fn excerpt(body: &str) -> String {
    let mut text = String::with_capacity(body.len().min(EXCERPT_CHARS * 4));
    let mut in_tag = false;
    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.chars().take(EXCERPT_CHARS).collect()
}

/// `Month D, YYYY`, e.g. `March 5, 2025`.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

pub struct PostCardView {
    pub href: String,
    pub title: String,
    pub excerpt: String,
}

impl From<&Post> for PostCardView {
    fn from(post: &Post) -> Self {
        Self {
            href: format!("/posts/{}", post.id),
            title: post.title.clone(),
            excerpt: excerpt(&post.body),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub posts: Vec<PostCardView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub title: String,
    pub published: String,
    /// Sanitized body HTML.
    pub body_html: String,
}

pub struct AdminPostView {
    pub id: i32,
    pub title: String,
    pub preview_html: String,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub posts: Vec<AdminPostView>,
    pub error: Option<String>,
}

/// Toolbar, placeholder and character count of the body editor.
pub struct EditorPanel {
    pub placeholder: String,
    pub toolbar: Vec<ToolbarButton>,
    pub character_count: Option<String>,
    pub preview_html: String,
    pub is_empty: bool,
}

impl EditorPanel {
    /// Panel for `body` with the whole of text block `block` selected, or the
    /// cursor at the end when no block is chosen.
    pub fn new(body: &str, character_limit: usize, block: Option<usize>) -> Self {
        match form_editor(body, character_limit, block).and_then(|editor| editor.view()) {
            Some(view) => Self {
                placeholder: view.placeholder,
                toolbar: view.toolbar,
                character_count: view.character_count.map(|count| count.to_string()),
                preview_html: view.html,
                is_empty: view.is_empty,
            },
            None => Self {
                placeholder: FORM_PLACEHOLDER.to_string(),
                toolbar: Vec::new(),
                character_count: None,
                preview_html: String::new(),
                is_empty: true,
            },
        }
    }
}

fn form_editor(body: &str, character_limit: usize, block: Option<usize>) -> Option<Editor> {
    let config = EditorConfig {
        placeholder: FORM_PLACEHOLDER.to_string(),
        character_limit: Some(character_limit),
    };
    let mut editor = Editor::new(config, body)
        .map_err(|e| tracing::warn!("Editor could not load post body: {}", e))
        .ok()?;
    editor.mount();
    if !block.is_some_and(|block| editor.select_all_in_block(block)) {
        editor.move_to_end();
    }
    Some(editor)
}

/// Run the toolbar button named `key` on `body`. `None` when the button is
/// unknown or does not apply to the selection.
pub fn run_toolbar(
    body: &str,
    character_limit: usize,
    block: Option<usize>,
    key: &str,
    url: &str,
) -> Option<String> {
    let action = ToolbarAction::from_key(key)?;
    let mut editor = form_editor(body, character_limit, block)?;
    if !editor.run_action(action, url) {
        tracing::debug!(action = key, "Toolbar action not applicable");
        return None;
    }
    Some(editor.html().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Edit(i32),
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub title_placeholder: &'static str,
    pub submit_label: &'static str,
    pub pending_label: &'static str,
    pub title: String,
    /// Body exactly as submitted or stored.
    pub body: String,
    pub editor: EditorPanel,
    /// Text block the toolbar acts on.
    pub block: Option<usize>,
    pub url: String,
    pub error: Option<String>,
    character_limit: usize,
}

impl PostFormTemplate {
    pub fn new(kind: FormKind, title: &str, body: &str, character_limit: usize) -> Self {
        let (heading, action, title_placeholder, submit_label, pending_label) = match kind {
            FormKind::Create => (
                "Create Post",
                "/admin/create-post".to_string(),
                "Title",
                "Save",
                "Saving...",
            ),
            FormKind::Edit(id) => (
                "Edit Post",
                format!("/admin/edit-post/{}", id),
                "Post Title",
                "Update",
                "Updating...",
            ),
        };

        Self {
            heading,
            action,
            title_placeholder,
            submit_label,
            pending_label,
            title: title.to_string(),
            body: body.to_string(),
            editor: EditorPanel::new(body, character_limit, None),
            block: None,
            url: String::new(),
            error: None,
            character_limit,
        }
    }

    pub fn with_selection(mut self, block: Option<usize>, url: &str) -> Self {
        self.editor = EditorPanel::new(&self.body, self.character_limit, block);
        self.block = block;
        self.url = url.to_string();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
    pub request_id: Option<String>,
}
