//! Controlled editor surface around [`EditorState`].

use std::fmt;

use crate::capability::Capability;
use crate::commands::{Command, EditorState, Selection};
use crate::document::{Document, ListKind, Mark};
use crate::error::EditorError;

pub const DEFAULT_PLACEHOLDER: &str = "Write something...";

/// Stands in for the URL a user would supply when deciding whether link and
/// image buttons are enabled.
const ANY_URL: &str = "https://example.com";

/// Size of the table inserted from the toolbar.
const TOOLBAR_TABLE: Command = Command::InsertTable {
    rows: 3,
    cols: 3,
    with_header_row: true,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub placeholder: String,
    /// Enables the character count when set.
    pub character_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            character_limit: None,
        }
    }
}

impl EditorConfig {
    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = Some(limit);
        self
    }

    /// Enabled capabilities; the character count only exists with a limit.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| *c != Capability::CharacterCount || self.character_limit.is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Unmounted,
    Mounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Bold,
    Italic,
    Strike,
    BulletList,
    OrderedList,
    TaskList,
    Link,
    Image,
    InsertTable,
    AddColumn,
    AddRow,
    DeleteColumn,
    DeleteRow,
    DeleteTable,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 14] = [
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::Strike,
        ToolbarAction::BulletList,
        ToolbarAction::OrderedList,
        ToolbarAction::TaskList,
        ToolbarAction::Link,
        ToolbarAction::Image,
        ToolbarAction::InsertTable,
        ToolbarAction::AddColumn,
        ToolbarAction::AddRow,
        ToolbarAction::DeleteColumn,
        ToolbarAction::DeleteRow,
        ToolbarAction::DeleteTable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::Bold => "Bold",
            ToolbarAction::Italic => "Italic",
            ToolbarAction::Strike => "Strike",
            ToolbarAction::BulletList => "Bullet List",
            ToolbarAction::OrderedList => "Ordered List",
            ToolbarAction::TaskList => "Task List",
            ToolbarAction::Link => "Link",
            ToolbarAction::Image => "Image",
            ToolbarAction::InsertTable => "Insert Table",
            ToolbarAction::AddColumn => "Add Column",
            ToolbarAction::AddRow => "Add Row",
            ToolbarAction::DeleteColumn => "Delete Column",
            ToolbarAction::DeleteRow => "Delete Row",
            ToolbarAction::DeleteTable => "Delete Table",
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            ToolbarAction::Bold => Capability::Bold,
            ToolbarAction::Italic => Capability::Italic,
            ToolbarAction::Strike => Capability::Strike,
            ToolbarAction::BulletList => Capability::BulletList,
            ToolbarAction::OrderedList => Capability::OrderedList,
            ToolbarAction::TaskList => Capability::TaskList,
            ToolbarAction::Link => Capability::Link,
            ToolbarAction::Image => Capability::Image,
            _ => Capability::Table,
        }
    }

    /// Stable identifier submitted by form toolbars.
    pub fn key(self) -> &'static str {
        match self {
            ToolbarAction::Bold => "bold",
            ToolbarAction::Italic => "italic",
            ToolbarAction::Strike => "strike",
            ToolbarAction::BulletList => "bullet-list",
            ToolbarAction::OrderedList => "ordered-list",
            ToolbarAction::TaskList => "task-list",
            ToolbarAction::Link => "link",
            ToolbarAction::Image => "image",
            ToolbarAction::InsertTable => "insert-table",
            ToolbarAction::AddColumn => "add-column",
            ToolbarAction::AddRow => "add-row",
            ToolbarAction::DeleteColumn => "delete-column",
            ToolbarAction::DeleteRow => "delete-row",
            ToolbarAction::DeleteTable => "delete-table",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }

    /// Command run by the button. Link and image buttons take their target from `url`;
    /// a blank URL removes a link and inserts no image.
    pub fn command(self, url: &str) -> Option<Command> {
        let url = url.trim();
        Some(match self {
            ToolbarAction::Bold => Command::ToggleBold,
            ToolbarAction::Italic => Command::ToggleItalic,
            ToolbarAction::Strike => Command::ToggleStrike,
            ToolbarAction::BulletList => Command::ToggleBulletList,
            ToolbarAction::OrderedList => Command::ToggleOrderedList,
            ToolbarAction::TaskList => Command::ToggleTaskList,
            ToolbarAction::Link if url.is_empty() => Command::UnsetLink,
            ToolbarAction::Link => Command::SetLink(url.to_string()),
            ToolbarAction::Image if url.is_empty() => return None,
            ToolbarAction::Image => Command::InsertImage(url.to_string()),
            ToolbarAction::InsertTable => TOOLBAR_TABLE,
            ToolbarAction::AddColumn => Command::AddColumnAfter,
            ToolbarAction::AddRow => Command::AddRowAfter,
            ToolbarAction::DeleteColumn => Command::DeleteColumn,
            ToolbarAction::DeleteRow => Command::DeleteRow,
            ToolbarAction::DeleteTable => Command::DeleteTable,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub action: ToolbarAction,
    pub label: &'static str,
    pub enabled: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCount {
    pub characters: usize,
    pub limit: usize,
}

impl fmt::Display for CharacterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} characters", self.characters, self.limit)
    }
}

/// What a mounted editor shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub html: String,
    pub is_empty: bool,
    pub placeholder: String,
    pub toolbar: Vec<ToolbarButton>,
    pub character_count: Option<CharacterCount>,
}

type ChangeHandler = Box<dyn FnMut(&str) + Send>;

/// Controlled rich-text editor.
///
/// Edits that change the document hand the new HTML to the `on_change`
/// callback; [`Editor::set_content`] resynchronizes from outside without it.
pub struct Editor {
    config: EditorConfig,
    state: EditorState,
    html: String,
    surface: Surface,
    on_change: Option<ChangeHandler>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("config", &self.config)
            .field("html", &self.html)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(config: EditorConfig, content: &str) -> Result<Self, EditorError> {
        let doc = Document::from_html(content)?;
        let html = doc.to_html();
        let state = EditorState::new(doc, config.character_limit);
        Ok(Self {
            config,
            state,
            html,
            surface: Surface::Unmounted,
            on_change: None,
        })
    }

    pub fn on_change(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mount(&mut self) {
        if self.surface == Surface::Unmounted {
            tracing::trace!("Editor mounted");
            self.surface = Surface::Mounted;
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface == Surface::Mounted
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn document(&self) -> &Document {
        self.state.doc()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    /// Replace the content without notifying `on_change`.
    ///
    /// Returns `Ok(false)` when `html` is already the current content.
    pub fn set_content(&mut self, html: &str) -> Result<bool, EditorError> {
        if html == self.html {
            return Ok(false);
        }
        let doc = Document::from_html(html)?;
        let next = doc.to_html();
        if next == self.html {
            return Ok(false);
        }
        self.state.set_doc(doc);
        self.html = next;
        Ok(true)
    }

    pub fn select(&mut self, block: usize, anchor: usize, head: usize) -> bool {
        self.state.select(block, anchor, head)
    }

    pub fn select_all_in_block(&mut self, block: usize) -> bool {
        self.state.select_all_in_block(block)
    }

    pub fn move_to_end(&mut self) {
        self.state.move_to_end();
    }

    pub fn can(&self, command: &Command) -> bool {
        self.state.can(command)
    }

    /// Run `command`, emitting the new HTML if the document changed.
    pub fn run(&mut self, command: &Command) -> bool {
        if !self.state.apply(command) {
            return false;
        }
        let html = self.state.doc().to_html();
        if html != self.html {
            self.html = html;
            if let Some(handler) = self.on_change.as_mut() {
                handler(&self.html);
            }
        }
        true
    }

    /// Run a toolbar button against the current selection.
    pub fn run_action(&mut self, action: ToolbarAction, url: &str) -> bool {
        match action.command(url) {
            Some(command) => self.run(&command),
            None => false,
        }
    }

    pub fn character_count(&self) -> usize {
        self.state.doc().character_count()
    }

    fn is_active(&self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::Bold => self.state.is_mark_active(Mark::Bold),
            ToolbarAction::Italic => self.state.is_mark_active(Mark::Italic),
            ToolbarAction::Strike => self.state.is_mark_active(Mark::Strike),
            ToolbarAction::BulletList => self.state.is_list_active(ListKind::Bullet),
            ToolbarAction::OrderedList => self.state.is_list_active(ListKind::Ordered),
            ToolbarAction::TaskList => self.state.is_list_active(ListKind::Task),
            ToolbarAction::Link => self.state.is_link_active(),
            _ => false,
        }
    }

    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        ToolbarAction::ALL
            .into_iter()
            .map(|action| ToolbarButton {
                action,
                label: action.label(),
                enabled: action.command(ANY_URL).is_some_and(|c| self.state.can(&c)),
                active: self.is_active(action),
            })
            .collect()
    }

    /// `None` until the editor is mounted.
    pub fn view(&self) -> Option<EditorView> {
        if !self.is_mounted() {
            return None;
        }
        Some(EditorView {
            html: self.html.clone(),
            is_empty: self.state.doc().is_empty(),
            placeholder: self.config.placeholder.clone(),
            toolbar: self.toolbar(),
            character_count: self.config.character_limit.map(|limit| CharacterCount {
                characters: self.character_count(),
                limit,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::DEFAULT_CHARACTER_LIMIT;

    fn recording(content: &str) -> (Editor, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let editor = Editor::new(EditorConfig::default(), content)
            .unwrap()
            .on_change(move |html| sink.lock().unwrap().push(html.to_string()));
        (editor, seen)
    }

    #[test]
    fn view_is_none_until_mounted() {
        let mut editor = Editor::new(EditorConfig::default(), "").unwrap();
        assert!(editor.view().is_none());

        editor.mount();
        let view = editor.view().unwrap();
        assert!(view.is_empty);
        assert_eq!(view.placeholder, "Write something...");
        assert_eq!(view.html, "<p></p>");
        assert!(view.character_count.is_none());
    }

    #[test]
    fn edits_emit_the_new_html() {
        let (mut editor, seen) = recording("<p>a</p>");
        assert!(editor.run(&Command::InsertText("b".into())));
        assert_eq!(seen.lock().unwrap().as_slice(), ["<p>ab</p>"]);
    }

    #[test]
    fn commands_that_leave_the_html_alone_do_not_emit() {
        let (mut editor, seen) = recording("<p>a</p>");
        assert!(editor.run(&Command::ToggleBold));
        assert!(!editor.run(&Command::DeleteTable));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn set_content_does_not_emit() {
        let (mut editor, seen) = recording("<p>a</p>");
        assert!(editor.set_content("<p>b</p>").unwrap());
        assert_eq!(editor.html(), "<p>b</p>");
        assert!(!editor.set_content("<p>b</p>").unwrap());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn set_content_ignores_the_limit() {
        let config = EditorConfig::default().with_character_limit(2);
        let mut editor = Editor::new(config, "").unwrap();
        assert!(editor.set_content("<p>abcdef</p>").unwrap());
        assert_eq!(editor.character_count(), 6);
    }

    #[test]
    fn character_count_tracks_inserted_text() {
        let config = EditorConfig::default().with_character_limit(DEFAULT_CHARACTER_LIMIT);
        let mut editor = Editor::new(config, "").unwrap();
        for _ in 0..42 {
            assert!(editor.run(&Command::InsertText("x".into())));
        }
        assert_eq!(editor.character_count(), 42);

        editor.mount();
        let count = editor.view().unwrap().character_count.unwrap();
        assert_eq!(count.to_string(), "42/5000 characters");
    }

    #[test]
    fn toolbar_reflects_context() {
        let mut editor = Editor::new(EditorConfig::default(), "<p><strong>hi</strong></p>").unwrap();
        let toolbar = editor.toolbar();
        assert_eq!(toolbar.len(), ToolbarAction::ALL.len());

        let find = |toolbar: &[ToolbarButton], action| {
            toolbar.iter().find(|b| b.action == action).cloned().unwrap()
        };
        assert!(find(&toolbar, ToolbarAction::Bold).active);
        assert!(find(&toolbar, ToolbarAction::InsertTable).enabled);
        assert!(!find(&toolbar, ToolbarAction::AddRow).enabled);

        editor.select(0, 0, 0);
        assert!(editor.run(&Command::SplitBlock));
        editor.select(0, 0, 0);
        assert!(editor.run(&TOOLBAR_TABLE));
        let toolbar = editor.toolbar();
        assert!(!find(&toolbar, ToolbarAction::InsertTable).enabled);
        assert!(find(&toolbar, ToolbarAction::AddRow).enabled);
        assert!(find(&toolbar, ToolbarAction::DeleteRow).enabled);
    }

    #[test]
    fn toolbar_keys_round_trip() {
        for action in ToolbarAction::ALL {
            assert_eq!(ToolbarAction::from_key(action.key()), Some(action));
        }
        assert_eq!(ToolbarAction::from_key("heading"), None);
    }

    #[test]
    fn link_and_image_buttons_take_a_url() {
        let mut editor = Editor::new(EditorConfig::default(), "<p>docs</p>").unwrap();
        assert!(!find_button(&editor, ToolbarAction::Link).enabled);
        assert!(!editor.run_action(ToolbarAction::Image, "  "));

        editor.select_all_in_block(0);
        assert!(find_button(&editor, ToolbarAction::Link).enabled);
        assert!(editor.run_action(ToolbarAction::Link, "https://a.example"));
        assert!(editor.html().contains(r#"href="https://a.example""#));

        assert!(editor.run_action(ToolbarAction::Link, ""));
        assert_eq!(editor.html(), "<p>docs</p>");
    }

    fn find_button(editor: &Editor, action: ToolbarAction) -> ToolbarButton {
        editor
            .toolbar()
            .into_iter()
            .find(|b| b.action == action)
            .unwrap()
    }

    #[test]
    fn capabilities_include_the_count_only_with_a_limit() {
        let plain = EditorConfig::default();
        assert!(!plain.capabilities().contains(&Capability::CharacterCount));
        assert_eq!(plain.capabilities().len(), Capability::ALL.len() - 1);

        let limited = plain.with_character_limit(10);
        assert!(limited.capabilities().contains(&Capability::CharacterCount));
    }
}
