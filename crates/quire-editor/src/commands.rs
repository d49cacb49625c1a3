//! Editing commands over a [`Document`] and a [`Selection`].
//!
//! Every command is checked with [`EditorState::can`] before it runs, and
//! runs against a copy of the state so a failed step never leaves a
//! half-applied edit behind.

use crate::document::{
    Block, Document, Inline, List, ListItem, ListKind, Mark, Marks, Paragraph, Path, Step, Table,
    TableCell, TableRow,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    ToggleStrike,
    ToggleBulletList,
    ToggleOrderedList,
    ToggleTaskList,
    ToggleTaskChecked,
    /// An empty href removes the link instead.
    SetLink(String),
    UnsetLink,
    InsertImage(String),
    InsertTable {
        rows: usize,
        cols: usize,
        with_header_row: bool,
    },
    AddColumnAfter,
    AddRowAfter,
    DeleteColumn,
    DeleteRow,
    DeleteTable,
    InsertText(String),
    SplitBlock,
}

/// A range inside one text block, addressed by its document-order index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub block: usize,
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(block: usize, pos: usize) -> Self {
        Self {
            block,
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(block: usize, anchor: usize, head: usize) -> Self {
        Self {
            block,
            anchor,
            head,
        }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// The container closest to a paragraph.
enum Context {
    Root,
    Item {
        list: Path,
        item: usize,
        rest: Path,
    },
    Cell,
}

fn context(path: &[Step]) -> Context {
    let nearest = path
        .iter()
        .enumerate()
        .rev()
        .find(|(_, step)| !matches!(step, Step::Block(_)));
    match nearest {
        Some((i, Step::Item(item))) => Context::Item {
            list: path[..i].to_vec(),
            item: *item,
            rest: path[i + 1..].to_vec(),
        },
        Some((_, Step::Cell { .. })) => Context::Cell,
        _ => Context::Root,
    }
}

/// Innermost table cell around `path`: the table's path, row and column.
fn enclosing_cell(path: &[Step]) -> Option<(Path, usize, usize)> {
    path.iter()
        .enumerate()
        .rev()
        .find_map(|(i, step)| match step {
            Step::Cell { row, col } => Some((path[..i].to_vec(), *row, *col)),
            _ => None,
        })
}

fn split_block_step(path: &[Step]) -> Option<(usize, &[Step])> {
    match path.split_last()? {
        (Step::Block(index), container) => Some((*index, container)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
    stored_marks: Option<Marks>,
    limit: Option<usize>,
}

impl EditorState {
    /// State with the cursor at the end of the document.
    pub fn new(doc: Document, limit: Option<usize>) -> Self {
        let mut state = Self {
            doc,
            selection: Selection::default(),
            stored_marks: None,
            limit,
        };
        state.move_to_end();
        state
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Replace the whole document. Not subject to the character limit.
    pub fn set_doc(&mut self, doc: Document) {
        self.doc = doc;
        self.stored_marks = None;
        self.move_to_end();
    }

    /// Select `anchor..head` in text block `block`, clamping positions to the block.
    pub fn select(&mut self, block: usize, anchor: usize, head: usize) -> bool {
        let Some(len) = self.block_len(block) else {
            return false;
        };
        self.selection = Selection::range(block, anchor.min(len), head.min(len));
        self.stored_marks = None;
        true
    }

    pub fn select_all_in_block(&mut self, block: usize) -> bool {
        match self.block_len(block) {
            Some(len) => self.select(block, 0, len),
            None => false,
        }
    }

    pub fn move_to_end(&mut self) {
        let last = self.doc.text_blocks().len().saturating_sub(1);
        let len = self.block_len(last).unwrap_or(0);
        self.selection = Selection::cursor(last, len);
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        let path = self.doc.text_blocks().into_iter().nth(block)?;
        self.doc.paragraph(&path).map(Paragraph::len)
    }

    fn path(&self) -> Option<Path> {
        self.doc.text_blocks().into_iter().nth(self.selection.block)
    }

    fn paragraph(&self) -> Option<&Paragraph> {
        self.doc.paragraph(&self.path()?)
    }

    /// Marks the next typed character would carry.
    fn pending_marks(&self) -> Marks {
        if let Some(marks) = &self.stored_marks {
            return marks.clone();
        }
        let Some(paragraph) = self.paragraph() else {
            return Marks::default();
        };
        if self.selection.is_empty() {
            paragraph.marks_at(self.selection.from())
        } else {
            paragraph.marks_at(self.selection.from() + 1)
        }
    }

    fn within_limit(&self, added: usize, removed: usize) -> bool {
        let Some(limit) = self.limit else {
            return true;
        };
        let current = self.doc.character_count();
        let next = current.saturating_sub(removed) + added;
        next <= limit || next <= current
    }

    fn task_item(&self, path: &[Step]) -> Option<(Path, usize)> {
        let Context::Item { list, item, .. } = context(path) else {
            return None;
        };
        match self.doc.block(&list)? {
            Block::List(l) if l.kind == ListKind::Task && item < l.items.len() => Some((list, item)),
            _ => None,
        }
    }

    fn table_at(&self, path: &[Step]) -> Option<&Table> {
        match self.doc.block(path)? {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Whether `command` applies at the current selection.
    pub fn can(&self, command: &Command) -> bool {
        let Some(path) = self.path() else {
            return false;
        };
        let Some(paragraph) = self.doc.paragraph(&path) else {
            return false;
        };
        let (from, to) = (self.selection.from(), self.selection.to());

        match command {
            Command::ToggleBold | Command::ToggleItalic | Command::ToggleStrike => true,
            Command::ToggleBulletList | Command::ToggleOrderedList | Command::ToggleTaskList => {
                true
            }
            Command::ToggleTaskChecked => self.task_item(&path).is_some(),
            Command::SetLink(href) if href.trim().is_empty() => self.can(&Command::UnsetLink),
            Command::SetLink(_) => from < to || paragraph.link_range(from).is_some(),
            Command::UnsetLink => {
                if from < to {
                    paragraph.some_text(from, to, |m| m.link.is_some())
                } else {
                    paragraph.link_range(from).is_some()
                }
            }
            Command::InsertImage(src) => !src.trim().is_empty() && self.within_limit(1, to - from),
            Command::InsertTable { rows, cols, .. } => {
                *rows > 0 && *cols > 0 && enclosing_cell(&path).is_none()
            }
            Command::AddColumnAfter | Command::AddRowAfter | Command::DeleteTable => {
                enclosing_cell(&path).is_some()
            }
            Command::DeleteColumn => enclosing_cell(&path)
                .and_then(|(table, ..)| self.table_at(&table))
                .is_some_and(|t| t.column_count() > 1),
            Command::DeleteRow => enclosing_cell(&path)
                .and_then(|(table, ..)| self.table_at(&table))
                .is_some_and(|t| t.rows.len() > 1),
            Command::InsertText(text) => {
                (!text.is_empty() || from < to)
                    && self.within_limit(text.chars().count(), to - from)
            }
            Command::SplitBlock => true,
        }
    }

    /// Run `command`. Returns `false`, leaving the state untouched, when it does not apply.
    pub fn apply(&mut self, command: &Command) -> bool {
        if !self.can(command) {
            return false;
        }
        let mut next = self.clone();
        if next.exec(command).is_none() {
            tracing::debug!(?command, "Editor command did not apply");
            return false;
        }
        *self = next;
        true
    }

    fn exec(&mut self, command: &Command) -> Option<()> {
        match command {
            Command::ToggleBold => self.toggle_mark(Mark::Bold),
            Command::ToggleItalic => self.toggle_mark(Mark::Italic),
            Command::ToggleStrike => self.toggle_mark(Mark::Strike),
            Command::ToggleBulletList => self.toggle_list(ListKind::Bullet),
            Command::ToggleOrderedList => self.toggle_list(ListKind::Ordered),
            Command::ToggleTaskList => self.toggle_list(ListKind::Task),
            Command::ToggleTaskChecked => self.toggle_task_checked(),
            Command::SetLink(href) if href.trim().is_empty() => self.set_link(None),
            Command::SetLink(href) => self.set_link(Some(href.trim())),
            Command::UnsetLink => self.set_link(None),
            Command::InsertImage(src) => self.replace_selection(
                vec![Inline::Image {
                    src: src.trim().to_string(),
                    alt: None,
                }],
                1,
            ),
            Command::InsertTable {
                rows,
                cols,
                with_header_row,
            } => self.insert_table(*rows, *cols, *with_header_row),
            Command::AddColumnAfter => self.add_column_after(),
            Command::AddRowAfter => self.add_row_after(),
            Command::DeleteColumn => self.delete_column(),
            Command::DeleteRow => self.delete_row(),
            Command::DeleteTable => self.delete_table(),
            Command::InsertText(text) => {
                let marks = self.pending_marks();
                self.replace_selection(vec![Inline::text(text.as_str(), marks)], text.chars().count())
            }
            Command::SplitBlock => self.split_block(),
        }
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        if self.selection.is_empty() {
            return self.pending_marks().has(mark);
        }
        self.paragraph().is_some_and(|p| {
            p.every_text(self.selection.from(), self.selection.to(), |m| m.has(mark))
        })
    }

    pub fn is_link_active(&self) -> bool {
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let (from, to) = (self.selection.from(), self.selection.to());
        if from < to {
            paragraph.some_text(from, to, |m| m.link.is_some())
        } else {
            paragraph.marks_at(from).link.is_some()
        }
    }

    pub fn is_list_active(&self, kind: ListKind) -> bool {
        let Some(path) = self.path() else {
            return false;
        };
        let Context::Item { list, .. } = context(&path) else {
            return false;
        };
        matches!(self.doc.block(&list), Some(Block::List(l)) if l.kind == kind)
    }

    pub fn in_table(&self) -> bool {
        self.path().is_some_and(|p| enclosing_cell(&p).is_some())
    }

    fn focus(&mut self, path: &[Step], pos: usize) -> Option<()> {
        let index = self.doc.text_block_index(path)?;
        self.selection = Selection::cursor(index, pos);
        self.stored_marks = None;
        Some(())
    }

    /// Cursor at the start of the first text block under `prefix`.
    fn focus_within(&mut self, prefix: &[Step]) -> Option<()> {
        let index = self
            .doc
            .text_blocks()
            .iter()
            .position(|p| p.starts_with(prefix))?;
        self.selection = Selection::cursor(index, 0);
        self.stored_marks = None;
        Some(())
    }

    /// Point the selection at the paragraph now living at `path`, keeping offsets.
    fn follow(&mut self, path: &[Step]) -> Option<()> {
        self.selection.block = self.doc.text_block_index(path)?;
        Some(())
    }

    fn toggle_mark(&mut self, mark: Mark) -> Option<()> {
        let path = self.path()?;
        let (from, to) = (self.selection.from(), self.selection.to());

        if from == to {
            let mut marks = self.pending_marks();
            let on = !marks.has(mark);
            marks.set(mark, on);
            self.stored_marks = Some(marks);
            return Some(());
        }

        let paragraph = self.doc.paragraph_mut(&path)?;
        let on = !paragraph.every_text(from, to, |m| m.has(mark));
        paragraph.update_marks(from, to, |m| m.set(mark, on));
        Some(())
    }

    fn set_link(&mut self, href: Option<&str>) -> Option<()> {
        let path = self.path()?;
        let (from, to) = (self.selection.from(), self.selection.to());
        let paragraph = self.doc.paragraph_mut(&path)?;
        let (from, to) = if from < to {
            (from, to)
        } else {
            paragraph.link_range(from)?
        };
        paragraph.update_marks(from, to, |m| m.link = href.map(str::to_string));
        self.stored_marks = None;
        Some(())
    }

    fn replace_selection(&mut self, inlines: Vec<Inline>, width: usize) -> Option<()> {
        let path = self.path()?;
        let (from, to) = (self.selection.from(), self.selection.to());
        self.doc.paragraph_mut(&path)?.replace(from, to, inlines);
        self.selection = Selection::cursor(self.selection.block, from + width);
        self.stored_marks = None;
        Some(())
    }

    fn split_block(&mut self) -> Option<()> {
        let path = self.path()?;
        let (from, to) = (self.selection.from(), self.selection.to());

        let paragraph = self.doc.paragraph_mut(&path)?;
        paragraph.replace(from, to, Vec::new());
        let tail = Paragraph::new(paragraph.split_off(from));
        let head_empty = paragraph.is_empty();

        if let Context::Item { list, item, rest } = context(&path) {
            if let [Step::Block(b)] = rest.as_slice() {
                let list_block = self.doc.list_mut(&list)?;
                let current = list_block.items.get_mut(item)?;

                // Enter on an empty item leaves the list.
                if head_empty && tail.is_empty() && current.blocks.len() == 1 {
                    let lifted = self.lift_item(&list, item, &rest)?;
                    return self.focus(&lifted, 0);
                }

                let mut blocks = vec![Block::Paragraph(tail)];
                blocks.extend(current.blocks.split_off(b + 1));
                list_block.items.insert(item + 1, ListItem::new(blocks));

                let mut next = list;
                next.extend([Step::Item(item + 1), Step::Block(0)]);
                return self.focus(&next, 0);
            }
        }

        let (b, container) = split_block_step(&path)?;
        self.doc
            .blocks_at_mut(container)?
            .insert(b + 1, Block::Paragraph(tail));
        let mut next = container.to_vec();
        next.push(Step::Block(b + 1));
        self.focus(&next, 0)
    }

    /// Move item `item` of the list at `list_path` out to the list's container.
    /// Returns the new path of the paragraph that was at `rest` inside the item.
    fn lift_item(&mut self, list_path: &[Step], item: usize, rest: &[Step]) -> Option<Path> {
        let (list_index, container) = split_block_step(list_path)?;
        let blocks = self.doc.blocks_at_mut(container)?;
        let Block::List(List { kind, mut items }) = blocks.get(list_index)?.clone() else {
            return None;
        };
        if item >= items.len() {
            return None;
        }

        let after = items.split_off(item + 1);
        let lifted = items.pop()?;
        let before = items;

        let mut replacement = Vec::new();
        if !before.is_empty() {
            replacement.push(Block::List(List {
                kind,
                items: before,
            }));
        }
        let offset = replacement.len();
        replacement.extend(lifted.blocks);
        if !after.is_empty() {
            replacement.push(Block::List(List { kind, items: after }));
        }
        blocks.splice(list_index..=list_index, replacement);

        let (Step::Block(b), tail) = rest.split_first()? else {
            return None;
        };
        let mut path = container.to_vec();
        path.push(Step::Block(list_index + offset + b));
        path.extend_from_slice(tail);
        Some(path)
    }

    /// Lift out of a list of the same kind, retype a list of another kind, or wrap in a new list.
    fn toggle_list(&mut self, kind: ListKind) -> Option<()> {
        let path = self.path()?;

        let next = match context(&path) {
            Context::Item { list, item, rest } => {
                let current = self.doc.list_mut(&list)?;
                if current.kind == kind {
                    self.lift_item(&list, item, &rest)?
                } else {
                    current.kind = kind;
                    for list_item in &mut current.items {
                        list_item.checked = false;
                    }
                    path
                }
            }
            Context::Root | Context::Cell => {
                let (b, container) = split_block_step(&path)?;
                let block = self.doc.blocks_at_mut(container)?.get_mut(b)?;
                let paragraph = std::mem::replace(block, Block::Paragraph(Paragraph::default()));
                *block = Block::List(List {
                    kind,
                    items: vec![ListItem::new(vec![paragraph])],
                });
                let mut next = container.to_vec();
                next.extend([Step::Block(b), Step::Item(0), Step::Block(0)]);
                next
            }
        };

        self.follow(&next)
    }

    fn toggle_task_checked(&mut self) -> Option<()> {
        let path = self.path()?;
        let (list, item) = self.task_item(&path)?;
        let list_item = self.doc.list_mut(&list)?.items.get_mut(item)?;
        list_item.checked = !list_item.checked;
        Some(())
    }

    fn insert_table(&mut self, rows: usize, cols: usize, with_header_row: bool) -> Option<()> {
        let path = self.path()?;
        let replace = self.doc.paragraph(&path)?.is_empty();
        let (b, container) = split_block_step(&path)?;

        let table = Block::Table(Table::new(rows, cols, with_header_row));
        let blocks = self.doc.blocks_at_mut(container)?;
        let at = if replace {
            *blocks.get_mut(b)? = table;
            b
        } else {
            blocks.insert(b + 1, table);
            b + 1
        };

        let mut target = container.to_vec();
        target.push(Step::Block(at));
        self.focus_within(&target)
    }

    fn add_column_after(&mut self) -> Option<()> {
        let path = self.path()?;
        let (table_path, _, col) = enclosing_cell(&path)?;
        let table = self.doc.table_mut(&table_path)?;
        for row in &mut table.rows {
            let header = row.cells.get(col).is_some_and(|c| c.header);
            let at = (col + 1).min(row.cells.len());
            row.cells.insert(at, TableCell::empty(header));
        }
        self.follow(&path)
    }

    fn add_row_after(&mut self) -> Option<()> {
        let path = self.path()?;
        let (table_path, row, _) = enclosing_cell(&path)?;
        let table = self.doc.table_mut(&table_path)?;
        let cells = (0..table.column_count())
            .map(|_| TableCell::empty(false))
            .collect();
        table.rows.insert(row + 1, TableRow { cells });
        self.follow(&path)
    }

    fn delete_column(&mut self) -> Option<()> {
        let path = self.path()?;
        let (table_path, row, col) = enclosing_cell(&path)?;
        let table = self.doc.table_mut(&table_path)?;
        for table_row in &mut table.rows {
            if col < table_row.cells.len() {
                table_row.cells.remove(col);
            }
        }
        let col = col.min(table.column_count().checked_sub(1)?);

        let mut target = table_path;
        target.push(Step::Cell { row, col });
        self.focus_within(&target)
    }

    fn delete_row(&mut self) -> Option<()> {
        let path = self.path()?;
        let (table_path, row, col) = enclosing_cell(&path)?;
        let table = self.doc.table_mut(&table_path)?;
        if row >= table.rows.len() {
            return None;
        }
        table.rows.remove(row);
        let row = row.min(table.rows.len().checked_sub(1)?);

        let mut target = table_path;
        target.push(Step::Cell { row, col });
        self.focus_within(&target)
    }

    fn delete_table(&mut self) -> Option<()> {
        let path = self.path()?;
        let (table_path, ..) = enclosing_cell(&path)?;
        let first = self
            .doc
            .text_blocks()
            .iter()
            .position(|p| p.starts_with(&table_path))?;

        let (t, container) = split_block_step(&table_path)?;
        let blocks = self.doc.blocks_at_mut(container)?;
        if t >= blocks.len() {
            return None;
        }
        blocks.remove(t);
        if blocks.is_empty() {
            blocks.push(Block::Paragraph(Paragraph::default()));
        }

        let last = self.doc.text_blocks().len().saturating_sub(1);
        self.selection = Selection::cursor(first.min(last), 0);
        self.stored_marks = None;
        Some(())
    }
}
