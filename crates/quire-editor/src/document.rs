//! Document model: blocks of paragraphs, lists and tables holding marked inline content.
//!
//! Positions inside a paragraph count one per character, image, and hard break.
//! The same unit drives the character count.

/// Inline formatting toggled from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Strike,
}

/// The set of marks applied to a run of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub link: Option<String>,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Strike => self.strike,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Strike => self.strike = on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, marks: Marks },
    Image { src: String, alt: Option<String> },
    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Width in positions.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::Image { .. } | Inline::HardBreak => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn new(inlines: Vec<Inline>) -> Self {
        let mut paragraph = Self::default();
        for inline in inlines {
            paragraph.push(inline);
        }
        paragraph
    }

    pub fn len(&self) -> usize {
        self.inlines.iter().map(Inline::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    /// Plain text, images and breaks dropped.
    pub fn plain_text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append an inline node, merging text runs that carry the same marks.
    pub fn push(&mut self, inline: Inline) {
        if let Inline::Text { text, marks } = &inline {
            if text.is_empty() {
                return;
            }
            if let Some(Inline::Text {
                text: last,
                marks: last_marks,
            }) = self.inlines.last_mut()
            {
                if last_marks == marks {
                    last.push_str(text);
                    return;
                }
            }
        }
        self.inlines.push(inline);
    }

    /// Cut the paragraph at `pos`, returning everything after it.
    pub fn split_off(&mut self, pos: usize) -> Vec<Inline> {
        let mut offset = 0;
        for i in 0..self.inlines.len() {
            if pos <= offset {
                return self.inlines.split_off(i);
            }
            let len = self.inlines[i].len();
            if pos < offset + len {
                if let Inline::Text { text, marks } = &mut self.inlines[i] {
                    let byte = text
                        .char_indices()
                        .nth(pos - offset)
                        .map(|(b, _)| b)
                        .unwrap_or(text.len());
                    let head_marks = marks.clone();
                    let tail_text = text.split_off(byte);
                    let mut tail = self.inlines.split_off(i + 1);
                    tail.insert(0, Inline::text(tail_text, head_marks));
                    return tail;
                }
            }
            offset += len;
        }
        Vec::new()
    }

    fn append(&mut self, inlines: Vec<Inline>) {
        for inline in inlines {
            self.push(inline);
        }
    }

    /// Replace positions `from..to` with `insert`.
    pub fn replace(&mut self, from: usize, to: usize, insert: Vec<Inline>) {
        let tail = self.split_off(to);
        self.split_off(from);
        self.append(insert);
        self.append(tail);
    }

    /// Rewrite the marks of the text inside `from..to`.
    pub fn update_marks(&mut self, from: usize, to: usize, mut f: impl FnMut(&mut Marks)) {
        let tail = self.split_off(to);
        let mut middle = self.split_off(from);
        for inline in &mut middle {
            if let Inline::Text { marks, .. } = inline {
                f(marks);
            }
        }
        self.append(middle);
        self.append(tail);
    }

    /// Text runs overlapping `from..to`, with their marks.
    fn text_in(&self, from: usize, to: usize) -> impl Iterator<Item = &Marks> {
        let mut offset = 0;
        self.inlines.iter().filter_map(move |inline| {
            let start = offset;
            offset += inline.len();
            match inline {
                Inline::Text { marks, .. } if start < to && offset > from => Some(marks),
                _ => None,
            }
        })
    }

    /// True when `from..to` holds text and every run satisfies `pred`.
    pub fn every_text(&self, from: usize, to: usize, pred: impl Fn(&Marks) -> bool) -> bool {
        let mut any = false;
        for marks in self.text_in(from, to) {
            if !pred(marks) {
                return false;
            }
            any = true;
        }
        any
    }

    /// True when some text run inside `from..to` satisfies `pred`.
    pub fn some_text(&self, from: usize, to: usize, pred: impl Fn(&Marks) -> bool) -> bool {
        self.text_in(from, to).any(pred)
    }

    /// Marks a character typed at `pos` would inherit.
    pub fn marks_at(&self, pos: usize) -> Marks {
        let at = if pos > 0 { pos - 1 } else { 0 };
        let mut offset = 0;
        for inline in &self.inlines {
            let len = inline.len();
            if at < offset + len {
                return match inline {
                    Inline::Text { marks, .. } => marks.clone(),
                    _ => Marks::default(),
                };
            }
            offset += len;
        }
        Marks::default()
    }

    /// The full extent of the link touching `pos`.
    pub fn link_range(&self, pos: usize) -> Option<(usize, usize)> {
        let mut runs: Vec<(usize, usize, Option<&str>)> = Vec::new();
        let mut offset = 0;
        for inline in &self.inlines {
            let len = inline.len();
            let href = match inline {
                Inline::Text { marks, .. } => marks.link.as_deref(),
                _ => None,
            };
            runs.push((offset, offset + len, href));
            offset += len;
        }

        let hit = runs.iter().position(|(start, end, href)| {
            href.is_some() && *start <= pos && pos <= *end && start != end
        })?;
        let href = runs[hit].2;

        let mut first = hit;
        while first > 0 && runs[first - 1].2 == href {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < runs.len() && runs[last + 1].2 == href {
            last += 1;
        }
        Some((runs[first].0, runs[last].1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Only meaningful for task list items.
    pub checked: bool,
    pub blocks: Vec<Block>,
}

impl ListItem {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            checked: false,
            blocks: non_empty(blocks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub header: bool,
    pub blocks: Vec<Block>,
}

impl TableCell {
    pub fn empty(header: bool) -> Self {
        Self {
            header,
            blocks: vec![Block::Paragraph(Paragraph::default())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// An empty `rows` x `cols` table, the first row made of header cells if asked.
    pub fn new(rows: usize, cols: usize, with_header_row: bool) -> Self {
        let rows = (0..rows)
            .map(|r| TableRow {
                cells: (0..cols)
                    .map(|_| TableCell::empty(with_header_row && r == 0))
                    .collect(),
            })
            .collect();
        Self { rows }
    }

    /// Pad short rows so every row has the same number of cells.
    pub fn normalized(mut self) -> Self {
        let width = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        for row in &mut self.rows {
            while row.cells.len() < width {
                row.cells.push(TableCell::empty(false));
            }
        }
        self
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    List(List),
    Table(Table),
}

/// One step from a block container to a child container or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Block(usize),
    Item(usize),
    Cell { row: usize, col: usize },
}

/// Address of a paragraph: alternating block and item/cell steps, ending on a block.
pub type Path = Vec<Step>;

/// Ensure a container holds at least one paragraph.
pub(crate) fn non_empty(mut blocks: Vec<Block>) -> Vec<Block> {
    if blocks.is_empty() {
        blocks.push(Block::Paragraph(Paragraph::default()));
    }
    blocks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: non_empty(blocks),
        }
    }

    /// A single empty paragraph.
    pub fn is_empty(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Paragraph(p)] if p.is_empty())
    }

    /// Characters plus one per image or hard break; blocks add no separators.
    pub fn character_count(&self) -> usize {
        self.text_blocks()
            .iter()
            .filter_map(|path| self.paragraph(path))
            .map(Paragraph::len)
            .sum()
    }

    /// Paths of every paragraph in document order.
    pub fn text_blocks(&self) -> Vec<Path> {
        let mut out = Vec::new();
        collect_paragraphs(&self.blocks, &mut Vec::new(), &mut out);
        out
    }

    pub fn text_block_index(&self, path: &[Step]) -> Option<usize> {
        self.text_blocks().iter().position(|p| p.as_slice() == path)
    }

    pub fn blocks_at(&self, container: &[Step]) -> Option<&Vec<Block>> {
        blocks_at(&self.blocks, container)
    }

    pub fn blocks_at_mut(&mut self, container: &[Step]) -> Option<&mut Vec<Block>> {
        blocks_at_mut(&mut self.blocks, container)
    }

    pub fn block(&self, path: &[Step]) -> Option<&Block> {
        let (Step::Block(index), container) = path.split_last()? else {
            return None;
        };
        self.blocks_at(container)?.get(*index)
    }

    pub fn block_mut(&mut self, path: &[Step]) -> Option<&mut Block> {
        let (Step::Block(index), container) = path.split_last()? else {
            return None;
        };
        self.blocks_at_mut(container)?.get_mut(*index)
    }

    pub fn paragraph(&self, path: &[Step]) -> Option<&Paragraph> {
        match self.block(path)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn paragraph_mut(&mut self, path: &[Step]) -> Option<&mut Paragraph> {
        match self.block_mut(path)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, path: &[Step]) -> Option<&mut List> {
        match self.block_mut(path)? {
            Block::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, path: &[Step]) -> Option<&mut Table> {
        match self.block_mut(path)? {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }
}

fn collect_paragraphs(blocks: &[Block], prefix: &mut Path, out: &mut Vec<Path>) {
    for (i, block) in blocks.iter().enumerate() {
        prefix.push(Step::Block(i));
        match block {
            Block::Paragraph(_) => out.push(prefix.clone()),
            Block::List(list) => {
                for (j, item) in list.items.iter().enumerate() {
                    prefix.push(Step::Item(j));
                    collect_paragraphs(&item.blocks, prefix, out);
                    prefix.pop();
                }
            }
            Block::Table(table) => {
                for (row, table_row) in table.rows.iter().enumerate() {
                    for (col, cell) in table_row.cells.iter().enumerate() {
                        prefix.push(Step::Cell { row, col });
                        collect_paragraphs(&cell.blocks, prefix, out);
                        prefix.pop();
                    }
                }
            }
        }
        prefix.pop();
    }
}

fn blocks_at<'a>(blocks: &'a Vec<Block>, container: &[Step]) -> Option<&'a Vec<Block>> {
    match container {
        [] => Some(blocks),
        [Step::Block(i), Step::Item(j), rest @ ..] => match blocks.get(*i)? {
            Block::List(list) => blocks_at(&list.items.get(*j)?.blocks, rest),
            _ => None,
        },
        [Step::Block(i), Step::Cell { row, col }, rest @ ..] => match blocks.get(*i)? {
            Block::Table(table) => {
                blocks_at(&table.rows.get(*row)?.cells.get(*col)?.blocks, rest)
            }
            _ => None,
        },
        _ => None,
    }
}

fn blocks_at_mut<'a>(blocks: &'a mut Vec<Block>, container: &[Step]) -> Option<&'a mut Vec<Block>> {
    match container {
        [] => Some(blocks),
        [Step::Block(i), Step::Item(j), rest @ ..] => match blocks.get_mut(*i)? {
            Block::List(list) => blocks_at_mut(&mut list.items.get_mut(*j)?.blocks, rest),
            _ => None,
        },
        [Step::Block(i), Step::Cell { row, col }, rest @ ..] => match blocks.get_mut(*i)? {
            Block::Table(table) => blocks_at_mut(
                &mut table.rows.get_mut(*row)?.cells.get_mut(*col)?.blocks,
                rest,
            ),
            _ => None,
        },
        _ => None,
    }
}
