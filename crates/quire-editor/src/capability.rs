//! The fixed editor feature set.

use std::fmt;

/// One editor feature. The set is static per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Bold,
    Italic,
    Strike,
    BulletList,
    OrderedList,
    TaskList,
    Link,
    Image,
    Table,
    Placeholder,
    CharacterCount,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::Bold,
        Capability::Italic,
        Capability::Strike,
        Capability::BulletList,
        Capability::OrderedList,
        Capability::TaskList,
        Capability::Link,
        Capability::Image,
        Capability::Table,
        Capability::Placeholder,
        Capability::CharacterCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::Bold => "bold",
            Capability::Italic => "italic",
            Capability::Strike => "strike",
            Capability::BulletList => "bulletList",
            Capability::OrderedList => "orderedList",
            Capability::TaskList => "taskList",
            Capability::Link => "link",
            Capability::Image => "image",
            Capability::Table => "table",
            Capability::Placeholder => "placeholder",
            Capability::CharacterCount => "characterCount",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
