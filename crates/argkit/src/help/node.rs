//! Help document nodes.
//!
//! The generator produces a flat list of [`HelpNode`]s; renderers turn each
//! one into text. Custom render hooks may edit the list before rendering.

use crate::flags::FlagSpec;
use crate::help::columns::{ColumnSpec, TableOptions};

/// One unit of the help document.
#[derive(Debug, Clone)]
pub struct HelpNode {
    /// Identifies generated sections (`name`, `usage`, `flags`, ...).
    pub id: Option<String>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Text(String),
    Bold(String),
    Heading(String),
    IndentText { text: String, spaces: usize },
    Section(Section),
    Table(Table),
    FlagName(FlagData),
    FlagDescription(FlagData),
    /// Rendered by the function registered under `renderer`.
    Custom {
        renderer: String,
        data: serde_json::Value,
    },
}

impl HelpNode {
    pub fn new(kind: NodeKind) -> Self {
        Self { id: None, kind }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(text.into()))
    }

    pub fn section(section: Section) -> Self {
        Self::new(NodeKind::Section(section))
    }

    pub fn table(table: Table) -> Self {
        Self::new(NodeKind::Table(table))
    }

    pub fn custom(renderer: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        Self::new(NodeKind::Custom {
            renderer: renderer.into(),
            data: data.into(),
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn as_section(&self) -> Option<&Section> {
        match &self.kind {
            NodeKind::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match &mut self.kind {
            NodeKind::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            NodeKind::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// Renderable content: plain text, a node, or a node list joined by newlines.
#[derive(Debug, Clone)]
pub enum Content {
    Text(String),
    Node(Box<HelpNode>),
    Nodes(Vec<HelpNode>),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&HelpNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Empty text renders as nothing.
    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<HelpNode> for Content {
    fn from(node: HelpNode) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<Vec<HelpNode>> for Content {
    fn from(nodes: Vec<HelpNode>) -> Self {
        Self::Nodes(nodes)
    }
}

/// Titled block with an indented body.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: Option<String>,
    pub body: Option<Content>,
    /// Spaces prepended to every body line.
    pub indent_body: usize,
}

impl Section {
    pub const DEFAULT_INDENT: usize = 2;

    pub fn new(title: impl Into<String>, body: impl Into<Content>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            indent_body: Self::DEFAULT_INDENT,
        }
    }

    pub fn indent_body(mut self, spaces: usize) -> Self {
        self.indent_body = spaces;
        self
    }

    /// The body's table, when the body is a table node.
    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match self.body.as_mut()? {
            Content::Node(node) => match &mut node.kind {
                NodeKind::Table(table) => Some(table),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Rows of cells laid out in columns.
#[derive(Debug, Clone)]
pub struct Table {
    pub rows: Vec<Vec<Content>>,
    pub layout: TableLayout,
}

impl Table {
    pub fn new(rows: Vec<Vec<Content>>, layout: TableLayout) -> Self {
        Self { rows, layout }
    }
}

#[derive(Debug, Clone)]
pub enum TableLayout {
    /// One layout regardless of terminal width.
    Columns(TableOptions),
    /// The first breakpoint whose threshold the width exceeds wins.
    Breakpoints(Vec<Breakpoint>),
}

impl TableLayout {
    pub fn columns(columns: Vec<ColumnSpec>) -> Self {
        Self::Columns(TableOptions::new(columns))
    }

    /// Options for a terminal `columns` wide; unknown width matches the
    /// first breakpoint.
    pub fn resolve(&self, columns: Option<usize>) -> TableOptions {
        match self {
            Self::Columns(options) => options.clone(),
            Self::Breakpoints(breakpoints) => breakpoints
                .iter()
                .find(|bp| columns.is_none_or(|width| width > bp.above))
                .map(|bp| bp.options.clone())
                .unwrap_or_default(),
        }
    }
}

/// Layout used when the terminal is wider than `above` columns.
#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub above: usize,
    pub options: TableOptions,
}

impl Breakpoint {
    pub fn new(above: usize, options: TableOptions) -> Self {
        Self { above, options }
    }
}

/// What the flag name and description renderers receive.
#[derive(Debug, Clone)]
pub struct FlagData {
    /// Schema key.
    pub name: String,
    pub flag: FlagSpec,
    /// `--kebab-name`.
    pub flag_formatted: String,
    /// Whether any flag in the same table has an alias.
    pub aliases_enabled: bool,
    /// `-a` when the flag has an alias.
    pub alias_formatted: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::columns::ColumnWidth;

    fn options(width: ColumnWidth) -> TableOptions {
        TableOptions::new(vec![ColumnSpec::new(width)])
    }

    fn first_width(options: &TableOptions) -> ColumnWidth {
        options.columns[0].width
    }

    #[test]
    fn breakpoints_pick_first_match() {
        let layout = TableLayout::Breakpoints(vec![
            Breakpoint::new(80, options(ColumnWidth::ContentWidth)),
            Breakpoint::new(40, options(ColumnWidth::Auto)),
            Breakpoint::new(0, options(ColumnWidth::Fixed(3))),
        ]);
        assert_eq!(first_width(&layout.resolve(None)), ColumnWidth::ContentWidth);
        assert_eq!(first_width(&layout.resolve(Some(81))), ColumnWidth::ContentWidth);
        assert_eq!(first_width(&layout.resolve(Some(80))), ColumnWidth::Auto);
        assert_eq!(first_width(&layout.resolve(Some(30))), ColumnWidth::Fixed(3));
        assert!(layout.resolve(Some(0)).columns.is_empty());
    }

    #[test]
    fn section_table_access() {
        let table = Table::new(Vec::new(), TableLayout::columns(Vec::new()));
        let mut section = Section::new("Flags:", HelpNode::table(table)).indent_body(0);
        assert!(section.table_mut().is_some());
        assert_eq!(section.indent_body, 0);

        let mut text = Section::new("Usage:", "pkg");
        assert!(text.table_mut().is_none());
        assert_eq!(text.body.as_ref().and_then(Content::as_text), Some("pkg"));
    }
}
