//! Turns help nodes into text.
//!
//! [`Renderers`] is a table of functions, one per node kind. Every function
//! receives the table itself, so replacing one entry (say `flag_operator`)
//! changes the output of every renderer that calls it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;
use crate::flags::{FlagType, FlagValue};
use crate::help::columns;
use crate::help::node::{Content, FlagData, HelpNode, NodeKind, Section, Table};
use crate::terminal::Terminal;

pub type TextFn = Arc<dyn Fn(&Renderers, &str) -> String + Send + Sync>;
pub type IndentFn = Arc<dyn Fn(&Renderers, &str, usize) -> String + Send + Sync>;
pub type SectionFn = Arc<dyn Fn(&Renderers, &Section) -> Result<String, RenderError> + Send + Sync>;
pub type TableFn = Arc<dyn Fn(&Renderers, &Table) -> Result<String, RenderError> + Send + Sync>;
pub type FlagParameterFn = Arc<dyn Fn(&Renderers, &FlagType) -> String + Send + Sync>;
pub type FlagOperatorFn = Arc<dyn Fn(&Renderers) -> String + Send + Sync>;
pub type FlagDefaultFn = Arc<dyn Fn(&Renderers, &FlagValue) -> String + Send + Sync>;
pub type FlagDataFn = Arc<dyn Fn(&Renderers, &FlagData) -> String + Send + Sync>;
pub type CustomFn =
    Arc<dyn Fn(&Renderers, &serde_json::Value) -> Result<String, RenderError> + Send + Sync>;

/// Renderer table for one help rendering pass.
#[derive(Clone)]
pub struct Renderers {
    pub text: TextFn,
    /// ANSI bold when color is on, upper case otherwise.
    pub bold: TextFn,
    pub heading: TextFn,
    pub indent_text: IndentFn,
    pub section: SectionFn,
    pub table: TableFn,
    /// Placeholder for a flag's value type (`<string>`).
    pub flag_parameter: FlagParameterFn,
    /// Separator between a flag name and its placeholder.
    pub flag_operator: FlagOperatorFn,
    pub flag_name: FlagDataFn,
    pub flag_default: FlagDefaultFn,
    pub flag_description: FlagDataFn,
    /// Renderers for [`NodeKind::Custom`] nodes, by name.
    pub custom: HashMap<String, CustomFn>,
    pub terminal: Terminal,
}

impl Renderers {
    pub fn new(terminal: Terminal) -> Self {
        Self {
            text: Arc::new(|_: &Renderers, text: &str| text.to_string()),
            bold: Arc::new(default_bold),
            heading: Arc::new(|r: &Renderers, text: &str| (r.bold)(r, text)),
            indent_text: Arc::new(|_: &Renderers, text: &str, spaces: usize| indent(text, spaces)),
            section: Arc::new(default_section),
            table: Arc::new(default_table),
            flag_parameter: Arc::new(default_flag_parameter),
            flag_operator: Arc::new(|_: &Renderers| " ".to_string()),
            flag_name: Arc::new(default_flag_name),
            flag_default: Arc::new(|_: &Renderers, value: &FlagValue| value.to_json().to_string()),
            flag_description: Arc::new(default_flag_description),
            custom: HashMap::new(),
            terminal,
        }
    }

    /// Register a renderer for custom nodes named `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, render: F)
    where
        F: Fn(&Renderers, &serde_json::Value) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(render));
    }

    pub fn with_overrides(mut self, overrides: RendererOverrides) -> Self {
        let RendererOverrides {
            text,
            bold,
            heading,
            indent_text,
            section,
            table,
            flag_parameter,
            flag_operator,
            flag_name,
            flag_default,
            flag_description,
            custom,
        } = overrides;
        if let Some(f) = text {
            self.text = f;
        }
        if let Some(f) = bold {
            self.bold = f;
        }
        if let Some(f) = heading {
            self.heading = f;
        }
        if let Some(f) = indent_text {
            self.indent_text = f;
        }
        if let Some(f) = section {
            self.section = f;
        }
        if let Some(f) = table {
            self.table = f;
        }
        if let Some(f) = flag_parameter {
            self.flag_parameter = f;
        }
        if let Some(f) = flag_operator {
            self.flag_operator = f;
        }
        if let Some(f) = flag_name {
            self.flag_name = f;
        }
        if let Some(f) = flag_default {
            self.flag_default = f;
        }
        if let Some(f) = flag_description {
            self.flag_description = f;
        }
        self.custom.extend(custom);
        self
    }

    /// Render nodes, joined by newlines.
    pub fn render(&self, nodes: &[HelpNode]) -> Result<String, RenderError> {
        let rendered = nodes
            .iter()
            .map(|node| self.render_node(node))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join("\n"))
    }

    pub fn render_node(&self, node: &HelpNode) -> Result<String, RenderError> {
        match &node.kind {
            NodeKind::Text(text) => Ok((self.text)(self, text)),
            NodeKind::Bold(text) => Ok((self.bold)(self, text)),
            NodeKind::Heading(text) => Ok((self.heading)(self, text)),
            NodeKind::IndentText { text, spaces } => Ok((self.indent_text)(self, text, *spaces)),
            NodeKind::Section(section) => (self.section)(self, section),
            NodeKind::Table(table) => (self.table)(self, table),
            NodeKind::FlagName(data) => Ok((self.flag_name)(self, data)),
            NodeKind::FlagDescription(data) => Ok((self.flag_description)(self, data)),
            NodeKind::Custom { renderer, data } => {
                let render = self
                    .custom
                    .get(renderer)
                    .ok_or_else(|| RenderError::UnknownNode(renderer.clone()))?;
                render(self, data)
            }
        }
    }

    pub fn render_content(&self, content: &Content) -> Result<String, RenderError> {
        match content {
            Content::Text(text) => Ok(text.clone()),
            Content::Node(node) => self.render_node(node),
            Content::Nodes(nodes) => self.render(nodes),
        }
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<_> = self.custom.keys().collect();
        custom.sort();
        f.debug_struct("Renderers")
            .field("custom", &custom)
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

/// Partial replacement of the default renderers.
#[derive(Clone, Default)]
pub struct RendererOverrides {
    pub text: Option<TextFn>,
    pub bold: Option<TextFn>,
    pub heading: Option<TextFn>,
    pub indent_text: Option<IndentFn>,
    pub section: Option<SectionFn>,
    pub table: Option<TableFn>,
    pub flag_parameter: Option<FlagParameterFn>,
    pub flag_operator: Option<FlagOperatorFn>,
    pub flag_name: Option<FlagDataFn>,
    pub flag_default: Option<FlagDefaultFn>,
    pub flag_description: Option<FlagDataFn>,
    pub custom: HashMap<String, CustomFn>,
}

impl RendererOverrides {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.bold.is_none()
            && self.heading.is_none()
            && self.indent_text.is_none()
            && self.section.is_none()
            && self.table.is_none()
            && self.flag_parameter.is_none()
            && self.flag_operator.is_none()
            && self.flag_name.is_none()
            && self.flag_default.is_none()
            && self.flag_description.is_none()
            && self.custom.is_empty()
    }
}

impl fmt::Debug for RendererOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererOverrides")
            .field("is_empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}

fn default_bold(r: &Renderers, text: &str) -> String {
    if r.terminal.color {
        format!("\u{1b}[1m{text}\u{1b}[22m")
    } else {
        text.to_uppercase()
    }
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.split('\n')
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_section(r: &Renderers, section: &Section) -> Result<String, RenderError> {
    let mut out = String::new();
    if let Some(title) = section.title.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&(r.heading)(r, title));
        out.push('\n');
    }
    if let Some(body) = section.body.as_ref().filter(|b| !b.is_blank()) {
        let body = r.render_content(body)?;
        out.push_str(&(r.indent_text)(r, &body, section.indent_body));
    }
    out.push('\n');
    Ok(out)
}

fn default_table(r: &Renderers, table: &Table) -> Result<String, RenderError> {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| r.render_content(cell))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let options = table.layout.resolve(r.terminal.columns);
    Ok(columns::layout(&rows, &options, r.terminal.columns))
}

fn default_flag_parameter(r: &Renderers, kind: &FlagType) -> String {
    match kind {
        FlagType::Boolean => String::new(),
        FlagType::String => "<string>".to_string(),
        FlagType::Number => "<number>".to_string(),
        FlagType::Array(inner) => (r.flag_parameter)(r, inner),
        FlagType::Custom(_) => "<value>".to_string(),
    }
}

fn default_flag_name(r: &Renderers, data: &FlagData) -> String {
    let mut out = String::new();
    if let Some(alias) = &data.alias_formatted {
        out.push_str(alias);
        out.push_str(", ");
    } else if data.aliases_enabled {
        out.push_str("    ");
    }
    out.push_str(&data.flag_formatted);

    let placeholder = match &data.flag.placeholder {
        Some(placeholder) => placeholder.clone(),
        None => (r.flag_parameter)(r, &data.flag.kind),
    };
    if !placeholder.is_empty() || data.flag.placeholder.is_some() {
        out.push_str(&(r.flag_operator)(r));
        out.push_str(&placeholder);
    }
    out
}

fn default_flag_description(r: &Renderers, data: &FlagData) -> String {
    let mut out = data.flag.description.clone().unwrap_or_default();
    if let Some(default) = &data.flag.default {
        let value = default.resolve();
        if value.is_truthy() {
            out.push_str(" (default: ");
            out.push_str(&(r.flag_default)(r, &value));
            out.push(')');
        }
    }
    out
}
