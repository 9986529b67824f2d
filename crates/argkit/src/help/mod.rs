//! Help document generation and rendering.
//!
//! [`generate_help`] turns a [`ProgramSpec`](crate::ProgramSpec) into a list
//! of [`HelpNode`]s and [`Renderers`] turns nodes into text. A
//! [`HelpOptions::render`](crate::HelpOptions::render) hook sits between the
//! two and may rewrite the nodes or the renderers.

pub mod columns;
pub mod flags_table;
pub mod generate;
pub mod node;
pub mod renderers;

pub use columns::{ColumnSpec, ColumnWidth, TableOptions};
pub use flags_table::{flag_breakpoints, flags_table};
pub use generate::generate_help;
pub use node::{Breakpoint, Content, FlagData, HelpNode, NodeKind, Section, Table, TableLayout};
pub use renderers::{RendererOverrides, Renderers};

use crate::error::RenderError;
use crate::options::{ProgramSpec, RenderFn};
use crate::terminal::Terminal;

/// Generate and render help for `program`.
///
/// Renderer overrides from the program's help options are applied first;
/// `render` replaces the default rendering when given.
pub fn render_help(
    program: &ProgramSpec,
    render: Option<&RenderFn>,
    overrides: Option<&RendererOverrides>,
    terminal: Terminal,
) -> Result<String, RenderError> {
    let nodes = generate_help(program);
    let mut renderers = Renderers::new(terminal);
    if let Some(overrides) = overrides {
        renderers = renderers.with_overrides(overrides.clone());
    }
    match render {
        Some(render) => render(nodes, &mut renderers),
        None => renderers.render(&nodes),
    }
}
