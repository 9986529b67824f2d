//! Builds the help document of a program or command.

use crate::help::columns::{ColumnSpec, ColumnWidth};
use crate::help::flags_table::flags_table;
use crate::help::node::{Content, HelpNode, Section, Table, TableLayout};
use crate::options::{ProgramSpec, Usage};
use crate::parameters::usage_patterns;

/// Help nodes in display order: name, description, usage, commands, flags,
/// examples, aliases. Sections with nothing to show are left out.
pub fn generate_help(program: &ProgramSpec) -> Vec<HelpNode> {
    [
        name_and_version(program),
        description(program),
        usage(program),
        commands(program),
        flags(program),
        examples(program),
        aliases(program),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn name_and_version(program: &ProgramSpec) -> Option<HelpNode> {
    let mut parts = Vec::with_capacity(2);
    if let Some(name) = program.full_name() {
        parts.push(name);
    }
    if let Some(version) = program.display_version().filter(|v| !v.is_empty()) {
        parts.push(format!("v{version}"));
    }
    if parts.is_empty() {
        return None;
    }
    Some(HelpNode::text(format!("{}\n", parts.join(" "))).with_id("name"))
}

fn description(program: &ProgramSpec) -> Option<HelpNode> {
    let description = program
        .help
        .options()?
        .description
        .as_deref()
        .filter(|d| !d.is_empty())?;
    Some(HelpNode::text(format!("{description}\n")).with_id("description"))
}

fn usage_section(body: String) -> HelpNode {
    HelpNode::section(Section::new("Usage:", body)).with_id("usage")
}

fn usage(program: &ProgramSpec) -> Option<HelpNode> {
    match program.help.options().and_then(|h| h.usage.as_ref()) {
        Some(Usage::Disabled) => return None,
        Some(Usage::Lines(lines)) if lines.is_empty() => return None,
        Some(Usage::Lines(lines)) => return Some(usage_section(lines.join("\n"))),
        None => {}
    }

    let name = program.full_name()?;
    let mut usages = Vec::new();

    let mut line = vec![name];
    if !program.flags.is_empty() {
        line.push("[flags...]".to_string());
    }
    if !program.parameters.is_empty() {
        line.push(usage_patterns(&program.parameters));
    }
    if line.len() > 1 {
        usages.push(line.join(" "));
    }

    if !program.commands.is_empty() {
        if let Some(name) = &program.name {
            usages.push(format!("{name} <command>"));
        }
    }

    if usages.is_empty() {
        return None;
    }
    Some(usage_section(usages.join("\n")))
}

fn commands(program: &ProgramSpec) -> Option<HelpNode> {
    if program.commands.is_empty() {
        return None;
    }
    let rows = program
        .commands
        .iter()
        .map(|command| {
            vec![
                Content::from(command.name.as_str()),
                Content::from(command.description.clone().unwrap_or_default()),
            ]
        })
        .collect();
    let table = Table::new(
        rows,
        TableLayout::columns(vec![
            ColumnSpec::new(ColumnWidth::ContentWidth).padding(2, 8),
        ]),
    );
    Some(
        HelpNode::section(Section::new("Commands:", HelpNode::table(table)).indent_body(0))
            .with_id("commands"),
    )
}

fn flags(program: &ProgramSpec) -> Option<HelpNode> {
    if program.flags.is_empty() {
        return None;
    }
    let table = flags_table(&program.flags);
    Some(
        HelpNode::section(Section::new("Flags:", HelpNode::table(table)).indent_body(0))
            .with_id("flags"),
    )
}

fn examples(program: &ProgramSpec) -> Option<HelpNode> {
    let examples = &program.help.options()?.examples;
    if examples.is_empty() {
        return None;
    }
    Some(HelpNode::section(Section::new("Examples:", examples.join("\n"))).with_id("examples"))
}

fn aliases(program: &ProgramSpec) -> Option<HelpNode> {
    if program.aliases.is_empty() {
        return None;
    }
    Some(
        HelpNode::section(Section::new("Aliases:", program.aliases.join(", ")))
            .with_id("aliases"),
    )
}
