//! The `Flags:` table.

use std::cmp::Ordering;

use crate::case::kebab_case;
use crate::flags::FlagSchema;
use crate::help::columns::{ColumnSpec, ColumnWidth, TableOptions};
use crate::help::node::{Breakpoint, Content, FlagData, HelpNode, NodeKind, Table, TableLayout};

/// One row per flag, sorted by key, laid out by [`flag_breakpoints`].
pub fn flags_table(flags: &FlagSchema) -> Table {
    let mut keys: Vec<&String> = flags.keys().collect();
    keys.sort_by(|a, b| locale_compare(a, b));

    let aliases_enabled = flags.values().any(|spec| spec.alias.is_some());
    let rows = keys
        .into_iter()
        .map(|key| {
            let spec = &flags[key.as_str()];
            let data = FlagData {
                name: key.clone(),
                flag: spec.clone(),
                flag_formatted: format!("--{}", kebab_case(key)),
                aliases_enabled,
                alias_formatted: spec.alias.map(|alias| format!("-{alias}")),
            };
            vec![
                Content::from(HelpNode::new(NodeKind::FlagName(data.clone()))),
                Content::from(HelpNode::new(NodeKind::FlagDescription(data))),
            ]
        })
        .collect();

    Table::new(rows, TableLayout::Breakpoints(flag_breakpoints()))
}

/// Wide terminals get name and description side by side, medium ones get
/// the description on its own line, and narrow ones a fixed wide layout.
pub fn flag_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new(
            80,
            TableOptions::new(vec![
                ColumnSpec::new(ColumnWidth::ContentWidth).padding(2, 8),
                ColumnSpec::new(ColumnWidth::Auto),
            ]),
        ),
        Breakpoint::new(
            40,
            TableOptions::new(vec![
                ColumnSpec::new(ColumnWidth::Auto)
                    .padding(2, 8)
                    .preprocess(|text| text.trim().to_string()),
                ColumnSpec::new(ColumnWidth::Percent(100.0))
                    .padding(2, 0)
                    .padding_bottom(1),
            ]),
        ),
        Breakpoint::new(
            0,
            TableOptions::new(vec![
                ColumnSpec::new(ColumnWidth::ContentWidth).padding(2, 8),
                ColumnSpec::new(ColumnWidth::ContentWidth),
            ])
            .stdout_columns(1000),
        ),
    ]
}

/// Case-insensitive order with lower case first among otherwise equal keys.
fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a.to_lowercase().cmp(&b.to_lowercase());
    primary.then_with(|| {
        let swap = |s: &str| -> Vec<char> {
            s.chars()
                .map(|c| {
                    if c.is_uppercase() {
                        c.to_ascii_lowercase()
                    } else {
                        c.to_ascii_uppercase()
                    }
                })
                .collect()
        };
        swap(a).cmp(&swap(b))
    })
}
