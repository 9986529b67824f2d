//! Column layout for help tables.
//!
//! Cells are wrapped to their column width and padded. Columns that do not
//! fit next to the previous ones move to a following line group, so a row
//! may span several groups of lines.

use std::borrow::Cow;

use unicode_width::UnicodeWidthStr;

/// Minimum text width an `Auto` column needs to share a line group.
const AUTO_MIN_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    /// Widest cell of the column.
    ContentWidth,
    /// Share of whatever the other columns leave.
    #[default]
    Auto,
    /// Percentage of the available width, padding included.
    Percent(f32),
    /// Fixed text width, padding excluded.
    Fixed(usize),
}

#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    pub width: ColumnWidth,
    pub padding_left: usize,
    pub padding_right: usize,
    pub padding_top: usize,
    pub padding_bottom: usize,
    /// Applied to every cell of the column before measuring.
    pub preprocess: Option<fn(&str) -> String>,
}

impl ColumnSpec {
    pub fn new(width: ColumnWidth) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn padding(mut self, left: usize, right: usize) -> Self {
        self.padding_left = left;
        self.padding_right = right;
        self
    }

    pub fn padding_bottom(mut self, lines: usize) -> Self {
        self.padding_bottom = lines;
        self
    }

    pub fn padding_top(mut self, lines: usize) -> Self {
        self.padding_top = lines;
        self
    }

    pub fn preprocess(mut self, preprocess: fn(&str) -> String) -> Self {
        self.preprocess = Some(preprocess);
        self
    }

    fn horizontal_padding(&self) -> usize {
        self.padding_left + self.padding_right
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Missing entries default to `Auto` with no padding.
    pub columns: Vec<ColumnSpec>,
    /// Overrides the terminal width.
    pub stdout_columns: Option<usize>,
}

impl TableOptions {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            stdout_columns: None,
        }
    }

    pub fn stdout_columns(mut self, columns: usize) -> Self {
        self.stdout_columns = Some(columns);
        self
    }
}

/// Display width of `text`, ignoring ANSI escape sequences.
pub fn display_width(text: &str) -> usize {
    strip_ansi(text).width()
}

fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\u{1b}') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            // CSI: parameters and intermediates up to a final byte in @..~
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
    }
    Cow::Owned(out)
}

struct Column<'a> {
    spec: Cow<'a, ColumnSpec>,
    width: usize,
}

/// Lay out `rows` as text lines joined by `\n`, without a trailing newline.
///
/// `terminal_columns` is used unless the options fix `stdout_columns`;
/// `None` means unbounded.
pub fn layout<S: AsRef<str>>(
    rows: &[Vec<S>],
    options: &TableOptions,
    terminal_columns: Option<usize>,
) -> String {
    let available = options.stdout_columns.or(terminal_columns);
    let count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if count == 0 {
        return String::new();
    }

    let specs: Vec<Cow<'_, ColumnSpec>> = (0..count)
        .map(|i| match options.columns.get(i) {
            Some(spec) => Cow::Borrowed(spec),
            None => Cow::Owned(ColumnSpec::default()),
        })
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..count)
                .map(|i| {
                    let raw = row.get(i).map_or("", |cell| cell.as_ref());
                    match specs[i].preprocess {
                        Some(preprocess) => preprocess(raw),
                        None => raw.to_string(),
                    }
                })
                .collect()
        })
        .collect();

    let content_widths: Vec<usize> = (0..count)
        .map(|i| {
            cells
                .iter()
                .flat_map(|row| row[i].split('\n'))
                .map(display_width)
                .max()
                .unwrap_or(0)
        })
        .collect();

    let groups = group_columns(specs, &content_widths, available);

    let mut lines = Vec::new();
    for row in &cells {
        for group in &groups {
            render_group(row, group, &mut lines);
        }
    }
    lines.join("\n")
}

/// Assign widths and split columns into line groups that fit `available`.
fn group_columns<'a>(
    specs: Vec<Cow<'a, ColumnSpec>>,
    content_widths: &[usize],
    available: Option<usize>,
) -> Vec<Vec<(usize, Column<'a>)>> {
    let mut groups: Vec<Vec<(usize, Column<'a>)>> = Vec::new();
    let mut current: Vec<(usize, Column<'a>)> = Vec::new();
    let mut used = 0usize;

    for (i, spec) in specs.into_iter().enumerate() {
        let content = content_widths[i];
        let padding = spec.horizontal_padding();
        let width = match spec.width {
            ColumnWidth::ContentWidth => content,
            ColumnWidth::Fixed(width) => width,
            ColumnWidth::Percent(percent) => match available {
                Some(total) => {
                    let share = (total as f32 * percent / 100.0).floor() as usize;
                    share.saturating_sub(padding)
                }
                None => content,
            },
            ColumnWidth::Auto => content,
        };
        let needed = padding
            + match spec.width {
                ColumnWidth::Auto => width.min(AUTO_MIN_WIDTH),
                _ => width,
            };

        if let Some(total) = available {
            if !current.is_empty() && used + needed > total {
                groups.push(std::mem::take(&mut current));
                used = 0;
            }
        }
        used += needed;
        current.push((i, Column { spec, width }));
    }
    if !current.is_empty() {
        groups.push(current);
    }

    if let Some(total) = available {
        for group in &mut groups {
            fit_group(group, total);
        }
    }
    groups
}

/// Shrink `Auto` columns to the space left by the others, and clamp
/// anything still too wide.
fn fit_group(group: &mut [(usize, Column<'_>)], total: usize) {
    let fixed: usize = group
        .iter()
        .map(|(_, c)| match c.spec.width {
            ColumnWidth::Auto => c.spec.horizontal_padding(),
            _ => c.spec.horizontal_padding() + c.width,
        })
        .sum();
    let autos = group
        .iter()
        .filter(|(_, c)| c.spec.width == ColumnWidth::Auto)
        .count();
    if autos > 0 {
        let share = (total.saturating_sub(fixed) / autos).max(1);
        for (_, column) in group.iter_mut() {
            if column.spec.width == ColumnWidth::Auto {
                column.width = column.width.min(share);
            }
        }
    }

    let used: usize = group
        .iter()
        .map(|(_, c)| c.spec.horizontal_padding() + c.width)
        .sum();
    if used > total {
        if let Some((_, widest)) = group.iter_mut().max_by_key(|(_, c)| c.width) {
            let excess = used - total;
            widest.width = widest.width.saturating_sub(excess).max(1);
        }
    }
}

fn wrap_cell(text: &str, column: &Column<'_>) -> Vec<String> {
    let mut lines = vec![String::new(); column.spec.padding_top];
    for line in text.split('\n') {
        if column.width == 0 || display_width(line) <= column.width {
            lines.push(line.to_string());
        } else {
            lines.extend(
                textwrap::wrap(line, column.width)
                    .into_iter()
                    .map(Cow::into_owned),
            );
        }
    }
    lines.extend(std::iter::repeat_n(String::new(), column.spec.padding_bottom));
    lines
}

fn render_group(row: &[String], group: &[(usize, Column<'_>)], out: &mut Vec<String>) {
    let wrapped: Vec<Vec<String>> = group
        .iter()
        .map(|(i, column)| wrap_cell(&row[*i], column))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(0);

    for line in 0..height {
        let mut text = String::new();
        for (index, (_, column)) in group.iter().enumerate() {
            let cell = wrapped[index].get(line).map_or("", String::as_str);
            let last = index + 1 == group.len();
            if last {
                if !cell.is_empty() {
                    text.push_str(&" ".repeat(column.spec.padding_left));
                    text.push_str(cell);
                }
            } else {
                let fill = column.width.saturating_sub(display_width(cell));
                text.push_str(&" ".repeat(column.spec.padding_left));
                text.push_str(cell);
                text.push_str(&" ".repeat(fill + column.spec.padding_right));
            }
        }
        out.push(text);
    }
}
