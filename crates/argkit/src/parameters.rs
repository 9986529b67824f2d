//! Positional parameter patterns.
//!
//! A pattern is `<name>` (required) or `[name]` (optional), with a trailing
//! `...` on the name for a spread parameter. The literal `--` splits a list
//! into the part matched before the argv separator and the part matched after.

use crate::error::GrammarError;

const SEPARATOR: &str = "--";
const RESERVED: &[char] = &[
    '|', '\\', '{', '}', '(', ')', '[', ']', '^', '$', '+', '*', '?', '.',
];

/// One compiled parameter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Name as written, without brackets or spread suffix.
    pub name: String,
    pub required: bool,
    /// Consumes every remaining token of its segment.
    pub spread: bool,
}

/// Compile a pattern list, stopping at the first invalid pattern.
pub fn parse_parameters<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<ParameterSpec>, GrammarError> {
    let mut parsed = Vec::with_capacity(patterns.len());
    let mut optional: Option<&str> = None;
    let mut spread: Option<&str> = None;

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if let Some(spread) = spread {
            return Err(GrammarError::SpreadNotLast(spread.to_string()));
        }

        let (required, mut name) = if let Some(inner) = wrapped(pattern, '<', '>') {
            if let Some(optional) = optional {
                return Err(GrammarError::RequiredAfterOptional {
                    required: pattern.to_string(),
                    optional: optional.to_string(),
                });
            }
            (true, inner)
        } else if let Some(inner) = wrapped(pattern, '[', ']') {
            optional = Some(pattern);
            (false, inner)
        } else {
            return Err(GrammarError::NotWrapped(pattern.to_string()));
        };

        let is_spread = name.ends_with("...");
        if is_spread {
            spread = Some(pattern);
            name = &name[..name.len() - 3];
        }

        if let Some(character) = name.chars().find(|c| RESERVED.contains(c)) {
            return Err(GrammarError::InvalidCharacter {
                parameter: pattern.to_string(),
                character: character.to_string(),
            });
        }

        parsed.push(ParameterSpec {
            name: name.to_string(),
            required,
            spread: is_spread,
        });
    }

    Ok(parsed)
}

fn wrapped(pattern: &str, open: char, close: char) -> Option<&str> {
    if pattern.len() < 2 {
        return None;
    }
    pattern.strip_prefix(open)?.strip_suffix(close)
}

/// Split a pattern list at its first `--`.
///
/// Returns the whole list and `None` when there is no `--` or nothing
/// follows it; a trailing `--` then fails compilation as an unwrapped
/// pattern.
pub fn split_segments<S: AsRef<str>>(patterns: &[S]) -> (&[S], Option<&[S]>) {
    match patterns.iter().position(|p| p.as_ref() == SEPARATOR) {
        Some(index) if index + 1 < patterns.len() => {
            (&patterns[..index], Some(&patterns[index + 1..]))
        }
        _ => (patterns, None),
    }
}

/// Whether any required pattern follows the first `--`.
pub(crate) fn has_required_after_separator<S: AsRef<str>>(patterns: &[S]) -> bool {
    patterns
        .iter()
        .position(|p| p.as_ref() == SEPARATOR)
        .is_some_and(|index| {
            patterns[index + 1..]
                .iter()
                .any(|p| p.as_ref().starts_with('<'))
        })
}

/// Pattern list as shown in usage lines: `--` becomes `[--]` unless a
/// required pattern follows it.
pub(crate) fn usage_patterns<S: AsRef<str>>(patterns: &[S]) -> String {
    let required_after = has_required_after_separator(patterns);
    patterns
        .iter()
        .map(|p| match p.as_ref() {
            SEPARATOR if !required_after => "[--]",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
