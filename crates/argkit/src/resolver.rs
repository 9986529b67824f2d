//! Maps positional tokens onto named parameters.

use std::collections::HashSet;
use std::ops::Index;

use indexmap::IndexMap;
use serde::Serialize;

use crate::case::camel_case;
use crate::error::{Error, Result};
use crate::parameters::{ParameterSpec, parse_parameters, split_segments};

/// Value bound to a named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Spread(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Spread(_) => None,
        }
    }

    /// Every token bound to the parameter.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Spread(values) => values,
        }
    }
}

/// Positional arguments of a parse.
///
/// Indexing yields the leftover tokens in argv order (including those after
/// `--`). Named parameter values are available by camel-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Arguments {
    tokens: Vec<String>,
    #[serde(rename = "--")]
    separated: Vec<String>,
    #[serde(flatten)]
    named: IndexMap<String, ParamValue>,
}

impl Arguments {
    pub(crate) fn new(tokens: Vec<String>, separated: Vec<String>) -> Self {
        Self {
            tokens,
            separated,
            named: IndexMap::new(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    /// Tokens given after `--`.
    pub fn separated(&self) -> &[String] {
        &self.separated
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.named.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(ParamValue::as_slice)
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn extend_named(&mut self, named: IndexMap<String, ParamValue>) {
        self.named.extend(named);
    }
}

impl Index<usize> for Arguments {
    type Output = String;

    fn index(&self, index: usize) -> &String {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Outcome of binding tokens to parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Camel-cased name -> value. Optional parameters without a token are
    /// absent.
    Complete(IndexMap<String, ParamValue>),
    /// A required parameter had no token; carries the name as written.
    Missing(String),
}

#[derive(Default)]
struct Binder {
    named: IndexMap<String, ParamValue>,
    seen: HashSet<String>,
}

impl Binder {
    /// Bind one segment. Returns the name of the first missing required
    /// parameter, if any.
    fn bind(&mut self, parameters: &[ParameterSpec], tokens: &[String]) -> Result<Option<String>> {
        for (i, parameter) in parameters.iter().enumerate() {
            let key = camel_case(&parameter.name);
            if !self.seen.insert(key.clone()) {
                return Err(Error::DuplicateParameter(parameter.name.clone()));
            }

            let value = if parameter.spread {
                let rest = tokens.get(i..).unwrap_or_default();
                Some(ParamValue::Spread(rest.to_vec()))
            } else {
                tokens.get(i).cloned().map(ParamValue::Single)
            };

            let missing = match &value {
                None => true,
                Some(ParamValue::Single(token)) => token.is_empty(),
                Some(ParamValue::Spread(tokens)) => tokens.is_empty(),
            };
            if parameter.required && missing {
                return Ok(Some(parameter.name.clone()));
            }

            if let Some(value) = value {
                self.named.insert(key, value);
            }
            if parameter.spread {
                break;
            }
        }
        Ok(None)
    }
}

/// Bind `positionals` to `patterns`.
///
/// When the patterns contain a `--` with patterns after it, the tokens after
/// the argv separator (`separated`, the tail of `positionals`) feed the
/// second segment and the rest feed the first. Otherwise every positional
/// feeds the single segment.
pub fn resolve_parameters<S: AsRef<str>>(
    patterns: &[S],
    positionals: &[String],
    separated: &[String],
) -> Result<Resolution> {
    let (before, after) = split_segments(patterns);
    let mut binder = Binder::default();

    let leading = match after {
        Some(_) => &positionals[..positionals.len().saturating_sub(separated.len())],
        None => positionals,
    };
    if let Some(missing) = binder.bind(&parse_parameters(before)?, leading)? {
        return Ok(Resolution::Missing(missing));
    }

    if let Some(after) = after {
        if let Some(missing) = binder.bind(&parse_parameters(after)?, separated)? {
            return Ok(Resolution::Missing(missing));
        }
    }

    Ok(Resolution::Complete(binder.named))
}
