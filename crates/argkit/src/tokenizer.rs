//! Flag tokenizer.
//!
//! Splits raw argv into typed flag values, unknown flags and positional
//! tokens according to a [`FlagSchema`]. Supported forms:
//!
//! - `--name value`, `--name=value` (long names match the key or its
//!   kebab-case form)
//! - `-a value`, `-a=value`, `-avalue`
//! - clustered short booleans: `-abc`
//! - `--` stops flag parsing; the rest is positional and also recorded in the
//!   separated bucket

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::case::kebab_case;
use crate::error::{Error, Result};
use crate::flags::{FlagSchema, FlagSpec, FlagValue, Flags};

/// Classification of a token handed to an [`IgnoreFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgvKind {
    Argument,
    KnownFlag,
    UnknownFlag,
}

/// Returns `true` to drop a token from both flag and positional parsing.
pub type IgnoreFn = Arc<dyn Fn(ArgvKind, &str) -> bool + Send + Sync>;

/// Unknown flag name (as typed) -> every value it was given.
pub type UnknownFlags = IndexMap<String, Vec<FlagValue>>;

#[derive(Clone, Default)]
pub struct TokenizeOptions {
    /// Consulted for every token before the `--` separator.
    pub ignore: Option<IgnoreFn>,
    /// Keep unknown flags as positional tokens instead of recording them.
    pub unknown_as_arguments: bool,
}

/// Result of tokenizing argv.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub flags: Flags,
    pub unknown_flags: UnknownFlags,
    /// Every positional token, including those after `--`.
    pub positionals: Vec<String>,
    /// Tokens after the `--` separator.
    pub separated: Vec<String>,
}

struct Lookup<'s> {
    long: HashMap<String, &'s str>,
    short: HashMap<char, &'s str>,
    schema: &'s FlagSchema,
}

impl<'s> Lookup<'s> {
    fn new(schema: &'s FlagSchema) -> Self {
        let mut long = HashMap::new();
        let mut short = HashMap::new();
        for (key, spec) in schema {
            long.insert(key.clone(), key.as_str());
            long.entry(kebab_case(key)).or_insert(key.as_str());
            if let Some(alias) = spec.alias {
                short.insert(alias, key.as_str());
            }
        }
        Self {
            long,
            short,
            schema,
        }
    }

    fn long(&self, name: &str) -> Option<(&'s str, &'s FlagSpec)> {
        let key = *self.long.get(name)?;
        Some((key, &self.schema[key]))
    }

    fn short(&self, alias: char) -> Option<(&'s str, &'s FlagSpec)> {
        let key = *self.short.get(&alias)?;
        Some((key, &self.schema[key]))
    }
}

/// A token that should not be consumed as the value of a preceding flag.
///
/// Negative numbers such as `-7` or `-.5` are values. Only a digit or `.`
/// after the dash counts, so clusters like `-inf` stay flags.
fn looks_like_flag(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let numeric = rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && token.parse::<f64>().is_ok();
    !numeric
}

/// Whether a short cluster names an alias that is not in the schema. Stops at
/// an inline `=` or at the first value-taking flag, whose value is the rest.
fn has_unknown_short(lookup: &Lookup<'_>, cluster: &str) -> bool {
    for c in cluster.chars() {
        if c == '=' {
            return false;
        }
        match lookup.short(c) {
            None => return true,
            Some((_, spec)) if spec.kind.takes_value() => return false,
            Some(_) => {}
        }
    }
    false
}

fn record(tokenized: &mut Tokenized, key: &str, spec: &FlagSpec, raw: Option<&str>) -> Result<()> {
    let value = match raw {
        Some(raw) => spec.kind.parse(raw).map_err(Error::Flag)?,
        None if spec.kind.takes_value() => spec.kind.parse("").map_err(Error::Flag)?,
        None => FlagValue::Bool(true),
    };
    if spec.kind.is_array() {
        tokenized.flags.push(key, value);
    } else {
        tokenized.flags.set(key, value);
    }
    Ok(())
}

fn record_unknown(tokenized: &mut Tokenized, name: &str, raw: Option<&str>) {
    tracing::trace!(flag = name, "unknown flag");
    let value = raw.map_or(FlagValue::Bool(true), FlagValue::from);
    tokenized
        .unknown_flags
        .entry(name.to_string())
        .or_default()
        .push(value);
}

/// Tokenize `argv` against `schema`.
///
/// Absent flags take their declared default; absent array flags without a
/// default become empty lists. Errors only come from custom flag types.
pub fn tokenize<S: AsRef<str>>(
    schema: &FlagSchema,
    argv: &[S],
    options: &TokenizeOptions,
) -> Result<Tokenized> {
    let lookup = Lookup::new(schema);
    let ignored = |kind: ArgvKind, token: &str| {
        options
            .ignore
            .as_ref()
            .is_some_and(|ignore| ignore(kind, token))
    };

    let mut out = Tokenized::default();
    let mut i = 0usize;
    while i < argv.len() {
        let arg = argv[i].as_ref();

        if arg == "--" {
            for rest in &argv[i + 1..] {
                out.positionals.push(rest.as_ref().to_string());
                out.separated.push(rest.as_ref().to_string());
            }
            break;
        }

        if !looks_like_flag(arg) {
            if !ignored(ArgvKind::Argument, arg) {
                out.positionals.push(arg.to_string());
            }
            i += 1;
            continue;
        }

        if let Some(body) = arg.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };

            let Some((key, spec)) = lookup.long(name) else {
                if ignored(ArgvKind::UnknownFlag, arg) {
                    i += 1;
                    continue;
                }
                if options.unknown_as_arguments {
                    out.positionals.push(arg.to_string());
                } else {
                    record_unknown(&mut out, name, inline);
                }
                i += 1;
                continue;
            };

            if ignored(ArgvKind::KnownFlag, arg) {
                i += 1;
                continue;
            }

            // --key value (only for value-taking flags)
            let mut value = inline;
            if value.is_none() && spec.kind.takes_value() {
                if let Some(next) = argv.get(i + 1).map(AsRef::as_ref) {
                    if !looks_like_flag(next) && next != "--" {
                        value = Some(next);
                        i += 1;
                    }
                }
            }
            record(&mut out, key, spec, value)?;
            i += 1;
            continue;
        }

        // Short flags: -v, -o value, -o=value, -abc, -ofile
        let cluster = &arg[1..];
        let first = cluster.chars().next();
        let first_known = first.and_then(|c| lookup.short(c)).is_some();
        let kind = if first_known {
            ArgvKind::KnownFlag
        } else {
            ArgvKind::UnknownFlag
        };
        if ignored(kind, arg) {
            i += 1;
            continue;
        }
        if options.unknown_as_arguments && has_unknown_short(&lookup, cluster) {
            out.positionals.push(arg.to_string());
            i += 1;
            continue;
        }

        let mut consumed_next = false;
        for (offset, c) in cluster.char_indices() {
            let rest = &cluster[offset + c.len_utf8()..];
            let inline = rest.strip_prefix('=');

            let Some((key, spec)) = lookup.short(c) else {
                record_unknown(&mut out, &c.to_string(), inline);
                if inline.is_some() {
                    break;
                }
                continue;
            };

            if let Some(value) = inline {
                record(&mut out, key, spec, Some(value))?;
                break;
            }

            if spec.kind.takes_value() {
                if !rest.is_empty() {
                    record(&mut out, key, spec, Some(rest))?;
                } else {
                    let next = argv
                        .get(i + 1)
                        .map(AsRef::as_ref)
                        .filter(|next| !looks_like_flag(next) && *next != "--");
                    consumed_next = next.is_some();
                    record(&mut out, key, spec, next)?;
                }
                break;
            }

            record(&mut out, key, spec, None)?;
        }

        i += if consumed_next { 2 } else { 1 };
    }

    for (key, spec) in schema {
        if out.flags.contains(key) {
            continue;
        }
        if let Some(default) = &spec.default {
            out.flags.set(key, default.resolve());
        } else if spec.kind.is_array() {
            out.flags.set(key, FlagValue::List(Vec::new()));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagSpec, FlagType};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn schema(entries: &[(&str, FlagSpec)]) -> FlagSchema {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn run(schema: &FlagSchema, argv: &[&str]) -> Tokenized {
        tokenize(schema, argv, &TokenizeOptions::default()).unwrap()
    }

    #[test]
    fn long_flags_accept_key_and_kebab_names() {
        let schema = schema(&[
            ("flagA", FlagSpec::string()),
            ("flagB", FlagSpec::number()),
        ]);
        let t = run(&schema, &["--flagA", "valueA", "--flag-b=123", "rest"]);
        assert_eq!(t.flags.get_str("flagA"), Some("valueA"));
        assert_eq!(t.flags.get_f64("flagB"), Some(123.0));
        assert_eq!(t.positionals, vec!["rest"]);
    }

    #[test]
    fn boolean_does_not_consume_next_token() {
        let schema = schema(&[("verbose", FlagSpec::boolean())]);
        let t = run(&schema, &["--verbose", "file.txt"]);
        assert!(t.flags.is_set("verbose"));
        assert_eq!(t.positionals, vec!["file.txt"]);

        let t = run(&schema, &["--verbose=false"]);
        assert_eq!(t.flags.get_bool("verbose"), Some(false));
    }

    #[test]
    fn empty_and_negative_values() {
        let schema = schema(&[("value", FlagSpec::string()), ("n", FlagSpec::number())]);
        let t = run(&schema, &["--value=", "--n=-42"]);
        assert_eq!(t.flags.get_str("value"), Some(""));
        assert_eq!(t.flags.get_f64("n"), Some(-42.0));

        let t = run(&schema, &["--n", "-7"]);
        assert_eq!(t.flags.get_f64("n"), Some(-7.0));
    }

    #[test]
    fn word_like_numbers_are_short_clusters() {
        let schema = schema(&[
            ("interactive", FlagSpec::boolean().alias('i')),
            ("dryRun", FlagSpec::boolean().alias('n')),
            ("force", FlagSpec::boolean().alias('f')),
        ]);
        for cluster in ["-inf", "-nif", "-fin"] {
            let t = run(&schema, &[cluster]);
            assert_eq!(t.flags.get_bool("interactive"), Some(true), "{cluster}");
            assert_eq!(t.flags.get_bool("dryRun"), Some(true), "{cluster}");
            assert_eq!(t.flags.get_bool("force"), Some(true), "{cluster}");
            assert!(t.positionals.is_empty(), "{cluster}");
        }

        let t = run(&schema, &["-nan"]);
        assert_eq!(t.flags.get_bool("dryRun"), Some(true));
        assert_eq!(t.unknown_flags.get("a"), Some(&vec![FlagValue::Bool(true)]));
        assert!(t.positionals.is_empty());

        let t = run(&schema, &["-1.5", "-.5", "-"]);
        assert_eq!(t.positionals, ["-1.5", "-.5", "-"]);
    }

    #[test]
    fn value_flag_without_value_parses_empty() {
        let schema = schema(&[("out", FlagSpec::string()), ("v", FlagSpec::boolean())]);
        let t = run(&schema, &["--out", "--v"]);
        assert_eq!(t.flags.get_str("out"), Some(""));
        assert!(t.flags.is_set("v"));
    }

    #[test]
    fn short_clusters_and_attached_values() {
        let schema = schema(&[
            ("verbose", FlagSpec::boolean().alias('v')),
            ("output", FlagSpec::string().alias('o')),
            ("all", FlagSpec::boolean().alias('a')),
        ]);
        let t = run(&schema, &["-vaoout.txt", "in.txt"]);
        assert!(t.flags.is_set("verbose"));
        assert!(t.flags.is_set("all"));
        assert_eq!(t.flags.get_str("output"), Some("out.txt"));
        assert_eq!(t.positionals, vec!["in.txt"]);

        let t = run(&schema, &["-o", "x", "-o=y"]);
        assert_eq!(t.flags.get_str("output"), Some("y"));
    }

    #[test]
    fn arrays_accumulate_and_default_empty() {
        let schema = schema(&[
            ("include", FlagType::array(FlagType::String).into()),
            ("tag", FlagType::array(FlagType::String).into()),
        ]);
        let t = run(&schema, &["--include", "a", "--include=b"]);
        assert_eq!(
            t.flags.get_list("include"),
            Some(&[FlagValue::from("a"), FlagValue::from("b")][..])
        );
        assert_eq!(t.flags.get_list("tag"), Some(&[][..]));
    }

    #[test]
    fn defaults_fill_absent_flags() {
        let schema = schema(&[
            ("time", FlagSpec::string().default_value("morning")),
            ("width", FlagSpec::number().default_value(550.0)),
        ]);
        let t = run(&schema, &["--time", "evening"]);
        assert_eq!(t.flags.get_str("time"), Some("evening"));
        assert_eq!(t.flags.get_f64("width"), Some(550.0));
    }

    #[test]
    fn unknown_flags_are_recorded_by_name() {
        let schema = FlagSchema::new();
        let t = run(&schema, &["--version", "--foo=bar", "-x", "arg"]);
        assert_eq!(t.unknown_flags["version"], vec![FlagValue::Bool(true)]);
        assert_eq!(t.unknown_flags["foo"], vec![FlagValue::from("bar")]);
        assert_eq!(t.unknown_flags["x"], vec![FlagValue::Bool(true)]);
        assert_eq!(t.positionals, vec!["arg"]);
        assert!(t.flags.is_empty());
    }

    #[test]
    fn unknown_flags_as_arguments() {
        let schema = schema(&[("known", FlagSpec::boolean().alias('k'))]);
        let options = TokenizeOptions {
            unknown_as_arguments: true,
            ..Default::default()
        };
        let t = tokenize(&schema, &["--nope", "-z", "-k", "x"], &options).unwrap();
        assert!(t.unknown_flags.is_empty());
        assert_eq!(t.positionals, vec!["--nope", "-z", "x"]);
        assert!(t.flags.is_set("known"));
    }

    #[test]
    fn separator_fills_both_buckets() {
        let schema = schema(&[("flag", FlagSpec::boolean())]);
        let t = run(&schema, &["a", "--", "--flag", "b"]);
        assert_eq!(t.positionals, vec!["a", "--flag", "b"]);
        assert_eq!(t.separated, vec!["--flag", "b"]);
        assert!(!t.flags.contains("flag"));
    }

    #[test]
    fn ignore_skips_tokens() {
        let seen_argument = Arc::new(AtomicBool::new(false));
        let seen = seen_argument.clone();
        let options = TokenizeOptions {
            ignore: Some(Arc::new(move |kind, _token| {
                if seen.load(Ordering::SeqCst) {
                    return true;
                }
                if kind == ArgvKind::Argument {
                    seen.store(true, Ordering::SeqCst);
                    return true;
                }
                false
            })),
            ..Default::default()
        };
        let schema = schema(&[("help", FlagSpec::boolean().alias('h'))]);
        let t = tokenize(&schema, &["--unknown", "arg", "--help"], &options).unwrap();
        assert_eq!(t.unknown_flags["unknown"], vec![FlagValue::Bool(true)]);
        assert!(t.positionals.is_empty());
        assert!(!t.flags.contains("help"));
        assert!(seen_argument.load(Ordering::SeqCst));
    }

    #[test]
    fn custom_type_errors_propagate() {
        let schema = schema(&[(
            "size",
            FlagType::custom(|raw| {
                let n: u32 = raw.parse()?;
                Ok(FlagValue::Number(f64::from(n)))
            })
            .into(),
        )]);
        let err = tokenize(&schema, &["--size", "big"], &TokenizeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Flag(_)));
    }
}
