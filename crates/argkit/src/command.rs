//! Subcommands and their lookup table.

use std::collections::HashMap;
use std::fmt;

use crate::dispatch::Callback;
use crate::error::{Error, Result};
use crate::flags::{FlagSchema, FlagSpec};
use crate::names::is_valid_script_name;
use crate::options::{Help, ignore_fn};
use crate::tokenizer::{ArgvKind, IgnoreFn};

/// Configuration of one subcommand.
#[derive(Clone, Default)]
pub struct CommandOptions {
    /// Word used to invoke the command.
    pub name: String,
    /// Alternative invocation words, shown in the command's help.
    pub alias: Vec<String>,
    /// Enables `--version` for this command.
    pub version: Option<String>,
    pub parameters: Vec<String>,
    pub flags: FlagSchema,
    pub help: Help,
    pub ignore_argv: Option<IgnoreFn>,
    pub ignore_unknown_flags: bool,
}

impl CommandOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn parameter(mut self, pattern: impl Into<String>) -> Self {
        self.parameters.push(pattern.into());
        self
    }

    pub fn parameters<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn flag(mut self, key: impl Into<String>, spec: impl Into<FlagSpec>) -> Self {
        self.flags.insert(key.into(), spec.into());
        self
    }

    pub fn help(mut self, help: impl Into<Help>) -> Self {
        self.help = help.into();
        self
    }

    pub fn ignore_argv<F>(mut self, ignore: F) -> Self
    where
        F: Fn(ArgvKind, &str) -> bool + Send + Sync + 'static,
    {
        self.ignore_argv = Some(ignore_fn(ignore));
        self
    }

    pub fn ignore_unknown_flags(mut self, ignore: bool) -> Self {
        self.ignore_unknown_flags = ignore;
        self
    }
}

impl fmt::Debug for CommandOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOptions")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("version", &self.version)
            .field("parameters", &self.parameters)
            .field("flags", &self.flags)
            .field("help", &self.help)
            .field("ignore_unknown_flags", &self.ignore_unknown_flags)
            .finish_non_exhaustive()
    }
}

/// A validated subcommand with an optional callback.
#[derive(Debug, Clone)]
pub struct Command {
    options: CommandOptions,
    callback: Option<Callback>,
}

impl Command {
    /// Fails when the name is empty or not a single word.
    pub fn new(options: CommandOptions) -> Result<Self> {
        if !is_valid_script_name(&options.name) {
            return Err(Error::InvalidCommandName(options.name));
        }
        Ok(Self {
            options,
            callback: None,
        })
    }

    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    pub fn callback(&self) -> Option<&Callback> {
        self.callback.as_ref()
    }

    fn invocation_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name()).chain(self.options.alias.iter().map(String::as_str))
    }
}

/// Name and alias lookup over a command list.
pub(crate) struct Registry<'a> {
    by_name: HashMap<&'a str, &'a Command>,
}

impl<'a> Registry<'a> {
    /// Fails on the first name or alias used twice.
    pub(crate) fn build(commands: &'a [Command]) -> Result<Self> {
        let mut by_name = HashMap::new();
        for command in commands {
            for name in command.invocation_names() {
                if by_name.insert(name, command).is_some() {
                    return Err(Error::DuplicateCommand(name.to_string()));
                }
            }
        }
        Ok(Self { by_name })
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a Command> {
        self.by_name.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(options: CommandOptions) -> Command {
        Command::new(options).unwrap()
    }

    #[test]
    fn rejects_multi_word_names() {
        let err = Command::new(CommandOptions::new("a b")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Invalid command name "a b". Command names must be one word."#
        );
        assert!(Command::new(CommandOptions::default()).is_err());
    }

    #[test]
    fn lookup_by_name_and_alias() {
        let commands = vec![
            command(CommandOptions::new("install").alias("i").alias("add")),
            command(CommandOptions::new("run-script").alias("run")),
        ];
        let registry = Registry::build(&commands).unwrap();
        assert_eq!(registry.get("i").map(Command::name), Some("install"));
        assert_eq!(registry.get("add").map(Command::name), Some("install"));
        assert_eq!(registry.get("run").map(Command::name), Some("run-script"));
        assert!(registry.get("uninstall").is_none());
    }

    #[test]
    fn duplicates_are_rejected() {
        let commands = vec![
            command(CommandOptions::new("duplicate")),
            command(CommandOptions::new("duplicate")),
        ];
        let err = Registry::build(&commands).err().unwrap();
        assert_eq!(err.to_string(), r#"Duplicate command name found: "duplicate""#);

        let commands = vec![
            command(CommandOptions::new("build").alias("b")),
            command(CommandOptions::new("b")),
        ];
        assert!(matches!(
            Registry::build(&commands),
            Err(Error::DuplicateCommand(name)) if name == "b"
        ));
    }
}
