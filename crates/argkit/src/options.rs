//! Program configuration.

use std::fmt;
use std::sync::Arc;

use crate::command::{Command, CommandOptions};
use crate::error::RenderError;
use crate::flags::{FlagSchema, FlagSpec};
use crate::help::{HelpNode, RendererOverrides, Renderers};
use crate::tokenizer::{ArgvKind, IgnoreFn};

/// Replaces the default help rendering. Receives the generated nodes and the
/// renderer table for this pass; the returned text is printed as is.
pub type RenderFn =
    Arc<dyn Fn(Vec<HelpNode>, &mut Renderers) -> Result<String, RenderError> + Send + Sync>;

/// Usage section contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usage {
    /// No usage section at all.
    Disabled,
    /// Explicit usage lines.
    Lines(Vec<String>),
}

impl From<&str> for Usage {
    fn from(line: &str) -> Self {
        Self::Lines(vec![line.to_string()])
    }
}

impl From<String> for Usage {
    fn from(line: String) -> Self {
        Self::Lines(vec![line])
    }
}

impl From<Vec<String>> for Usage {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for Usage {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

/// Help document settings.
#[derive(Clone, Default)]
pub struct HelpOptions {
    /// Shown in the help header without enabling `--version`.
    pub version: Option<String>,
    pub description: Option<String>,
    /// `None` generates usage lines from the name, flags and parameters.
    pub usage: Option<Usage>,
    pub examples: Vec<String>,
    pub render: Option<RenderFn>,
    /// Renderer replacements applied before rendering.
    pub renderers: RendererOverrides,
}

impl HelpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<Usage>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn no_usage(mut self) -> Self {
        self.usage = Some(Usage::Disabled);
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(Vec<HelpNode>, &mut Renderers) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn renderers(mut self, overrides: RendererOverrides) -> Self {
        self.renderers = overrides;
        self
    }
}

impl fmt::Debug for HelpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpOptions")
            .field("version", &self.version)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("examples", &self.examples)
            .field("render", &self.render.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// Whether `--help`/`-h` is handled, and how help looks.
#[derive(Debug, Clone)]
pub enum Help {
    /// No implicit `--help` flag. Help can still be printed on demand.
    Disabled,
    Enabled(HelpOptions),
}

impl Help {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn options(&self) -> Option<&HelpOptions> {
        match self {
            Self::Enabled(options) => Some(options),
            Self::Disabled => None,
        }
    }
}

impl Default for Help {
    fn default() -> Self {
        Self::Enabled(HelpOptions::default())
    }
}

impl From<HelpOptions> for Help {
    fn from(options: HelpOptions) -> Self {
        Self::Enabled(options)
    }
}

impl From<bool> for Help {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::Disabled
        }
    }
}

pub(crate) fn ignore_fn<F>(ignore: F) -> IgnoreFn
where
    F: Fn(ArgvKind, &str) -> bool + Send + Sync + 'static,
{
    Arc::new(ignore)
}

/// Root program configuration.
#[derive(Clone, Default)]
pub struct CliOptions {
    /// Script name shown in help. Must be a single word when set.
    pub name: Option<String>,
    /// Enables `--version` and is shown in the help header.
    pub version: Option<String>,
    pub parameters: Vec<String>,
    pub flags: FlagSchema,
    pub commands: Vec<Command>,
    pub help: Help,
    pub ignore_argv: Option<IgnoreFn>,
    /// Keep unknown flags as positional arguments.
    pub ignore_unknown_flags: bool,
}

impl CliOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
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

impl fmt::Debug for CliOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliOptions")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("parameters", &self.parameters)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .field("help", &self.help)
            .field("ignore_unknown_flags", &self.ignore_unknown_flags)
            .finish_non_exhaustive()
    }
}

/// Name and version of the program a command belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parent {
    pub name: Option<String>,
    /// The program version, else its help version.
    pub version: Option<String>,
}

/// Command row of the help document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub description: Option<String>,
}

/// Everything the help generator needs about the program being run: the
/// root program or a dispatched command, with its effective flags.
#[derive(Debug, Clone)]
pub struct ProgramSpec {
    pub name: Option<String>,
    pub version: Option<String>,
    pub aliases: Vec<String>,
    pub parameters: Vec<String>,
    /// Declared flags plus injected `--help`/`--version`.
    pub flags: FlagSchema,
    pub commands: Vec<CommandSummary>,
    pub help: Help,
    pub parent: Option<Parent>,
}

impl ProgramSpec {
    pub fn root(options: &CliOptions) -> Self {
        Self {
            name: options.name.clone(),
            version: options.version.clone(),
            aliases: Vec::new(),
            parameters: options.parameters.clone(),
            flags: options.flags.clone(),
            commands: options
                .commands
                .iter()
                .map(|command| CommandSummary {
                    name: command.name().to_string(),
                    description: command
                        .options()
                        .help
                        .options()
                        .and_then(|help| help.description.clone()),
                })
                .collect(),
            help: options.help.clone(),
            parent: None,
        }
    }

    pub fn command(options: &CommandOptions, root: &CliOptions) -> Self {
        Self {
            name: Some(options.name.clone()),
            version: options.version.clone(),
            aliases: options.alias.clone(),
            parameters: options.parameters.clone(),
            flags: options.flags.clone(),
            commands: Vec::new(),
            help: options.help.clone(),
            parent: Some(Parent {
                name: root.name.clone(),
                version: root.version.clone().or_else(|| {
                    root.help
                        .options()
                        .and_then(|help| help.version.clone())
                }),
            }),
        }
    }

    /// Name with the parent program's name in front, if any.
    pub fn full_name(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        match self.parent.as_ref().and_then(|p| p.name.as_deref()) {
            Some(parent) => Some(format!("{parent} {name}")),
            None => Some(name.to_string()),
        }
    }

    /// Version shown in the help header: own version, own help version,
    /// then the parent's.
    pub fn display_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.help.options().and_then(|h| h.version.as_deref()))
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    /// The same program documented with `help` instead.
    pub fn with_help(&self, help: HelpOptions) -> Self {
        Self {
            help: Help::Enabled(help),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_defaults_to_enabled() {
        assert!(CliOptions::new().help.is_enabled());
        assert!(!CliOptions::new().help(false).help.is_enabled());
    }

    #[test]
    fn builders_keep_flag_order() {
        let options = CliOptions::new()
            .name("pkg")
            .flag("zeta", FlagSpec::boolean())
            .flag("alpha", FlagSpec::string());
        let keys: Vec<_> = options.flags.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn command_spec_inherits_parent() {
        let root = CliOptions::new()
            .name("my-cli")
            .help(HelpOptions::new().version("2.0.0"));
        let command = CommandOptions::new("test");
        let spec = ProgramSpec::command(&command, &root);
        assert_eq!(spec.full_name().as_deref(), Some("my-cli test"));
        assert_eq!(spec.display_version(), Some("2.0.0"));
    }

    #[test]
    fn own_version_wins() {
        let spec = ProgramSpec::root(
            &CliOptions::new()
                .version("1.0.0")
                .help(HelpOptions::new().version("9.9.9")),
        );
        assert_eq!(spec.display_version(), Some("1.0.0"));
        assert_eq!(spec.full_name(), None);
    }
}
