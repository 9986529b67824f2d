//! Parsing entry points and command dispatch.
//!
//! [`parse`] never touches the process: help, version and missing-parameter
//! cases come back as [`Outcome::Exit`]. [`cli_with`] and [`cli`] print those
//! and exit.

use std::ffi::OsString;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::io::Write;
use std::ops::Deref;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::command::Registry;
use crate::error::{Error, RenderError, Result};
use crate::flags::{FlagSpec, Flags};
use crate::help::{RendererOverrides, render_help};
use crate::names::is_valid_script_name;
use crate::options::{CliOptions, HelpOptions, ProgramSpec, RenderFn};
use crate::resolver::{Arguments, Resolution, resolve_parameters};
use crate::terminal::Terminal;
use crate::tokenizer::{IgnoreFn, TokenizeOptions, UnknownFlags, tokenize};

const HELP_FLAG: &str = "help";
const VERSION_FLAG: &str = "version";

/// What a callback leaves behind.
pub enum Continuation {
    Done,
    /// Work that completes when the [`Resolved`] result is awaited.
    Pending(BoxFuture<'static, anyhow::Result<()>>),
}

type CallbackFn = dyn Fn(&Parsed) -> anyhow::Result<Continuation> + Send + Sync;

/// Runs after a successful parse, before the result is returned.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// A synchronous callback. Its error is returned from the parse.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Parsed) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(move |parsed: &Parsed| {
            callback(parsed)?;
            Ok(Continuation::Done)
        }))
    }

    /// An asynchronous callback. It receives its own copy of the result and
    /// runs when the [`Resolved`] value is awaited.
    pub fn new_async<F, Fut>(callback: F) -> Self
    where
        F: Fn(Parsed) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self(Arc::new(move |parsed: &Parsed| {
            Ok(Continuation::Pending(callback(parsed.clone()).boxed()))
        }))
    }

    /// A callback deciding per call whether it finishes now or later.
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&Parsed) -> anyhow::Result<Continuation> + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    fn call(&self, parsed: &Parsed) -> anyhow::Result<Continuation> {
        (self.0)(parsed)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

struct HelpContext {
    program: ProgramSpec,
    render: Option<RenderFn>,
    overrides: Option<RendererOverrides>,
    terminal: Terminal,
}

impl HelpContext {
    fn render(&self, help: Option<HelpOptions>) -> Result<String, RenderError> {
        let program = match help {
            Some(help) => self.program.with_help(help),
            None => self.program.clone(),
        };
        render_help(
            &program,
            self.render.as_ref(),
            self.overrides.as_ref(),
            self.terminal,
        )
    }
}

/// Result of a successful parse.
#[derive(Clone)]
pub struct Parsed {
    /// Name of the dispatched command, `None` for the root program.
    pub command: Option<String>,
    pub flags: Flags,
    pub args: Arguments,
    /// Flags not in the schema, by name as typed.
    pub unknown_flags: UnknownFlags,
    context: Arc<HelpContext>,
}

impl Parsed {
    /// The help document of the parsed program or command.
    ///
    /// `help` replaces the configured help options for this rendering only.
    pub fn help_text(&self, help: Option<HelpOptions>) -> Result<String> {
        Ok(self.context.render(help)?)
    }

    /// Print [`Parsed::help_text`] to stdout.
    pub fn show_help(&self, help: Option<HelpOptions>) -> Result<()> {
        let text = self.help_text(help)?;
        println!("{text}");
        Ok(())
    }

    /// The configured version of the parsed program or command.
    pub fn version(&self) -> Option<&str> {
        self.context.program.version.as_deref()
    }

    /// Print the version to stdout, if one is configured.
    pub fn show_version(&self) {
        if let Some(version) = self.version() {
            println!("{version}");
        }
    }
}

impl fmt::Debug for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parsed")
            .field("command", &self.command)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .field("unknown_flags", &self.unknown_flags)
            .finish_non_exhaustive()
    }
}

/// A parse result, possibly with an asynchronous callback still to run.
///
/// Dereferences to [`Parsed`], so fields are usable right away. Awaiting it
/// runs the callback and yields the [`Parsed`] value or the callback's error.
pub struct Resolved {
    parsed: Parsed,
    pending: Option<BoxFuture<'static, anyhow::Result<()>>>,
}

impl Resolved {
    /// Whether awaiting still runs a callback.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending callback and keep the parse result.
    pub fn into_parsed(self) -> Parsed {
        self.parsed
    }
}

impl Deref for Resolved {
    type Target = Parsed;

    fn deref(&self) -> &Parsed {
        &self.parsed
    }
}

impl IntoFuture for Resolved {
    type Output = anyhow::Result<Parsed>;
    type IntoFuture = BoxFuture<'static, anyhow::Result<Parsed>>;

    fn into_future(self) -> Self::IntoFuture {
        let Resolved { parsed, pending } = self;
        async move {
            if let Some(pending) = pending {
                pending.await?;
            }
            Ok(parsed)
        }
        .boxed()
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("parsed", &self.parsed)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Output and status of a run that ends the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Exit {
    fn success(stdout: String) -> Self {
        Self {
            status: 0,
            stdout,
            stderr: String::new(),
        }
    }

    /// Write stderr, then stdout, and exit with `status`.
    pub fn apply(self) -> ! {
        let _ = std::io::stderr().write_all(self.stderr.as_bytes());
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(self.stdout.as_bytes());
        let _ = stdout.flush();
        std::process::exit(self.status)
    }
}

#[derive(Debug)]
pub enum Outcome {
    Parsed(Resolved),
    /// Help or version was shown, or a required parameter is missing.
    Exit(Exit),
}

impl Outcome {
    pub fn parsed(self) -> Option<Resolved> {
        match self {
            Self::Parsed(resolved) => Some(resolved),
            Self::Exit(_) => None,
        }
    }

    pub fn exit(self) -> Option<Exit> {
        match self {
            Self::Exit(exit) => Some(exit),
            Self::Parsed(_) => None,
        }
    }
}

struct Invocation<'a> {
    command: Option<String>,
    ignore_argv: Option<IgnoreFn>,
    ignore_unknown_flags: bool,
    callback: Option<&'a Callback>,
}

/// Parse `argv` (without the program name) against `options`, detecting the
/// terminal from stdout.
pub fn parse<I, S>(options: &CliOptions, callback: Option<Callback>, argv: I) -> Result<Outcome>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parse_with_terminal(options, callback, argv, Terminal::detect())
}

/// [`parse`] with explicit terminal capabilities for help output.
pub fn parse_with_terminal<I, S>(
    options: &CliOptions,
    callback: Option<Callback>,
    argv: I,
    terminal: Terminal,
) -> Result<Outcome>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if let Some(name) = &options.name {
        if !is_valid_script_name(name) {
            return Err(Error::InvalidScriptName(name.clone()));
        }
    }

    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

    if !options.commands.is_empty() {
        let registry = Registry::build(&options.commands)?;
        let matched = argv
            .first()
            .filter(|word| is_valid_script_name(word))
            .and_then(|word| registry.get(word));
        if let Some(command) = matched {
            tracing::debug!(command = command.name(), "dispatching to command");
            let command_options = command.options();
            return run(
                ProgramSpec::command(command_options, options),
                Invocation {
                    command: Some(command.name().to_string()),
                    ignore_argv: command_options.ignore_argv.clone(),
                    ignore_unknown_flags: command_options.ignore_unknown_flags,
                    callback: command.callback(),
                },
                &argv[1..],
                terminal,
            );
        }
    }

    run(
        ProgramSpec::root(options),
        Invocation {
            command: None,
            ignore_argv: options.ignore_argv.clone(),
            ignore_unknown_flags: options.ignore_unknown_flags,
            callback: callback.as_ref(),
        },
        &argv,
        terminal,
    )
}

/// Parse `argv`, printing and exiting for help, version and missing
/// parameters.
pub fn cli_with<I, S>(options: &CliOptions, callback: Option<Callback>, argv: I) -> Result<Resolved>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    match parse(options, callback, argv)? {
        Outcome::Parsed(resolved) => Ok(resolved),
        Outcome::Exit(exit) => exit.apply(),
    }
}

/// [`cli_with`] over the process arguments, without a root callback.
pub fn cli(options: &CliOptions) -> Result<Resolved> {
    cli_with(options, None, os_args(std::env::args_os().skip(1)))
}

/// Process arguments as strings. Invalid UTF-8 is replaced, not rejected.
fn os_args(args: impl Iterator<Item = OsString>) -> Vec<String> {
    args.map(|arg| match arg.into_string() {
        Ok(arg) => arg,
        Err(arg) => {
            tracing::debug!(?arg, "argument is not valid UTF-8");
            arg.to_string_lossy().into_owned()
        }
    })
    .collect()
}

fn run(
    mut program: ProgramSpec,
    invocation: Invocation<'_>,
    argv: &[String],
    terminal: Terminal,
) -> Result<Outcome> {
    let version_enabled = program.version.as_deref().is_some_and(|v| !v.is_empty())
        && !program.flags.contains_key(VERSION_FLAG);
    if version_enabled {
        program.flags.insert(
            VERSION_FLAG.to_string(),
            FlagSpec::boolean().description("Show version"),
        );
    }
    let help_enabled = program.help.is_enabled();
    if help_enabled && !program.flags.contains_key(HELP_FLAG) {
        program.flags.insert(
            HELP_FLAG.to_string(),
            FlagSpec::boolean().alias('h').description("Show help"),
        );
    }
    tracing::trace!(version = version_enabled, help = help_enabled, "implicit flags");

    let tokenized = tokenize(
        &program.flags,
        argv,
        &TokenizeOptions {
            ignore: invocation.ignore_argv,
            unknown_as_arguments: invocation.ignore_unknown_flags,
        },
    )?;

    let context = Arc::new(HelpContext {
        render: program.help.options().and_then(|h| h.render.clone()),
        overrides: program
            .help
            .options()
            .map(|h| h.renderers.clone())
            .filter(|o| !o.is_empty()),
        program,
        terminal,
    });

    if version_enabled && tokenized.flags.get_bool(VERSION_FLAG) == Some(true) {
        tracing::debug!("version requested");
        let version = context.program.version.as_deref().unwrap_or_default();
        return Ok(Outcome::Exit(Exit::success(format!("{version}\n"))));
    }

    if help_enabled && tokenized.flags.get_bool(HELP_FLAG) == Some(true) {
        tracing::debug!("help requested");
        let text = context.render(None)?;
        return Ok(Outcome::Exit(Exit::success(format!("{text}\n"))));
    }

    let mut args = Arguments::new(tokenized.positionals, tokenized.separated);
    if !context.program.parameters.is_empty() {
        match resolve_parameters(&context.program.parameters, args.tokens(), args.separated())? {
            Resolution::Complete(named) => args.extend_named(named),
            Resolution::Missing(name) => {
                tracing::debug!(parameter = %name, "missing required parameter");
                let text = context.render(None)?;
                return Ok(Outcome::Exit(Exit {
                    status: 1,
                    stdout: format!("{text}\n"),
                    stderr: format!("Error: Missing required parameter {name:?}\n"),
                }));
            }
        }
    }

    let parsed = Parsed {
        command: invocation.command,
        flags: tokenized.flags,
        args,
        unknown_flags: tokenized.unknown_flags,
        context,
    };

    let pending = match invocation.callback {
        Some(callback) => match callback.call(&parsed).map_err(Error::Callback)? {
            Continuation::Done => None,
            Continuation::Pending(future) => Some(future),
        },
        None => None,
    };

    Ok(Outcome::Parsed(Resolved { parsed, pending }))
}
