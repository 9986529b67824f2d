//! Declarative argument parsing, subcommand dispatch and help rendering.
//!
//! A program is described with [`CliOptions`]: a name, positional parameter
//! patterns such as `<file>` or `[files...]`, a flag schema and optional
//! [`Command`]s. [`parse`] turns an argv vector into a [`Parsed`] result or
//! an [`Exit`] (help, version, missing parameter). [`cli`] does the same for
//! the process arguments and exits the process when asked to.
//!
//! ```no_run
//! use argkit::{CliOptions, FlagSpec};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let argv = argkit::cli(
//!     &CliOptions::new()
//!         .name("greet")
//!         .version("1.0.0")
//!         .parameter("<first name>")
//!         .flag("time", FlagSpec::string().alias('t').default_value("morning")),
//! )?;
//! let time = argv.flags.get_str("time").unwrap_or_default();
//! let name = argv.args.get_str("firstName").unwrap_or_default();
//! println!("Good {time}, {name}!");
//! # Ok(())
//! # }
//! ```

pub mod case;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod help;
pub mod names;
pub mod options;
pub mod parameters;
pub mod resolver;
pub mod terminal;
pub mod tokenizer;

pub use command::{Command, CommandOptions};
pub use dispatch::{
    Callback, Continuation, Exit, Outcome, Parsed, Resolved, cli, cli_with, parse,
    parse_with_terminal,
};
pub use error::{Error, GrammarError, RenderError, Result};
pub use flags::{FlagDefault, FlagSchema, FlagSpec, FlagType, FlagValue, Flags};
pub use help::{HelpNode, RendererOverrides, Renderers};
pub use options::{CliOptions, Help, HelpOptions, ProgramSpec, RenderFn, Usage};
pub use parameters::ParameterSpec;
pub use resolver::{Arguments, ParamValue};
pub use terminal::Terminal;
pub use tokenizer::{ArgvKind, UnknownFlags};
