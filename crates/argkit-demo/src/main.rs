//! `pkg`, a toy package manager front end wired up with argkit.

use std::time::Duration;

use anyhow::{Result, bail};
use argkit::{
    Callback, CliOptions, Command, CommandOptions, FlagSpec, FlagType, FlagValue, HelpOptions,
    Parsed,
};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    init_tracing();
    let options = cli_options()?;
    let argv = argkit::cli(&options)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let parsed = argv.await?;
            if parsed.command.is_some() {
                return Ok(());
            }
            if let Some(word) = parsed.args.tokens().first() {
                bail!("unknown command {word:?}");
            }
            parsed.show_help(None)?;
            Ok(())
        })
}

fn cli_options() -> Result<CliOptions> {
    let install = Command::new(
        CommandOptions::new("install")
            .alias("i")
            .alias("add")
            .parameter("[packages...]")
            .flag(
                "global",
                FlagSpec::boolean()
                    .alias('g')
                    .description("Install into the global store"),
            )
            .flag(
                "saveDev",
                FlagSpec::boolean()
                    .alias('D')
                    .description("Record as a development dependency"),
            )
            .help(HelpOptions::new().description("Install packages")),
    )?
    .with_callback(Callback::new(install_packages));

    let run_script = Command::new(
        CommandOptions::new("run-script")
            .alias("run")
            .parameters(["<script>", "--", "[args...]"])
            .help(HelpOptions::new().description("Run a package script")),
    )?
    .with_callback(Callback::new(run_package_script));

    let greet = Command::new(
        CommandOptions::new("greet")
            .parameters(["<first name>", "[last name]"])
            .flag(
                "time",
                FlagSpec::string()
                    .alias('t')
                    .default_value("morning")
                    .description("Time of day"),
            )
            .help(HelpOptions::new().description("Greet a maintainer")),
    )?
    .with_callback(Callback::new(greet_maintainer));

    let snap = Command::new(
        CommandOptions::new("snap")
            .parameter("[files...]")
            .flag(
                "delay",
                FlagSpec::number()
                    .alias('d')
                    .default_value(0i64)
                    .description("Milliseconds to wait before each snapshot"),
            )
            .help(HelpOptions::new().description("Snapshot files")),
    )?
    .with_callback(Callback::new_async(snapshot_files));

    let inspect = Command::new(
        CommandOptions::new("inspect")
            .alias("debug")
            .version("0.1.0")
            .parameter("[args...]")
            .flag(
                "format",
                FlagSpec::new(FlagType::custom(output_format))
                    .placeholder("<json|compact>")
                    .default_value("json")
                    .description("Output format"),
            )
            .help(HelpOptions::new().description("Print the parse result")),
    )?
    .with_callback(Callback::new(print_report));

    Ok(CliOptions::new()
        .name("pkg")
        .version(env!("CARGO_PKG_VERSION"))
        .command(install)
        .command(run_script)
        .command(greet)
        .command(snap)
        .command(inspect)
        .help(
            HelpOptions::new()
                .description("A toy package manager")
                .examples([
                    "# Install a package globally",
                    "pkg install -g left-pad",
                    "",
                    "# Pass flags through to a script",
                    "pkg run test -- --watch",
                ]),
        ))
}

fn output_format(raw: &str) -> Result<FlagValue> {
    match raw {
        "json" | "compact" => Ok(FlagValue::from(raw)),
        other => bail!("unsupported format {other:?}"),
    }
}

fn install_packages(parsed: &Parsed) -> Result<()> {
    let packages = parsed.args.get_all("packages").unwrap_or_default();
    if packages.is_empty() {
        println!("Nothing to install");
        return Ok(());
    }
    let scope = if parsed.flags.is_set("global") {
        "globally"
    } else if parsed.flags.is_set("saveDev") {
        "as dev dependencies"
    } else {
        "locally"
    };
    tracing::debug!(count = packages.len(), scope, "installing");
    println!("Installing {} {scope}", packages.join(", "));
    Ok(())
}

fn run_package_script(parsed: &Parsed) -> Result<()> {
    let Some(script) = parsed.args.get_str("script") else {
        bail!("no script given");
    };
    let args = parsed.args.get_all("args").unwrap_or_default();
    if args.is_empty() {
        println!("> {script}");
    } else {
        println!("> {script} {}", args.join(" "));
    }
    Ok(())
}

fn greet_maintainer(parsed: &Parsed) -> Result<()> {
    let time = parsed.flags.get_str("time").unwrap_or("day");
    let mut name = parsed.args.get_str("firstName").unwrap_or_default().to_string();
    if let Some(last) = parsed.args.get_str("lastName") {
        name.push(' ');
        name.push_str(last);
    }
    println!("Good {time}, {name}!");
    Ok(())
}

async fn snapshot_files(parsed: Parsed) -> Result<()> {
    let delay = parsed.flags.get_f64("delay").unwrap_or_default();
    for file in parsed.args.get_all("files").unwrap_or_default() {
        if delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(delay.min(60_000.0) / 1000.0)).await;
        }
        tracing::debug!(file = %file, "snapshot");
        println!("Snapped {file}");
    }
    Ok(())
}

fn print_report(parsed: &Parsed) -> Result<()> {
    let report = serde_json::json!({
        "command": parsed.command,
        "flags": parsed.flags,
        "args": parsed.args,
        "unknownFlags": parsed.unknown_flags,
    });
    let text = match parsed.flags.get_str("format") {
        Some("compact") => serde_json::to_string(&report)?,
        _ => serde_json::to_string_pretty(&report)?,
    };
    println!("{text}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
