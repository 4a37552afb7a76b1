//! linkedin-launch - launcher for the LinkedIn MCP server
//!
//! Resolves the LinkedIn credential configuration, validates it against the
//! launcher schema and starts the server with the credentials in its
//! environment.

use clap::{Args, Parser, Subcommand};
use ll_config::{
    get_schema, resolve_config, validate, ResolvedConfig, ValidationError, CONFIG_SCHEMA_VERSION,
};
use ll_core::exit_codes::ExitCode;
use ll_core::log_event;
use ll_core::logging::{
    event_names, init_logging, redactor, register_secrets, LogConfig, LogContext, LogFormat,
    LogLevel, Stage,
};
use ll_core::output::{ErrorReport, ValidationReport};
use ll_core::schema::{config_json_schema, descriptor_json_schema};
use ll_core::{build, forwarded_exit_code, LaunchDescriptor, Launcher, OutputFormat, StdioMode};
use std::io::Write;
use std::path::PathBuf;

/// Launch the LinkedIn MCP server with validated credentials
#[derive(Parser)]
#[command(name = "linkedin-launch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file path (`-` reads JSON from stdin)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the configuration schema
    Schema(SchemaArgs),

    /// Check the configuration without launching
    Validate,

    /// Print the launch descriptor without launching
    Describe(DescribeArgs),

    /// Validate, then start the server and wait for it
    Run(RunArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Emit the configuration schema as JSON Schema
    #[arg(long)]
    json_schema: bool,

    /// Emit the JSON Schema of the launch descriptor instead
    #[arg(long, conflicts_with = "json_schema")]
    descriptor: bool,
}

#[derive(Args, Debug)]
struct DescribeArgs {
    /// Show environment values instead of placeholders
    #[arg(long)]
    reveal_env: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Relay stdio through the launcher instead of handing it to the server
    #[arg(long)]
    piped: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_level = LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(log_level, cli.global.log_format));

    let ctx = LogContext::for_this_run();
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "linkedin-launch started");

    let exit_code = match cli.command {
        Commands::Schema(args) => run_schema(&cli.global, &args),
        Commands::Validate => run_validate(&cli.global, &ctx),
        Commands::Describe(args) => run_describe(&cli.global, &ctx, &args),
        Commands::Run(args) => run_launch(&cli.global, &ctx, &args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean.as_i32()
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Init,
        "linkedin-launch finished",
        exit_code = exit_code
    );
    std::process::exit(exit_code);
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> i32 {
    let payload = if args.descriptor {
        descriptor_json_schema()
    } else if args.json_schema {
        config_json_schema()
    } else {
        serde_json::json!({
            "schema_version": CONFIG_SCHEMA_VERSION,
            "fields": get_schema().fields(),
        })
    };

    if args.descriptor || args.json_schema {
        return emit(|out| writeln!(out, "{}", pretty(&payload)));
    }

    emit(|out| match global.format {
        OutputFormat::Json => writeln!(out, "{}", pretty(&payload)),
        OutputFormat::Summary => {
            let names: Vec<&str> = get_schema().fields().iter().map(|f| f.name()).collect();
            writeln!(out, "{} fields: {}", names.len(), names.join(", "))
        }
        OutputFormat::Md => {
            writeln!(out, "# Configuration schema {}", CONFIG_SCHEMA_VERSION)?;
            writeln!(out)?;
            writeln!(out, "| Field | Type | Required | Environment | Description |")?;
            writeln!(out, "|---|---|---|---|---|")?;
            for field in get_schema().fields() {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    field.name(),
                    field.field_type().json_type(),
                    if field.is_required() { "yes" } else { "no" },
                    field.env_var().unwrap_or("-"),
                    field.description()
                )?;
            }
            Ok(())
        }
    })
}

fn run_validate(global: &GlobalOpts, ctx: &LogContext) -> i32 {
    let resolved = match load(global, ctx) {
        Ok(resolved) => resolved,
        Err(code) => return code.as_i32(),
    };

    match validate(&resolved.object, get_schema()) {
        Ok(_) => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_VALIDATED,
            Stage::Validate,
            "configuration is complete"
        ),
        Err(err) => log_missing_field(ctx, &err),
    }

    let report = ValidationReport::new(&resolved, get_schema());
    match emit(|out| report.write(global.format, out)) {
        0 => report.exit_code().as_i32(),
        failed => failed,
    }
}

fn run_describe(global: &GlobalOpts, ctx: &LogContext, args: &DescribeArgs) -> i32 {
    let resolved = match load(global, ctx) {
        Ok(resolved) => resolved,
        Err(code) => return code.as_i32(),
    };
    let descriptor = match descriptor_for(global, ctx, &resolved) {
        Ok(descriptor) => descriptor,
        Err(code) => return code.as_i32(),
    };

    let shown = if args.reveal_env {
        descriptor
    } else {
        descriptor.redacted()
    };

    emit(|out| match global.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "source": resolved.source.to_string(),
                "descriptor": shown,
            });
            writeln!(out, "{}", pretty(&payload))
        }
        OutputFormat::Summary => writeln!(
            out,
            "{} [env: {}]",
            shown.command_line(),
            shown.env_names().collect::<Vec<_>>().join(", ")
        ),
        OutputFormat::Md => {
            writeln!(out, "# Launch descriptor")?;
            writeln!(out)?;
            writeln!(out, "```")?;
            writeln!(out, "{}", shown.command_line())?;
            writeln!(out, "```")?;
            writeln!(out)?;
            writeln!(out, "| Variable | Value |")?;
            writeln!(out, "|---|---|")?;
            for (name, value) in shown.env() {
                writeln!(out, "| {} | {} |", name, value)?;
            }
            Ok(())
        }
    })
}

fn run_launch(global: &GlobalOpts, ctx: &LogContext, args: &RunArgs) -> i32 {
    let resolved = match load(global, ctx) {
        Ok(resolved) => resolved,
        Err(code) => return code.as_i32(),
    };
    let descriptor = match descriptor_for(global, ctx, &resolved) {
        Ok(descriptor) => descriptor,
        Err(code) => return code.as_i32(),
    };

    let mode = if args.piped {
        StdioMode::Piped
    } else {
        StdioMode::Inherit
    };

    let mut child = match Launcher::new(descriptor).stdio(mode).spawn() {
        Ok(child) => child,
        Err(err) => {
            log_event!(
                ctx,
                ERROR,
                event_names::LAUNCH_FAILED,
                Stage::Launch,
                "failed to start server",
                error = err.to_string().as_str()
            );
            return output_error(global, ExitCode::from(&err), &err.to_string());
        }
    };

    log_event!(
        ctx,
        INFO,
        event_names::LAUNCH_SPAWNED,
        Stage::Launch,
        "server started",
        pid = child.id()
    );

    let relays = if args.piped {
        relay_stdio(&mut child)
    } else {
        Vec::new()
    };

    let status = match child.wait() {
        Ok(status) => status,
        Err(err) => {
            log_event!(
                ctx,
                ERROR,
                event_names::LAUNCH_FAILED,
                Stage::Launch,
                "lost track of server",
                error = err.to_string().as_str()
            );
            return output_error(global, ExitCode::from(&err), &err.to_string());
        }
    };

    for relay in relays {
        let _ = relay.join();
    }

    let code = forwarded_exit_code(status);
    log_event!(
        ctx,
        INFO,
        event_names::LAUNCH_EXITED,
        Stage::Launch,
        "server exited",
        exit_code = code
    );
    code
}

/// Copy the launcher's stdin to the server and the server's stdout back.
fn relay_stdio(child: &mut ll_core::LaunchedChild) -> Vec<std::thread::JoinHandle<()>> {
    let mut handles = Vec::new();

    if let Some(mut child_stdin) = child.take_stdin() {
        // Not joined: blocks on our stdin until the host closes it.
        std::thread::spawn(move || {
            let _ = std::io::copy(&mut std::io::stdin().lock(), &mut child_stdin);
        });
    }

    if let Some(mut child_stdout) = child.take_stdout() {
        handles.push(std::thread::spawn(move || {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let _ = std::io::copy(&mut child_stdout, &mut out);
            let _ = out.flush();
        }));
    }

    handles
}

/// Resolve the configuration object and register its values as secrets.
fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedConfig, ExitCode> {
    match resolve_config(global.config.as_deref()) {
        Ok(resolved) => {
            register_secrets(resolved.object.iter().map(|(_, value)| value));
            log_event!(
                ctx,
                INFO,
                event_names::CONFIG_LOADED,
                Stage::Config,
                "configuration loaded",
                source = resolved.source.to_string().as_str(),
                keys = resolved.object.len()
            );
            Ok(resolved)
        }
        Err(err) => {
            log_event!(
                ctx,
                ERROR,
                event_names::CONFIG_ERROR,
                Stage::Config,
                "configuration could not be loaded",
                error = err.to_string().as_str(),
                code = err.code()
            );
            let code = ExitCode::from(&err);
            output_error(global, code, &err.to_string());
            Err(code)
        }
    }
}

/// Validate and build, reporting a missing field as an error.
fn descriptor_for(
    global: &GlobalOpts,
    ctx: &LogContext,
    resolved: &ResolvedConfig,
) -> Result<LaunchDescriptor, ExitCode> {
    match validate(&resolved.object, get_schema()) {
        Ok(validated) => {
            let descriptor = build(&validated);
            log_event!(
                ctx,
                DEBUG,
                event_names::DESCRIPTOR_BUILT,
                Stage::Build,
                "launch descriptor built",
                command = redactor()
                    .redact_command(descriptor.command(), descriptor.args())
                    .as_str(),
                env_names = descriptor.env_names().collect::<Vec<_>>().join(",").as_str()
            );
            Ok(descriptor)
        }
        Err(err) => {
            log_missing_field(ctx, &err);
            let code = ExitCode::from(&err);
            output_error(global, code, &err.to_string());
            Err(code)
        }
    }
}

fn log_missing_field(ctx: &LogContext, err: &ValidationError) {
    log_event!(
        ctx,
        WARN,
        event_names::CONFIG_MISSING_FIELD,
        Stage::Validate,
        "required configuration field missing",
        field = err.field(),
        code = err.code()
    );
}

/// Report an error on stderr in the selected format. Returns the exit code.
fn output_error(global: &GlobalOpts, exit_code: ExitCode, message: &str) -> i32 {
    let report = ErrorReport::new(exit_code, message);
    let _ = report.write(global.format, &mut std::io::stderr().lock());
    exit_code.as_i32()
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": CONFIG_SCHEMA_VERSION,
        "linkedin_launch_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    let _ = emit(|out| match global.format {
        OutputFormat::Json => writeln!(out, "{}", pretty(&version_info)),
        _ => {
            writeln!(out, "linkedin-launch {}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "schema version: {}", CONFIG_SCHEMA_VERSION)
        }
    });
}

/// Write a payload to stdout, mapping write failures to [`ExitCode::IoError`].
fn emit<F>(write: F) -> i32
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let mut out = std::io::stdout().lock();
    match write(&mut out).and_then(|()| out.flush()) {
        Ok(()) => ExitCode::Clean.as_i32(),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => ExitCode::Clean.as_i32(),
        Err(err) => {
            tracing::error!(target: event_names::OUTPUT_FAILED, error = %err, "failed to write output");
            ExitCode::IoError.as_i32()
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
