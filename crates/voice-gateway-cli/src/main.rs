// voice-gateway-cli/src/main.rs
// ============================================================================
// Module: Voice Gateway CLI Entry Point
// Description: Command dispatcher for serving and inspecting the gateway.
// Purpose: Start transports, validate config, and print the tool surface.
// Dependencies: clap, serde_json, thiserror, tokio, voice-gateway-mcp
// ============================================================================

//! ## Overview
//! `voice-gateway serve` runs the configured transports. `config validate`
//! loads and validates a config file without serving. `tools list` prints the
//! frozen registry's tool definitions, which is the exact listing both
//! transports return. Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use voice_gateway_config::GatewayConfig;
use voice_gateway_config::TransportSelection;
use voice_gateway_mcp::GatewayServer;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "voice-gateway", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the voice gateway.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Tool surface inspection.
    Tools {
        /// Selected tools subcommand.
        #[command(subcommand)]
        command: ToolsCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to voice-gateway.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the configured transport selection.
    #[arg(long, value_enum, value_name = "TRANSPORT")]
    transport: Option<TransportArg>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a voice gateway configuration file.
    Validate(ConfigArgs),
}

/// Tools subcommands.
#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print tool definitions as JSON.
    List(ConfigArgs),
}

/// Shared config path argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to voice-gateway.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Transport selection argument.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TransportArg {
    /// Local pipe over stdin/stdout.
    Stdio,
    /// Remote HTTP event stream.
    Stream,
    /// Both transports.
    Both,
}

impl From<TransportArg> for TransportSelection {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdio => Self::Stdio,
            TransportArg::Stream => Self::Stream,
            TransportArg::Both => Self::Both,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("voice-gateway {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
        Commands::Tools {
            command: ToolsCommand::List(args),
        } => command_tools_list(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref(), command.transport)?;
    let server = tokio::task::spawn_blocking(move || GatewayServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("gateway init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("gateway init failed: {err}")))?;
    let listener = server
        .bind_stream()
        .await
        .map_err(|err| CliError::new(format!("gateway failed: {err}")))?;
    if let Some(addr) = listener.as_ref().and_then(|listener| listener.local_addr().ok()) {
        write_stderr_line(&format!("voice-gateway: stream transport listening on {addr}"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    server.serve_on(listener).await.map_err(|err| CliError::new(format!("gateway failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref(), None)?;
    GatewayServer::from_config(config)
        .map_err(|err| CliError::new(format!("config invalid: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the frozen tool listing.
fn command_tools_list(args: &ConfigArgs) -> CliResult<ExitCode> {
    let mut config = load_config(args.config.as_deref(), None)?;
    config.audit.enabled = false;
    let server = GatewayServer::from_config(config)
        .map_err(|err| CliError::new(format!("gateway init failed: {err}")))?;
    let rendered = serde_json::to_string_pretty(&server.engine().list_tools())
        .map_err(|err| CliError::new(format!("failed to render tools: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads config and applies CLI overrides, re-validating afterwards.
fn load_config(path: Option<&Path>, transport: Option<TransportArg>) -> CliResult<GatewayConfig> {
    let mut config = GatewayConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_transport_override(&mut config, transport)?;
    Ok(config)
}

/// Applies a `--transport` override.
fn apply_transport_override(
    config: &mut GatewayConfig,
    transport: Option<TransportArg>,
) -> CliResult<()> {
    let Some(transport) = transport else {
        return Ok(());
    };
    config.server.transport = transport.into();
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
