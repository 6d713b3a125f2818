//! Purpose: `apio-api` CLI entry point.
//! Role: Binary crate root; parses args, runs one fetch, emits JSON on stdout.
//! Invariants: Successful payloads go to stdout; diagnostics go to stderr.
//! Invariants: Errors print as `Error: <message>` (red when color is enabled).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, IsTerminal};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod color_json;

use apio_api::api::{
    ApiConfig, CONNECTIVITY_MESSAGE, Error, ErrorKind, RequestExecutor, parse_duration,
    to_exit_code,
};
use color_json::render_json;

const LOG_ENV: &str = "APIO_LOG";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `apio-api --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    dispatch(cli).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "apio-api",
    version,
    about = "Fetch JSON from the GitHub repos API for an organization",
    long_about = None,
    after_help = r#"EXAMPLES
  $ apio-api get apio/releases/latest
  $ apio-api get tools-oss-cad-suite/tags --compact
  $ apio-api --org myorg get myrepo

ENVIRONMENT
  APIO_GITHUB_TOKEN   Token sent as `Authorization: token <value>` (falls back to GITHUB_TOKEN)
  APIO_API_ROOT       API root (default: https://api.github.com)
  APIO_GITHUB_ORG     Organization (default: FPGAwars)
  APIO_LOG            Log filter for stderr diagnostics (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, global = true, help = "GitHub organization (overrides APIO_GITHUB_ORG)")]
    org: Option<String>,
    #[arg(
        long = "api-root",
        global = true,
        help = "API root URL (overrides APIO_API_ROOT)"
    )]
    api_root: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Request timeout (e.g. 500ms, 10s, 1m); default waits indefinitely"
    )]
    timeout: Option<String>,
    #[arg(
        long = "verify-tls",
        global = true,
        help = "Verify TLS certificates (verification is off by default)"
    )]
    verify_tls: bool,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "GET <api-root>/repos/<org>/<PATH> and print the JSON body",
        after_help = r#"EXAMPLES
  $ apio-api get apio/releases/latest
  $ apio-api get apio --compact

NOTES
  - PATH is appended verbatim; escape it yourself if needed.
  - Exits 1 on connection failure, HTTP error status, or a non-JSON body."#
    )]
    Get {
        #[arg(help = "Path under repos/<org>/ (e.g. apio/releases/latest)")]
        path: String,
        #[arg(long, help = "Emit single-line JSON even on a terminal")]
        compact: bool,
    },
    #[command(about = "Print version info")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ apio-api completion bash > ~/.local/share/bash-completion/completions/apio-api
  $ apio-api completion zsh > ~/.zfunc/_apio-api"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn dispatch(cli: Cli) -> Result<RunOutcome, Error> {
    match cli.command {
        Command::Get { ref path, compact } => {
            let config = build_config(&cli)?;
            tracing::debug!(?config, "resolved config");
            let executor = RequestExecutor::from_config(&config);
            let value = executor.fetch(path)?;
            emit_json(&value, cli.color, compact);
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(cli.color);
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "apio-api", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn build_config(cli: &Cli) -> Result<ApiConfig, Error> {
    let mut config = ApiConfig::from_env()?.with_tls_skip_verify(!cli.verify_tls);
    if let Some(api_root) = &cli.api_root {
        config = config.with_api_root(api_root)?;
    }
    if let Some(org) = &cli.org {
        config = config.with_org(org.clone());
    }
    if let Some(timeout) = &cli.timeout {
        config = config.with_timeout(parse_duration(timeout)?);
    }
    Ok(config)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: &Value, color_mode: ColorMode, compact: bool) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let text = if compact || !(is_tty || use_color) {
        serde_json::to_string(value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        render_json(value, use_color)
    };
    println!("{text}");
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("apio-api {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            &json!({
                "name": "apio-api",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
            true,
        );
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize(text: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return text.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let use_color = color_mode.use_color(io::stderr().is_terminal());
    eprintln!("{}", error_text(err, use_color));
}

fn error_message(err: &Error) -> String {
    // Connectivity failures always get the fixed guidance, never transport detail.
    let fallback = match err.kind() {
        ErrorKind::Connectivity => return CONNECTIVITY_MESSAGE.to_string(),
        ErrorKind::Request => "request failed",
        ErrorKind::Usage => "usage error",
        ErrorKind::Internal => "internal error",
    };
    err.message().unwrap_or(fallback).to_string()
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![colorize(
        &format!("Error: {}", error_message(err)),
        use_color,
        AnsiColor::Red,
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, ColorMode, Command, build_config, clap_error_summary, error_text};
    use apio_api::api::{Error, ErrorKind};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn connectivity_error_uses_fixed_message() {
        let err = Error::new(ErrorKind::Connectivity).with_message("dns error: no such host");
        assert_eq!(
            error_text(&err, false),
            "Error: Could not connect to GitHub API.\nCheck your internet connection and try again"
        );
    }

    #[test]
    fn request_error_prefixes_message() {
        let err = Error::new(ErrorKind::Request).with_message("expected value at line 1 column 1");
        assert_eq!(
            error_text(&err, false),
            "Error: expected value at line 1 column 1"
        );
    }

    #[test]
    fn error_text_is_red_when_colored() {
        let err = Error::new(ErrorKind::Request).with_message("boom");
        assert_eq!(error_text(&err, true), "\u{1b}[31mError: boom\u{1b}[0m");
    }

    #[test]
    fn usage_error_includes_hint_line() {
        let err = Error::new(ErrorKind::Usage)
            .with_message("invalid duration")
            .with_hint("Use a number plus ms|s|m|h (e.g. 10s).");
        let text = error_text(&err, false);
        assert_eq!(
            text,
            "Error: invalid duration\nhint: Use a number plus ms|s|m|h (e.g. 10s)."
        );
    }

    #[test]
    fn color_mode_respects_tty() {
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Auto.use_color(false));
        assert!(ColorMode::Always.use_color(false));
        assert!(!ColorMode::Never.use_color(true));
    }

    #[test]
    fn get_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "apio-api",
            "get",
            "apio/releases",
            "--org",
            "acme",
            "--timeout",
            "5s",
            "--verify-tls",
        ])
        .expect("cli");
        match &cli.command {
            Command::Get { path, compact } => {
                assert_eq!(path, "apio/releases");
                assert!(!compact);
            }
            _ => panic!("expected get"),
        }
        let config = build_config(&cli).expect("config");
        assert_eq!(config.org(), "acme");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert!(!config.tls_skip_verify());
    }

    #[test]
    fn bad_timeout_is_usage_error() {
        let cli = Cli::try_parse_from(["apio-api", "get", "apio", "--timeout", "soon"])
            .expect("cli");
        let err = build_config(&cli).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn clap_summary_strips_error_prefix() {
        let err = Cli::try_parse_from(["apio-api", "bogus"]).err().expect("err");
        let summary = clap_error_summary(&err);
        assert!(!summary.starts_with("error:"));
        assert!(summary.contains("bogus"));
    }
}
