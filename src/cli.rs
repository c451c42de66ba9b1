//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, check), and their associated
//! argument structs. Flags on `run` have environment variable
//! equivalents.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::flow::Scheme;

#[derive(Parser)]
#[command(
    name = "splitproxy",
    version,
    about = "Serve a production site's UI from a local build while API calls keep hitting production",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        splitproxy init                      Create a starter config\n  \
        splitproxy run                       Start with ./splitproxy.yaml (or built-in defaults)\n  \
        splitproxy check https://host/try    Show where a URL would be routed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the intercepting proxy
    Run(Box<RunArgs>),

    /// Generate a starter config file
    Init(InitArgs),

    /// Validate a config file without starting
    Validate(ValidateArgs),

    /// Show how URLs would be routed
    Check(CheckArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        splitproxy run                                 Auto-detect config\n  \
        splitproxy run -c splitproxy.yaml              Specific config file\n  \
        splitproxy run --local-port 3000 --pretty      Dev server on another port")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "SPLITPROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "SPLITPROXY_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "SPLITPROXY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    // -- Overrides --
    /// Override the production domain from the config
    #[arg(long, env = "SPLITPROXY_DOMAIN", help_heading = "Overrides")]
    pub domain: Option<String>,

    /// Override the local backend port from the config
    #[arg(long, env = "SPLITPROXY_LOCAL_PORT", help_heading = "Overrides")]
    pub local_port: Option<u16>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream timeout in milliseconds
    #[arg(
        long,
        env = "SPLITPROXY_TIMEOUT_MS",
        default_value_t = 30_000,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "SPLITPROXY_MAX_BODY",
        default_value_t = 10_485_760,
        help_heading = "Tuning"
    )]
    pub max_body: usize,

    /// Scheme used for requests sent without an absolute URL
    #[arg(
        long,
        env = "SPLITPROXY_UPSTREAM_SCHEME",
        default_value = "https",
        value_parser = parse_scheme,
        help_heading = "Tuning"
    )]
    pub upstream_scheme: Scheme,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        splitproxy init                           Minimal config (yaml)\n  \
        splitproxy init --full                    Every option, documented\n  \
        splitproxy init -f toml -o dev.toml       TOML format")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include full documentation as comments
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "splitproxy.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        splitproxy check https://ndx.digital.cabinet-office.gov.uk/catalogue/x\n  \
        splitproxy check -c dev.yaml --format json /try /api/v1/sessions")]
pub struct CheckArgs {
    /// URLs to classify; bare paths are taken relative to the production domain
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Config file path (defaults to auto-detection)
    #[arg(short, long, env = "SPLITPROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

fn parse_scheme(s: &str) -> Result<Scheme, String> {
    s.parse()
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
