//! These structs provide the CLI interface for the ward-report CLI.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ward-report: daily municipal property-tax collections, grouped by ward.
///
/// The program fetches the daily collection report from a municipal eGov
/// portal (CSRF handshake plus a date-ranged POST), folds the records into
/// per-ward summaries and presents them through a web page, a Telegram chat
/// bot, a spreadsheet export or plain terminal output.
///
/// Run `ward-report init` once to create the data directory and its
/// config.json, then any of the front-end subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and write an initial config.json.
    Init(InitArgs),
    /// Fetch one day's collections and print the per-ward summary.
    Fetch(FetchArgs),
    /// Run the web front end (date picker plus JSON endpoint).
    Serve(ServeArgs),
    /// Run the Telegram chat front end (long polling).
    Bot(BotArgs),
    /// Export one day's collections to Summary and Details CSV sheets.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ward-report configuration is held. Defaults to
    /// ~/.ward-report
    #[arg(long, env = "WARD_REPORT_HOME", default_value_t = default_report_home())]
    report_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, report_home: PathBuf) -> Self {
        Self {
            log_level,
            report_home: report_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn report_home(&self) -> &DisplayPath {
        &self.report_home
    }
}

/// Args for the `ward-report init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The daily-collection reporting endpoint. Defaults to the Tirupati
    /// eGov PTIS endpoint.
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Fix the revenueWard filter to a single ward, e.g. "Revenue Ward No
    /// 18". Leave unset for city-wide reporting.
    #[arg(long)]
    revenue_ward: Option<String>,
}

impl InitArgs {
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn revenue_ward(&self) -> Option<&str> {
        self.revenue_ward.as_deref()
    }
}

/// How `fetch` renders its result.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Args for the `ward-report fetch` command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// The date to report, DD/MM/YYYY. Defaults to today.
    date: Option<String>,

    /// Output format.
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl FetchArgs {
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `ward-report serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Listening port. Overrides the configured port; deploy platforms set
    /// PORT in the environment.
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

impl ServeArgs {
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

/// Args for the `ward-report bot` command.
#[derive(Debug, Parser, Clone)]
pub struct BotArgs {
    /// Telegram bot API token. Comes from the environment, never from
    /// config.json.
    #[arg(long, env = "WARD_REPORT_BOT_TOKEN", hide_env_values = true)]
    token: String,
}

impl BotArgs {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Args for the `ward-report export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The date to export, DD/MM/YYYY. Defaults to today.
    date: Option<String>,

    /// Directory to write the CSV sheets to. Defaults to the configured
    /// export directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl ExportArgs {
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }
}

fn default_report_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".ward-report"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --report-home or WARD_REPORT_HOME instead of relying on the \
                default data directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from(".ward-report")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
