//! folioline - library-services export jobs
//!
//! Pulls users, service points, service point assignments and patron
//! groups from an Okapi gateway into JSON/TSV snapshots, then joins
//! them into reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use folioline_core::ProgressContext;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "folioline")]
#[command(about = "Export library-services records from an Okapi gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./folioline.toml or ~/.config/folioline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Output directory for snapshots and reports
    #[arg(short, long, global = true)]
    output: Option<std::path::PathBuf>,

    /// Records per page
    #[arg(long, global = true)]
    page_size: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and print a session token
    Login,
    /// Fetch one collection into JSON/TSV snapshots
    Fetch(cmd::fetch::FetchArgs),
    /// Add service point names to the staff users table
    Join(cmd::join::JoinArgs),
    /// Report non-staff users holding service point assignments
    Enrich(cmd::enrich::EnrichArgs),
    /// Run every stage in order
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = ProgressContext::new();

    // TTY: spinners show activity, so only warnings unless --debug
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    folioline_core::init_logging(quiet, cli.debug, multi);

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if let Some(dir) = cli.output {
        config.output.dir = dir;
    }
    if let Some(page_size) = cli.page_size {
        config.fetch.page_size = page_size;
    }

    match cli.command {
        Command::Login => cmd::login::run(&config),
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Join(args) => cmd::join::run(args, &config),
        Command::Enrich(args) => cmd::enrich::run(args, &config, &progress),
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Config => {
            let okapi = &config.okapi;
            let rows = [
                ("Okapi URL", or_unset(&okapi.url)),
                ("Tenant", or_unset(&okapi.tenant)),
                (
                    "Username",
                    okapi.username.clone().unwrap_or_else(|| "not set".into()),
                ),
                (
                    "Password",
                    if okapi.password.is_some() {
                        "configured"
                    } else {
                        "not set"
                    }
                    .to_string(),
                ),
                ("Output directory", config.output.dir.display().to_string()),
                ("Page size", config.fetch.page_size.to_string()),
                (
                    "Staff patron group",
                    config
                        .fetch
                        .staff_patron_group
                        .clone()
                        .unwrap_or_else(|| "not set".into()),
                ),
                (
                    "Connect timeout",
                    format!("{}s", config.http.connect_timeout),
                ),
                (
                    "Request timeout",
                    format!("{}s", config.http.request_timeout),
                ),
            ];
            cmd::print_summary("Setting", &rows);
            Ok(())
        }
    }
}

fn or_unset(s: &str) -> String {
    if s.is_empty() {
        "not set".to_string()
    } else {
        s.to_string()
    }
}
