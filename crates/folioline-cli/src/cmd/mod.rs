pub mod enrich;
pub mod fetch;
pub mod join;
pub mod login;
pub mod run;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use folioline_core::{OkapiClient, fmt_num};
use folioline_export::{ExportConfig, JobSummary, OutputLayout};

use crate::config::Config;

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Print one table row per fetch job
pub fn print_jobs(jobs: &[JobSummary]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            ["Entity", "Records", "Requests", "Status", "Output", "Time"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan)),
        );
    for job in jobs {
        let status = if job.truncated {
            Cell::new("partial").fg(Color::Yellow)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(job.entity),
            Cell::new(fmt_num(job.records)),
            Cell::new(job.requests),
            status,
            Cell::new(job.paths.json.display()),
            Cell::new(format!("{:.1}s", job.elapsed.as_secs_f64())),
        ]);
    }
    eprintln!("\n{table}");
}

/// Client for the configured tenant
pub fn connect(config: &Config) -> Result<OkapiClient> {
    let okapi = config.okapi()?;
    OkapiClient::connect(okapi, config.http()).context("Cannot build HTTP client")
}

pub fn export_config(config: &Config) -> ExportConfig {
    ExportConfig {
        layout: OutputLayout::new(&config.output.dir),
        page_size: config.fetch.page_size,
    }
}
