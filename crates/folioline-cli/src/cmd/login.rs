//! Login subcommand - obtain a session token

use anyhow::{Context, Result};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let mut client = super::connect(config)?;
    let tenant = client.config().tenant.clone();
    let token = client.token().context("Login failed")?;
    log::info!("Logged in to tenant {tenant}");
    println!("{token}");
    Ok(())
}
