//! CLI mode
//!
//! One-shot commands that run against the configured store through the same
//! service layer as the HTTP API.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;

use crate::config::{StaticConfig, get_config};
use crate::errors::ResolveError;
use crate::runtime::lifetime;
use crate::storage::{ExpiryPreset, format_timestamp};

/// Rate limit bucket used for notes shared from the command line
pub const CLI_CLIENT_ADDRESS: &str = "cli";

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        None | Some("-") => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read note from stdin")?;
            Ok(content)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read note from {}", path)),
    }
}

fn warn_if_ephemeral(config: &StaticConfig) {
    if config.store.store_type == "memory" {
        eprintln!(
            "{} the memory store does not outlive this process; configure store.type = \"redis\" to share from the CLI",
            "warning:".yellow().bold()
        );
    }
}

/// `notelink share [FILE] --expires <preset>`
pub async fn run_share(file: Option<&str>, expires: Option<ExpiryPreset>) -> Result<()> {
    let config = get_config();
    let content = read_input(file)?;

    warn_if_ephemeral(&config);
    let startup = lifetime::startup::prepare_startup(&config).await?;
    let service = startup.share_service;

    let expires_in = expires.unwrap_or(service.settings().default_expiry);
    let link = service
        .issue(&content, expires_in, CLI_CLIENT_ADDRESS)
        .await
        .map_err(|e| anyhow!("{} ({})", e.message(), e.code()))?;

    println!("{}", link.url);
    match link.expires_at {
        Some(at) => eprintln!("{} {}", "Expires:".dimmed(), format_timestamp(&at)),
        None => eprintln!("{}", "Never expires".dimmed()),
    }
    Ok(())
}

/// `notelink show <SLUG>`
pub async fn run_show(slug: &str) -> Result<()> {
    let config = get_config();
    let startup = lifetime::startup::prepare_startup(&config).await?;

    match startup.share_service.resolve(slug).await {
        Ok(note) => {
            let json =
                serde_json::to_string_pretty(&note).context("Failed to serialize note")?;
            println!("{}", json);
            Ok(())
        }
        Err(ResolveError::Store(e)) => Err(anyhow!(e.format_simple())),
        Err(e) => bail!("{}: {}", slug, e),
    }
}

/// `notelink generate-config [PATH] [--force]`
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<()> {
    let sample = StaticConfig::generate_sample_config();

    let Some(path) = output_path else {
        print!("{}", sample);
        return Ok(());
    };

    if Path::new(path).exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path);
    }

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow!("Failed to write {}: {}", path, e))?;
    println!("{} {}", "Configuration written to".green(), path);
    Ok(())
}
