//! company-scout: run one registry search and print the result as JSON
//!
//! ```text
//! company-scout [--config <file>] segment '<json search params>'
//! company-scout [--config <file>] search <query>
//! company-scout [--config <file>] info <detail path or url>
//! ```

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use company_scout_lib::application::CompanySearchService;
use company_scout_lib::domain::SearchParams;
use company_scout_lib::infrastructure::{AppConfig, HttpClient, init_logging_with_config};
use tracing::info;

const USAGE: &str = "usage: company-scout [--config <file>] (segment <json> | search <query> | info <path>)";

/// Remove `--config <file>` from the arguments, returning the file
fn take_config_flag(args: &mut Vec<String>) -> Result<Option<String>> {
    let Some(position) = args.iter().position(|arg| arg == "--config") else {
        return Ok(None);
    };
    if position + 1 >= args.len() {
        bail!("--config requires a file path\n{USAGE}");
    }
    let path = args.remove(position + 1);
    args.remove(position);
    Ok(Some(path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = take_config_flag(&mut args)?;

    let config = AppConfig::load(config_path.as_deref())?;
    init_logging_with_config(&config.logging)?;

    let fetcher = Arc::new(HttpClient::new(config.http.clone())?);
    let service = CompanySearchService::new(fetcher, config.site.clone())?;

    let Some((command, rest)) = args.split_first() else {
        bail!(USAGE);
    };
    let argument = rest.join(" ");
    if argument.trim().is_empty() {
        bail!("missing argument for '{command}'\n{USAGE}");
    }

    info!("Running {} command", command);
    let output = match command.as_str() {
        "segment" => {
            let params: SearchParams =
                serde_json::from_str(&argument).context("Search parameters must be a JSON object")?;
            serde_json::to_string_pretty(&service.segmentation_search(&params).await?)?
        }
        "search" => serde_json::to_string_pretty(&service.search_companies(&argument).await?)?,
        "info" => serde_json::to_string_pretty(&service.get_company_info(&argument).await?)?,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };

    println!("{output}");
    Ok(())
}
