//! reposcrape binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use reposcrape::settings::CONFIG_ENV;
use reposcrape::{Scraper, Settings};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Settings file from the first argument or the environment
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from);

    let settings = Settings::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("failed to load settings from {}", path.display()),
        None => "failed to load settings from the environment".to_string(),
    })?;

    info!("Starting reposcrape v{}", env!("CARGO_PKG_VERSION"));
    info!("Destination: {}", settings.destination.display());
    info!("Repositories: {}", settings.repositories.len());

    let mut scraper = Scraper::new(settings.destination.clone());
    let mut failures = 0usize;

    for (index, entry) in settings.repositories.into_iter().enumerate() {
        let mut log_progress = |message: &str, advance: bool| {
            if advance {
                info!("{}", message);
            } else {
                debug!("{}", message);
            }
        };

        match scraper.scrape(entry, Some(&mut log_progress)) {
            Ok(true) => {
                if let Some(path) = scraper.result_path() {
                    info!("Repository #{} available at {}", index + 1, path.display());
                }
            },
            Ok(false) => {
                failures += 1;
                for message in scraper.errors() {
                    error!("Repository #{}: {}", index + 1, message);
                }
            },
            Err(e) => {
                failures += 1;
                error!("Repository #{} rejected: {}", index + 1, e);
            },
        }
    }

    if failures > 0 {
        error!("{} repositories failed", failures);
        return Ok(ExitCode::FAILURE);
    }

    info!("All repositories scraped");
    Ok(ExitCode::SUCCESS)
}
