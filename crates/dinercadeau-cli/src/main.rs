mod export;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use dinercadeau_core::PipelineSettings;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dinercadeau")]
#[command(about = "Build a local index of Diner Cadeau restaurants")]
struct Cli {
    /// Only list restaurants in this city
    #[arg(long)]
    city: Option<String>,

    /// Number of listing pages to crawl
    #[arg(long)]
    max_pages: Option<u32>,

    /// Restaurants per listing page
    #[arg(long)]
    page_size: Option<usize>,

    /// Output CSV path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Append to the output file instead of overwriting it
    #[arg(long)]
    append: bool,

    /// Skip geocoding lookups
    #[arg(long)]
    no_geocoding: bool,

    /// Settings file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Contact email passed to the geocoding provider
    #[arg(long)]
    email: Option<String>,

    /// Seconds to wait between listing page requests
    #[arg(long)]
    pause: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Overlays the flags that were given on top of loaded settings.
    fn apply_to(&self, settings: &mut PipelineSettings) {
        if let Some(city) = &self.city {
            settings.fetch.city = Some(city.clone());
        }
        if let Some(max_pages) = self.max_pages {
            settings.fetch.max_pages = max_pages;
        }
        if let Some(page_size) = self.page_size {
            settings.fetch.page_size = page_size;
        }
        if let Some(pause) = self.pause {
            settings.fetch.pause_seconds = pause;
        }
        if let Some(output) = &self.output {
            settings.output_csv.clone_from(output);
        }
        if self.append {
            settings.append = true;
        }
        if self.no_geocoding {
            settings.include_geocoding = false;
        }
        if let Some(email) = &self.email {
            settings.geocode.email = Some(email.clone());
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut settings = dinercadeau_core::load_settings(cli.config.as_deref())?;
    cli.apply_to(&mut settings);
    settings.validate()?;

    let report = pipeline::run_pipeline(&settings).await?;
    tracing::info!(
        pages = report.pages_fetched,
        restaurants = report.restaurants,
        geocoded = report.geocoded,
        output = %settings.output_csv.display(),
        "restaurant index written"
    );

    Ok(())
}
