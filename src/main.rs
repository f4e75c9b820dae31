use clap::{Parser, Subcommand, ValueEnum};
use film_pages::{
    AppConfig, CachedContentRepository, ContentRepository, DisplayZone, FRESHNESS_WINDOW,
    FilmIndex, FilmPage, FilmPagesError, ImageUrlBuilder, RenderError, RenderOptions,
    SanityRepository, VimeoProvider, load_dotenv, render_film_index, render_film_page,
};
use serde::Serialize;
use std::process;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit code for an unknown film slug
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "film-pages", version, about = "Render the film catalog and film detail pages")]
struct Cli {
    /// Time zone for screening times: an IANA name or "local"
    #[arg(long, global = true, env = "FILM_PAGES_TIMEZONE", default_value = "local")]
    timezone: DisplayZone,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Always read from the content store, bypassing the freshness window
    #[arg(long, global = true)]
    no_cache: bool,

    /// Timeout in seconds for each request to Sanity or Vimeo
    #[arg(
        long,
        global = true,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all films, newest screening first
    List,
    /// Show the detail page of one film
    Show {
        /// Slug of the film
        slug: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to warnings
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_repository(
    config: &AppConfig,
    timeout: Duration,
    no_cache: bool,
) -> Result<Box<dyn ContentRepository>, FilmPagesError> {
    let sanity = SanityRepository::new(config.sanity.clone(), timeout)?;
    if no_cache {
        return Ok(Box::new(sanity));
    }

    match CachedContentRepository::new(sanity, FRESHNESS_WINDOW) {
        Ok(cached) => Ok(Box::new(cached)),
        Err(e) => {
            warn!(error = %e, "Cache unavailable, reading content store directly");
            Ok(Box::new(SanityRepository::new(config.sanity.clone(), timeout)?))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FilmPagesError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_index(index: &FilmIndex) {
    println!("Films\n");

    if index.items.is_empty() {
        println!("No films found.");
        return;
    }

    for item in &index.items {
        println!("{}", item.title.as_deref().unwrap_or("Untitled"));
        if let Some(date) = &item.date_text {
            println!("  {}", date);
        }
        println!("  {}", item.href);
        println!();
    }
}

fn print_page(page: &FilmPage) {
    println!("<- Back to films (/)\n");

    if let Some(label) = &page.category_label {
        println!("[{}]", label);
    }
    if let Some(title) = &page.title {
        println!("{}", title);
    }
    if let Some(headline) = &page.headline {
        println!("{}", headline);
    }
    println!();
    println!("  Date:       {}", page.date_text);
    println!("  Time:       {}", page.time_text);
    println!("  Doors open: {}", page.doors_open_time_text);

    if let Some(url) = &page.video_embed_url {
        println!("  Video:      {}", url);
    }
    if let Some(url) = &page.image_url {
        println!("  Image:      {}", url);
    }
    if let Some(reason) = &page.video_unavailable {
        println!("  Video unavailable: {}", reason);
    }

    if let Some(description) = &page.description {
        let text = description.to_plain_text();
        if !text.is_empty() {
            println!("\n{}", text);
        }
    }
}

fn run(cli: Cli) -> Result<(), FilmPagesError> {
    // Validate every credential before touching the network
    let config = AppConfig::from_env()?;
    let timeout = Duration::from_secs(cli.timeout_secs);

    let repository = open_repository(&config, timeout, cli.no_cache)?;
    let options = RenderOptions::new(cli.timezone).with_images(ImageUrlBuilder::new(
        config.sanity.project_id.clone(),
        config.sanity.dataset.clone(),
    ));

    match cli.command {
        Command::List => {
            let index = render_film_index(repository.as_ref(), &options)?;
            match cli.format {
                OutputFormat::Text => print_index(&index),
                OutputFormat::Json => print_json(&index)?,
            }
        }
        Command::Show { slug } => {
            let provider = VimeoProvider::new(config.vimeo, timeout)?;
            let page = render_film_page(repository.as_ref(), &provider, &slug, &options)?;
            match cli.format {
                OutputFormat::Text => print_page(&page),
                OutputFormat::Json => print_json(&page)?,
            }
        }
    }

    Ok(())
}

fn main() {
    // .env may carry RUST_LOG, so it is loaded before the subscriber
    load_dotenv();
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => {}
        Err(FilmPagesError::Render(RenderError::NotFound(slug))) => {
            eprintln!("404: no film found with slug '{}'", slug);
            process::exit(EXIT_NOT_FOUND);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = Cli::try_parse_from(["film-pages", "--timeout-secs", "0", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeout_and_show_slug_parse() {
        let cli =
            Cli::try_parse_from(["film-pages", "show", "stalker", "--timeout-secs", "5"]).unwrap();
        assert_eq!(cli.timeout_secs, 5);
        assert!(matches!(cli.command, Command::Show { ref slug } if slug == "stalker"));
    }
}
