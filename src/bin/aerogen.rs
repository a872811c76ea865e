//! aerogen: command-line front end for the site's generative features
//!
//! Exercises image generation, the sequential catalog fetch, the navigation
//! assistant and the local preference store.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use aerogen::config::{Config, Secrets};
use aerogen::types::catalog;
use aerogen::{Aerogen, CatalogItem, FetchEvent, PreferenceStore, SiteGateway, Theme};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::warn;

/// Aerogen CLI
#[derive(Parser)]
#[command(name = "aerogen")]
#[command(version = aerogen::PKG_VERSION)]
#[command(about = "Generative imagery and site assistant for the drone catalog")]
struct Args {
    /// Config file path (default: ~/.aerogen/config.toml, then /etc/aerogen/config.toml)
    #[arg(short, long, env = "AEROGEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a product image
    Image {
        /// Product title
        title: String,
        /// Product description
        description: String,
        /// Explicit scene prompt (replaces the description as context)
        #[arg(short, long)]
        prompt: Option<String>,
        /// Write the decoded image here (default: print the data URI length)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Ask the site assistant a question
    Ask {
        /// Question (or omit to read from stdin)
        query: Option<String>,
    },

    /// Fetch images for a catalog list, one item at a time
    Catalog {
        /// featured, products, solution:<category>, or a path to a JSON item list
        #[arg(default_value = "featured")]
        source: String,
    },

    /// Show, set or toggle the theme
    Theme {
        /// light, dark, or toggle (omit to show the current theme)
        value: Option<String>,
    },

    /// Save or unsave a job posting
    SaveJob {
        /// Job identifier
        id: String,
    },

    /// List saved job postings
    SavedJobs,

    /// Print the full version string
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Image {
            title,
            description,
            prompt,
            out,
        } => {
            let gateway = build_gateway(&config)?;
            let Some(image) = gateway
                .request_image(&title, &description, prompt.as_deref())
                .await
            else {
                println!("no image generated (see log for details)");
                return Ok(());
            };
            match out {
                Some(path) => {
                    let path = if path.extension().is_none() {
                        path.with_extension(image.file_extension())
                    } else {
                        path
                    };
                    std::fs::write(&path, image.decode()?)?;
                    println!("{} written to {}", image.mime_type(), path.display());
                }
                None => println!(
                    "{} image, {} base64 chars",
                    image.mime_type(),
                    image.base64_data().len()
                ),
            }
        }

        Command::Ask { query } => {
            let gateway = build_gateway(&config)?;
            let query = resolve_text(query, "ask")?;
            println!("{}", gateway.answer_query(&query).await);
        }

        Command::Catalog { source } => {
            let gateway = build_gateway(&config)?;
            let items = resolve_items(&source)?;
            run_catalog(&gateway, items).await;
        }

        Command::Theme { value } => {
            let mut store = open_preferences(&config)?;
            let theme = match value.as_deref() {
                None => store.theme(),
                Some("toggle") => store.toggle_theme()?,
                Some(other) => {
                    let theme: Theme = other.parse()?;
                    store.set_theme(theme)?;
                    theme
                }
            };
            println!("{theme}");
        }

        Command::SaveJob { id } => {
            let mut store = open_preferences(&config)?;
            let saved = store.toggle_saved_job(&id)?;
            println!("{id}: {}", if saved { "saved" } else { "removed" });
        }

        Command::SavedJobs => {
            let store = open_preferences(&config)?;
            if store.saved_jobs().is_empty() {
                println!("no saved jobs");
            }
            for id in store.saved_jobs() {
                println!("{id}");
            }
        }

        Command::Version => println!("aerogen {}", aerogen::version_string()),
    }

    Ok(())
}

fn build_gateway(config: &Config) -> Result<SiteGateway, Box<dyn std::error::Error>> {
    let secrets = Secrets::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring secrets file");
        Secrets::default()
    });
    let mut builder = config.apply(Aerogen::builder());
    if let Some(key) = secrets.api_key() {
        builder = builder.gemini(key);
    }
    Ok(builder.build()?)
}

fn open_preferences(config: &Config) -> Result<PreferenceStore, Box<dyn std::error::Error>> {
    let path = config
        .preferences_path()
        .ok_or("cannot determine home directory for preferences")?;
    Ok(PreferenceStore::open(path))
}

fn resolve_items(source: &str) -> Result<Vec<CatalogItem>, Box<dyn std::error::Error>> {
    match source {
        "featured" => Ok(catalog::featured_products()),
        "products" => Ok(catalog::product_list()),
        _ => {
            if let Some(category) = source.strip_prefix("solution:") {
                return catalog::solution(category)
                    .map(|item| vec![item])
                    .ok_or_else(|| {
                        let known: Vec<_> = catalog::solution_categories().collect();
                        format!(
                            "unknown solution '{category}' (known: {})",
                            known.join(", ")
                        )
                        .into()
                    });
            }
            let content = std::fs::read_to_string(source)?;
            Ok(serde_json::from_str(&content)?)
        }
    }
}

async fn run_catalog(gateway: &SiteGateway, items: Vec<CatalogItem>) {
    let session = gateway.fetch_session(items.clone());
    let Some(mut run) = session.trigger() else {
        return;
    };

    let mut tracker = aerogen::LoadingTracker::new();
    while let Some(event) = run.next().await {
        tracker.apply(&event);
        match &event {
            FetchEvent::Started { ids } => println!("loading {} items", ids.len()),
            FetchEvent::Settled { id, image } => {
                let outcome = if image.is_some() {
                    "generated"
                } else {
                    "fallback"
                };
                println!("  {id}: {outcome} ({} still loading)", tracker.in_flight());
            }
            FetchEvent::Finished => println!("done"),
            FetchEvent::Cancelled => println!("cancelled"),
        }
    }

    for item in &items {
        let source = match tracker.display_source(item) {
            Some(src) if src.starts_with("data:") => "generated image".to_string(),
            Some(src) => src.to_string(),
            None => "no image".to_string(),
        };
        println!("{}: {source}", item.title);
    }
    if gateway.generation().is_quota_exhausted() {
        println!("quota exhausted: image generation disabled for this session");
    }
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n\n{stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_is_pipe = !io::stdin().is_terminal();
    let stdin_text = if stdin_is_pipe {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    } else {
        None
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}
