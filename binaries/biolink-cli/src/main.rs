//! biolink CLI
//!
//! ```bash
//! biolink serve --bind 0.0.0.0:8080
//! biolink pages create my-site "My Site"
//! biolink pages show my-site
//! biolink suggest bio "Ayu" photography travel
//! ```

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use biolink_config::Config;
use biolink_gemini::{CopyClient, ViewGuard};
use biolink_pages::{PageDirectory, TestimonialBook};
use biolink_store::FileStorage;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "biolink")]
#[command(about = "Link-in-bio pages: build, publish and collect visitor notes")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/biolink/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on, overrides the config
        #[arg(long)]
        bind: Option<String>,
    },

    /// Manage pages
    Pages {
        #[command(subcommand)]
        command: PageCommands,
    },

    /// Notes left on a page, newest first
    Testimonials {
        page_id: String,
    },

    /// Generated copy
    Suggest {
        #[command(subcommand)]
        command: SuggestCommands,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// List all pages
    List,

    /// Create an empty page
    Create {
        slug: String,
        name: String,
    },

    /// Print the public view of a page
    Show {
        slug: String,
    },

    /// Delete a page (its testimonials are kept)
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum SuggestCommands {
    /// Draft a profile bio
    Bio {
        name: String,
        /// Keywords describing the vibe
        keywords: Vec<String>,
    },

    /// Suggest a button title for a URL
    Title {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let json = config.log.json;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log.filter.as_str().into()))
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = Arc::new(biolink_web::AppState::from_config(&config)?);
            tracing::info!(
                "pages stored in {} (copy suggestions {})",
                config.storage.data_dir.display(),
                if config.copy.is_configured() { "on" } else { "off" }
            );
            biolink_web::serve(state, &bind).await?;
        }

        Commands::Pages { command } => {
            let storage = FileStorage::open(&config.storage.data_dir)?;
            let directory = PageDirectory::new(storage, config.defaults.clone());
            match command {
                PageCommands::List => print!("{}", report::page_table(&directory.summaries())),
                PageCommands::Create { slug, name } => {
                    let page = directory.create_page(&slug, &name, chrono::Utc::now())?;
                    println!("Created {} at /p/{}", page.id, page.slug);
                }
                PageCommands::Show { slug } => {
                    let view = directory.visitor_view(&slug, chrono::Utc::now())?;
                    print!("{}", report::outline(&view));
                }
                PageCommands::Delete { id } => {
                    directory.delete_page(&id)?;
                    println!("Deleted {}", id);
                }
            }
        }

        Commands::Testimonials { page_id } => {
            let book = TestimonialBook::new(FileStorage::open(&config.storage.data_dir)?);
            print!("{}", report::testimonials(&book.for_page(&page_id)));
        }

        Commands::Suggest { command } => {
            let client = CopyClient::from_config(&config.copy);

            // Ctrl-C closes the view; a reply arriving afterwards is dropped
            let guard = ViewGuard::new();
            let handle = guard.handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    guard.close();
                }
            });

            let result = match command {
                SuggestCommands::Bio { name, keywords } => {
                    handle.run(client.draft_bio(&name, &keywords.join(" "))).await
                }
                SuggestCommands::Title { url } => handle.run(client.suggest_link_title(&url)).await,
            };

            match result {
                Some(Ok(text)) if text.is_empty() => println!("(no suggestion)"),
                Some(Ok(text)) => println!("{}", text),
                Some(Err(e)) => eprintln!("{}", e),
                None => eprintln!("cancelled"),
            }
        }
    }

    Ok(())
}
