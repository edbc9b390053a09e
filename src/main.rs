mod commands;

use clap::{Parser, Subcommand};
use lexis_core::config;
use lexis_memory::Store;

#[derive(Parser)]
#[command(
    name = "lexis",
    version,
    about = "Lexis — build and query localization catalogs from translation fragments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a dotted key for display.
    Resolve {
        /// The key to resolve (e.g. `scheduling.today`).
        key: String,
        /// Language to resolve in. Defaults to the persisted active language.
        #[arg(short, long)]
        lang: Option<String>,
        /// Bundle to look in before the merged catalog.
        #[arg(short, long)]
        bundle: Option<String>,
        /// Placeholder values as `name=value`, repeatable.
        #[arg(short = 'a', long = "arg", value_parser = commands::parse_arg)]
        args: Vec<(String, String)>,
    },
    /// Print the merged catalog of one language as JSON.
    Dump {
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// List registered bundles.
    Bundles {
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Report keys missing relative to the default language.
    Coverage,
    /// Show or persist the active language.
    Language {
        #[command(subcommand)]
        action: Option<LanguageAction>,
    },
    /// Show config, fragment directory, and catalog sizes.
    Status,
}

#[derive(Subcommand)]
enum LanguageAction {
    /// Persist a new active language.
    Set {
        /// Language code (e.g. `fr`).
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.lexis.log_level)),
        )
        .init();

    match cli.command {
        Commands::Resolve {
            key,
            lang,
            bundle,
            args,
        } => {
            let localizer = commands::build_localizer(&cfg)?;
            let lang = match lang {
                Some(l) => l,
                None => {
                    let store = Store::new(&cfg.memory).await?;
                    commands::load_active_language(&localizer, &store).await?
                }
            };
            println!(
                "{}",
                commands::resolve(&localizer, &lang, bundle.as_deref(), &key, &args)
            );
        }
        Commands::Dump { lang } => {
            let localizer = commands::build_localizer(&cfg)?;
            let lang = lang.unwrap_or_else(|| localizer.default_language().to_string());
            println!("{}", commands::dump(&localizer, &lang)?);
        }
        Commands::Bundles { lang } => {
            let localizer = commands::build_localizer(&cfg)?;
            let lang = lang.unwrap_or_else(|| localizer.default_language().to_string());
            println!("{}", commands::bundles(&localizer, &lang));
        }
        Commands::Coverage => {
            let localizer = commands::build_localizer(&cfg)?;
            println!("{}", commands::coverage(&localizer));
        }
        Commands::Language { action } => {
            let store = Store::new(&cfg.memory).await?;
            match action {
                Some(LanguageAction::Set { code }) => {
                    store.set_active_language(&code).await?;
                    println!("Active language set to: {}", code.trim());
                }
                None => {
                    let current = store
                        .active_language()
                        .await?
                        .unwrap_or_else(|| cfg.catalog.default_language.clone());
                    println!("Active language: {current}\nUsage: lexis language set <code>");
                }
            }
        }
        Commands::Status => {
            let localizer = commands::build_localizer(&cfg)?;
            println!("{}", commands::status(&cfg, &cli.config, &localizer));
        }
    }

    Ok(())
}
