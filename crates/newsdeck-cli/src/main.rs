use anyhow::{bail, Context};
use clap::Parser;
use newsdeck_api::NewsDataClient;
use newsdeck_cache::{KeyValueStore, MemoryStore, SqliteStore};
use newsdeck_core::{
    feeds::SearchParams, providers::NewsDataProvider, Article, ArticleHydrator, ArticleId,
    ArticleSource, BookmarkStore, BookmarkUpdate, Config, Error, FilterSet, LoadState, NewsFeed,
    Preferences, SavedArticles, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "newsdeck")]
#[command(version, about = "Read, search and bookmark news from the terminal", long_about = None)]
struct Cli {
    /// newsdata.io API key (overrides the config file)
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep bookmarks and preferences in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Top headlines
    Breaking,
    /// Latest news, optionally for one category
    News {
        /// Category slug (see `categories`)
        #[arg(long, default_value = "")]
        category: String,
        /// Page cursor from a previous result
        #[arg(long)]
        page: Option<String>,
    },
    /// Search news
    Search {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,
        /// Category slug, repeatable
        #[arg(long)]
        category: Vec<String>,
        /// Country code, repeatable
        #[arg(long)]
        country: Vec<String>,
    },
    /// Show one article
    Show {
        /// Article id
        id: String,
    },
    /// Manage bookmarks
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Fetch and list bookmarked articles
    Saved,
    /// List available categories
    Categories,
    /// List available countries
    Countries,
    /// Show or toggle dark mode
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(clap::Subcommand)]
enum BookmarkCommand {
    /// Save an article id
    Add { id: String },
    /// Forget an article id
    Remove { id: String },
    /// Save if missing, forget if saved
    Toggle { id: String },
    /// Print saved ids
    List,
    /// Forget everything
    Clear,
}

/// Everything a command might need, wired explicitly
struct App {
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    api_key: Option<String>,
}

impl App {
    fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = match cli.config {
            Some(ref path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        let storage: Arc<dyn KeyValueStore> = if cli.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            let path = config.storage_path()?;
            tracing::debug!("Using storage at {}", path.display());
            Arc::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("opening storage at {}", path.display()))?,
            )
        };

        let api_key = cli.api_key.clone().or_else(|| config.api.api_key.clone());

        Ok(Self {
            config,
            storage,
            api_key,
        })
    }

    fn session(&self) -> Session {
        let prefs = Preferences::new(self.storage.clone());
        Session::new(self.config.user.clone(), prefs.theme())
    }

    fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::new(self.storage.clone())
    }

    fn source(&self) -> anyhow::Result<Arc<dyn ArticleSource>> {
        let Some(ref key) = self.api_key else {
            bail!("No API key configured. Set NEWSDATA_API_KEY or api.api_key in the config file");
        };

        let client = NewsDataClient::with_base_url(
            key.clone(),
            self.config.api.base_url.clone(),
            self.config.api.timeout(),
        )?;
        let source: Arc<dyn ArticleSource> = Arc::new(NewsDataProvider::new(client));
        Ok(source)
    }

    fn feed(&self) -> anyhow::Result<NewsFeed> {
        Ok(NewsFeed::new(self.source()?)
            .with_language(self.config.api.language.clone())
            .with_sizes(self.config.ui.page_size, self.config.ui.breaking_size))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(ref command) = cli.command else {
        println!("No command specified. Try --help");
        return Ok(());
    };

    let app = App::new(&cli)?;

    match command {
        Commands::Breaking => {
            let session = app.session();
            println!("Welcome, {}", session.display_name());
            println!("Breaking News\n");
            for article in app.feed()?.breaking().await? {
                print_row(&article);
            }
        }
        Commands::News { category, page } => {
            let result = app.feed()?.by_category(category, page.clone()).await?;
            for article in &result.articles {
                print_row(article);
            }
            print_next_page(result.next_page.as_deref());
        }
        Commands::Search {
            query,
            category,
            country,
        } => {
            let params = SearchParams {
                query: query.clone(),
                category: select_filters(FilterSet::categories(), category, "category"),
                country: select_filters(FilterSet::countries(), country, "country"),
            };
            let result = app.feed()?.search(&params).await?;
            if result.articles.is_empty() {
                println!("No results.");
            }
            for article in &result.articles {
                print_row(article);
            }
            print_next_page(result.next_page.as_deref());
        }
        Commands::Show { id } => {
            let id = ArticleId::new(id.clone());
            let article = app.feed()?.article(&id).await?;
            let saved = app.bookmarks().is_bookmarked(&id);
            print_detail(&article, saved);
        }
        Commands::Bookmark(cmd) => run_bookmark(&app, cmd),
        Commands::Saved => {
            let store = app.bookmarks();
            if store.list().is_empty() {
                println!("No saved articles.");
                return Ok(());
            }
            let hydrator = ArticleHydrator::new(app.source()?);
            let mut screen = SavedArticles::new();

            match screen.refresh(&store, &hydrator).await {
                LoadState::Ready(articles) if articles.is_empty() => {
                    println!("No saved articles.")
                }
                LoadState::Ready(articles) => {
                    for article in articles {
                        print_row(article);
                    }
                }
                LoadState::Failed { error } => {
                    eprintln!("Couldn't load saved articles: {}", error);
                }
                LoadState::Idle | LoadState::Loading => {}
            }
        }
        Commands::Categories => {
            for option in FilterSet::categories().options() {
                println!("{:<14} {}", option.value, option.label);
            }
        }
        Commands::Countries => {
            for option in FilterSet::countries().options() {
                println!("{:<4} {}", option.value, option.label);
            }
        }
        Commands::Theme { toggle } => {
            let prefs = Preferences::new(app.storage.clone());
            if *toggle {
                prefs.toggle_dark_mode()?;
            }
            println!("Theme: {}", prefs.theme());
        }
    }

    Ok(())
}

fn run_bookmark(app: &App, cmd: &BookmarkCommand) {
    let store = app.bookmarks();
    match cmd {
        BookmarkCommand::Add { id } => {
            let update = store.add(ArticleId::new(id.clone()));
            report(&update, if update.changed { "News saved!" } else { "Already saved." });
        }
        BookmarkCommand::Remove { id } => {
            let update = store.remove(&ArticleId::new(id.clone()));
            report(&update, if update.changed { "News unsaved!" } else { "Wasn't saved." });
        }
        BookmarkCommand::Toggle { id } => {
            let id = ArticleId::new(id.clone());
            let update = store.toggle(id.clone());
            let msg = if store.is_bookmarked(&id) {
                "News saved!"
            } else {
                "News unsaved!"
            };
            report(&update, msg);
        }
        BookmarkCommand::List => {
            let ids = store.list();
            if ids.is_empty() {
                println!("No bookmarks.");
            }
            for id in ids {
                println!("{}", id);
            }
        }
        BookmarkCommand::Clear => {
            let update = store.clear();
            report(&update, "Bookmarks cleared.");
        }
    }
}

fn report(update: &BookmarkUpdate, message: &str) {
    match update.warning {
        Some(ref err @ Error::StorageRead(_)) => {
            eprintln!("Couldn't read saved bookmarks, nothing changed: {}", err);
        }
        Some(ref warning) => {
            println!("{}", message);
            eprintln!("warning: {} (change kept for this run only)", warning);
        }
        None => println!("{}", message),
    }
}

fn select_filters(mut set: FilterSet, values: &[String], kind: &str) -> Option<String> {
    for value in values {
        if !set.select_value(value) {
            tracing::warn!("Unknown {} '{}', ignoring", kind, value);
        }
    }
    set.query_value()
}

fn print_row(article: &Article) {
    let source = article.source_name.as_deref().unwrap_or("unknown source");
    let when = article.published_label().unwrap_or_default();
    println!("[{}] {}", article.id, article.title);
    println!("    {} {}", source, when);
}

fn print_detail(article: &Article, saved: bool) {
    println!("{}{}", if saved { "[saved] " } else { "" }, article.title);
    println!(
        "{}  {}",
        article.published_label().unwrap_or_default(),
        article.source_name.as_deref().unwrap_or("")
    );
    if let Some(ref image) = article.image_url {
        println!("{}", image);
    }
    println!();
    if let Some(body) = article.body() {
        println!("{}", body);
    }
    if let Some(ref link) = article.link {
        println!("\n{}", link);
    }
}

fn print_next_page(next: Option<&str>) {
    if let Some(cursor) = next {
        println!("\nMore: --page {}", cursor);
    }
}
