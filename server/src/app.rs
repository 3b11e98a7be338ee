//! Core application

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, SearchArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, SHUTDOWN_TIMEOUT_SECS};
use crate::core::shutdown::ShutdownService;
use crate::data::SqliteStore;
use crate::data::schema::{Column, TableName};
use crate::domain::search::{NO_ROWS_NOTICE, NO_TABLES_NOTICE, SearchRequest};
use crate::domain::{Catalog, CategoryMap, SearchService};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub store: Arc<SqliteStore>,
    pub search: Arc<SearchService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;

        let result = match command {
            Some(Commands::Serve) | None => return Self::start_server(app).await,
            Some(Commands::Tables) => app.print_tables().await,
            Some(Commands::Options { table, column }) => app.print_options(&table, column).await,
            Some(Commands::Categories) => app.print_categories(),
            Some(Commands::Search(args)) => app.print_search(args).await,
        };

        app.store.close().await;
        result
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let categories = match &config.catalog.categories_file {
            Some(path) => CategoryMap::load(path).with_context(|| {
                format!("Failed to load category map: {}", path.display())
            })?,
            None => CategoryMap::bundled().context("Bundled category map is invalid")?,
        };
        tracing::debug!(count = categories.entries().len(), "Category map loaded");

        let store = Arc::new(SqliteStore::connect(&config.database));
        let catalog = Arc::new(Catalog::new(
            store.clone(),
            config.catalog.cache_max_entries,
        ));
        let search = Arc::new(SearchService::new(catalog, Arc::new(categories)));
        let shutdown = ShutdownService::new(store.clone());

        Ok(Self {
            shutdown,
            config,
            store,
            search,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.config.database.path.display().to_string(),
            app.search.categories().entries().len(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;

        let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
        if tokio::time::timeout(timeout, app.shutdown.shutdown())
            .await
            .is_err()
        {
            tracing::warn!(timeout_secs = timeout.as_secs(), "Timeout during shutdown");
        }

        Ok(())
    }

    async fn print_tables(&self) -> Result<()> {
        let listing = self.search.tables().await;
        print_warning(listing.warning.as_deref());
        if listing.items.is_empty() && listing.warning.is_none() {
            eprintln!("{}", NO_TABLES_NOTICE);
        }
        print_json(&listing.items)
    }

    async fn print_options(&self, table: &str, column: Column) -> Result<()> {
        let table = self.resolve_table(table).await?;
        let listing = self.search.options(&table, column).await;
        print_warning(listing.warning.as_deref());
        print_json(&listing.items)
    }

    fn print_categories(&self) -> Result<()> {
        print_json(&self.search.categories().entries())
    }

    async fn print_search(&self, args: SearchArgs) -> Result<()> {
        let table = self.resolve_table(&args.table).await?;
        let request = SearchRequest {
            categories: args.categories,
            routes: args.routes,
            departure_time: args.departure,
            price: args.price,
            star_rating: args.rating,
            seat_availability: args.seats,
        };
        let criteria = self.search.criteria(&request)?;

        let outcome = self.search.search(&table, &criteria).await;
        print_warning(outcome.warning.as_deref());
        if outcome.count == 0 && outcome.warning.is_none() {
            eprintln!("{}", NO_ROWS_NOTICE);
        }
        print_json(&outcome)
    }

    /// Resolve a table name given on the command line
    async fn resolve_table(&self, name: &str) -> Result<TableName> {
        self.search
            .resolve_table(name)
            .await
            .context("Failed to list tables")?
            .ok_or_else(|| anyhow::anyhow!("Unknown table: {}", name))
    }
}

fn print_warning(warning: Option<&str>) {
    if let Some(warning) = warning {
        eprintln!("Warning: {}", warning);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
