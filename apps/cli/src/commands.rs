//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use postforge_core::{
    CancellationToken, GeminiClient, IngestReport, ProgressReporter, Synthesizer, Worker,
};
use postforge_extract::HttpFetcher;
use postforge_research::{ResearchAugmenter, SerperClient};
use postforge_shared::{AppConfig, ArticleId, ArticleStatus, init_config, load_config};
use postforge_store::{ArticleStore, HttpArticleStore};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// postforge: enrich blog articles with research and a rewrite pass.
#[derive(Parser)]
#[command(
    name = "postforge",
    version,
    about = "Ingest blog articles and rewrite them with web research.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Article Store API base URL (overrides the config file).
    #[arg(long, env = "POSTFORGE_STORE_URL", global = true)]
    pub store_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rewrite pending articles until interrupted.
    Worker {
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },

    /// Seed the store from a blog listing page.
    Ingest {
        /// Listing page URL (defaults to the configured source).
        #[arg(long)]
        url: Option<String>,

        /// Number of articles to import.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List articles in the store.
    List {
        /// Only show articles with this status: pending or completed.
        #[arg(long)]
        status: Option<ArticleStatus>,
    },

    /// Show one article.
    Show {
        /// Article ID.
        id: ArticleId,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postforge=info",
        1 => "postforge=debug",
        _ => "postforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(cli.store_url.as_deref())?),
        };
    }

    let config = resolve_config(cli.store_url.as_deref())?;
    match cli.command {
        Command::Worker { once } => cmd_worker(&config, once).await,
        Command::Ingest { url, limit } => cmd_ingest(&config, url.as_deref(), limit).await,
        Command::List { status } => cmd_list(&config, status).await,
        Command::Show { id } => cmd_show(&config, id).await,
        Command::Config { .. } => Ok(()),
    }
}

/// Config file (or defaults) with CLI overrides applied.
fn resolve_config(store_url: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(url) = store_url {
        Url::parse(url).map_err(|e| eyre!("invalid store URL '{url}': {e}"))?;
        config.store.base_url = url.to_string();
    }
    Ok(config)
}

fn page_fetcher(config: &AppConfig) -> Result<HttpFetcher> {
    Ok(HttpFetcher::new(
        &config.research.user_agent,
        Duration::from_secs(config.research.timeout_secs),
    )?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_worker(config: &AppConfig, once: bool) -> Result<()> {
    // Validate API keys before touching the store
    let generator = Arc::new(GeminiClient::from_config(&config.llm)?);
    let search = Arc::new(SerperClient::from_config(&config.search)?);

    let store = Arc::new(HttpArticleStore::from_config(&config.store)?);
    let augmenter = ResearchAugmenter::with_config(
        search,
        Arc::new(page_fetcher(config)?),
        &config.search,
        &config.research,
    )?;

    let cancel = CancellationToken::new();
    let mut worker = Worker::new(store, augmenter, Synthesizer::new(generator), &config.worker)
        .with_cancellation(cancel.clone());

    info!(store = %config.store.base_url, model = %config.llm.model, once, "starting worker");

    if once {
        let report = worker.run_cycle().await;
        if report.listing_failed {
            return Err(eyre!("could not list articles from {}", config.store.base_url));
        }
        println!();
        println!("  Cycle finished");
        println!("  Pending:   {}", report.pending);
        println!("  Completed: {}", report.completed);
        println!("  Failed:    {}", report.failed);
        println!();
        return Ok(());
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, finishing current article");
            cancel.cancel();
        }
    });

    worker.run().await;
    Ok(())
}

async fn cmd_ingest(config: &AppConfig, url: Option<&str>, limit: Option<usize>) -> Result<()> {
    let mut ingest_config = config.ingest.clone();
    if let Some(url) = url {
        ingest_config.source_url = url.to_string();
    }
    if let Some(limit) = limit {
        if limit == 0 {
            return Err(eyre!("--limit must be at least 1"));
        }
        ingest_config.limit = limit;
    }

    let store = HttpArticleStore::from_config(&config.store)?;
    let fetcher = page_fetcher(config)?;

    info!(source = %ingest_config.source_url, limit = ingest_config.limit, "ingesting articles");

    let reporter = CliProgress::new();
    let report = postforge_core::ingest(&ingest_config, &store, &fetcher, &reporter).await?;

    println!();
    println!("  Ingestion finished");
    println!("  Found:    {}", report.found);
    println!("  Selected: {}", report.selected);
    println!("  Created:  {}", report.created);
    println!("  Skipped:  {}", report.skipped_existing);
    println!("  Failed:   {}", report.failed);
    println!();

    Ok(())
}

async fn cmd_list(config: &AppConfig, status: Option<ArticleStatus>) -> Result<()> {
    let store = HttpArticleStore::from_config(&config.store)?;
    let articles: Vec<_> = store
        .list_articles()
        .await?
        .into_iter()
        .filter(|a| status.is_none_or(|s| a.status == s))
        .collect();

    if articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    for article in &articles {
        println!("{:>5}  {:<10}  {}", article.id, article.status, article.title);
    }
    Ok(())
}

async fn cmd_show(config: &AppConfig, id: ArticleId) -> Result<()> {
    let store = HttpArticleStore::from_config(&config.store)?;
    let article = store.get_article(id).await?;

    println!("ID:      {}", article.id);
    println!("Title:   {}", article.title);
    println!("Status:  {}", article.status);
    if let Some(updated_at) = article.updated_at {
        println!("Updated: {}", updated_at.to_rfc3339());
    }
    println!();
    println!("--- Original ---");
    println!("{}", article.original_content);
    if let Some(updated) = &article.updated_content {
        println!();
        println!("--- Rewritten ---");
        println!("{updated}");
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn candidate(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Importing [{current}/{total}] {title}"));
    }

    fn done(&self, _report: &IngestReport) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_worker_once() {
        let cli = Cli::try_parse_from(["postforge", "worker", "--once"]).unwrap();
        assert!(matches!(cli.command, Command::Worker { once: true }));
    }

    #[test]
    fn parses_list_status_filter() {
        let cli = Cli::try_parse_from(["postforge", "list", "--status", "completed"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                status: Some(ArticleStatus::Completed)
            }
        ));
        assert!(Cli::try_parse_from(["postforge", "list", "--status", "archived"]).is_err());
    }

    #[test]
    fn parses_show_id_and_global_store_url() {
        let cli = Cli::try_parse_from([
            "postforge",
            "show",
            "42",
            "--store-url",
            "http://store.local/api",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Show { id: ArticleId(42) }));
        assert_eq!(cli.store_url.as_deref(), Some("http://store.local/api"));
    }

    #[test]
    fn ingest_overrides_are_optional() {
        let cli = Cli::try_parse_from(["postforge", "ingest", "--limit", "3"]).unwrap();
        match cli.command {
            Command::Ingest { url, limit } => {
                assert!(url.is_none());
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected ingest"),
        }
    }
}
