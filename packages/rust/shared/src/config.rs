//! Application configuration for postforge.
//!
//! User config lives at `~/.postforge/postforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PostforgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postforge";

/// Most search results scraped per article. Larger `max_sources` values are clamped.
pub const MAX_SOURCES_CAP: usize = 2;

/// Longest research excerpt, in characters. Larger `max_excerpt_chars` values are clamped.
pub const MAX_EXCERPT_CHARS_CAP: usize = 4000;

/// Browser-like identifying header sent to source sites to reduce blocking.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching postforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Pull research limits down to their caps, warning for each one lowered.
    pub fn clamp_limits(&mut self) {
        if self.search.max_sources > MAX_SOURCES_CAP {
            tracing::warn!(
                configured = self.search.max_sources,
                cap = MAX_SOURCES_CAP,
                "search.max_sources above cap, clamping"
            );
            self.search.max_sources = MAX_SOURCES_CAP;
        }
        if self.research.max_excerpt_chars > MAX_EXCERPT_CHARS_CAP {
            tracing::warn!(
                configured = self.research.max_excerpt_chars,
                cap = MAX_EXCERPT_CHARS_CAP,
                "research.max_excerpt_chars above cap, clamping"
            );
            self.research.max_excerpt_chars = MAX_EXCERPT_CHARS_CAP;
        }
    }
}

/// `[store]` section: the Article Store REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL; `/articles` is appended.
    #[serde(default = "default_store_url")]
    pub base_url: String,

    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:8000/api".into()
}
fn default_store_timeout() -> u64 {
    30
}

/// `[search]` section: the web search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Results requested per query.
    #[serde(default = "default_result_count")]
    pub result_count: u32,

    /// Organic links kept for scraping, at most [`MAX_SOURCES_CAP`].
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_key_env(),
            result_count: default_result_count(),
            max_sources: default_max_sources(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".into()
}
fn default_search_key_env() -> String {
    "SERPER_API_KEY".into()
}
fn default_result_count() -> u32 {
    5
}
fn default_max_sources() -> usize {
    MAX_SOURCES_CAP
}
fn default_search_timeout() -> u64 {
    15
}

/// `[llm]` section: the generative text provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_model(),
            api_key_env: default_llm_key_env(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_model() -> String {
    "gemini-flash-latest".into()
}
fn default_llm_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[research]` section: source scraping limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Upper bound on each excerpt, in characters, at most [`MAX_EXCERPT_CHARS_CAP`].
    #[serde(default = "default_max_excerpt_chars")]
    pub max_excerpt_chars: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_excerpt_chars: default_max_excerpt_chars(),
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_max_excerpt_chars() -> usize {
    MAX_EXCERPT_CHARS_CAP
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}
fn default_fetch_timeout() -> u64 {
    20
}

/// `[worker]` section: pacing and idle policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Pause after every article, success or failure.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Pause between cycles, whether or not work was found.
    #[serde(default = "default_idle_interval_ms")]
    pub idle_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            idle_interval_ms: default_idle_interval_ms(),
        }
    }
}

impl WorkerConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

fn default_pacing_ms() -> u64 {
    2000
}
fn default_idle_interval_ms() -> u64 {
    5000
}

/// `[ingest]` section: the blog listing used to seed the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// How many of the oldest listed posts to ingest.
    #[serde(default = "default_ingest_limit")]
    pub limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            limit: default_ingest_limit(),
        }
    }
}

fn default_source_url() -> String {
    "https://beyondchats.com/blogs/".into()
}
fn default_ingest_limit() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postforge/postforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
/// Research limits above their caps are clamped.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostforgeError::io(path, e))?;

    let mut config: AppConfig = toml::from_str(&content)
        .map_err(|e| PostforgeError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.clamp_limits();
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a non-empty API key from the named environment variable.
pub fn validate_api_key(var_name: &str, provider: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PostforgeError::config(format!(
            "{provider} API key not found. Set the {var_name} environment variable."
        ))),
    }
}
