//! Configuration management.
//!
//! Configuration is layered: serde defaults, then an optional TOML file,
//! then `RESEARCH_SYNTH_*` environment variables (nested keys use `__`,
//! e.g. `RESEARCH_SYNTH_AGENT__MAX_ITERATIONS=4`). The Gemini key falls
//! back to `GEMINI_API_KEY` when no layer sets it.
//!
//! ```toml
//! [api_keys]
//! gemini = "your-key"
//!
//! [generation]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta/models"
//! model = "gemini-1.5-flash"
//!
//! [sources]
//! default_source = "arxiv"
//! search_results = 5
//!
//! [agent]
//! max_iterations = 8
//! memory = true
//! memory_max_turns = 40
//! memory_max_chars = 24000
//!
//! [documents]
//! max_chars = 4000
//!
//! [retry]
//! max_attempts = 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::RetryConfig;

/// Environment variable holding the generation API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "RESEARCH_SYNTH";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Generation endpoint settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Paper source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Document reader settings
    #[serde(default)]
    pub documents: DocumentConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry settings for upstream calls
    #[serde(default)]
    pub retry: RetrySettings,
}

/// API keys for external services
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Gemini API key
    #[serde(default)]
    pub gemini: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("gemini", &self.gemini.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Generation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the models collection
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Model name appended to the endpoint
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            model: default_model(),
        }
    }
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Paper source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// arXiv query endpoint
    #[serde(default = "default_arxiv_url")]
    pub arxiv_url: String,

    /// Semantic Scholar graph API base
    #[serde(default = "default_semantic_url")]
    pub semantic_url: String,

    /// Source used by the `paper_search` tool
    #[serde(default = "default_source")]
    pub default_source: String,

    /// Result count used by the `paper_search` tool
    #[serde(default = "default_search_results")]
    pub search_results: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            arxiv_url: default_arxiv_url(),
            semantic_url: default_semantic_url(),
            default_source: default_source(),
            search_results: default_search_results(),
        }
    }
}

fn default_arxiv_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_semantic_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_source() -> String {
    "arxiv".to_string()
}

fn default_search_results() -> usize {
    5
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum decisions per request before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Carry the transcript across requests
    #[serde(default = "default_true")]
    pub memory: bool,

    /// Sliding window size in turns
    #[serde(default = "default_memory_max_turns")]
    pub memory_max_turns: usize,

    /// Sliding window size in characters
    #[serde(default = "default_memory_max_chars")]
    pub memory_max_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            memory: true,
            memory_max_turns: default_memory_max_turns(),
            memory_max_chars: default_memory_max_chars(),
        }
    }
}

fn default_max_iterations() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_memory_max_turns() -> usize {
    40
}

fn default_memory_max_chars() -> usize {
    24_000
}

/// Document reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Character budget for extracted text
    #[serde(default = "default_document_chars")]
    pub max_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_chars: default_document_chars(),
        }
    }
}

fn default_document_chars() -> usize {
    4000
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Retry configuration as it appears in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per upstream call; 1 disables retry
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl RetrySettings {
    /// Convert into the runtime retry configuration
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: 2.0,
        }
    }
}

impl Config {
    /// Fill unset secrets from their conventional environment variables
    pub fn with_env_fallbacks(mut self) -> Self {
        if self.api_keys.gemini.as_deref().map_or(true, str::is_empty) {
            self.api_keys.gemini = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        self
    }

    /// The Gemini key, if one is configured
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.api_keys.gemini.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Check the configuration without failing startup
    pub fn health(&self) -> HealthReport {
        let mut issues = Vec::new();

        if self.gemini_api_key().is_none() {
            issues.push(format!(
                "generation API key is missing: set {} or [api_keys] gemini",
                API_KEY_ENV
            ));
        }
        if self.agent.max_iterations == 0 {
            issues.push("agent.max_iterations must be at least 1".to_string());
        }
        if self.documents.max_chars == 0 {
            issues.push("documents.max_chars must be at least 1".to_string());
        }
        if !matches!(self.sources.default_source.as_str(), "arxiv" | "semantic") {
            issues.push(format!(
                "sources.default_source '{}' is not a known source",
                self.sources.default_source
            ));
        }

        HealthReport { issues }
    }
}

/// Outcome of [`Config::health`]
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    /// Human-readable problems, empty when healthy
    pub issues: Vec<String>,
}

impl HealthReport {
    /// Whether no problems were found
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    Ok(config.with_env_fallbacks())
}

/// Look for a config file in the working directory, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("research-synth.toml");
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("research-synth").join("config.toml"))
        .filter(|path| path.is_file())
}
