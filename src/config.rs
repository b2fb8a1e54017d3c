use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub arxiv: ArxivConfig,
    pub llm: LLMConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

/// Web search provider (Tavily)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArxivConfig {
    /// Tried in order, first success wins
    pub endpoints: Vec<String>,
    pub max_results: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ARXIV_ENDPOINTS: [&str; 2] = [
    "https://export2.arxiv.org/api/query",
    "https://export.arxiv.org/api/query",
];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            tavily_base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            max_results: 8,
            timeout_secs: 6,
        }
    }
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ARXIV_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            max_results: 10,
            timeout_secs: 10,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 1000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            arxiv: ArxivConfig::default(),
            llm: LLMConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", defaults.server.port)?,
                host: env::var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or(defaults.server.cors_allowed_origins),
            },
            search: SearchConfig {
                tavily_api_key: non_empty_var("TAVILY_API_KEY"),
                tavily_base_url: env::var("TAVILY_BASE_URL")
                    .unwrap_or(defaults.search.tavily_base_url),
                max_results: parse_var("SEARCH_MAX_RESULTS", defaults.search.max_results)?,
                timeout_secs: parse_var("SEARCH_TIMEOUT_SECS", defaults.search.timeout_secs)?,
            },
            arxiv: ArxivConfig {
                endpoints: env::var("ARXIV_ENDPOINTS")
                    .map(|v| split_list(&v))
                    .ok()
                    .filter(|list| !list.is_empty())
                    .unwrap_or(defaults.arxiv.endpoints),
                max_results: parse_var("ARXIV_MAX_RESULTS", defaults.arxiv.max_results)?,
                timeout_secs: parse_var("ARXIV_TIMEOUT_SECS", defaults.arxiv.timeout_secs)?,
            },
            llm: LLMConfig {
                gemini_api_key: non_empty_var("GEMINI_API_KEY"),
                gemini_base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or(defaults.llm.gemini_base_url),
                model: env::var("GEMINI_MODEL").unwrap_or(defaults.llm.model),
                timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
            },
            cache: CacheConfig {
                ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache.ttl_secs)?,
            },
            retry: RetryConfig {
                max_attempts: parse_var("RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                backoff_ms: parse_var("RETRY_BACKOFF_MS", defaults.retry.backoff_ms)?,
            },
            database: DatabaseConfig {
                url: non_empty_var("DATABASE_URL"),
                max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
