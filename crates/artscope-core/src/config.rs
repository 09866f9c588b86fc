//! Explorer configuration. Load from TOML or env.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | api_base | ARTSCOPE__API_BASE | https://api.harvardartmuseums.org |
//! | api_key | ARTSCOPE__API_KEY | (empty) |
//! | cache_path | ARTSCOPE__CACHE_PATH | ./data/artscope_cache |
//! | bind_addr | ARTSCOPE__BIND_ADDR | 127.0.0.1:3001 |
//! | request_timeout_secs | ARTSCOPE__REQUEST_TIMEOUT_SECS | 30 |
//! | reference_page_size | ARTSCOPE__REFERENCE_PAGE_SIZE | 100 |
//! | session_idle_secs | ARTSCOPE__SESSION_IDLE_SECS | 3600 |

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://api.harvardartmuseums.org";
const DEFAULT_CONFIG_PATH: &str = "config/artscope";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtscopeConfig {
    /// Base endpoint of the remote search API (no trailing slash).
    pub api_base: String,
    /// Value of the `apikey` query parameter sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Directory of the sled tree backing the reference-data cache.
    pub cache_path: String,
    /// Address the gateway listens on.
    pub bind_addr: String,
    pub request_timeout_secs: u64,
    /// `size` parameter of reference-list fetches.
    pub reference_page_size: u32,
    /// Browser sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
}

impl Default for ArtscopeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            cache_path: "./data/artscope_cache".to_string(),
            bind_addr: "127.0.0.1:3001".to_string(),
            request_timeout_secs: 30,
            reference_page_size: 100,
            session_idle_secs: 3600,
        }
    }
}

impl ArtscopeConfig {
    /// Load config from file and environment. Precedence: env > `ARTSCOPE_CONFIG` path
    /// (or `config/artscope.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("ARTSCOPE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("api_base", defaults.api_base)?
            .set_default("api_key", defaults.api_key)?
            .set_default("cache_path", defaults.cache_path)?
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("reference_page_size", defaults.reference_page_size as i64)?
            .set_default("session_idle_secs", defaults.session_idle_secs as i64)?;

        let toml_path = Path::new(&config_path).with_extension("toml");
        let builder = if toml_path.exists() {
            builder.add_source(config::File::from(toml_path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("ARTSCOPE").separator("__"))
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        cfg.api_base = cfg.api_base.trim().trim_end_matches('/').to_string();
        cfg.api_key = cfg.api_key.trim().to_string();
        Ok(cfg)
    }

    /// True when no API key is configured; the remote API rejects such requests.
    pub fn missing_api_key(&self) -> bool {
        self.api_key.is_empty()
    }
}
