use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bind address for serve mode.
    pub bind: String,
    /// Cache entries older than this are treated as misses.
    pub cache_ttl_hours: i64,
    /// Static USD→EUR conversion rate applied to USD-denominated providers.
    pub usd_to_eur: f64,
    /// Timeout for each outbound provider call.
    pub request_timeout_secs: u64,
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub pokemon_base_url: String,
    pub yugioh_base_url: String,
    pub scryfall_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            cache_ttl_hours: 24,
            usd_to_eur: 0.92,
            request_timeout_secs: 10,
            providers: ProviderConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            pokemon_base_url: "https://api.pokemontcg.io/v2".to_string(),
            yugioh_base_url: "https://db.ygoprodeck.com/api/v7".to_string(),
            scryfall_base_url: "https://api.scryfall.com".to_string(),
        }
    }
}

impl Config {
    /// Load from a YAML file; a missing file means defaults, a present but
    /// invalid file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.usd_to_eur <= 0.0 {
            anyhow::bail!("usd_to_eur must be positive, got {}", self.usd_to_eur);
        }
        if self.cache_ttl_hours <= 0 {
            anyhow::bail!("cache_ttl_hours must be positive, got {}", self.cache_ttl_hours);
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        for (name, url) in [
            ("pokemon_base_url", &self.providers.pokemon_base_url),
            ("yugioh_base_url", &self.providers.yugioh_base_url),
            ("scryfall_base_url", &self.providers.scryfall_base_url),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("{} must not be empty", name);
            }
        }
        Ok(())
    }
}
