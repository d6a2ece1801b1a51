use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Share of non-active, non-pinned tabs reported as idle.
    pub idle_ratio: f64,
    pub similarity: SimilarityConfig,
    pub concurrency: ConcurrencyConfig,
    pub cache: CacheConfig,
}

/// Merge thresholds for the near-duplicate clusterer.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Maximum Hamming distance between two content signatures.
    pub simhash_threshold: u32,
    pub title_threshold: f64,
    pub url_threshold: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub content: usize,
    pub process: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub thumbnail_ttl_secs: u64,
    pub max_thumbnails: usize,
    pub process_ttl_secs: u64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            simhash_threshold: 5,
            title_threshold: 0.8,
            url_threshold: 0.8,
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            content: 6,
            process: 4,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            thumbnail_ttl_secs: 30 * 60,
            max_thumbnails: 30,
            process_ttl_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn thumbnail_ttl(&self) -> Duration {
        Duration::from_secs(self.thumbnail_ttl_secs)
    }

    pub fn process_ttl(&self) -> Duration {
        Duration::from_secs(self.process_ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            idle_ratio: 0.3,
            similarity: SimilarityConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Load `Config.{toml,json,yaml}` from the working directory if present, then
/// apply `TAB_TRIAGE__SECTION__KEY` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("TAB_TRIAGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let config = AppConfig::default();
        assert_eq!(config.similarity.simhash_threshold, 5);
        assert_eq!(config.similarity.title_threshold, 0.8);
        assert_eq!(config.similarity.url_threshold, 0.8);
        assert_eq!(config.concurrency.content, 6);
        assert_eq!(config.concurrency.process, 4);
        assert_eq!(config.cache.max_thumbnails, 30);
        assert_eq!(config.cache.thumbnail_ttl(), Duration::from_secs(1800));
        assert_eq!(config.idle_ratio, 0.3);
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[similarity]\nsimhash_threshold = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.similarity.simhash_threshold, 3);
        assert_eq!(config.similarity.title_threshold, 0.8);
        assert_eq!(config.concurrency.process, 4);
        assert_eq!(config.idle_ratio, 0.3);
    }
}
