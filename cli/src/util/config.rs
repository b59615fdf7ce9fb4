use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use runmed_core::domain::{Collation, DomainKind};
use runmed_util::cli::logger::LoggerConfig;
use runmed_util::serde_helpers::{self, load_json_from_file};
use serde::{Deserialize, Serialize};

const DEFAULT_WINDOW_SIZE: NonZeroUsize = NonZeroUsize::new(5).unwrap();

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logger: LoggerConfig,

    /// Value type used when a command has no `--type`.
    pub domain: DomainKind,

    /// Text ordering used when a command has no `--collation`.
    pub collation: Collation,

    /// Window size used when `window` has no `--size`.
    pub window_size: NonZeroUsize,

    pub engine: Engine,

    /// Worker threads for `group`. All cores by default.
    pub rayon_threads: Option<NonZeroUsize>,

    /// Log the number of consumed lines this often.
    #[serde(with = "serde_helpers::humantime_opt")]
    pub progress_interval: Option<Duration>,
}

impl AppConfig {
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => load_json_from_file(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(Self::default()),
        }
    }

    pub fn build_rayon_pool(&self) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|_| "runmed_worker".to_owned());
        if let Some(threads) = self.rayon_threads {
            builder = builder.num_threads(threads.get());
        }
        builder.build()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            domain: DomainKind::Float8,
            collation: Collation::C,
            window_size: DEFAULT_WINDOW_SIZE,
            engine: Engine::Heap,
            rayon_threads: None,
            progress_interval: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Two-heap running median.
    #[default]
    Heap,
    /// Collect and sort once.
    Sort,
}

#[cfg(test)]
mod tests {
    use runmed_util::serde_helpers::load_json_from_str;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "domain": "int8", "engine": "sort", "progress_interval": "10s" }"#,
        )
        .unwrap();

        let config = AppConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.domain, DomainKind::Int8);
        assert_eq!(config.collation, Collation::C);
        assert_eq!(config.engine, Engine::Sort);
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(DEFAULT_WINDOW_SIZE.get(), 5);
        assert_eq!(config.progress_interval, Some(Duration::from_secs(10)));
        assert_eq!(config.logger.outputs.len(), 1);
    }

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config.window_size.get(), 5);
        assert_eq!(config.engine, Engine::Heap);

        let config = load_json_from_str::<AppConfig>(r#"{ "collation": "nocase" }"#).unwrap();
        assert_eq!(config.collation, Collation::NoCase);
        assert_eq!(config.domain, DomainKind::Float8);
    }

    #[test]
    fn invalid_config_names_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "window_size": 0 }"#).unwrap();

        let err = AppConfig::load_or_default(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("window_size"), "{err:#}");
    }
}
