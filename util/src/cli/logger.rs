//! Logging for command line tools whose stdout carries results.
//!
//! Nothing here ever writes to stdout: human-readable logs go to stderr,
//! everything else to rolling files.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Installs the global subscriber described by `config`.
///
/// Filter precedence: `targets_path`, then `RUST_LOG`, then
/// [`LoggerConfig::default_filter`].
pub fn init_logger(config: &LoggerConfig, targets_path: Option<PathBuf>) -> Result<()> {
    let targets = targets_path.map(LoggerTargets::load_from).transpose()?;
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = config.build_filter(targets.as_ref(), env.as_deref())?;

    let layers = config
        .outputs
        .iter()
        .map(LoggerOutput::as_layer::<Registry>)
        .collect::<Result<Vec<_>>>()?;

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("a global logger is already installed")
}

/// Per-target levels, e.g. `{ "runmed_core": "trace", "runmed": "info" }`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoggerTargets(BTreeMap<String, String>);

impl LoggerTargets {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        crate::serde_helpers::load_json_from_file(path)
            .with_context(|| format!("failed to load logger targets {}", path.display()))
    }

    /// Comma-separated directive string understood by [`EnvFilter`].
    pub fn directives(&self) -> String {
        let directives = self
            .0
            .iter()
            .map(|(target, level)| format!("{target}={level}"))
            .collect::<Vec<_>>();
        directives.join(",")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directives used when neither a targets file nor `RUST_LOG` is given.
    pub default_filter: String,
    pub outputs: Vec<LoggerOutput>,
}

impl LoggerConfig {
    pub fn build_filter(
        &self,
        targets: Option<&LoggerTargets>,
        env: Option<&str>,
    ) -> Result<EnvFilter> {
        let directives = match (targets, env) {
            (Some(targets), _) => targets.directives(),
            (None, Some(env)) if !env.trim().is_empty() => env.to_owned(),
            (None, _) => self.default_filter.clone(),
        };
        EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid log filter `{directives}`"))
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_owned(),
            outputs: vec![LoggerOutput::Stderr(StderrOutput::default())],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LoggerOutput {
    Stderr(StderrOutput),
    File(FileOutput),
}

impl LoggerOutput {
    fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self {
            Self::Stderr(stderr) => Ok(stderr.as_layer()),
            Self::File(file) => file.as_layer(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StderrOutput {
    /// Colors on/off. Follows whether stderr is a terminal when unset.
    pub ansi: Option<bool>,
}

impl StderrOutput {
    fn as_layer<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let ansi = self.ansi.unwrap_or_else(|| std::io::stderr().is_terminal());
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .boxed()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutput {
    pub dir: PathBuf,
    #[serde(default = "FileOutput::default_prefix")]
    pub file_prefix: String,
    #[serde(default)]
    pub rotation: LogRotation,
    /// Stackdriver-compatible JSON lines instead of plain text.
    #[serde(default)]
    pub json: bool,
}

impl FileOutput {
    fn default_prefix() -> String {
        "runmed.log".to_owned()
    }

    fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let writer = tracing_appender::rolling::Builder::new()
            .rotation(self.rotation.into())
            .filename_prefix(&self.file_prefix)
            .build(&self.dir)
            .with_context(|| format!("failed to open log dir {}", self.dir.display()))?;

        Ok(if self.json {
            tracing_stackdriver::layer().with_writer(writer).boxed()
        } else {
            fmt::layer().with_ansi(false).with_writer(writer).boxed()
        })
    }
}

/// One file per run unless rotation is requested.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

impl From<LogRotation> for Rotation {
    fn from(value: LogRotation) -> Self {
        match value {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;
    use crate::serde_helpers::load_json_from_str;

    #[test]
    fn parses_outputs() {
        let config = load_json_from_str::<LoggerConfig>(
            r#"{ "outputs": [
                { "type": "stderr", "ansi": false },
                { "type": "file", "dir": "/var/log/runmed", "rotation": "daily", "json": true }
            ] }"#,
        )
        .unwrap();

        assert_eq!(config.default_filter, "warn");
        assert!(matches!(
            &config.outputs[0],
            LoggerOutput::Stderr(StderrOutput { ansi: Some(false) })
        ));
        let LoggerOutput::File(file) = &config.outputs[1] else {
            panic!("expected a file output");
        };
        assert_eq!(file.dir, Path::new("/var/log/runmed"));
        assert_eq!(file.file_prefix, "runmed.log");
        assert_eq!(file.rotation, LogRotation::Daily);
        assert!(file.json);
    }

    #[test]
    fn filter_precedence() {
        let config = LoggerConfig::default();
        let targets = load_json_from_str::<LoggerTargets>(
            r#"{ "runmed_core": "trace", "runmed": "info" }"#,
        )
        .unwrap();
        assert_eq!(targets.directives(), "runmed=info,runmed_core=trace");

        let hint = |targets: Option<&LoggerTargets>, env: Option<&str>| {
            config
                .build_filter(targets, env)
                .unwrap()
                .max_level_hint()
        };
        assert_eq!(hint(Some(&targets), Some("error")), Some(LevelFilter::TRACE));
        assert_eq!(hint(None, Some("debug")), Some(LevelFilter::DEBUG));
        assert_eq!(hint(None, Some(" ")), Some(LevelFilter::WARN));
        assert_eq!(hint(None, None), Some(LevelFilter::WARN));
    }

    #[test]
    fn loads_targets_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#"{ "runmed_core": "debug" }"#).unwrap();
        assert_eq!(
            LoggerTargets::load_from(&path).unwrap().directives(),
            "runmed_core=debug"
        );

        std::fs::write(&path, r#"[ "runmed_core" ]"#).unwrap();
        assert!(LoggerTargets::load_from(&path).is_err());
    }
}
