use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::util::error::InputError;

/// Opens `path`, or stdin when absent.
pub fn open(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    })
}

/// Line-oriented input that skips blank lines.
pub struct InputReader<R> {
    reader: R,
    progress_interval: Option<Duration>,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            progress_interval: None,
        }
    }

    pub fn with_progress(mut self, interval: Option<Duration>) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Calls `f` for every non-blank line with trailing newline removed.
    /// Returns the number of consumed lines.
    pub fn for_each_line<F>(mut self, mut f: F) -> Result<usize>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let started_at = Instant::now();
        let mut last_report = started_at;

        let mut buffer = String::new();
        let mut line_no = 0usize;
        let mut consumed = 0usize;
        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer).context("failed to read input")? == 0 {
                break;
            }
            line_no += 1;

            let line = buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            f(line).map_err(|e| InputError::line(line_no, e))?;
            consumed += 1;

            if let Some(interval) = self.progress_interval {
                if last_report.elapsed() >= interval {
                    last_report = Instant::now();
                    tracing::info!(consumed, "reading input");
                }
            }
        }

        tracing::debug!(
            consumed,
            skipped = line_no - consumed,
            elapsed = %humantime::format_duration(started_at.elapsed()),
            "input finished"
        );
        Ok(consumed)
    }
}
