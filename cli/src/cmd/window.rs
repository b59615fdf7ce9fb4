use std::io::{BufRead, Write};
use std::num::NonZeroUsize;

use anyhow::Result;
use runmed_core::MovingMedian;
use runmed_core::domain::{self, Collation, DomainKind};

use crate::cmd::median::MedianOutput;
use crate::cmd::{InputArgs, parse_value};
use crate::util::config::AppConfig;
use crate::util::input::{self, InputReader};

/// Print the median of the last N values after every input line
#[derive(clap::Parser)]
pub struct Cmd {
    #[clap(flatten)]
    input: InputArgs,

    /// window size, overrides the config
    #[clap(short, long)]
    size: Option<NonZeroUsize>,
}

impl Cmd {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let kind = self.input.kind(config);
        let collation = self.input.collation(config);
        let size = self.size.unwrap_or(config.window_size);
        tracing::info!(%kind, %collation, size = size.get(), "computing moving median");

        let reader = InputReader::new(input::open(self.input.file.as_deref())?)
            .with_progress(config.progress_interval);

        let mut stdout = std::io::stdout().lock();
        compute(reader, &mut stdout, kind, collation, size)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Writes one JSON line per non-NULL input value. NULL lines are skipped.
pub fn compute<R: BufRead, W: Write>(
    reader: InputReader<R>,
    output: &mut W,
    kind: DomainKind,
    collation: Collation,
    size: NonZeroUsize,
) -> Result<usize> {
    let mut window = MovingMedian::new(size, domain::collated_config_for(kind, collation)?);
    reader.for_each_line(|line| {
        let Some(value) = parse_value(kind, line)? else {
            return Ok(());
        };
        if let Some(evicted) = window.push(value)? {
            tracing::trace!(%evicted, "evicted");
        }

        let row = MedianOutput {
            count: window.len(),
            median: window.median()?,
        };
        serde_json::to_writer(&mut *output, &row)?;
        output.write_all(b"\n")?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, kind: DomainKind, size: usize) -> Result<String> {
        run_collated(input, kind, Collation::C, size)
    }

    fn run_collated(
        input: &str,
        kind: DomainKind,
        collation: Collation,
        size: usize,
    ) -> Result<String> {
        let mut output = Vec::new();
        let size = NonZeroUsize::new(size).unwrap();
        compute(InputReader::new(input.as_bytes()), &mut output, kind, collation, size)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn prints_window_medians() {
        let output = run("5\n1\n\\N\n9\n2\n", DomainKind::Int8, 3).unwrap();
        assert_eq!(
            output,
            concat!(
                "{\"count\":1,\"median\":5}\n",
                "{\"count\":2,\"median\":3}\n",
                "{\"count\":3,\"median\":5}\n",
                "{\"count\":3,\"median\":2}\n",
            )
        );
    }

    #[test]
    fn text_window_needs_odd_size() {
        let output = run("b\na\nc\n", DomainKind::Text, 1).unwrap();
        assert_eq!(output.lines().count(), 3);

        let err = run("b\na\n", DomainKind::Text, 2).unwrap_err();
        assert!(err.to_string().starts_with("line 2"), "{err}");
    }

    #[test]
    fn nocase_window() {
        let output = run("B\na\nC\n", DomainKind::Text, 3).unwrap();
        assert_eq!(output.lines().last(), Some(r#"{"count":3,"median":"C"}"#));

        let output = run_collated("B\na\nC\n", DomainKind::Text, Collation::NoCase, 3).unwrap();
        assert_eq!(output.lines().last(), Some(r#"{"count":3,"median":"B"}"#));
    }
}
