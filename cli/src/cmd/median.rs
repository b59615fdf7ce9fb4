use std::io::BufRead;

use anyhow::Result;
use runmed_core::aggregate::{MedianAggregate, MedianState};
use runmed_core::batch;
use runmed_core::domain::{self, Collation, Datum, DomainKind};
use serde::Serialize;

use crate::cmd::{InputArgs, parse_value};
use crate::util::config::{AppConfig, Engine};
use crate::util::input::{self, InputReader};
use crate::util::print_json;

/// Compute the median of all input values
#[derive(clap::Parser)]
pub struct Cmd {
    #[clap(flatten)]
    input: InputArgs,

    /// median engine, overrides the config
    #[clap(short, long, value_enum)]
    engine: Option<Engine>,
}

impl Cmd {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let kind = self.input.kind(config);
        let collation = self.input.collation(config);
        let engine = self.engine.unwrap_or(config.engine);
        tracing::info!(%kind, %collation, ?engine, "computing median");

        let reader = InputReader::new(input::open(self.input.file.as_deref())?)
            .with_progress(config.progress_interval);
        print_json(compute(reader, kind, collation, engine)?)
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MedianOutput {
    /// Number of non-NULL values.
    pub count: usize,
    pub median: Option<Datum>,
}

pub fn compute<R: BufRead>(
    reader: InputReader<R>,
    kind: DomainKind,
    collation: Collation,
    engine: Engine,
) -> Result<MedianOutput> {
    match engine {
        Engine::Heap => {
            let mut aggregate = MedianAggregate::with_collation(kind, collation)?;
            reader.for_each_line(|line| {
                aggregate.accum(parse_value(kind, line)?)?;
                Ok(())
            })?;

            Ok(MedianOutput {
                count: aggregate.state().map_or(0, MedianState::len),
                median: aggregate.finalize()?,
            })
        }
        Engine::Sort => {
            let config = domain::collated_config_for(kind, collation)?;
            let mut values = Vec::new();
            reader.for_each_line(|line| {
                values.extend(parse_value(kind, line)?);
                Ok(())
            })?;

            Ok(MedianOutput {
                count: values.len(),
                median: batch::median(values, &config)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, kind: DomainKind, engine: Engine) -> Result<MedianOutput> {
        compute(InputReader::new(input.as_bytes()), kind, Collation::C, engine)
    }

    #[test]
    fn engines_agree() {
        let input = "5\n1\n\\N\n9\n\n2\n";
        for engine in [Engine::Heap, Engine::Sort] {
            let output = run(input, DomainKind::Float8, engine).unwrap();
            assert_eq!(output, MedianOutput {
                count: 4,
                median: Some(Datum::Float8(3.5)),
            });

            let output = run(input, DomainKind::Int4, engine).unwrap();
            assert_eq!(output.median, Some(Datum::Int4(3)));
        }
    }

    #[test]
    fn empty_input_has_no_median() {
        for engine in [Engine::Heap, Engine::Sort] {
            let output = run("\\N\n\n", DomainKind::Numeric, engine).unwrap();
            assert_eq!(output, MedianOutput {
                count: 0,
                median: None,
            });
        }

        let json = serde_json::to_string(&run("", DomainKind::Int8, Engine::Heap).unwrap());
        assert_eq!(json.unwrap(), r#"{"count":0,"median":null}"#);
    }

    #[test]
    fn reports_bad_input() {
        let err = run("1\nx\n", DomainKind::Int8, Engine::Heap).unwrap_err();
        assert_eq!(err.to_string(), "line 2: invalid int8 value `x`");

        let err = run("a\nb\n", DomainKind::Text, Engine::Sort).unwrap_err();
        assert!(err.to_string().contains("text"), "{err}");

        assert!(run("{}", DomainKind::Json, Engine::Heap).is_err());
    }

    #[test]
    fn nan_median_is_reported_as_string() {
        let output = run("NaN\n1\nNaN\n", DomainKind::Float8, Engine::Heap).unwrap();
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"count":3,"median":"NaN"}"#);
    }

    #[test]
    fn collation_changes_text_median() {
        let input = "B\na\nC\n";
        for engine in [Engine::Heap, Engine::Sort] {
            let reader = || InputReader::new(input.as_bytes());
            let output = compute(reader(), DomainKind::Text, Collation::C, engine).unwrap();
            assert_eq!(output.median, Some(Datum::Text("C".to_owned())));

            let output = compute(reader(), DomainKind::Text, Collation::NoCase, engine).unwrap();
            assert_eq!(output.median, Some(Datum::Text("B".to_owned())));
        }
    }
}
