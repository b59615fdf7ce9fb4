use std::collections::BTreeMap;
use std::io::BufRead;

use anyhow::{Context, Result};
use rayon::prelude::*;
use runmed_core::aggregate::{MedianAggregate, MedianState};
use runmed_core::domain::{Collation, Datum, DomainKind};
use runmed_util::FastHashMap;

use crate::cmd::median::MedianOutput;
use crate::cmd::{InputArgs, parse_value};
use crate::util::config::AppConfig;
use crate::util::error::InputError;
use crate::util::input::{self, InputReader};
use crate::util::print_json;

/// Compute a median per key of `key<TAB>value` lines
#[derive(clap::Parser)]
pub struct Cmd {
    #[clap(flatten)]
    input: InputArgs,
}

impl Cmd {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let kind = self.input.kind(config);
        let collation = self.input.collation(config);
        let pool = config
            .build_rayon_pool()
            .context("failed to build a thread pool")?;
        tracing::info!(
            %kind,
            %collation,
            threads = pool.current_num_threads(),
            "computing group medians"
        );

        let reader = InputReader::new(input::open(self.input.file.as_deref())?)
            .with_progress(config.progress_interval);
        let groups = read_groups(reader, kind)?;
        print_json(pool.install(|| compute(groups, kind, collation))?)
    }
}

pub fn read_groups<R: BufRead>(
    reader: InputReader<R>,
    kind: DomainKind,
) -> Result<FastHashMap<String, Vec<Datum>>> {
    let mut groups = FastHashMap::<String, Vec<Datum>>::default();
    reader.for_each_line(|line| {
        let (key, value) = line
            .split_once('\t')
            .context("expected a `key<TAB>value` pair")?;

        let values = groups.entry(key.to_owned()).or_default();
        values.extend(parse_value(kind, value)?);
        Ok(())
    })?;

    tracing::debug!(groups = groups.len(), "input grouped");
    Ok(groups)
}

/// Builds one median state per group on the current rayon pool.
pub fn compute(
    groups: FastHashMap<String, Vec<Datum>>,
    kind: DomainKind,
    collation: Collation,
) -> Result<BTreeMap<String, MedianOutput>> {
    groups
        .into_par_iter()
        .map(|(key, values)| -> Result<_> {
            let mut aggregate = MedianAggregate::with_collation(kind, collation)?;
            for value in values {
                aggregate.accum(Some(value))?;
            }

            let output = MedianOutput {
                count: aggregate.state().map_or(0, MedianState::len),
                median: aggregate
                    .finalize()
                    .map_err(|e| InputError::group(key.as_str(), e))?,
            };
            Ok((key, output))
        })
        .collect()
}
