use std::path::PathBuf;

use anyhow::Result;
use runmed_core::domain::{Collation, Datum, DomainKind};

use crate::util::config::AppConfig;

pub mod group;
pub mod median;
pub mod util;
pub mod window;

/// Input marker of a missing value, as in Postgres text dumps.
pub const NULL_MARKER: &str = "\\N";

#[derive(clap::Args)]
pub struct InputArgs {
    /// value type (int2, int4, int8, float4, float8, numeric, money, interval,
    /// timestamp, timestamptz, text, bool, json)
    #[clap(short = 't', long = "type")]
    pub kind: Option<DomainKind>,

    /// text ordering (c, nocase)
    #[clap(long)]
    pub collation: Option<Collation>,

    /// input file, one value per line (reads from stdin if omitted)
    pub file: Option<PathBuf>,
}

impl InputArgs {
    pub fn kind(&self, config: &AppConfig) -> DomainKind {
        self.kind.unwrap_or(config.domain)
    }

    pub fn collation(&self, config: &AppConfig) -> Collation {
        self.collation.unwrap_or(config.collation)
    }
}

/// Parses an input field, `None` for [`NULL_MARKER`].
pub fn parse_value(kind: DomainKind, field: &str) -> Result<Option<Datum>> {
    if field.trim() == NULL_MARKER {
        return Ok(None);
    }
    Ok(Some(Datum::parse(kind, field)?))
}
