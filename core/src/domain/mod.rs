//! Dynamically typed values and the per-domain comparator/averager table.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize, Serializer};

pub use self::numeric::{InvalidNumeric, Numeric};
use crate::average::{Average, point_mean};
use crate::config::{Averager, Comparator, MedianConfig};
use crate::error::MedianError;

mod numeric;

/// Value domain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Money,
    Interval,
    Timestamp,
    TimestampTz,
    Text,
    Bool,
    Json,
}

impl DomainKind {
    pub const ALL: [Self; 13] = [
        Self::Int2,
        Self::Int4,
        Self::Int8,
        Self::Float4,
        Self::Float8,
        Self::Numeric,
        Self::Money,
        Self::Interval,
        Self::Timestamp,
        Self::TimestampTz,
        Self::Text,
        Self::Bool,
        Self::Json,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int2 => "int2",
            Self::Int4 => "int4",
            Self::Int8 => "int8",
            Self::Float4 => "float4",
            Self::Float8 => "float8",
            Self::Numeric => "numeric",
            Self::Money => "money",
            Self::Interval => "interval",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DomainKind {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let kind = match s.as_str() {
            "smallint" => Self::Int2,
            "int" | "integer" => Self::Int4,
            "bigint" => Self::Int8,
            "real" => Self::Float4,
            "double" | "float" => Self::Float8,
            "decimal" => Self::Numeric,
            "boolean" => Self::Bool,
            name => match Self::ALL.into_iter().find(|kind| kind.name() == name) {
                Some(kind) => kind,
                None => return Err(UnknownDomain(name.to_owned())),
            },
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value type `{0}`")]
pub struct UnknownDomain(pub String);

/// Ordering rule for text values. Other domains ignore it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collation {
    /// Byte order of the UTF-8 encoding.
    #[default]
    C,
    /// Case-insensitive, ties broken by byte order.
    NoCase,
}

impl Collation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::NoCase => "nocase",
        }
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collation {
    type Err = UnknownCollation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "posix" | "binary" => Ok(Self::C),
            "nocase" | "ci" => Ok(Self::NoCase),
            name => Err(UnknownCollation(name.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collation `{0}`")]
pub struct UnknownCollation(pub String);

/// Value of one of the supported domains.
///
/// Temporal values are microseconds: since the Unix epoch for timestamps,
/// signed length for intervals. Money is in cents.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(Numeric),
    Money(i64),
    Interval(i64),
    Timestamp(i64),
    TimestampTz(i64),
    Text(String),
    Bool(bool),
    Json(serde_json::Value),
}

impl Datum {
    pub fn kind(&self) -> DomainKind {
        match self {
            Self::Int2(_) => DomainKind::Int2,
            Self::Int4(_) => DomainKind::Int4,
            Self::Int8(_) => DomainKind::Int8,
            Self::Float4(_) => DomainKind::Float4,
            Self::Float8(_) => DomainKind::Float8,
            Self::Numeric(_) => DomainKind::Numeric,
            Self::Money(_) => DomainKind::Money,
            Self::Interval(_) => DomainKind::Interval,
            Self::Timestamp(_) => DomainKind::Timestamp,
            Self::TimestampTz(_) => DomainKind::TimestampTz,
            Self::Text(_) => DomainKind::Text,
            Self::Bool(_) => DomainKind::Bool,
            Self::Json(_) => DomainKind::Json,
        }
    }

    /// Parses the textual form of a value of the given domain.
    pub fn parse(kind: DomainKind, input: &str) -> Result<Self, DatumParseError> {
        let invalid = || DatumParseError {
            kind,
            input: input.to_owned(),
        };
        let s = input.trim();

        Ok(match kind {
            DomainKind::Int2 => Self::Int2(s.parse().map_err(|_e| invalid())?),
            DomainKind::Int4 => Self::Int4(s.parse().map_err(|_e| invalid())?),
            DomainKind::Int8 => Self::Int8(s.parse().map_err(|_e| invalid())?),
            DomainKind::Float4 => Self::Float4(s.parse().map_err(|_e| invalid())?),
            DomainKind::Float8 => Self::Float8(s.parse().map_err(|_e| invalid())?),
            DomainKind::Numeric => Self::Numeric(s.parse().map_err(|_e| invalid())?),
            DomainKind::Money => Self::Money(parse_money(s).ok_or_else(invalid)?),
            DomainKind::Interval => Self::Interval(parse_interval(s).ok_or_else(invalid)?),
            DomainKind::Timestamp => {
                let time = humantime::parse_rfc3339_weak(s).map_err(|_e| invalid())?;
                Self::Timestamp(micros_since_epoch(time).ok_or_else(invalid)?)
            }
            DomainKind::TimestampTz => {
                let time = humantime::parse_rfc3339(s).map_err(|_e| invalid())?;
                Self::TimestampTz(micros_since_epoch(time).ok_or_else(invalid)?)
            }
            // Text keeps surrounding whitespace.
            DomainKind::Text => Self::Text(input.to_owned()),
            DomainKind::Bool => Self::Bool(parse_bool(s).ok_or_else(invalid)?),
            DomainKind::Json => Self::Json(serde_json::from_str(s).map_err(|_e| invalid())?),
        })
    }

    /// Order used by every orderable domain.
    ///
    /// Values of different domains are ordered by domain, which never happens
    /// inside a single median state.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int2(a), Self::Int2(b)) => a.cmp(b),
            (Self::Int4(a), Self::Int4(b)) => a.cmp(b),
            (Self::Float4(a), Self::Float4(b)) => a.total_cmp(b),
            (Self::Float8(a), Self::Float8(b)) => a.total_cmp(b),
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Int8(a), Self::Int8(b))
            | (Self::Money(a), Self::Money(b))
            | (Self::Interval(a), Self::Interval(b))
            | (Self::Timestamp(a), Self::Timestamp(b))
            | (Self::TimestampTz(a), Self::TimestampTz(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => (self.kind() as u8).cmp(&(other.kind() as u8)),
        }
    }

    /// Like [`Datum::total_cmp`], but text compares case-insensitively.
    pub fn nocase_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => {
                let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
                fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
            }
            _ => self.total_cmp(other),
        }
    }

    /// Midpoint of two values of the same domain.
    ///
    /// # Panics
    ///
    /// Panics for domains without a midpoint or for mixed domains. Use
    /// [`averager_for`] to check support first.
    pub fn midpoint(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Int2(a), Self::Int2(b)) => Self::Int2(a.average(b)),
            (Self::Int4(a), Self::Int4(b)) => Self::Int4(a.average(b)),
            (Self::Int8(a), Self::Int8(b)) => Self::Int8(a.average(b)),
            (Self::Float4(a), Self::Float4(b)) => Self::Float4(a.average(b)),
            (Self::Float8(a), Self::Float8(b)) => Self::Float8(a.average(b)),
            (Self::Numeric(a), Self::Numeric(b)) => Self::Numeric(a.midpoint(b)),
            (Self::Money(a), Self::Money(b)) => Self::Money(a.average(b)),
            (Self::Interval(a), Self::Interval(b)) => Self::Interval(a.average(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Self::Timestamp(point_mean(*a, *b)),
            (Self::TimestampTz(a), Self::TimestampTz(b)) => {
                Self::TimestampTz(point_mean(*a, *b))
            }
            _ => unreachable!(
                "no midpoint between {} and {}",
                self.kind(),
                other.kind()
            ),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int2(v) => fmt::Display::fmt(v, f),
            Self::Int4(v) => fmt::Display::fmt(v, f),
            Self::Int8(v) => fmt::Display::fmt(v, f),
            Self::Float4(v) => fmt::Display::fmt(v, f),
            Self::Float8(v) => fmt::Display::fmt(v, f),
            Self::Numeric(v) => fmt::Display::fmt(v, f),
            Self::Money(cents) => {
                let sign = if *cents < 0 { "-" } else { "" };
                let cents = cents.unsigned_abs();
                write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
            }
            Self::Interval(micros) => {
                let sign = if *micros < 0 { "-" } else { "" };
                let duration = Duration::from_micros(micros.unsigned_abs());
                write!(f, "{sign}{}", humantime::format_duration(duration))
            }
            Self::Timestamp(micros) => match time_from_micros(*micros) {
                Some(time) => {
                    let formatted = humantime::format_rfc3339_micros(time).to_string();
                    f.write_str(formatted.trim_end_matches('Z'))
                }
                None => write!(f, "@{micros}"),
            },
            Self::TimestampTz(micros) => match time_from_micros(*micros) {
                Some(time) => write!(f, "{}", humantime::format_rfc3339_micros(time)),
                None => write!(f, "@{micros}"),
            },
            Self::Text(v) => f.write_str(v),
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Json(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int2(v) => serializer.serialize_i16(*v),
            Self::Int4(v) => serializer.serialize_i32(*v),
            Self::Int8(v) => serializer.serialize_i64(*v),
            Self::Float4(v) if v.is_finite() => serializer.serialize_f32(*v),
            Self::Float8(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Json(v) => v.serialize(serializer),
            // JSON has no NaN or infinities.
            Self::Float4(_)
            | Self::Float8(_)
            | Self::Numeric(_)
            | Self::Money(_)
            | Self::Interval(_)
            | Self::Timestamp(_)
            | Self::TimestampTz(_)
            | Self::Text(_) => serializer.collect_str(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value `{input}`")]
pub struct DatumParseError {
    pub kind: DomainKind,
    pub input: String,
}

/// Comparator provider. Fails for domains without a total order.
pub fn comparator_for(kind: DomainKind) -> Result<Comparator<Datum>, MedianError> {
    collated_comparator_for(kind, Collation::C)
}

/// Comparator provider honoring a text collation.
pub fn collated_comparator_for(
    kind: DomainKind,
    collation: Collation,
) -> Result<Comparator<Datum>, MedianError> {
    match (kind, collation) {
        (DomainKind::Json, _) => Err(MedianError::UnsupportedType(kind.name())),
        (DomainKind::Text, Collation::NoCase) => Ok(Datum::nocase_cmp),
        _ => Ok(Datum::total_cmp),
    }
}

/// Averager provider. `None` for domains without a midpoint.
pub fn averager_for(kind: DomainKind) -> Option<Averager<Datum>> {
    match kind {
        DomainKind::Text | DomainKind::Bool | DomainKind::Json => None,
        _ => Some(Datum::midpoint),
    }
}

/// Full median configuration for a domain.
pub fn config_for(kind: DomainKind) -> Result<MedianConfig<Datum>, MedianError> {
    collated_config_for(kind, Collation::C)
}

pub fn collated_config_for(
    kind: DomainKind,
    collation: Collation,
) -> Result<MedianConfig<Datum>, MedianError> {
    let mut config = MedianConfig::new(kind.name(), collated_comparator_for(kind, collation)?);
    config.average = averager_for(kind);
    Ok(config)
}

fn parse_money(s: &str) -> Option<i64> {
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s).replace(',', "");

    let (units, cents) = s.split_once('.').unwrap_or((s.as_str(), ""));
    if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let cents = match cents.len() {
        0 => 0,
        1 | 2 if cents.bytes().all(|b| b.is_ascii_digit()) => {
            let value = cents.parse::<i64>().ok()?;
            if cents.len() == 1 { value * 10 } else { value }
        }
        _ => return None,
    };

    let total = units.parse::<i64>().ok()?.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

fn parse_interval(s: &str) -> Option<i64> {
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let duration = humantime::parse_duration(s).ok()?;
    let micros = i64::try_from(duration.as_micros()).ok()?;
    Some(if negative { -micros } else { micros })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn micros_since_epoch(time: SystemTime) -> Option<i64> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_micros()).ok(),
        Err(e) => i64::try_from(e.duration().as_micros()).ok().map(|v| -v),
    }
}

fn time_from_micros(micros: i64) -> Option<SystemTime> {
    // humantime only formats points after the epoch.
    let micros = u64::try_from(micros).ok()?;
    UNIX_EPOCH.checked_add(Duration::from_micros(micros))
}
