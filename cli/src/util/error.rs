/// Failure while consuming command input.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    /// A single input line could not be consumed.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: anyhow::Error,
    },
    /// The median of one group could not be computed.
    #[error("group `{key}`: {source}")]
    Group {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl InputError {
    pub fn line(line: usize, source: impl Into<anyhow::Error>) -> Self {
        Self::Line {
            line,
            source: source.into(),
        }
    }

    pub fn group(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Group {
            key: key.into(),
            source: source.into(),
        }
    }

    /// 1-based input line, if the error is bound to one.
    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Group { .. } => None,
        }
    }
}
