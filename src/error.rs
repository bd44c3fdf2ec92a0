use std::path::{Path, PathBuf};

/// Everything that can go wrong while loading inputs or pricing a plan.
///
/// All of these abort the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open `{}`", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}`: malformed CSV", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("`{}` line {line}: expected {expected} fields, found {actual}", path.display())]
    FieldCount { path: PathBuf, line: u64, expected: usize, actual: usize },

    #[error("`{}` line {line}: field `{field}` is not a number: {value:?}", path.display())]
    InvalidNumber { path: PathBuf, line: u64, field: String, value: String },

    #[error("`{}` line {line}: cannot parse timestamp {value:?}", path.display())]
    InvalidTimestamp { path: PathBuf, line: u64, value: String },

    #[error("`{}`: header has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("`{}` line {line}: plan name is empty", path.display())]
    MissingName { path: PathBuf, line: u64 },

    #[error("`{}` line {line}: plan `{name}` is already defined", path.display())]
    DuplicatePlan { path: PathBuf, line: u64, name: String },

    #[error("`{}`: no readings found", path.display())]
    EmptyUsage { path: PathBuf },

    #[error("plan `{plan}` has no `{field}` price")]
    MissingField { plan: String, field: &'static str },

    #[error("plan `{plan}` sets `{field}` but no time-of-use logic exists for it")]
    UnknownStrategy { plan: String, field: &'static str },

    #[error("plan `{0}` is not in the price table")]
    UnknownPlan(String),
}

impl Error {
    /// Wrap a CSV error, surfacing ragged rows as [`Error::FieldCount`].
    pub fn from_csv(path: &Path, source: csv::Error) -> Self {
        if let csv::ErrorKind::UnequalLengths { pos, expected_len, len } = source.kind() {
            return Self::FieldCount {
                path: path.into(),
                line: pos.as_ref().map_or(0, csv::Position::line),
                expected: *expected_len as usize,
                actual: *len as usize,
            };
        }
        Self::Csv { path: path.into(), source }
    }
}
