use std::fmt::Debug;

use thiserror::Error;

pub type EmptyResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type ResultWithError<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
pub type FormulaResult<T> = Result<T, FormulaError>;

pub trait ResultTrait<T, E> {
    fn auto_err(self, desc: &str) -> ResultWithError<T>;
}

impl<T, E> ResultTrait<T, E> for Result<T, E>
where
    E: Debug,
{
    fn auto_err(self, desc: &str) -> ResultWithError<T> {
        match self {
            Ok(t) => Ok(t),
            Err(e) => Err(format!("{desc}: {e:?}").into()),
        }
    }
}

pub trait OptionResultTrait<T> {
    fn auto_err(self, desc: &str) -> ResultWithError<T>;
}

impl<T> OptionResultTrait<T> for Option<T> {
    fn auto_err(self, desc: &str) -> ResultWithError<T> {
        match self {
            Some(t) => Ok(t),
            None => Err(format!("{desc}: None Option").into()),
        }
    }
}

/// Broad category of a formula failure, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormula,
    FetchError,
    InstallError,
    TestFailure,
}

/// Terminal failures of the formula pipeline. None of them are retried.
#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("Invalid formula '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("Checksum mismatch for '{url}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to install '{name}': {reason}")]
    Install { name: String, reason: String },

    #[error("Smoke test '{command}' failed: {reason}")]
    TestFailure { command: String, reason: String },
}

impl FormulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid { .. } => ErrorKind::InvalidFormula,
            Self::Fetch { .. } | Self::ChecksumMismatch { .. } => ErrorKind::FetchError,
            Self::Install { .. } => ErrorKind::InstallError,
            Self::TestFailure { .. } => ErrorKind::TestFailure,
        }
    }

    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn install(name: &str, reason: impl Into<String>) -> Self {
        Self::Install {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_mismatch_is_a_fetch_error() {
        let err = FormulaError::ChecksumMismatch {
            url: "file:///tmp/a.tar.gz".into(),
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(err.kind(), ErrorKind::FetchError);
        assert!(err.to_string().contains("expected aa, got bb"));
    }

    #[test]
    fn auto_err_prefixes_description() {
        let res: Result<(), &str> = Err("boom");
        let err = res.auto_err("Could not read").unwrap_err();
        assert_eq!(err.to_string(), "Could not read: \"boom\"");

        let none: Option<u8> = None;
        assert!(none.auto_err("missing").is_err());
    }
}
