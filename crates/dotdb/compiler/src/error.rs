// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by an external collaborator (preprocessor, optimizer).
pub type ExternalError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Statement validation failed: {0}")]
    Validation(#[source] ExternalError),
    #[error("Plan optimization failed: {0}")]
    Optimization(#[source] ExternalError),
    #[error("expensive to execute")]
    TooExpensive,
}

impl CompileError {
    pub fn is_too_expensive(&self) -> bool {
        matches!(self, CompileError::TooExpensive)
    }

    /// The collaborator's error, if this failure came from one.
    pub fn into_external(self) -> Option<ExternalError> {
        match self {
            CompileError::Validation(err) | CompileError::Optimization(err) => Some(err),
            CompileError::TooExpensive => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("unknown column 'x' in 'field list'")]
    struct UnknownColumn;

    #[test]
    fn test_external_error_is_source() {
        let err = CompileError::Validation(Box::new(UnknownColumn));
        assert_eq!(err.to_string(), "Statement validation failed: unknown column 'x' in 'field list'");
        assert!(err.source().unwrap().downcast_ref::<UnknownColumn>().is_some());
        assert!(!err.is_too_expensive());

        let inner = err.into_external().unwrap();
        assert!(inner.downcast_ref::<UnknownColumn>().is_some());
    }

    #[test]
    fn test_too_expensive_message() {
        let err = CompileError::TooExpensive;
        assert_eq!(err.to_string(), "expensive to execute");
        assert!(err.is_too_expensive());
        assert!(err.source().is_none());
        assert!(err.into_external().is_none());
    }
}
