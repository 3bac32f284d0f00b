//! Error taxonomy shared by every stage.
//!
//! Each variant maps to a process exit code so the binary can report failures
//! the same way regardless of which stage raised them:
//!
//! - `2`: bad input (schema, selection, representation, arguments)
//! - `3`: not enough data for the requested operation
//! - `4`: numerical failure
//! - `5`: filesystem / encoding failure

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{file}: missing required column `{column}` (found: {found})")]
    MissingColumn {
        file: String,
        column: String,
        found: String,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("insufficient data: {context} needs at least {required} samples, found {found}")]
    InsufficientData {
        context: String,
        required: usize,
        found: usize,
    },

    #[error("cannot build {representation} signal: {reason}")]
    InvalidRepresentation {
        representation: &'static str,
        reason: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    pub fn missing_column(file: impl Into<String>, column: impl Into<String>, found: &[String]) -> Self {
        AppError::MissingColumn {
            file: file.into(),
            column: column.into(),
            found: if found.is_empty() {
                "no columns".to_string()
            } else {
                found.join(", ")
            },
        }
    }

    pub fn insufficient(context: impl Into<String>, required: usize, found: usize) -> Self {
        AppError::InsufficientData {
            context: context.into(),
            required,
            found,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingColumn { .. }
            | AppError::InvalidSelection(_)
            | AppError::InvalidRepresentation { .. }
            | AppError::InvalidInput(_) => 2,
            AppError::InsufficientData { .. } => 3,
            AppError::Numerical(_) => 4,
            AppError::Io { .. } | AppError::Csv { .. } | AppError::Json { .. } => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_lists_found_headers() {
        let err = AppError::missing_column("in.csv", "Phase", &["FFT Bin".to_string(), "Power".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("`Phase`"), "{msg}");
        assert!(msg.contains("FFT Bin, Power"), "{msg}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn insufficient_data_exit_code() {
        let err = AppError::insufficient("cubic interpolation", 4, 3);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("at least 4"));
    }
}
