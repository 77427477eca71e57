//! Startup configuration failures
//!
//! Every failure maps to a stable code and a short list of hints that
//! `kakeibo` prints before exiting.

use serde::Serialize;
use thiserror::Error;

/// Stable identifier of a configuration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    Unreadable,
    InvalidYaml,
    MissingField,
    InvalidValue,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::Unreadable => "UNREADABLE",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::MissingField => "MISSING_FIELD",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the operator sees when the server refuses to start
#[derive(Debug, Clone, Serialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kakeibo: configuration error [{}]: {}", self.code, self.message)?;
        if let Some(field) = &self.field {
            write!(f, "\n  setting: {}", field)?;
        }
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {path} does not exist")]
    FileNotFound { path: String },

    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file is not valid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("setting {field} must be set")]
    MissingField { field: String },

    #[error("setting {field} is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    fn hints(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "pass --config <path> to point at another file".to_string(),
                "kakeibo --print-default-config > config.yaml writes a starting file".to_string(),
            ],
            ConfigError::Unreadable { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => {
                vec!["make the file readable by the user running kakeibo".to_string()]
            }
            ConfigError::Unreadable { .. } => vec!["--config must name a regular UTF-8 text file".to_string()],
            ConfigError::InvalidYaml { .. } => {
                vec!["compare the file with the output of kakeibo --print-default-config".to_string()]
            }
            ConfigError::MissingField { field } => {
                vec![format!("set {} or remove the key to use its default", field)]
            }
            ConfigError::InvalidValue { .. } => vec![],
        }
    }

    /// Report for printing on startup failure
    pub fn to_details(&self) -> ConfigErrorDetails {
        ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            field: self.field().map(str::to_string),
            hints: self.hints(),
        }
    }
}
