//! Structured error types.
//!
//! Layout itself never fails: every pass has a fallback position. Errors
//! only come from the edges of the system: storage, configuration, and
//! session requests that name a block that does not exist or arrive while
//! the page is in preview.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{BlockId, GRID_COLUMNS, MAX_GRID_ROWS};

/// Storage read/write failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stored page '{key}': {source}{}", hint_suffix(.hint))]
    Parse {
        key: String,
        hint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize page: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error(
        "stored page '{key}' places block '{block}' outside the grid (columns 0..{}, rows 0..{})",
        GRID_COLUMNS,
        MAX_GRID_ROWS
    )]
    OutOfGrid { key: String, block: BlockId },
}

impl StoreError {
    /// Wrap a JSON parse failure, with a hint depending on what went wrong.
    pub fn parse(key: impl Into<String>, source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Syntax => {
                "The stored value is not valid JSON. It may have been edited by hand.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the page schema. Check block field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the stored value truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        StoreError::Parse {
            key: key.into(),
            hint,
            source,
        }
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

/// Requests a constructor session refuses.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no block with id '{0}'")]
    UnknownBlock(BlockId),

    #[error("the page is in preview mode; switch to edit mode first")]
    PreviewMode,

    #[error("no block settings are open")]
    NoSettingsOpen,

    #[error("'{0}' is not a valid hex color")]
    InvalidColor(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The unified error type of the public API.
#[derive(Debug, Error)]
pub enum MemoriaError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_hint() {
        let source = serde_json::from_str::<serde_json::Value>("{\"blocks\": [").unwrap_err();
        let err = StoreError::parse("pageMemoryData", source);
        let message = err.to_string();
        assert!(message.contains("pageMemoryData"));
        assert!(message.contains("Hint: Unexpected end of input"));
    }

    #[test]
    fn test_session_error_wraps_store_error() {
        let err: SessionError = StoreError::InvalidKey("../x".to_string()).into();
        assert_eq!(err.to_string(), "invalid storage key '../x'");
    }

    #[test]
    fn test_out_of_grid_names_block_and_limits() {
        let err = StoreError::OutOfGrid {
            key: "pageMemoryData".to_string(),
            block: "b1".into(),
        };
        assert_eq!(
            err.to_string(),
            "stored page 'pageMemoryData' places block 'b1' outside the grid (columns 0..12, rows 0..100000)"
        );
    }
}
