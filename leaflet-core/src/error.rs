//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, warn};

pub type LeafletResult<T> = Result<T, LeafletError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for Leaflet
#[derive(Error, Debug)]
pub enum LeafletError {
    /// The project root is missing or is not a directory. Aborts the inventory.
    #[error("Invalid project root: {}", path.display())]
    InvalidRoot { path: PathBuf, context: ErrorContext },

    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern {
        pattern: String,
        message: String,
        context: ErrorContext,
    },

    /// A single file could not be read. The inventory keeps going and records a scan warning.
    #[error("Could not read file {}: {message}", path.display())]
    FileRead {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Import error: {message}")]
    Import {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("AI analysis error: {message}")]
    Ai {
        message: String,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
}

impl LeafletError {
    pub fn invalid_root(path: impl AsRef<Path>, reason: &str) -> Self {
        let path = path.as_ref().to_path_buf();
        LeafletError::InvalidRoot {
            context: ErrorContext::new("inventory")
                .with_operation("validate_root")
                .with_metadata("reason", reason)
                .with_suggestion("Pass an existing directory as the project root"),
            path,
        }
    }

    pub fn file_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LeafletError::FileRead {
            path: path.as_ref().to_path_buf(),
            message: source.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new("inventory").with_operation("read_file"),
        }
    }

    pub fn ai(message: impl Into<String>, model: Option<&str>) -> Self {
        LeafletError::Ai {
            message: message.into(),
            model: model.map(str::to_string),
            context: ErrorContext::new("ai_service")
                .with_suggestion("Check the API key and model name"),
        }
    }

    pub fn internal(message: impl Into<String>, component: &str) -> Self {
        LeafletError::Internal {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LeafletError::InvalidRoot { context, .. } => Some(context),
            LeafletError::InvalidPattern { context, .. } => Some(context),
            LeafletError::FileRead { context, .. } => Some(context),
            LeafletError::Import { context, .. } => Some(context),
            LeafletError::Ai { context, .. } => Some(context),
            LeafletError::RateLimit { context, .. } => Some(context),
            LeafletError::Storage { context, .. } => Some(context),
            LeafletError::Config { context, .. } => Some(context),
            LeafletError::Validation { context, .. } => Some(context),
            LeafletError::NotFound { context, .. } => Some(context),
            LeafletError::Timeout { context, .. } => Some(context),
            LeafletError::Internal { context, .. } => Some(context),
            LeafletError::Io(_) | LeafletError::Serialization(_) => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            LeafletError::FileRead { .. } => {
                warn!(error_id = ?error_id, error = %self, "Skipping unreadable file");
            }
            LeafletError::RateLimit { .. } | LeafletError::Timeout { .. } => {
                warn!(
                    error_id = ?error_id,
                    error = %self,
                    "Rate limit or timeout error (may be recoverable)"
                );
            }
            LeafletError::Config { .. } | LeafletError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! import_error {
    ($msg:expr, $component:expr) => {
        $crate::LeafletError::Import {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::LeafletError::Import {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::LeafletError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::LeafletError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::LeafletError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'leaflet config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::LeafletError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::LeafletError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the identifier or path"),
        }
    };
}
