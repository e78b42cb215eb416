use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// A single field-level complaint from the backend's validation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// No response was received (offline, refused, timed out).
    #[error("{message}")]
    Transport { message: String },

    #[error("{}", join_field_errors(.message, .fields))]
    Validation {
        status: u16,
        message: String,
        fields: Vec<FieldError>,
        data: Option<Value>,
    },

    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        data: Option<Value>,
    },

    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        data: Option<Value>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("You do not have permission to do that")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status of the failed call; 0 when nothing came back.
    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation { status, .. }
            | AppError::Rejected { status, .. }
            | AppError::Server { status, .. } => *status,
            _ => 0,
        }
    }

    /// The best available human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Raw error body, if the backend sent one that parsed as JSON.
    pub fn data(&self) -> Option<&Value> {
        match self {
            AppError::Validation { data, .. }
            | AppError::Rejected { data, .. }
            | AppError::Server { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Transport failures are worth retrying as-is; everything else needs
    /// the input or the server to change first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transport { .. } | AppError::Server { .. })
    }
}

fn join_field_errors(message: &str, fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return message.to_string();
    }

    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        // field_errors() is a HashMap; keep the message stable.
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::InvalidInput(join_field_errors("Invalid input", &fields))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Render(err.to_string())
    }
}
