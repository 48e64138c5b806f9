use prontio_protocol::ApiError;
use serde_json::{json, Value};

use crate::db::RepositoryError;

/// Failure raised by an action handler.
///
/// `Domain` errors reach the caller verbatim; `Unexpected` ones are logged
/// and collapsed into `SERVER_ERROR`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{code}: {message}")]
    Domain {
        code: String,
        message: String,
        details: Option<Value>,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn domain(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Domain {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(campo: &str, message: impl Into<String>) -> Self {
        Self::Domain {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: Some(json!({ "campo": campo })),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::domain("NOT_FOUND", message)
    }

    pub fn conflito_horario(data: &str, hora: &str, id_agenda: &str) -> Self {
        Self::Domain {
            code: "CONFLITO_HORARIO".to_string(),
            message: format!("Já existe um agendamento em {data} às {hora}."),
            details: Some(json!({ "idAgenda": id_agenda })),
        }
    }

    /// Envelope error for this failure.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Domain {
                code,
                message,
                details,
            } => ApiError {
                code: code.clone(),
                message: message.clone(),
                details: details.clone(),
            },
            Self::Unexpected(err) => ApiError::new("SERVER_ERROR", "Erro interno na API.")
                .with_details(Value::String(format!("{err:#}"))),
        }
    }
}

impl From<RepositoryError> for HandlerError {
    fn from(e: RepositoryError) -> Self {
        Self::Unexpected(anyhow::Error::new(e))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(anyhow::Error::new(e))
    }
}
