use prontio_protocol::ActionError;

/// Errors surfaced to page controllers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server (or the dispatcher) answered with a failed envelope.
    #[error(transparent)]
    Api(#[from] ActionError),
    /// Local form validation; never reaches the network.
    #[error("{0}")]
    Validation(String),
    #[error("dados inesperados na resposta: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("falha ao gravar a sessão: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Error code when the failure came from an envelope.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api(err) => Some(&err.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
