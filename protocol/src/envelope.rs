use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message used when a failed envelope arrives without any error entry.
pub const GENERIC_ERROR_MESSAGE: &str = "Erro não especificado.";

/// Request envelope: `{ action, payload }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, payload: Value) -> Self {
        let payload = if payload.is_null() {
            empty_payload()
        } else {
            payload
        };
        Self {
            action: action.into(),
            payload,
        }
    }
}

/// Structured error entry carried in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = if details.is_null() { None } else { Some(details) };
        self
    }

    /// Lenient conversion of one entry of a decoded `errors` field.
    fn from_loose(value: Value) -> Self {
        match value {
            Value::String(message) => Self::new("ERROR", message),
            Value::Object(mut obj) => {
                let code = match obj.remove("code") {
                    Some(Value::String(code)) if !code.is_empty() => code,
                    _ => "ERROR".to_string(),
                };
                let message = match obj.remove("message") {
                    Some(Value::String(message)) if !message.is_empty() => message,
                    _ => GENERIC_ERROR_MESSAGE.to_string(),
                };
                let details = obj.remove("details").filter(|d| !d.is_null());
                Self {
                    code,
                    message,
                    details,
                }
            }
            other => Self::new("ERROR", other.to_string()),
        }
    }
}

/// Response envelope: `{ success, data, errors }`.
///
/// Values built through the constructors (or [`ApiResponse::from_value`])
/// always hold the invariants: a success has no errors, a failure has no
/// data and at least one error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// The decoded body does not look like a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response envelope without a boolean `success` field")]
pub struct MalformedResponse;

/// A failed envelope turned into an error, as done by `safe_call`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub code: String,
    pub message: String,
}

impl ApiResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![error],
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(ApiError::new(code, message))
    }

    /// Normalises a decoded response body.
    ///
    /// `errors` may arrive as a string, an array of strings or objects, or not
    /// at all; the result always carries a list of structured errors.
    pub fn from_value(value: Value) -> Result<Self, MalformedResponse> {
        let Value::Object(mut obj) = value else {
            return Err(MalformedResponse);
        };
        let success = match obj.remove("success") {
            Some(Value::Bool(success)) => success,
            _ => return Err(MalformedResponse),
        };

        let mut errors: Vec<ApiError> = match obj.remove("errors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.into_iter().map(ApiError::from_loose).collect(),
            Some(other) => vec![ApiError::from_loose(other)],
        };
        let data = obj.remove("data").filter(|d| !d.is_null());

        if success {
            errors.clear();
            Ok(Self {
                success,
                data,
                errors,
            })
        } else {
            if errors.is_empty() {
                errors.push(ApiError::new("ERROR", GENERIC_ERROR_MESSAGE));
            }
            Ok(Self {
                success,
                data: None,
                errors,
            })
        }
    }

    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    /// All error messages joined by `" | "`.
    pub fn joined_messages(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Returns `data` (or `null`) on success, the first error otherwise.
    pub fn into_result(self) -> Result<Value, ActionError> {
        if self.success {
            return Ok(self.data.unwrap_or(Value::Null));
        }
        let first = self.errors.into_iter().next();
        Err(match first {
            Some(error) => ActionError {
                code: error.code,
                message: error.message,
            },
            None => ActionError {
                code: "ERROR".to_string(),
                message: GENERIC_ERROR_MESSAGE.to_string(),
            },
        })
    }
}
