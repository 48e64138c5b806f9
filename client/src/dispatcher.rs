//! Single entry point for every API call.
//!
//! [`ApiClient::call`] never fails: transport, HTTP and decoding problems
//! all come back as a failed [`ApiResponse`]. [`ApiClient::safe_call`] is
//! the same call turned into a `Result`.

use prontio_protocol::{ActionError, ActionRequest, ApiResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub const MSG_SEM_ACAO: &str = "Ação da API não informada.";
pub const MSG_JSON_INVALIDO: &str = "Resposta da API não é um JSON válido.";
pub const MSG_FORMATO_INESPERADO: &str = "Resposta da API em formato inesperado.";
pub const MSG_FALHA_CONEXAO: &str =
    "Falha ao conectar à API. Verifique sua conexão ou o servidor.";

/// Simple-request content type; the server reads the body as text.
const REQUEST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

fn msg_http(status: u16) -> String {
    format!("Erro de comunicação com servidor (HTTP {status}).")
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    url: String,
}

impl ApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `{ action, payload }` once. No retry, no timeout.
    pub async fn call(&self, action: &str, payload: Value) -> ApiResponse {
        if action.trim().is_empty() {
            tracing::error!("call without action");
            return ApiResponse::error("NO_ACTION", MSG_SEM_ACAO);
        }

        let request = ActionRequest::new(action, payload);
        let body = match serde_json::to_string(&request) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(action, error = %e, "payload could not be encoded");
                return ApiResponse::error("INVALID_PAYLOAD", e.to_string());
            }
        };

        let response = match self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, REQUEST_CONTENT_TYPE)
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(action, error = %e, "request failed");
                return ApiResponse::error("NETWORK_ERROR", MSG_FALHA_CONEXAO);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!(action, status = status.as_u16(), "non-success HTTP status");
            return ApiResponse::error("HTTP_ERROR", msg_http(status.as_u16()));
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(action, error = %e, "response body could not be read");
                return ApiResponse::error("NETWORK_ERROR", MSG_FALHA_CONEXAO);
            }
        };

        let decoded: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(action, error = %e, "response is not JSON");
                return ApiResponse::error("INVALID_RESPONSE", MSG_JSON_INVALIDO);
            }
        };

        match ApiResponse::from_value(decoded) {
            Ok(envelope) => {
                if !envelope.success {
                    tracing::debug!(action, errors = %envelope.joined_messages(), "action failed");
                }
                envelope
            }
            Err(e) => {
                tracing::error!(action, error = %e, "unexpected response shape");
                ApiResponse::error("UNEXPECTED_RESPONSE", MSG_FORMATO_INESPERADO)
            }
        }
    }

    /// `data` of a successful call, or the first error.
    pub async fn safe_call(&self, action: &str, payload: Value) -> std::result::Result<Value, ActionError> {
        self.call(action, payload).await.into_result()
    }

    /// [`safe_call`](Self::safe_call) with `data` decoded into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, action: &str, payload: Value) -> Result<T> {
        let data = self.safe_call(action, payload).await?;
        Ok(serde_json::from_value(data)?)
    }
}
