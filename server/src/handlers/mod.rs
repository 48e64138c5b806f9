//! Action handlers, one module per group.
//!
//! Each group exposes `handle(state, verb, payload)`. `Ok(None)` means the
//! group has no such verb; the router reports it as an empty result.

pub mod agenda;
pub mod configuracao;
pub mod documentos;
pub mod evolucao;
pub mod laudos;
pub mod medicamentos;
pub mod pacientes;
pub mod receita;

mod error;

pub use error::HandlerError;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// Decodes a payload into the handler's input type.
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T, HandlerError> {
    serde_json::from_value(payload).map_err(|e| {
        HandlerError::validation("payload", format!("Payload inválido: {e}"))
    })
}

/// Trimmed, non-empty text or a validation error naming the field.
pub(crate) fn required(campo: &str, valor: Option<String>) -> Result<String, HandlerError> {
    match valor.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(HandlerError::validation(
            campo,
            format!("Campo obrigatório não informado: {campo}."),
        )),
    }
}

pub(crate) fn texto(valor: Option<String>) -> String {
    valor.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// RFC 7396 merge of `patch` over `current`, decoded back into `T`.
pub(crate) fn merge_record<T, P>(current: &T, patch: &P) -> Result<T, HandlerError>
where
    T: Serialize + DeserializeOwned,
    P: Serialize,
{
    let mut doc = serde_json::to_value(current)?;
    let patch = serde_json::to_value(patch)?;
    json_patch::merge(&mut doc, &patch);
    Ok(serde_json::from_value(doc)?)
}

/// `{ name: value }` as response data.
pub(crate) fn campo<T: Serialize>(nome: &str, valor: T) -> Result<Value, HandlerError> {
    let mut obj = Map::new();
    obj.insert(nome.to_string(), serde_json::to_value(valor)?);
    Ok(Value::Object(obj))
}

pub(crate) fn novo_id(prefixo: &str) -> String {
    format!("{prefixo}-{}", Uuid::new_v4().simple())
}

pub(crate) fn agora() -> String {
    chrono::Utc::now().to_rfc3339()
}
