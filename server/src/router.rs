//! Turns a raw request body into a response envelope.

use prontio_protocol::{route, ActionGroup, ApiError, ApiResponse};
use serde_json::{Map, Value};

use crate::handlers::{self, HandlerError, HandlerResult};
use crate::AppState;

/// Entry point for `POST /`. Never fails: every outcome is an envelope.
pub async fn handle(state: &AppState, raw_body: &str) -> ApiResponse {
    let (action, payload) = match parse_request(raw_body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(routed) = route(&action) else {
        tracing::info!(action = %action, "unknown action");
        return ApiResponse::error("UNKNOWN_ACTION", format!("Ação desconhecida: {action}"));
    };

    tracing::debug!(action = %action, group = ?routed.group, "dispatching");
    match dispatch(state, routed.group, routed.verb, payload).await {
        Ok(Some(data)) => ApiResponse::success(data),
        Ok(None) => {
            tracing::warn!(action = %action, "handler returned no result");
            ApiResponse::error("EMPTY_RESULT", "Ação não retornou dados.")
        }
        Err(err) => {
            if let HandlerError::Unexpected(cause) = &err {
                tracing::error!(action = %action, error = %format!("{cause:#}"), "action failed");
            }
            ApiResponse::failure(err.to_api_error())
        }
    }
}

/// Splits the body into `(action, payload)` or an error envelope.
fn parse_request(raw_body: &str) -> Result<(String, Value), ApiResponse> {
    if raw_body.trim().is_empty() {
        return Err(no_action());
    }

    let body: Value = serde_json::from_str(raw_body).map_err(|e| {
        tracing::warn!(error = %e, "request body is not valid JSON");
        invalid_json(e.to_string())
    })?;
    let Value::Object(mut body) = body else {
        return Err(invalid_json("o corpo deve ser um objeto JSON".to_string()));
    };

    let action = match body.remove("action") {
        Some(Value::String(action)) if !action.trim().is_empty() => action,
        _ => return Err(no_action()),
    };
    let payload = match body.remove("payload") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(payload) => payload,
    };
    Ok((action, payload))
}

fn invalid_json(details: String) -> ApiResponse {
    ApiResponse::failure(
        ApiError::new("INVALID_JSON", "JSON de requisição inválido.")
            .with_details(Value::String(details)),
    )
}

fn no_action() -> ApiResponse {
    ApiResponse::error("NO_ACTION", "Nenhuma ação informada.")
}

pub async fn dispatch(
    state: &AppState,
    group: ActionGroup,
    verb: &str,
    payload: Value,
) -> HandlerResult {
    match group {
        ActionGroup::Agenda => handlers::agenda::handle(state, verb, payload).await,
        ActionGroup::AgendaConfig => {
            handlers::configuracao::handle_agenda_config(state, verb, payload).await
        }
        ActionGroup::Pacientes => handlers::pacientes::handle(state, verb, payload).await,
        ActionGroup::Evolucao => handlers::evolucao::handle(state, verb, payload).await,
        ActionGroup::Laudos => handlers::laudos::handle(state, verb, payload).await,
        ActionGroup::Receita => handlers::receita::handle(state, verb, payload).await,
        ActionGroup::Medicamentos => handlers::medicamentos::handle(state, verb, payload).await,
        ActionGroup::Configuracoes => {
            handlers::configuracao::handle_configuracoes(state, verb, payload).await
        }
    }
}
