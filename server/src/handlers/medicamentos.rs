use prontio_protocol::Medicamento;
use serde::Deserialize;
use serde_json::Value;

use super::{campo, novo_id, parse_payload, required, texto, HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository};
use crate::AppState;

pub async fn handle(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    let data = match verb {
        "ListarTodos" => {
            let mut medicamentos: Vec<Medicamento> = repo.list(RecordKind::Medicamento).await?;
            medicamentos.sort_by_cached_key(|m| m.nome_medicacao.to_lowercase());
            campo("medicamentos", medicamentos)?
        }
        "Criar" => criar(repo, parse_payload(payload)?).await?,
        _ => return Ok(None),
    };
    Ok(Some(data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriarInput {
    #[serde(alias = "nome")]
    nome_medicacao: Option<String>,
    posologia: Option<String>,
    quantidade: Option<String>,
    #[serde(alias = "via")]
    via_administracao: Option<String>,
    ativo: Option<bool>,
}

async fn criar(repo: &RecordRepository, input: CriarInput) -> Result<Value, HandlerError> {
    let medicamento = Medicamento {
        id_medicamento: novo_id("MED"),
        nome_medicacao: required("nomeMedicacao", input.nome_medicacao)?,
        posologia: texto(input.posologia),
        quantidade: texto(input.quantidade),
        via_administracao: texto(input.via_administracao),
        ativo: input.ativo.unwrap_or(true),
    };
    repo.insert(RecordKind::Medicamento, &medicamento.id_medicamento, &medicamento)
        .await?;
    tracing::info!(id_medicamento = %medicamento.id_medicamento, "medication added to catalog");
    campo("medicamento", medicamento)
}
