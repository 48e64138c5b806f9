use prontio_protocol::Evolucao;
use serde::Deserialize;
use serde_json::Value;

use super::{agora, campo, novo_id, parse_payload, required, texto, HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository};
use crate::AppState;

pub async fn handle(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    let data = match verb {
        "Salvar" => salvar(repo, parse_payload(payload)?).await?,
        "ListarPorAgenda" => {
            let input: FiltroInput = parse_payload(payload)?;
            let id_agenda = required("idAgenda", input.id_agenda)?;
            listar(repo, "idAgenda", &id_agenda).await?
        }
        "ListarPorPaciente" => {
            let input: FiltroInput = parse_payload(payload)?;
            let id_paciente = required("idPaciente", input.id_paciente)?;
            listar(repo, "idPaciente", &id_paciente).await?
        }
        _ => return Ok(None),
    };
    Ok(Some(data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalvarInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    #[serde(alias = "ID_Agenda")]
    id_agenda: Option<String>,
    #[serde(alias = "evolucao")]
    texto: Option<String>,
    #[serde(alias = "data")]
    data_referencia: Option<String>,
    #[serde(alias = "hora")]
    hora_referencia: Option<String>,
    origem: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FiltroInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    #[serde(alias = "ID_Agenda")]
    id_agenda: Option<String>,
}

async fn salvar(repo: &RecordRepository, input: SalvarInput) -> Result<Value, HandlerError> {
    let evolucao = Evolucao {
        id_evolucao: novo_id("EV"),
        id_paciente: required("idPaciente", input.id_paciente)?,
        texto: required("texto", input.texto)?,
        id_agenda: texto(input.id_agenda),
        data_referencia: texto(input.data_referencia),
        hora_referencia: texto(input.hora_referencia),
        origem: texto(input.origem),
        criado_em: agora(),
    };
    repo.insert(RecordKind::Evolucao, &evolucao.id_evolucao, &evolucao).await?;
    tracing::info!(id_evolucao = %evolucao.id_evolucao, id_paciente = %evolucao.id_paciente, "progress note saved");
    campo("evolucao", evolucao)
}

/// Newest first.
async fn listar(repo: &RecordRepository, field: &str, value: &str) -> Result<Value, HandlerError> {
    let mut evolucoes: Vec<Evolucao> = repo.list_by_field(RecordKind::Evolucao, field, value).await?;
    evolucoes.reverse();
    evolucoes.sort_by(|a, b| b.criado_em.cmp(&a.criado_em));
    campo("evolucoes", evolucoes)
}
