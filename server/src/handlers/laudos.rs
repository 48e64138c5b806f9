use prontio_protocol::{Laudo, Paciente};
use serde::Deserialize;
use serde_json::Value;

use super::{agora, campo, configuracao, documentos, novo_id, parse_payload, required, texto, HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository};
use crate::AppState;

pub async fn handle(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    let data = match verb {
        "Criar" => criar(repo, parse_payload(payload)?).await?,
        "ListarPorPaciente" => {
            let input: PacienteInput = parse_payload(payload)?;
            let id_paciente = required("idPaciente", input.id_paciente)?;
            let mut laudos: Vec<Laudo> = repo
                .list_by_field(RecordKind::Laudo, "idPaciente", &id_paciente)
                .await?;
            laudos.reverse();
            campo("laudos", laudos)?
        }
        "GerarPdf" => gerar_pdf(repo, parse_payload(payload)?).await?,
        _ => return Ok(None),
    };
    Ok(Some(data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriarInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    titulo: Option<String>,
    tipo: Option<String>,
    texto: Option<String>,
    #[serde(alias = "obs")]
    observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PacienteInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GerarPdfInput {
    #[serde(alias = "ID_Laudo")]
    id_laudo: Option<String>,
}

async fn criar(repo: &RecordRepository, input: CriarInput) -> Result<Value, HandlerError> {
    let laudo = Laudo {
        id_laudo: novo_id("LA"),
        id_paciente: required("idPaciente", input.id_paciente)?,
        texto: required("texto", input.texto)?,
        titulo: texto(input.titulo),
        tipo: texto(input.tipo),
        observacoes: texto(input.observacoes),
        criado_em: agora(),
    };
    repo.insert(RecordKind::Laudo, &laudo.id_laudo, &laudo).await?;
    tracing::info!(id_laudo = %laudo.id_laudo, id_paciente = %laudo.id_paciente, "report created");
    campo("laudo", laudo)
}

async fn gerar_pdf(repo: &RecordRepository, input: GerarPdfInput) -> Result<Value, HandlerError> {
    let id_laudo = required("idLaudo", input.id_laudo)?;
    let laudo: Laudo = repo
        .get(RecordKind::Laudo, &id_laudo)
        .await?
        .ok_or_else(|| HandlerError::not_found(format!("Laudo não encontrado: {id_laudo}.")))?;
    let paciente: Option<Paciente> = repo.get(RecordKind::Paciente, &laudo.id_paciente).await?;
    let config = configuracao::carregar(repo).await?;
    campo("html", documentos::laudo_html(&laudo, paciente.as_ref(), &config))
}
