use prontio_protocol::{Paciente, Receita};
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
            let mut receitas: Vec<Receita> = repo
                .list_by_field(RecordKind::Receita, "idPaciente", &id_paciente)
                .await?;
            receitas.reverse();
            campo("receitas", receitas)?
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
    #[serde(alias = "medicamentos")]
    texto_medicamentos: Option<String>,
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
    #[serde(alias = "ID_Receita")]
    id_receita: Option<String>,
}

async fn criar(repo: &RecordRepository, input: CriarInput) -> Result<Value, HandlerError> {
    let receita = Receita {
        id_receita: novo_id("RC"),
        id_paciente: required("idPaciente", input.id_paciente)?,
        texto_medicamentos: required("textoMedicamentos", input.texto_medicamentos)?,
        observacoes: texto(input.observacoes),
        criado_em: agora(),
    };
    repo.insert(RecordKind::Receita, &receita.id_receita, &receita).await?;
    tracing::info!(id_receita = %receita.id_receita, id_paciente = %receita.id_paciente, "prescription created");
    campo("receita", receita)
}

async fn gerar_pdf(repo: &RecordRepository, input: GerarPdfInput) -> Result<Value, HandlerError> {
    let id_receita = required("idReceita", input.id_receita)?;
    let receita: Receita = repo
        .get(RecordKind::Receita, &id_receita)
        .await?
        .ok_or_else(|| HandlerError::not_found(format!("Receita não encontrada: {id_receita}.")))?;
    let paciente: Option<Paciente> = repo.get(RecordKind::Paciente, &receita.id_paciente).await?;
    let config = configuracao::carregar(repo).await?;
    campo("html", documentos::receita_html(&receita, paciente.as_ref(), &config))
}
