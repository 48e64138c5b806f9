//! `Pacientes.*`: patient registry.

use prontio_protocol::{Paciente, PacienteResumo};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{agora, campo, merge_record, novo_id, parse_payload, required, HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository};
use crate::AppState;

pub async fn handle(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    let data = match verb {
        "ListarTodos" => campo("pacientes", repo.list::<Paciente>(RecordKind::Paciente).await?)?,
        "ListarSelecao" => listar_selecao(repo).await?,
        "Criar" | "CriarBasico" => criar(repo, parse_payload(payload)?).await?,
        "Atualizar" => atualizar(repo, parse_payload(payload)?).await?,
        "AlterarStatusAtivo" => alterar_status_ativo(repo, parse_payload(payload)?).await?,
        "ObterPorId" => {
            let input: IdInput = parse_payload(payload)?;
            let paciente = obter(repo, input.id_paciente).await?;
            campo("paciente", paciente)?
        }
        _ => return Ok(None),
    };
    Ok(Some(data))
}

/// Editable patient fields. Absent fields are left untouched on update.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DadosPaciente {
    #[serde(alias = "nome", skip_serializing_if = "Option::is_none")]
    nome_completo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_nascimento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sexo: Option<String>,
    #[serde(alias = "documento", skip_serializing_if = "Option::is_none")]
    cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rg: Option<String>,
    #[serde(alias = "telefone", skip_serializing_if = "Option::is_none")]
    telefone1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    telefone2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(alias = "bairro", skip_serializing_if = "Option::is_none")]
    endereco_bairro: Option<String>,
    #[serde(alias = "cidade", skip_serializing_if = "Option::is_none")]
    endereco_cidade: Option<String>,
    #[serde(alias = "uf", skip_serializing_if = "Option::is_none")]
    endereco_uf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plano_saude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    numero_carteirinha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    obs_importantes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profissao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtualizarInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    #[serde(flatten)]
    dados: DadosPaciente,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusAtivoInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    ativo: Option<bool>,
}

fn validar_nome(paciente: &Paciente) -> Result<(), HandlerError> {
    if paciente.nome_completo.trim().is_empty() {
        return Err(HandlerError::validation(
            "nomeCompleto",
            "Nome completo do paciente é obrigatório.",
        ));
    }
    Ok(())
}

async fn obter(repo: &RecordRepository, id: Option<String>) -> Result<Paciente, HandlerError> {
    let id = required("idPaciente", id)?;
    repo.get(RecordKind::Paciente, &id)
        .await?
        .ok_or_else(|| HandlerError::not_found(format!("Paciente não encontrado: {id}.")))
}

/// Replaces a stored patient; a vanished row is `NOT_FOUND`.
async fn gravar(repo: &RecordRepository, paciente: &Paciente) -> Result<(), HandlerError> {
    if repo.update(RecordKind::Paciente, &paciente.id_paciente, paciente).await? {
        Ok(())
    } else {
        Err(HandlerError::not_found(format!(
            "Paciente não encontrado: {}.",
            paciente.id_paciente
        )))
    }
}

async fn listar_selecao(repo: &RecordRepository) -> Result<Value, HandlerError> {
    let todos: Vec<Paciente> = repo.list(RecordKind::Paciente).await?;
    let mut ativos: Vec<&Paciente> = todos.iter().filter(|p| p.ativo).collect();
    ativos.sort_by_cached_key(|p| p.nome_completo.to_lowercase());
    let resumos: Vec<PacienteResumo> = ativos.into_iter().map(PacienteResumo::from).collect();
    campo("pacientes", resumos)
}

async fn criar(repo: &RecordRepository, dados: DadosPaciente) -> Result<Value, HandlerError> {
    let base = Paciente {
        id_paciente: novo_id("PAC"),
        ativo: true,
        data_cadastro: Some(agora()),
        ..Default::default()
    };
    let mut paciente = merge_record(&base, &dados)?;
    paciente.nome_completo = paciente.nome_completo.trim().to_string();
    validar_nome(&paciente)?;

    repo.insert(RecordKind::Paciente, &paciente.id_paciente, &paciente).await?;
    tracing::info!(id_paciente = %paciente.id_paciente, "patient created");
    Ok(json!({
        "ID_Paciente": paciente.id_paciente,
        "idPaciente": paciente.id_paciente,
        "paciente": serde_json::to_value(&paciente)?,
    }))
}

async fn atualizar(repo: &RecordRepository, input: AtualizarInput) -> Result<Value, HandlerError> {
    let atual = obter(repo, input.id_paciente).await?;
    let mut paciente = merge_record(&atual, &input.dados)?;
    paciente.id_paciente = atual.id_paciente;
    paciente.nome_completo = paciente.nome_completo.trim().to_string();
    validar_nome(&paciente)?;

    gravar(repo, &paciente).await?;
    tracing::info!(id_paciente = %paciente.id_paciente, "patient updated");
    campo("paciente", paciente)
}

async fn alterar_status_ativo(repo: &RecordRepository, input: StatusAtivoInput) -> Result<Value, HandlerError> {
    let ativo = input
        .ativo
        .ok_or_else(|| HandlerError::validation("ativo", "Informe se o paciente está ativo."))?;
    let mut paciente = obter(repo, input.id_paciente).await?;
    paciente.ativo = ativo;

    gravar(repo, &paciente).await?;
    tracing::info!(id_paciente = %paciente.id_paciente, ativo, "patient status changed");
    Ok(json!({ "idPaciente": paciente.id_paciente, "ativo": ativo }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_form_aliases_fill_the_record() {
        let dados: DadosPaciente = serde_json::from_value(json!({
            "nome": "Maria Souza",
            "telefone": "(11) 99999-0000",
            "documento": "123.456.789-00",
            "cidade": "Campinas",
            "bairro": "Centro"
        }))
        .unwrap();
        let paciente = merge_record(&Paciente::default(), &dados).unwrap();
        assert_eq!(paciente.nome_completo, "Maria Souza");
        assert_eq!(paciente.telefone1, "(11) 99999-0000");
        assert_eq!(paciente.cpf, "123.456.789-00");
        assert_eq!(paciente.endereco_cidade, "Campinas");
        assert_eq!(paciente.endereco_bairro, "Centro");
    }

    #[test]
    fn update_touches_only_given_fields() {
        let atual = Paciente {
            id_paciente: "PAC-1".into(),
            nome_completo: "José Álvares".into(),
            email: "jose@example.com".into(),
            ativo: true,
            ..Default::default()
        };
        let input: AtualizarInput = serde_json::from_value(json!({
            "idPaciente": "PAC-1",
            "telefone2": "3333-4444"
        }))
        .unwrap();
        let novo = merge_record(&atual, &input.dados).unwrap();
        assert_eq!(novo.nome_completo, "José Álvares");
        assert_eq!(novo.email, "jose@example.com");
        assert_eq!(novo.telefone2, "3333-4444");
        assert!(novo.ativo);
    }

    #[tokio::test]
    async fn writing_a_missing_patient_is_not_found() {
        let repo = RecordRepository::new(crate::db::open_in_memory().await.unwrap());
        let fantasma = Paciente {
            id_paciente: "PAC-fantasma".into(),
            nome_completo: "Ninguém".into(),
            ..Default::default()
        };

        let err = gravar(&repo, &fantasma).await.unwrap_err();
        assert_eq!(err.to_api_error().code, "NOT_FOUND");
    }
}
