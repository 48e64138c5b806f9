//! `AgendaConfig_*` and `Configuracoes.*`: the single clinic settings record.

use prontio_protocol::{parse_hora, ConfiguracaoClinica};
use serde_json::Value;

use super::{HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository};
use crate::AppState;

const CONFIG_ID: &str = "CONFIG";

pub async fn handle_agenda_config(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    match verb {
        "Obter" => Ok(Some(serde_json::to_value(carregar(repo).await?)?)),
        "Salvar" => {
            let config = mesclar(repo, payload).await?;
            validar_grade(&config)?;
            salvar(repo, &config).await.map(Some)
        }
        _ => Ok(None),
    }
}

pub async fn handle_configuracoes(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    match verb {
        "Obter" => Ok(Some(serde_json::to_value(carregar(repo).await?)?)),
        "Salvar" => {
            let config = mesclar(repo, payload).await?;
            validar_perfil(&config)?;
            validar_grade(&config)?;
            salvar(repo, &config).await.map(Some)
        }
        _ => Ok(None),
    }
}

/// Stored settings, or the defaults when nothing was saved yet.
pub async fn carregar(repo: &RecordRepository) -> Result<ConfiguracaoClinica, HandlerError> {
    let stored: Option<ConfiguracaoClinica> = repo.get(RecordKind::Configuracao, CONFIG_ID).await?;
    Ok(stored.unwrap_or_default())
}

async fn mesclar(repo: &RecordRepository, payload: Value) -> Result<ConfiguracaoClinica, HandlerError> {
    if !payload.is_object() {
        return Err(HandlerError::validation("payload", "Configurações devem ser um objeto."));
    }
    let mut doc = serde_json::to_value(carregar(repo).await?)?;
    json_patch::merge(&mut doc, &payload);
    serde_json::from_value(doc)
        .map_err(|e| HandlerError::validation("payload", format!("Configuração inválida: {e}")))
}

async fn salvar(repo: &RecordRepository, config: &ConfiguracaoClinica) -> Result<Value, HandlerError> {
    repo.upsert(RecordKind::Configuracao, CONFIG_ID, config).await?;
    tracing::info!(
        inicio = %config.hora_inicio_padrao,
        fim = %config.hora_fim_padrao,
        intervalo = config.duracao_grade_minutos,
        "clinic settings saved"
    );
    Ok(serde_json::to_value(config)?)
}

fn validar_perfil(config: &ConfiguracaoClinica) -> Result<(), HandlerError> {
    if config.medico_nome_completo.trim().is_empty() {
        return Err(HandlerError::validation(
            "medicoNomeCompleto",
            "Informe o nome completo do médico.",
        ));
    }
    if config.medico_crm.trim().is_empty() {
        return Err(HandlerError::validation("medicoCRM", "Informe o CRM do médico."));
    }
    Ok(())
}

fn validar_grade(config: &ConfiguracaoClinica) -> Result<(), HandlerError> {
    let inicio = parse_hora(&config.hora_inicio_padrao).ok_or_else(|| {
        HandlerError::validation("hora_inicio_padrao", "Hora de início inválida.")
    })?;
    let fim = parse_hora(&config.hora_fim_padrao)
        .ok_or_else(|| HandlerError::validation("hora_fim_padrao", "Hora de término inválida."))?;
    if fim <= inicio {
        return Err(HandlerError::validation(
            "hora_fim_padrao",
            "A hora de término deve ser posterior à hora de início.",
        ));
    }
    if !(5..=240).contains(&config.duracao_grade_minutos) {
        return Err(HandlerError::validation(
            "duracao_grade_minutos",
            "O intervalo da grade deve estar entre 5 e 240 minutos.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(inicio: &str, fim: &str, minutos: u32) -> ConfiguracaoClinica {
        ConfiguracaoClinica {
            hora_inicio_padrao: inicio.into(),
            hora_fim_padrao: fim.into(),
            duracao_grade_minutos: minutos,
            ..Default::default()
        }
    }

    fn campo_do_erro(err: HandlerError) -> Option<Value> {
        match err {
            HandlerError::Domain { details, .. } => details.and_then(|d| d.get("campo").cloned()),
            HandlerError::Unexpected(_) => None,
        }
    }

    #[test]
    fn default_grid_is_valid() {
        assert!(validar_grade(&ConfiguracaoClinica::default()).is_ok());
    }

    #[test]
    fn grid_rejects_inverted_hours_and_odd_intervals() {
        let err = validar_grade(&grade("18:00", "08:00", 30)).unwrap_err();
        assert_eq!(campo_do_erro(err), Some(Value::from("hora_fim_padrao")));

        let err = validar_grade(&grade("08:00", "18:00", 0)).unwrap_err();
        assert_eq!(campo_do_erro(err), Some(Value::from("duracao_grade_minutos")));

        let err = validar_grade(&grade("8h", "18:00", 30)).unwrap_err();
        assert_eq!(campo_do_erro(err), Some(Value::from("hora_inicio_padrao")));
    }

    #[test]
    fn profile_needs_name_and_crm() {
        let mut cfg = ConfiguracaoClinica::default();
        assert!(validar_perfil(&cfg).is_err());
        cfg.medico_nome_completo = "Dra. Ana Lima".into();
        let err = validar_perfil(&cfg).unwrap_err();
        assert_eq!(campo_do_erro(err), Some(Value::from("medicoCRM")));
        cfg.medico_crm = "12345-SP".into();
        assert!(validar_perfil(&cfg).is_ok());
    }
}
