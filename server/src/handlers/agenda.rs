//! `Agenda.*`: appointments, blocks and the day grid.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use prontio_protocol::{
    normalizar_hora, parse_data, Agendamento, ConfiguracaoClinica, DaySchedule, DaySummary,
    Paciente, Slot, SlotStatus, StatusAgendamento,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{agora, configuracao, novo_id, parse_payload, required, texto, HandlerError, HandlerResult};
use crate::db::{RecordKind, RecordRepository, RepositoryError};
use crate::AppState;

pub async fn handle(state: &AppState, verb: &str, payload: Value) -> HandlerResult {
    let repo = state.repo.as_ref();
    let data = match verb {
        "Criar" => criar(repo, parse_payload(payload)?).await?,
        "Atualizar" => atualizar(repo, parse_payload(payload)?).await?,
        "ListarPorData" => listar_por_data(repo, parse_payload(payload)?).await?,
        "ListSlotsOfDay" => list_slots_of_day(repo, parse_payload(payload)?).await?,
        "ListarAFuturo" => listar_a_futuro(repo, parse_payload(payload)?).await?,
        "BloquearHorario" => bloquear_horario(repo, parse_payload(payload)?).await?,
        _ => return Ok(None),
    };
    Ok(Some(data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgendamentoInput {
    #[serde(alias = "ID_Paciente")]
    id_paciente: Option<String>,
    nome_paciente: Option<String>,
    #[serde(alias = "dataConsulta")]
    data: Option<String>,
    #[serde(alias = "horaConsulta")]
    hora: Option<String>,
    tipo: Option<String>,
    status: Option<String>,
    #[serde(alias = "obs")]
    observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtualizarInput {
    #[serde(alias = "ID_Agenda")]
    id_agenda: Option<String>,
    #[serde(flatten)]
    campos: AgendamentoInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiaInput {
    data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturoInput {
    a_partir_de: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BloqueioInput {
    data: Option<String>,
    hora: Option<String>,
    #[serde(alias = "motivo", alias = "obs")]
    observacoes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Gravado<'a> {
    id_agenda: &'a str,
    agendamento: &'a Agendamento,
}

#[derive(Serialize)]
struct AgendaDoDia<'a> {
    data: &'a str,
    agendamentos: &'a [Agendamento],
}

fn validar_data(valor: Option<String>) -> Result<String, HandlerError> {
    let bruto = required("data", valor)?;
    parse_data(&bruto)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| HandlerError::validation("data", format!("Data inválida: {bruto}.")))
}

fn validar_hora(valor: Option<String>) -> Result<String, HandlerError> {
    let bruto = required("hora", valor)?;
    normalizar_hora(&bruto)
        .ok_or_else(|| HandlerError::validation("hora", format!("Hora inválida: {bruto}.")))
}

fn validar_status(valor: &str) -> Result<StatusAgendamento, HandlerError> {
    valor
        .parse::<StatusAgendamento>()
        .map_err(|e| HandlerError::validation("status", e.to_string()))
}

/// Fails when another live record holds `data`/`hora`.
async fn verificar_conflito(
    repo: &RecordRepository,
    data: &str,
    hora: &str,
    ignorar: Option<&str>,
) -> Result<(), HandlerError> {
    let do_dia: Vec<Agendamento> = repo.list_by_field(RecordKind::Agendamento, "data", data).await?;
    let ocupante = do_dia.iter().find(|a| {
        a.ocupa_horario() && a.hora == hora && Some(a.id_agenda.as_str()) != ignorar
    });
    match ocupante {
        Some(a) => Err(HandlerError::conflito_horario(data, hora, &a.id_agenda)),
        None => Ok(()),
    }
}

/// Turns a write that lost the slot to a concurrent one into `CONFLITO_HORARIO`.
async fn horario_tomado(repo: &RecordRepository, ag: &Agendamento, erro: RepositoryError) -> HandlerError {
    if !matches!(erro, RepositoryError::Duplicate(_)) {
        return erro.into();
    }
    tracing::info!(data = %ag.data, hora = %ag.hora, "slot taken by a concurrent write");
    match verificar_conflito(repo, &ag.data, &ag.hora, Some(&ag.id_agenda)).await {
        Err(conflito) => conflito,
        Ok(()) => HandlerError::conflito_horario(&ag.data, &ag.hora, ""),
    }
}

async fn nome_do_paciente(repo: &RecordRepository, id_paciente: &str) -> Result<Option<String>, HandlerError> {
    let paciente: Option<Paciente> = repo.get(RecordKind::Paciente, id_paciente).await?;
    Ok(paciente.map(|p| p.nome_completo))
}

fn gravado(ag: &Agendamento) -> Result<Value, HandlerError> {
    Ok(serde_json::to_value(Gravado {
        id_agenda: &ag.id_agenda,
        agendamento: ag,
    })?)
}

async fn criar(repo: &RecordRepository, input: AgendamentoInput) -> Result<Value, HandlerError> {
    let id_paciente = required("idPaciente", input.id_paciente)?;
    let data = validar_data(input.data)?;
    let hora = validar_hora(input.hora)?;
    let status = match input.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => validar_status(s)?,
        _ => StatusAgendamento::Agendado,
    };

    if !status.is_cancelado() {
        verificar_conflito(repo, &data, &hora, None).await?;
    }

    let nome_paciente = match nome_do_paciente(repo, &id_paciente).await? {
        Some(nome) => nome,
        None => texto(input.nome_paciente),
    };

    let ag = Agendamento {
        id_agenda: novo_id("AG"),
        id_paciente,
        nome_paciente,
        data,
        hora,
        tipo: texto(input.tipo),
        status,
        observacoes: texto(input.observacoes),
        bloqueio: false,
        criado_em: agora(),
    };
    if let Err(e) = repo.insert(RecordKind::Agendamento, &ag.id_agenda, &ag).await {
        return Err(horario_tomado(repo, &ag, e).await);
    }
    tracing::info!(id_agenda = %ag.id_agenda, data = %ag.data, hora = %ag.hora, "appointment created");
    gravado(&ag)
}

async fn atualizar(repo: &RecordRepository, input: AtualizarInput) -> Result<Value, HandlerError> {
    let id_agenda = required("idAgenda", input.id_agenda)?;
    let mut ag: Agendamento = repo
        .get(RecordKind::Agendamento, &id_agenda)
        .await?
        .ok_or_else(|| HandlerError::not_found(format!("Agendamento não encontrado: {id_agenda}.")))?;

    let campos = input.campos;
    if campos.data.is_some() {
        ag.data = validar_data(campos.data)?;
    }
    if campos.hora.is_some() {
        ag.hora = validar_hora(campos.hora)?;
    }
    if let Some(status) = campos.status {
        ag.status = validar_status(&status)?;
    }
    if let Some(id_paciente) = campos.id_paciente {
        ag.id_paciente = id_paciente.trim().to_string();
        if let Some(nome) = nome_do_paciente(repo, &ag.id_paciente).await? {
            ag.nome_paciente = nome;
        }
    }
    if let Some(nome) = campos.nome_paciente {
        ag.nome_paciente = nome.trim().to_string();
    }
    if let Some(tipo) = campos.tipo {
        ag.tipo = tipo.trim().to_string();
    }
    if let Some(obs) = campos.observacoes {
        ag.observacoes = obs.trim().to_string();
    }

    if ag.ocupa_horario() {
        verificar_conflito(repo, &ag.data, &ag.hora, Some(&id_agenda)).await?;
    }

    match repo.update(RecordKind::Agendamento, &id_agenda, &ag).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(HandlerError::not_found(format!("Agendamento não encontrado: {id_agenda}.")))
        }
        Err(e) => return Err(horario_tomado(repo, &ag, e).await),
    }
    tracing::info!(id_agenda = %id_agenda, status = %ag.status, "appointment updated");
    gravado(&ag)
}

async fn do_dia(repo: &RecordRepository, data: &str) -> Result<Vec<Agendamento>, HandlerError> {
    let mut ags: Vec<Agendamento> = repo.list_by_field(RecordKind::Agendamento, "data", data).await?;
    ags.sort_by(|a, b| a.hora.cmp(&b.hora));
    Ok(ags)
}

async fn listar_por_data(repo: &RecordRepository, input: DiaInput) -> Result<Value, HandlerError> {
    let data = validar_data(input.data)?;
    let agendamentos = do_dia(repo, &data).await?;
    Ok(serde_json::to_value(AgendaDoDia {
        data: &data,
        agendamentos: &agendamentos,
    })?)
}

async fn list_slots_of_day(repo: &RecordRepository, input: DiaInput) -> Result<Value, HandlerError> {
    let data = validar_data(input.data)?;
    let dia = parse_data(&data)
        .ok_or_else(|| HandlerError::validation("data", format!("Data inválida: {data}.")))?;
    let config = configuracao::carregar(repo).await?;
    let agendamentos = do_dia(repo, &data).await?;
    Ok(serde_json::to_value(montar_grade(&config, dia, &agendamentos))?)
}

async fn listar_a_futuro(repo: &RecordRepository, input: FuturoInput) -> Result<Value, HandlerError> {
    let desde = match input.a_partir_de {
        Some(bruto) if !bruto.trim().is_empty() => parse_data(&bruto).ok_or_else(|| {
            HandlerError::validation("aPartirDe", format!("Data inválida: {bruto}."))
        })?,
        _ => Local::now().date_naive(),
    };

    let todos: Vec<Agendamento> = repo.list(RecordKind::Agendamento).await?;
    let mut futuros: Vec<Agendamento> = todos
        .into_iter()
        .filter(|a| a.ocupa_horario() && !a.bloqueio)
        .filter(|a| parse_data(&a.data).is_some_and(|d| d >= desde))
        .collect();
    futuros.sort_by(|a, b| (&a.data, &a.hora).cmp(&(&b.data, &b.hora)));
    super::campo("agendamentos", futuros)
}

async fn bloquear_horario(repo: &RecordRepository, input: BloqueioInput) -> Result<Value, HandlerError> {
    let data = validar_data(input.data)?;
    let hora = validar_hora(input.hora)?;
    verificar_conflito(repo, &data, &hora, None).await?;

    let bloqueio = Agendamento {
        id_agenda: novo_id("BL"),
        data,
        hora,
        tipo: "Bloqueio".to_string(),
        status: StatusAgendamento::Bloqueado,
        observacoes: texto(input.observacoes),
        bloqueio: true,
        criado_em: agora(),
        ..Default::default()
    };
    if let Err(e) = repo.insert(RecordKind::Agendamento, &bloqueio.id_agenda, &bloqueio).await {
        return Err(horario_tomado(repo, &bloqueio, e).await);
    }
    tracing::info!(id_agenda = %bloqueio.id_agenda, data = %bloqueio.data, hora = %bloqueio.hora, "slot blocked");
    gravado(&bloqueio)
}

fn nao_vazio(valor: &str) -> Option<String> {
    let valor = valor.trim();
    (!valor.is_empty()).then(|| valor.to_string())
}

fn slot_de(ag: &Agendamento, status: SlotStatus, status_humano: &str) -> Slot {
    Slot {
        hora: ag.hora.clone(),
        status: status.as_str().to_string(),
        status_humano: status_humano.to_string(),
        id_agenda: nao_vazio(&ag.id_agenda),
        id_paciente: nao_vazio(&ag.id_paciente),
        paciente_nome: nao_vazio(&ag.nome_paciente),
        tipo: nao_vazio(&ag.tipo),
        observacoes: nao_vazio(&ag.observacoes),
    }
}

/// Builds the grid for one day.
///
/// Grid times come from the settings (none on inactive weekdays). Records at
/// times off the grid get rows of their own. A live block wins over a live
/// appointment, which wins over cancelled ones; cancelled blocks free their
/// time.
pub fn montar_grade(config: &ConfiguracaoClinica, dia: NaiveDate, agendamentos: &[Agendamento]) -> DaySchedule {
    let data = dia.format("%Y-%m-%d").to_string();

    let mut por_hora: BTreeMap<String, (bool, Vec<&Agendamento>)> = BTreeMap::new();
    if config.atende_em(dia) {
        for hora in config.horarios_da_grade() {
            por_hora.insert(hora, (true, Vec::new()));
        }
    }
    for ag in agendamentos {
        let hora = normalizar_hora(&ag.hora).unwrap_or_else(|| ag.hora.clone());
        por_hora.entry(hora).or_insert((false, Vec::new())).1.push(ag);
    }

    let mut slots = Vec::with_capacity(por_hora.len());
    for (hora, (na_grade, ags)) in por_hora {
        let bloqueio = ags.iter().find(|a| a.bloqueio && a.ocupa_horario());
        let ativo = ags.iter().find(|a| !a.bloqueio && a.ocupa_horario());
        let cancelado = ags.iter().rev().find(|a| !a.bloqueio && !a.ocupa_horario());

        let slot = if let Some(b) = bloqueio {
            slot_de(b, SlotStatus::Bloqueado, StatusAgendamento::Bloqueado.humano())
        } else if let Some(a) = ativo {
            slot_de(a, SlotStatus::Ocupado, a.status.humano())
        } else if let Some(c) = cancelado {
            slot_de(c, SlotStatus::Cancelado, StatusAgendamento::Cancelado.humano())
        } else if na_grade {
            Slot::livre(hora.clone())
        } else {
            continue;
        };
        slots.push(Slot { hora, ..slot });
    }

    let resumo = DaySummary::count(data.clone(), &slots);
    DaySchedule {
        data: Some(data),
        slots,
        resumo: Some(resumo),
        agendamentos: None,
    }
}
