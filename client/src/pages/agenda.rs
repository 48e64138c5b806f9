//! Agenda page: day grid, booking and the hand-over to the chart.

use prontio_protocol::action::names;
use prontio_protocol::{parse_data, parse_hora, Agendamento, DaySchedule, Paciente};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{obrigatorio, payload};
use crate::agenda_view::{DayView, SlotRow, StatusFilter};
use crate::dispatcher::ApiClient;
use crate::error::{ClientError, Result};
use crate::session::{ContextoAgenda, Session};

pub const ORIGEM_AGENDA: &str = "agenda->prontuario";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacienteAgendamento {
    Existente { id: String, nome: String },
    /// Registered on the fly with the basic form before booking.
    Novo {
        nome: String,
        telefone: String,
        documento: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoAgendamento {
    pub data: String,
    pub hora: String,
    pub paciente: PacienteAgendamento,
    pub tipo: String,
    pub observacoes: String,
}

/// Fields to change on an existing appointment; `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlteracaoAgendamento {
    /// Moves the appointment to another patient; the server fills the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_paciente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CriarPayload<'a> {
    id_paciente: &'a str,
    nome_paciente: &'a str,
    data: &'a str,
    hora: &'a str,
    tipo: &'a str,
    observacoes: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AtualizarPayload<'a> {
    id_agenda: &'a str,
    #[serde(flatten)]
    alteracao: &'a AlteracaoAgendamento,
}

#[derive(Debug, Deserialize)]
struct Gravado {
    agendamento: Agendamento,
}

#[derive(Debug, Deserialize)]
struct PacienteCriado {
    paciente: Paciente,
}

#[derive(Debug, Deserialize)]
struct Agendamentos {
    #[serde(default)]
    agendamentos: Vec<Agendamento>,
}

pub struct AgendaPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    dia: Option<DayView>,
    filtro: StatusFilter,
}

impl<'s> AgendaPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            dia: None,
            filtro: StatusFilter::default(),
        }
    }

    /// Fetches the day grid and keeps it for filtering.
    pub async fn carregar_dia(&mut self, data: &str) -> Result<&DayView> {
        let data = validar_data(data)?;
        let schedule: DaySchedule = self
            .api
            .call_as(names::AGENDA_LIST_SLOTS_OF_DAY, json!({ "data": data }))
            .await?;
        tracing::debug!(data = %data, slots = schedule.slots.len(), "day loaded");
        Ok(&*self.dia.insert(DayView::from_schedule(&data, schedule)))
    }

    pub fn dia(&self) -> Option<&DayView> {
        self.dia.as_ref()
    }

    pub fn filtro(&self) -> StatusFilter {
        self.filtro
    }

    /// Changes the status filter; rows come from the cached day.
    pub fn set_filtro(&mut self, filtro: StatusFilter) {
        self.filtro = filtro;
    }

    pub fn linhas(&self) -> Vec<SlotRow> {
        self.dia
            .as_ref()
            .map(|dia| dia.rows(self.filtro))
            .unwrap_or_default()
    }

    pub async fn agendar(&mut self, novo: NovoAgendamento) -> Result<Agendamento> {
        let data = validar_data(&novo.data)?;
        let hora = validar_hora(&novo.hora)?;
        let (id_paciente, nome_paciente) = match novo.paciente {
            PacienteAgendamento::Existente { id, nome } => {
                (obrigatorio(&id, "Selecione um paciente.")?, nome)
            }
            PacienteAgendamento::Novo {
                nome,
                telefone,
                documento,
            } => {
                let nome = obrigatorio(&nome, "Informe o nome do paciente.")?;
                let criado: PacienteCriado = self
                    .api
                    .call_as(
                        names::PACIENTES_CRIAR_BASICO,
                        json!({ "nome": nome, "telefone": telefone, "documento": documento }),
                    )
                    .await?;
                tracing::info!(id_paciente = %criado.paciente.id_paciente, "patient registered from the agenda");
                (criado.paciente.id_paciente, criado.paciente.nome_completo)
            }
        };

        let corpo = payload(&CriarPayload {
            id_paciente: &id_paciente,
            nome_paciente: &nome_paciente,
            data: &data,
            hora: &hora,
            tipo: novo.tipo.trim(),
            observacoes: novo.observacoes.trim(),
        })?;
        let gravado: Gravado = self.api.call_as(names::AGENDA_CRIAR, corpo).await?;
        self.recarregar_dia_aberto().await?;
        Ok(gravado.agendamento)
    }

    pub async fn editar(&mut self, id_agenda: &str, alteracao: AlteracaoAgendamento) -> Result<Agendamento> {
        let id_agenda = obrigatorio(id_agenda, "Agendamento não informado.")?;
        if let Some(data) = &alteracao.data {
            validar_data(data)?;
        }
        if let Some(hora) = &alteracao.hora {
            validar_hora(hora)?;
        }
        if let Some(id_paciente) = &alteracao.id_paciente {
            obrigatorio(id_paciente, "Selecione um paciente.")?;
        }
        let corpo = payload(&AtualizarPayload {
            id_agenda: &id_agenda,
            alteracao: &alteracao,
        })?;
        let gravado: Gravado = self.api.call_as(names::AGENDA_ATUALIZAR, corpo).await?;
        self.recarregar_dia_aberto().await?;
        Ok(gravado.agendamento)
    }

    /// Marks the appointment CANCELADO; the record is kept.
    pub async fn cancelar(&mut self, id_agenda: &str) -> Result<Agendamento> {
        self.editar(
            id_agenda,
            AlteracaoAgendamento {
                status: Some("CANCELADO".to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn bloquear(&mut self, data: &str, hora: &str, motivo: &str) -> Result<Agendamento> {
        let data = validar_data(data)?;
        let hora = validar_hora(hora)?;
        let gravado: Gravado = self
            .api
            .call_as(
                names::AGENDA_BLOQUEAR_HORARIO,
                json!({ "data": data, "hora": hora, "motivo": motivo.trim() }),
            )
            .await?;
        self.recarregar_dia_aberto().await?;
        Ok(gravado.agendamento)
    }

    /// Stores the slot's appointment as the chart context and selects its
    /// patient.
    pub fn abrir_prontuario(&mut self, hora: &str) -> Result<ContextoAgenda> {
        let slot = self
            .dia
            .as_ref()
            .and_then(|dia| dia.slot_at(hora.trim()))
            .ok_or_else(|| ClientError::validation(format!("Horário não encontrado: {hora}.")))?;
        let id_paciente = slot
            .id_paciente
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClientError::validation("Não há paciente neste horário."))?;

        let contexto = ContextoAgenda {
            id_agenda: slot.id_agenda.clone().unwrap_or_default(),
            id_paciente,
            data: self.dia.as_ref().map(|d| d.data.clone()).unwrap_or_default(),
            hora: slot.hora.clone(),
            status: slot.status_humano.clone(),
            origem: ORIGEM_AGENDA.to_string(),
        };
        let nome = slot.paciente_nome.clone().unwrap_or_default();

        self.session.set_contexto_agenda(Some(contexto.clone()))?;
        self.session.set_paciente_atual(&contexto.id_paciente, &nome)?;
        self.session
            .set_agenda_atual(Some(contexto.id_agenda.as_str()).filter(|id| !id.is_empty()))?;
        tracing::debug!(id_agenda = %contexto.id_agenda, id_paciente = %contexto.id_paciente, "chart opened from agenda");
        Ok(contexto)
    }

    /// Upcoming appointments from `a_partir_de` (today when absent).
    pub async fn proximos(&self, a_partir_de: Option<&str>) -> Result<Vec<Agendamento>> {
        let corpo = match a_partir_de.map(str::trim).filter(|d| !d.is_empty()) {
            Some(data) => json!({ "aPartirDe": validar_data(data)? }),
            None => json!({}),
        };
        let lista: Agendamentos = self.api.call_as(names::AGENDA_LISTAR_A_FUTURO, corpo).await?;
        Ok(lista.agendamentos)
    }

    /// Refreshes the day on screen after a write, whatever date it touched.
    async fn recarregar_dia_aberto(&mut self) -> Result<()> {
        if let Some(data) = self.dia.as_ref().map(|dia| dia.data.clone()) {
            self.carregar_dia(&data).await?;
        }
        Ok(())
    }
}

fn validar_data(data: &str) -> Result<String> {
    let data = obrigatorio(data, "Informe a data.")?;
    parse_data(&data)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ClientError::validation(format!("Data inválida: {data}.")))
}

fn validar_hora(hora: &str) -> Result<String> {
    let hora = obrigatorio(hora, "Informe a hora.")?;
    parse_hora(&hora)
        .map(|h| h.format("%H:%M").to_string())
        .ok_or_else(|| ClientError::validation(format!("Hora inválida: {hora}.")))
}
