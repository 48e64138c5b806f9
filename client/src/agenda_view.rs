//! Day schedule as shown on the agenda page.
//!
//! Rows are classified from both `status` and `status_humano`, since the two
//! are not guaranteed to agree. Precedence is CANCELADO, then BLOQUEADO, then
//! OCUPADO; anything else is LIVRE.

use std::fmt;
use std::str::FromStr;

use prontio_protocol::{DaySchedule, DaySummary, Slot, SlotStatus};
use serde_json::Value;

/// Bucket a slot is rendered in.
pub fn classify(slot: &Slot) -> SlotStatus {
    let status = slot.status.trim().to_uppercase();
    let humano = slot.status_humano.to_uppercase();

    if status == "CANCELADO" || humano.contains("CANCEL") {
        SlotStatus::Cancelado
    } else if status == "BLOQUEADO" || humano.contains("BLOQUE") {
        SlotStatus::Bloqueado
    } else if status == "OCUPADO" {
        SlotStatus::Ocupado
    } else {
        SlotStatus::Livre
    }
}

/// Status dropdown of the agenda page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Todos,
    Livre,
    Ocupado,
    Agendado,
    Confirmado,
    Bloqueado,
    Cancelado,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("filtro de status desconhecido: {0}")]
pub struct FiltroDesconhecido(pub String);

impl StatusFilter {
    pub const ALL: [StatusFilter; 7] = [
        Self::Todos,
        Self::Livre,
        Self::Ocupado,
        Self::Agendado,
        Self::Confirmado,
        Self::Bloqueado,
        Self::Cancelado,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todos => "TODOS",
            Self::Livre => "LIVRE",
            Self::Ocupado => "OCUPADO",
            Self::Agendado => "AGENDADO",
            Self::Confirmado => "CONFIRMADO",
            Self::Bloqueado => "BLOQUEADO",
            Self::Cancelado => "CANCELADO",
        }
    }

    /// Matches on the raw fields, not on [`classify`]: an OCUPADO row whose
    /// text says "Cancelado" shows under both OCUPADO and CANCELADO.
    pub fn matches(&self, slot: &Slot) -> bool {
        let status = slot.status.trim().to_uppercase();
        let humano = slot.status_humano.to_uppercase();
        match self {
            Self::Todos => true,
            Self::Livre => status == "LIVRE",
            Self::Ocupado => status == "OCUPADO",
            Self::Agendado => status == "OCUPADO" && humano.contains("AGEND"),
            Self::Confirmado => status == "OCUPADO" && humano.contains("CONFIRM"),
            Self::Bloqueado => status == "BLOQUEADO",
            Self::Cancelado => status == "CANCELADO" || humano.contains("CANCEL"),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = FiltroDesconhecido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| FiltroDesconhecido(s.to_string()))
    }
}

pub fn filter_slots<'a>(slots: &'a [Slot], filtro: StatusFilter) -> Vec<&'a Slot> {
    slots.iter().filter(|s| filtro.matches(s)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    AgendarAqui,
    AbrirProntuario,
    Editar,
    Cancelar,
}

impl SlotAction {
    pub const fn rotulo(&self) -> &'static str {
        match self {
            Self::AgendarAqui => "Agendar aqui",
            Self::AbrirProntuario => "Prontuário",
            Self::Editar => "Editar",
            Self::Cancelar => "Cancelar",
        }
    }
}

/// One rendered line of the agenda table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRow {
    pub hora: String,
    pub bucket: SlotStatus,
    pub paciente: String,
    pub tipo: String,
    pub status: String,
    pub observacoes: String,
    /// Cancelled rows are struck through.
    pub riscado: bool,
    pub acoes: Vec<SlotAction>,
}

const VAZIO: &str = "—";

fn ou(valor: Option<&str>, padrao: &str) -> String {
    match valor.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => padrao.to_string(),
    }
}

fn humano_ou(slot: &Slot, padrao: &str) -> String {
    ou(Some(slot.status_humano.as_str()), padrao)
}

impl SlotRow {
    pub fn from_slot(slot: &Slot) -> Self {
        let hora = ou(Some(slot.hora.as_str()), "--:--");
        let observacoes = ou(slot.observacoes.as_deref(), "");
        match classify(slot) {
            SlotStatus::Ocupado => Self {
                hora,
                bucket: SlotStatus::Ocupado,
                paciente: ou(slot.paciente_nome.as_deref(), VAZIO),
                tipo: ou(slot.tipo.as_deref(), ""),
                status: humano_ou(slot, "Agendado"),
                observacoes,
                riscado: false,
                acoes: vec![SlotAction::AbrirProntuario, SlotAction::Editar, SlotAction::Cancelar],
            },
            SlotStatus::Cancelado => Self {
                hora,
                bucket: SlotStatus::Cancelado,
                paciente: ou(slot.paciente_nome.as_deref(), VAZIO),
                tipo: ou(slot.tipo.as_deref(), ""),
                status: humano_ou(slot, "Cancelado"),
                observacoes,
                riscado: true,
                acoes: vec![SlotAction::AbrirProntuario],
            },
            SlotStatus::Bloqueado => Self {
                hora,
                bucket: SlotStatus::Bloqueado,
                paciente: VAZIO.to_string(),
                tipo: "Bloqueado".to_string(),
                status: humano_ou(slot, "Bloqueado"),
                observacoes,
                riscado: false,
                acoes: Vec::new(),
            },
            SlotStatus::Livre => Self {
                hora,
                bucket: SlotStatus::Livre,
                paciente: VAZIO.to_string(),
                tipo: VAZIO.to_string(),
                status: "Livre".to_string(),
                observacoes: String::new(),
                riscado: false,
                acoes: vec![SlotAction::AgendarAqui],
            },
        }
    }
}

/// Last fetched day, kept so filter changes re-render without a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayView {
    pub data: String,
    pub slots: Vec<Slot>,
    pub resumo: DaySummary,
    /// Slots were rebuilt from a flat appointment list.
    pub synthesized: bool,
}

impl DayView {
    pub fn from_schedule(data_pedida: &str, schedule: DaySchedule) -> Self {
        let data = schedule
            .data
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| data_pedida.to_string());

        if schedule.slots.is_empty() {
            if let Some(agendamentos) = schedule.agendamentos {
                // Server inconsistency: no grid, only appointments.
                tracing::warn!(
                    data = %data,
                    agendamentos = agendamentos.len(),
                    "day answered without slots, rebuilding occupied rows from appointments"
                );
                let slots: Vec<Slot> = agendamentos.iter().map(slot_de_agendamento).collect();
                let resumo = DaySummary {
                    data: data.clone(),
                    total_slots: slots.len(),
                    ocupados: slots.len(),
                    livres: 0,
                    bloqueados: 0,
                    cancelados: 0,
                    primeiro_livre: None,
                };
                return Self {
                    data,
                    slots,
                    resumo,
                    synthesized: true,
                };
            }
        }

        let resumo = schedule
            .resumo
            .unwrap_or_else(|| DaySummary::count(data.clone(), &schedule.slots));
        Self {
            data,
            slots: schedule.slots,
            resumo,
            synthesized: false,
        }
    }

    pub fn rows(&self, filtro: StatusFilter) -> Vec<SlotRow> {
        filter_slots(&self.slots, filtro)
            .into_iter()
            .map(SlotRow::from_slot)
            .collect()
    }

    pub fn slot_at(&self, hora: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.hora == hora)
    }
}

fn texto(ag: &Value, chaves: &[&str]) -> Option<String> {
    chaves
        .iter()
        .filter_map(|k| ag.get(*k))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
}

fn slot_de_agendamento(ag: &Value) -> Slot {
    Slot {
        hora: texto(ag, &["horaConsulta", "hora"]).unwrap_or_default(),
        status: SlotStatus::Ocupado.as_str().to_string(),
        status_humano: texto(ag, &["status"]).unwrap_or_else(|| "Agendado".to_string()),
        id_agenda: texto(ag, &["idAgenda", "id_agenda"]),
        id_paciente: texto(ag, &["idPaciente", "id_paciente"]),
        paciente_nome: texto(ag, &["nomePaciente"]),
        tipo: texto(ag, &["tipo"]),
        observacoes: texto(ag, &["observacoes"]),
    }
}
