use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status bucket of a schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotStatus {
    Livre,
    Ocupado,
    Bloqueado,
    Cancelado,
}

impl SlotStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Livre => "LIVRE",
            Self::Ocupado => "OCUPADO",
            Self::Bloqueado => "BLOQUEADO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

/// One row of the day grid as sent on the wire.
///
/// `status` is kept as raw text: the server is the only producer that is
/// guaranteed to use [`SlotStatus`] codes, and clients must still classify
/// rows whose `status` and `status_humano` disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub hora: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_humano: String,
    #[serde(default, alias = "idAgenda", skip_serializing_if = "Option::is_none")]
    pub id_agenda: Option<String>,
    #[serde(default, alias = "idPaciente", skip_serializing_if = "Option::is_none")]
    pub id_paciente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paciente_nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

impl Slot {
    pub fn livre(hora: impl Into<String>) -> Self {
        Self {
            hora: hora.into(),
            status: SlotStatus::Livre.as_str().to_string(),
            status_humano: "Livre".to_string(),
            ..Self::default()
        }
    }
}

/// Counters for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(default)]
    pub data: String,
    pub total_slots: usize,
    pub ocupados: usize,
    pub livres: usize,
    #[serde(default)]
    pub bloqueados: usize,
    #[serde(default)]
    pub cancelados: usize,
    #[serde(default)]
    pub primeiro_livre: Option<String>,
}

impl DaySummary {
    /// Counts straight from the rows, by raw status code.
    pub fn count(data: impl Into<String>, slots: &[Slot]) -> Self {
        let with_status = |status: SlotStatus| {
            slots
                .iter()
                .filter(|s| s.status.eq_ignore_ascii_case(status.as_str()))
                .count()
        };
        Self {
            data: data.into(),
            total_slots: slots.len(),
            ocupados: with_status(SlotStatus::Ocupado),
            livres: with_status(SlotStatus::Livre),
            bloqueados: with_status(SlotStatus::Bloqueado),
            cancelados: with_status(SlotStatus::Cancelado),
            primeiro_livre: slots
                .iter()
                .find(|s| s.status.eq_ignore_ascii_case(SlotStatus::Livre.as_str()))
                .map(|s| s.hora.clone()),
        }
    }
}

/// Payload of `Agenda.ListSlotsOfDay`.
///
/// Older server builds answer with a flat `agendamentos` list and no grid;
/// the field is kept loose so clients can still read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumo: Option<DaySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agendamentos: Option<Vec<Value>>,
}
