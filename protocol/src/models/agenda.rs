use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an appointment record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAgendamento {
    #[default]
    Agendado,
    Confirmado,
    EmAtendimento,
    Concluido,
    Faltou,
    Cancelado,
    Bloqueado,
}

impl StatusAgendamento {
    pub const ALL: [StatusAgendamento; 7] = [
        Self::Agendado,
        Self::Confirmado,
        Self::EmAtendimento,
        Self::Concluido,
        Self::Faltou,
        Self::Cancelado,
        Self::Bloqueado,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Agendado => "AGENDADO",
            Self::Confirmado => "CONFIRMADO",
            Self::EmAtendimento => "EM_ATENDIMENTO",
            Self::Concluido => "CONCLUIDO",
            Self::Faltou => "FALTOU",
            Self::Cancelado => "CANCELADO",
            Self::Bloqueado => "BLOQUEADO",
        }
    }

    /// Label shown to people.
    pub const fn humano(&self) -> &'static str {
        match self {
            Self::Agendado => "Agendado",
            Self::Confirmado => "Confirmado",
            Self::EmAtendimento => "Em atendimento",
            Self::Concluido => "Concluído",
            Self::Faltou => "Faltou",
            Self::Cancelado => "Cancelado",
            Self::Bloqueado => "Bloqueado",
        }
    }

    pub const fn is_cancelado(&self) -> bool {
        matches!(self, Self::Cancelado)
    }
}

impl fmt::Display for StatusAgendamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status de agendamento desconhecido: {0}")]
pub struct StatusDesconhecido(pub String);

impl FromStr for StatusAgendamento {
    type Err = StatusDesconhecido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace(' ', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| StatusDesconhecido(s.to_string()))
    }
}

/// Appointment, or an administrative block when `bloqueio` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agendamento {
    pub id_agenda: String,
    #[serde(default)]
    pub id_paciente: String,
    #[serde(default)]
    pub nome_paciente: String,
    pub data: String,
    pub hora: String,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub status: StatusAgendamento,
    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub bloqueio: bool,
    #[serde(default)]
    pub criado_em: String,
}

impl Agendamento {
    /// Still holds its slot.
    pub fn ocupa_horario(&self) -> bool {
        !self.status.is_cancelado()
    }
}

/// Parses `YYYY-MM-DD`.
pub fn parse_data(texto: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(texto.trim(), "%Y-%m-%d").ok()
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_hora(texto: &str) -> Option<NaiveTime> {
    let texto = texto.trim();
    NaiveTime::parse_from_str(texto, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(texto, "%H:%M:%S"))
        .ok()
}

/// Canonical `HH:MM` form of a time string.
pub fn normalizar_hora(texto: &str) -> Option<String> {
    parse_hora(texto).map(|t| t.format("%H:%M").to_string())
}
