use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::agenda::parse_hora;

fn hora_inicio_padrao() -> String {
    "08:00".to_string()
}

fn hora_fim_padrao() -> String {
    "18:00".to_string()
}

fn duracao_padrao() -> u32 {
    30
}

fn dias_ativos_padrao() -> Vec<String> {
    ["SEG", "TER", "QUA", "QUI", "SEX"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Clinic settings: doctor, clinic and agenda grid.
///
/// Profile fields travel in camelCase, grid fields in snake_case, as the
/// settings page has always sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguracaoClinica {
    #[serde(default)]
    pub medico_nome_completo: String,
    #[serde(default, rename = "medicoCRM")]
    pub medico_crm: String,
    #[serde(default)]
    pub medico_especialidade: String,
    #[serde(default)]
    pub clinica_nome: String,
    #[serde(default)]
    pub clinica_endereco: String,
    #[serde(default)]
    pub clinica_telefone: String,
    #[serde(default)]
    pub clinica_email: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(rename = "hora_inicio_padrao", default = "hora_inicio_padrao")]
    pub hora_inicio_padrao: String,
    #[serde(rename = "hora_fim_padrao", default = "hora_fim_padrao")]
    pub hora_fim_padrao: String,
    #[serde(rename = "duracao_grade_minutos", default = "duracao_padrao")]
    pub duracao_grade_minutos: u32,
    #[serde(rename = "dias_ativos", default = "dias_ativos_padrao")]
    pub dias_ativos: Vec<String>,
}

impl Default for ConfiguracaoClinica {
    fn default() -> Self {
        Self {
            medico_nome_completo: String::new(),
            medico_crm: String::new(),
            medico_especialidade: String::new(),
            clinica_nome: String::new(),
            clinica_endereco: String::new(),
            clinica_telefone: String::new(),
            clinica_email: String::new(),
            logo_url: String::new(),
            hora_inicio_padrao: hora_inicio_padrao(),
            hora_fim_padrao: hora_fim_padrao(),
            duracao_grade_minutos: duracao_padrao(),
            dias_ativos: dias_ativos_padrao(),
        }
    }
}

/// Three-letter weekday code used in `dias_ativos`.
pub const fn codigo_dia(dia: Weekday) -> &'static str {
    match dia {
        Weekday::Mon => "SEG",
        Weekday::Tue => "TER",
        Weekday::Wed => "QUA",
        Weekday::Thu => "QUI",
        Weekday::Fri => "SEX",
        Weekday::Sat => "SAB",
        Weekday::Sun => "DOM",
    }
}

impl ConfiguracaoClinica {
    pub fn atende_em(&self, dia: NaiveDate) -> bool {
        let codigo = codigo_dia(dia.weekday());
        self.dias_ativos
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(codigo))
    }

    /// Grid times from start (inclusive) to end (exclusive).
    ///
    /// Returns an empty grid when the times do not parse or the interval
    /// is zero.
    pub fn horarios_da_grade(&self) -> Vec<String> {
        let (Some(inicio), Some(fim)) = (
            parse_hora(&self.hora_inicio_padrao),
            parse_hora(&self.hora_fim_padrao),
        ) else {
            return Vec::new();
        };
        if self.duracao_grade_minutos == 0 {
            return Vec::new();
        }
        let passo = Duration::minutes(i64::from(self.duracao_grade_minutos));

        let mut horarios = Vec::new();
        let mut atual = inicio;
        while atual < fim {
            horarios.push(atual.format("%H:%M").to_string());
            let (proximo, dias) = atual.overflowing_add_signed(passo);
            if dias != 0 {
                break;
            }
            atual = proximo;
        }
        horarios
    }
}
