//! Search, active filter and ordering for cached lists.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use prontio_protocol::{Medicamento, Paciente};
use unidecode::unidecode;

/// Lower-case with diacritics stripped, for search and name ordering.
pub fn normalize_text(text: &str) -> String {
    unidecode(text).to_lowercase()
}

/// Milliseconds since the epoch for RFC 3339 or `YYYY-MM-DD` input.
/// Anything else, including no value, is 0.
pub fn date_to_millis(value: Option<&str>) -> i64 {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    NomeAsc,
    NomeDesc,
    DataCadastroAsc,
    #[default]
    DataCadastroDesc,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("critério de ordenação desconhecido: {0}")]
pub struct OrdenacaoDesconhecida(pub String);

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        Self::NomeAsc,
        Self::NomeDesc,
        Self::DataCadastroAsc,
        Self::DataCadastroDesc,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NomeAsc => "nomeAsc",
            Self::NomeDesc => "nomeDesc",
            Self::DataCadastroAsc => "dataCadastroAsc",
            Self::DataCadastroDesc => "dataCadastroDesc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = OrdenacaoDesconhecida;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OrdenacaoDesconhecida(s.to_string()))
    }
}

/// A record that can be listed, searched and ordered.
pub trait Listable {
    fn nome(&self) -> &str;

    fn ativo(&self) -> bool;

    fn data_cadastro(&self) -> Option<&str> {
        None
    }

    /// Fields searched by the text filter.
    fn campos_busca(&self) -> Vec<&str>;
}

impl Listable for Paciente {
    fn nome(&self) -> &str {
        &self.nome_completo
    }

    fn ativo(&self) -> bool {
        self.ativo
    }

    fn data_cadastro(&self) -> Option<&str> {
        self.data_cadastro.as_deref()
    }

    fn campos_busca(&self) -> Vec<&str> {
        vec![
            self.nome_completo.as_str(),
            self.cpf.as_str(),
            self.rg.as_str(),
            self.telefone1.as_str(),
            self.telefone2.as_str(),
            self.email.as_str(),
            self.plano_saude.as_str(),
            self.numero_carteirinha.as_str(),
            self.id_paciente.as_str(),
        ]
    }
}

impl Listable for Medicamento {
    fn nome(&self) -> &str {
        &self.nome_medicacao
    }

    fn ativo(&self) -> bool {
        self.ativo
    }

    fn campos_busca(&self) -> Vec<&str> {
        vec![
            self.nome_medicacao.as_str(),
            self.posologia.as_str(),
            self.quantidade.as_str(),
            self.via_administracao.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub texto: String,
    pub somente_ativos: bool,
    pub ordem: SortKey,
}

impl ListQuery {
    pub fn new(texto: impl Into<String>, somente_ativos: bool, ordem: SortKey) -> Self {
        Self {
            texto: texto.into(),
            somente_ativos,
            ordem,
        }
    }
}

pub fn matches_text<T: Listable>(item: &T, agulha_normalizada: &str) -> bool {
    agulha_normalizada.is_empty()
        || item
            .campos_busca()
            .into_iter()
            .any(|campo| normalize_text(campo).contains(agulha_normalizada))
}

fn comparar<T: Listable>(a: &T, b: &T, ordem: SortKey) -> Ordering {
    match ordem {
        SortKey::NomeAsc => normalize_text(a.nome()).cmp(&normalize_text(b.nome())),
        SortKey::NomeDesc => normalize_text(b.nome()).cmp(&normalize_text(a.nome())),
        SortKey::DataCadastroAsc => {
            date_to_millis(a.data_cadastro()).cmp(&date_to_millis(b.data_cadastro()))
        }
        SortKey::DataCadastroDesc => {
            date_to_millis(b.data_cadastro()).cmp(&date_to_millis(a.data_cadastro()))
        }
    }
}

/// Filters and orders `items` without touching them.
///
/// The active filter runs before the text filter. Order among equal keys is
/// not part of the contract.
pub fn project<'a, T: Listable>(items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let agulha = normalize_text(query.texto.trim());
    let mut lista: Vec<&T> = items
        .iter()
        .filter(|item| !query.somente_ativos || item.ativo())
        .filter(|item| matches_text(*item, &agulha))
        .collect();
    lista.sort_by(|a, b| comparar(*a, *b, query.ordem));
    lista
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paciente(id: &str, nome: &str, data_cadastro: Option<&str>, ativo: bool) -> Paciente {
        Paciente {
            id_paciente: id.into(),
            nome_completo: nome.into(),
            data_cadastro: data_cadastro.map(String::from),
            ativo,
            ..Default::default()
        }
    }

    fn ids(lista: &[&Paciente]) -> Vec<String> {
        lista.iter().map(|p| p.id_paciente.clone()).collect()
    }

    #[test]
    fn search_ignores_case_and_accents() {
        let pacientes = vec![
            paciente("1", "José Álvares", None, true),
            paciente("2", "Maria", None, true),
        ];
        let query = ListQuery::new("jose", false, SortKey::NomeAsc);
        let found = project(&pacientes, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id_paciente, "1");

        let query = ListQuery::new("ÁLVA", false, SortKey::NomeAsc);
        assert_eq!(project(&pacientes, &query).len(), 1);
    }

    #[test]
    fn search_covers_documents_and_contacts() {
        let mut p = paciente("PAC-77", "Ana", None, true);
        p.cpf = "123.456.789-00".into();
        p.email = "ana@clinica.com".into();
        p.numero_carteirinha = "CART-555".into();
        let lista = vec![p];

        for agulha in ["456.789", "CLINICA.COM", "cart-555", "pac-77"] {
            let query = ListQuery::new(agulha, false, SortKey::default());
            assert_eq!(project(&lista, &query).len(), 1, "{agulha}");
        }
        let query = ListQuery::new("ausente", false, SortKey::default());
        assert!(project(&lista, &query).is_empty());
    }

    #[test]
    fn missing_dates_sort_as_oldest() {
        let pacientes = vec![
            paciente("sem-data", "B", None, true),
            paciente("com-data", "A", Some("2024-01-01"), true),
        ];
        let desc = project(&pacientes, &ListQuery::new("", false, SortKey::DataCadastroDesc));
        assert_eq!(ids(&desc), vec!["com-data", "sem-data"]);

        let asc = project(&pacientes, &ListQuery::new("", false, SortKey::DataCadastroAsc));
        assert_eq!(ids(&asc), vec!["sem-data", "com-data"]);
    }

    #[test]
    fn active_filter_and_name_order() {
        let pacientes = vec![
            paciente("1", "Úrsula", Some("2024-02-01T10:00:00Z"), true),
            paciente("2", "bruno", Some("2024-03-01"), false),
            paciente("3", "Álvaro", Some("invalida"), true),
        ];
        let ativos = project(&pacientes, &ListQuery::new("", true, SortKey::NomeAsc));
        assert_eq!(ids(&ativos), vec!["3", "1"]);

        let todos = project(&pacientes, &ListQuery::new("", false, SortKey::NomeDesc));
        assert_eq!(ids(&todos), vec!["1", "2", "3"]);
        assert_eq!(pacientes[0].id_paciente, "1", "source is untouched");
    }

    #[test]
    fn dates_parse_both_formats() {
        assert_eq!(date_to_millis(Some("1970-01-02")), 86_400_000);
        assert_eq!(date_to_millis(Some("1970-01-01T00:00:01Z")), 1_000);
        assert_eq!(date_to_millis(Some("01/02/2024")), 0);
        assert_eq!(date_to_millis(None), 0);
    }

    #[test]
    fn medications_search_their_own_fields() {
        let meds = vec![
            Medicamento {
                id_medicamento: "M1".into(),
                nome_medicacao: "Dipirona".into(),
                via_administracao: "Oral".into(),
                ativo: true,
                ..Default::default()
            },
            Medicamento {
                id_medicamento: "M2".into(),
                nome_medicacao: "Cefalexina".into(),
                posologia: "6/6h por 7 dias".into(),
                ativo: true,
                ..Default::default()
            },
        ];
        let query = ListQuery::new("7 dias", false, SortKey::NomeAsc);
        let found = project(&meds, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id_medicamento, "M2");
    }

    #[test]
    fn sort_keys_parse_from_select_values() {
        assert_eq!("nomeAsc".parse(), Ok(SortKey::NomeAsc));
        assert_eq!("DATACADASTRODESC".parse(), Ok(SortKey::DataCadastroDesc));
        assert!("idade".parse::<SortKey>().is_err());
    }
}
