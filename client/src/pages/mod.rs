//! One controller per front-end page.
//!
//! Controllers own a clone of the [`ApiClient`] and borrow the [`Session`]
//! mutably, so whatever they select or open survives for the next page.

pub mod agenda;
pub mod configuracoes;
pub mod laudo;
pub mod pacientes;
pub mod prontuario;
pub mod receita;

pub use agenda::{AgendaPage, AlteracaoAgendamento, NovoAgendamento, PacienteAgendamento};
pub use configuracoes::ConfiguracoesPage;
pub use laudo::{LaudoPage, NovoLaudo};
pub use pacientes::PacientesPage;
pub use prontuario::ProntuarioPage;
pub use receita::ReceitaPage;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::session::Session;

pub(crate) const MSG_SEM_PACIENTE: &str = "Nenhum paciente selecionado.";

/// Id of the patient the session points at, from the selection or from
/// the agenda context.
pub(crate) fn paciente_da_sessao(session: &Session) -> Result<String> {
    session
        .paciente_atual()
        .map(|p| p.id.clone())
        .or_else(|| session.contexto_agenda().map(|c| c.id_paciente.clone()))
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ClientError::validation(MSG_SEM_PACIENTE))
}

pub(crate) fn obrigatorio(valor: &str, mensagem: &str) -> Result<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        return Err(ClientError::validation(mensagem));
    }
    Ok(valor.to_string())
}

pub(crate) fn payload<T: Serialize>(dados: &T) -> Result<Value> {
    Ok(serde_json::to_value(dados)?)
}
