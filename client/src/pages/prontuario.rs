//! Patient chart: header data and progress notes.

use prontio_protocol::action::names;
use prontio_protocol::{Evolucao, Paciente};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{obrigatorio, paciente_da_sessao, payload};
use crate::dispatcher::ApiClient;
use crate::error::Result;
use crate::session::{ContextoAgenda, Session};

#[derive(Debug, Deserialize)]
struct PacienteData {
    paciente: Paciente,
}

#[derive(Debug, Deserialize)]
struct Evolucoes {
    #[serde(default)]
    evolucoes: Vec<Evolucao>,
}

#[derive(Debug, Deserialize)]
struct EvolucaoGravada {
    evolucao: Evolucao,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SalvarEvolucao<'a> {
    id_paciente: &'a str,
    id_agenda: &'a str,
    texto: &'a str,
    data_referencia: &'a str,
    hora_referencia: &'a str,
    origem: &'a str,
}

pub struct ProntuarioPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    paciente: Option<Paciente>,
    evolucoes: Vec<Evolucao>,
}

impl<'s> ProntuarioPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            paciente: None,
            evolucoes: Vec::new(),
        }
    }

    /// Loads the patient the session points at.
    pub async fn carregar(&mut self) -> Result<&Paciente> {
        let id = paciente_da_sessao(self.session)?;
        let data: PacienteData = self
            .api
            .call_as(names::PACIENTES_OBTER_POR_ID, json!({ "idPaciente": id }))
            .await?;
        if self.session.paciente_atual().map(|p| p.id.as_str()) != Some(id.as_str()) {
            self.session
                .set_paciente_atual(&data.paciente.id_paciente, &data.paciente.nome_completo)?;
        }
        Ok(&*self.paciente.insert(data.paciente))
    }

    pub fn paciente(&self) -> Option<&Paciente> {
        self.paciente.as_ref()
    }

    /// Agenda context, when it belongs to the patient being viewed.
    fn contexto(&self) -> Option<&ContextoAgenda> {
        let id = paciente_da_sessao(self.session).ok()?;
        self.session
            .contexto_agenda()
            .filter(|c| c.id_paciente == id && !c.id_agenda.trim().is_empty())
    }

    /// Notes of the open appointment when the chart came from the agenda,
    /// of the whole patient otherwise. Newest first.
    pub async fn carregar_evolucoes(&mut self) -> Result<&[Evolucao]> {
        let (action, corpo) = match self.contexto() {
            Some(contexto) => (
                names::EVOLUCAO_LISTAR_POR_AGENDA,
                json!({ "idAgenda": contexto.id_agenda }),
            ),
            None => (
                names::EVOLUCAO_LISTAR_POR_PACIENTE,
                json!({ "idPaciente": paciente_da_sessao(self.session)? }),
            ),
        };
        let lista: Evolucoes = self.api.call_as(action, corpo).await?;
        self.evolucoes = lista.evolucoes;
        Ok(&self.evolucoes)
    }

    pub fn evolucoes(&self) -> &[Evolucao] {
        &self.evolucoes
    }

    pub async fn salvar_evolucao(&mut self, texto: &str) -> Result<Evolucao> {
        let texto = obrigatorio(texto, "Digite a evolução antes de salvar.")?;
        let id_paciente = paciente_da_sessao(self.session)?;
        let contexto = self.contexto().cloned().unwrap_or_default();

        let corpo = payload(&SalvarEvolucao {
            id_paciente: &id_paciente,
            id_agenda: &contexto.id_agenda,
            texto: &texto,
            data_referencia: &contexto.data,
            hora_referencia: &contexto.hora,
            origem: &contexto.origem,
        })?;
        let gravada: EvolucaoGravada = self.api.call_as(names::EVOLUCAO_SALVAR, corpo).await?;
        self.evolucoes.insert(0, gravada.evolucao.clone());
        Ok(gravada.evolucao)
    }
}
