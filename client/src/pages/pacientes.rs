//! Patient list, registration form and selection.

use prontio_protocol::action::names;
use prontio_protocol::Paciente;
use serde::Deserialize;
use serde_json::json;

use super::{obrigatorio, payload};
use crate::dispatcher::ApiClient;
use crate::error::{ClientError, Result};
use crate::listing::{project, ListQuery, SortKey};
use crate::session::Session;

/// Columns of the patient table, in display order.
pub const COLUNAS: [&str; 8] = [
    "nomeCompleto",
    "dataNascimento",
    "cpf",
    "telefone1",
    "email",
    "planoSaude",
    "enderecoCidade",
    "ativo",
];

#[derive(Debug, Deserialize)]
struct Pacientes {
    #[serde(default)]
    pacientes: Vec<Paciente>,
}

#[derive(Debug, Deserialize)]
struct PacienteGravado {
    paciente: Paciente,
}

#[derive(Debug, Deserialize)]
struct StatusAlterado {
    ativo: bool,
}

pub struct PacientesPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    pacientes: Vec<Paciente>,
    query: ListQuery,
}

impl<'s> PacientesPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            pacientes: Vec::new(),
            query: ListQuery::default(),
        }
    }

    pub async fn carregar(&mut self) -> Result<usize> {
        let lista: Pacientes = self.api.call_as(names::PACIENTES_LISTAR_TODOS, json!({})).await?;
        self.pacientes = lista.pacientes;
        Ok(self.pacientes.len())
    }

    pub fn pacientes(&self) -> &[Paciente] {
        &self.pacientes
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn set_busca(&mut self, texto: &str) {
        self.query.texto = texto.to_string();
    }

    pub fn set_somente_ativos(&mut self, somente_ativos: bool) {
        self.query.somente_ativos = somente_ativos;
    }

    pub fn set_ordem(&mut self, ordem: SortKey) {
        self.query.ordem = ordem;
    }

    /// Rows to display for the current search, filter and order.
    pub fn lista(&self) -> Vec<&Paciente> {
        project(&self.pacientes, &self.query)
    }

    /// Creates the patient when it has no id yet, updates it otherwise.
    pub async fn salvar(&mut self, paciente: &Paciente) -> Result<Paciente> {
        obrigatorio(&paciente.nome_completo, "Informe o nome completo do paciente.")?;
        let novo = paciente.id_paciente.trim().is_empty();
        let action = if novo {
            names::PACIENTES_CRIAR
        } else {
            names::PACIENTES_ATUALIZAR
        };
        let mut corpo = payload(paciente)?;
        // Active flag and registration date are not form fields.
        if let Some(obj) = corpo.as_object_mut() {
            obj.remove("dataCadastro");
            obj.remove("ativo");
            if novo {
                obj.remove("idPaciente");
            }
        }

        let gravado: PacienteGravado = self.api.call_as(action, corpo).await?;
        let salvo = gravado.paciente;
        match self
            .pacientes
            .iter_mut()
            .find(|p| p.id_paciente == salvo.id_paciente)
        {
            Some(existente) => *existente = salvo.clone(),
            None => self.pacientes.push(salvo.clone()),
        }
        tracing::debug!(id_paciente = %salvo.id_paciente, novo, "patient saved");
        Ok(salvo)
    }

    pub async fn alterar_status(&mut self, id_paciente: &str, ativo: bool) -> Result<bool> {
        let id = obrigatorio(id_paciente, "Paciente não informado.")?;
        let alterado: StatusAlterado = self
            .api
            .call_as(
                names::PACIENTES_ALTERAR_STATUS_ATIVO,
                json!({ "idPaciente": id, "ativo": ativo }),
            )
            .await?;
        if let Some(p) = self.pacientes.iter_mut().find(|p| p.id_paciente == id) {
            p.ativo = alterado.ativo;
        }
        Ok(alterado.ativo)
    }

    /// Makes a loaded patient the current one.
    pub fn selecionar(&mut self, id_paciente: &str) -> Result<&Paciente> {
        let id = id_paciente.trim();
        let paciente = self
            .pacientes
            .iter()
            .find(|p| p.id_paciente == id)
            .ok_or_else(|| ClientError::validation(format!("Paciente não encontrado: {id}.")))?;
        self.session
            .set_paciente_atual(&paciente.id_paciente, &paciente.nome_completo)?;
        Ok(paciente)
    }

    pub fn colunas_visiveis(&self) -> Vec<&'static str> {
        COLUNAS
            .into_iter()
            .filter(|c| self.session.coluna_visivel(c))
            .collect()
    }

    pub fn set_coluna_visivel(&mut self, coluna: &str, visivel: bool) -> Result<()> {
        if !COLUNAS.contains(&coluna) {
            return Err(ClientError::validation(format!("Coluna desconhecida: {coluna}.")));
        }
        self.session.set_coluna_visivel(coluna, visivel)
    }
}
