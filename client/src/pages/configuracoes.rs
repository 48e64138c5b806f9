//! Clinic settings page.

use prontio_protocol::action::names;
use prontio_protocol::ConfiguracaoClinica;
use serde_json::json;

use super::{obrigatorio, payload};
use crate::dispatcher::ApiClient;
use crate::error::Result;
use crate::session::{Session, Tema};

pub struct ConfiguracoesPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    config: Option<ConfiguracaoClinica>,
}

impl<'s> ConfiguracoesPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            config: None,
        }
    }

    pub async fn carregar(&mut self) -> Result<&ConfiguracaoClinica> {
        let config: ConfiguracaoClinica = self
            .api
            .call_as(names::CONFIGURACOES_OBTER, json!({}))
            .await?;
        Ok(&*self.config.insert(config))
    }

    pub fn config(&self) -> Option<&ConfiguracaoClinica> {
        self.config.as_ref()
    }

    pub async fn salvar(&mut self, config: &ConfiguracaoClinica) -> Result<&ConfiguracaoClinica> {
        obrigatorio(&config.medico_nome_completo, "Informe o nome completo do médico.")?;
        obrigatorio(&config.medico_crm, "Informe o CRM do médico.")?;
        let salva: ConfiguracaoClinica = self
            .api
            .call_as(names::CONFIGURACOES_SALVAR, payload(config)?)
            .await?;
        tracing::info!(crm = %salva.medico_crm, "clinic settings saved");
        Ok(&*self.config.insert(salva))
    }

    /// Theme is a per-user preference and never reaches the server.
    pub fn alternar_tema(&mut self) -> Result<Tema> {
        self.session.alternar_tema()
    }
}
