//! Medical reports for the current patient.

use prontio_protocol::action::names;
use prontio_protocol::Laudo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{obrigatorio, paciente_da_sessao, payload};
use crate::dispatcher::ApiClient;
use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NovoLaudo {
    pub titulo: String,
    pub tipo: String,
    pub texto: String,
    pub observacoes: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CriarLaudo<'a> {
    id_paciente: &'a str,
    titulo: &'a str,
    tipo: &'a str,
    texto: &'a str,
    observacoes: &'a str,
}

#[derive(Debug, Deserialize)]
struct LaudoGravado {
    laudo: Laudo,
}

#[derive(Debug, Deserialize)]
struct Laudos {
    #[serde(default)]
    laudos: Vec<Laudo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Documento {
    pub(crate) html: String,
}

pub struct LaudoPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    laudos: Vec<Laudo>,
}

impl<'s> LaudoPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            laudos: Vec::new(),
        }
    }

    pub async fn criar(&mut self, novo: &NovoLaudo) -> Result<Laudo> {
        let id_paciente = paciente_da_sessao(self.session)?;
        let texto = obrigatorio(&novo.texto, "Digite o texto do laudo.")?;
        let corpo = payload(&CriarLaudo {
            id_paciente: &id_paciente,
            titulo: novo.titulo.trim(),
            tipo: novo.tipo.trim(),
            texto: &texto,
            observacoes: novo.observacoes.trim(),
        })?;
        let gravado: LaudoGravado = self.api.call_as(names::LAUDOS_CRIAR, corpo).await?;
        self.laudos.insert(0, gravado.laudo.clone());
        Ok(gravado.laudo)
    }

    pub async fn listar(&mut self) -> Result<&[Laudo]> {
        let id_paciente = paciente_da_sessao(self.session)?;
        let lista: Laudos = self
            .api
            .call_as(names::LAUDOS_LISTAR_POR_PACIENTE, json!({ "idPaciente": id_paciente }))
            .await?;
        self.laudos = lista.laudos;
        Ok(&self.laudos)
    }

    pub fn laudos(&self) -> &[Laudo] {
        &self.laudos
    }

    /// Printable HTML of a report.
    pub async fn gerar_html(&self, id_laudo: &str) -> Result<String> {
        let id = obrigatorio(id_laudo, "Laudo não informado.")?;
        let doc: Documento = self
            .api
            .call_as(names::LAUDOS_GERAR_PDF, json!({ "idLaudo": id }))
            .await?;
        Ok(doc.html)
    }
}
