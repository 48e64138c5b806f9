//! Prescriptions for the current patient, filled from the medication
//! catalog.

use prontio_protocol::action::names;
use prontio_protocol::{Medicamento, Receita};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::laudo::Documento;
use super::{obrigatorio, paciente_da_sessao, payload};
use crate::dispatcher::ApiClient;
use crate::error::Result;
use crate::listing::{project, ListQuery, SortKey};
use crate::session::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CriarReceita<'a> {
    id_paciente: &'a str,
    texto_medicamentos: &'a str,
    observacoes: &'a str,
}

#[derive(Debug, Deserialize)]
struct ReceitaGravada {
    receita: Receita,
}

#[derive(Debug, Deserialize)]
struct Receitas {
    #[serde(default)]
    receitas: Vec<Receita>,
}

#[derive(Debug, Deserialize)]
struct Medicamentos {
    #[serde(default)]
    medicamentos: Vec<Medicamento>,
}

pub struct ReceitaPage<'s> {
    api: ApiClient,
    session: &'s mut Session,
    receitas: Vec<Receita>,
    medicamentos: Vec<Medicamento>,
}

impl<'s> ReceitaPage<'s> {
    pub fn new(api: ApiClient, session: &'s mut Session) -> Self {
        Self {
            api,
            session,
            receitas: Vec::new(),
            medicamentos: Vec::new(),
        }
    }

    pub async fn criar(&mut self, texto_medicamentos: &str, observacoes: &str) -> Result<Receita> {
        let id_paciente = paciente_da_sessao(self.session)?;
        let texto = obrigatorio(texto_medicamentos, "Informe os medicamentos da receita.")?;
        let corpo = payload(&CriarReceita {
            id_paciente: &id_paciente,
            texto_medicamentos: &texto,
            observacoes: observacoes.trim(),
        })?;
        let gravada: ReceitaGravada = self.api.call_as(names::RECEITA_CRIAR, corpo).await?;
        self.receitas.insert(0, gravada.receita.clone());
        Ok(gravada.receita)
    }

    pub async fn listar(&mut self) -> Result<&[Receita]> {
        let id_paciente = paciente_da_sessao(self.session)?;
        let lista: Receitas = self
            .api
            .call_as(names::RECEITA_LISTAR_POR_PACIENTE, json!({ "idPaciente": id_paciente }))
            .await?;
        self.receitas = lista.receitas;
        Ok(&self.receitas)
    }

    pub fn receitas(&self) -> &[Receita] {
        &self.receitas
    }

    pub async fn gerar_html(&self, id_receita: &str) -> Result<String> {
        let id = obrigatorio(id_receita, "Receita não informada.")?;
        let doc: Documento = self
            .api
            .call_as(names::RECEITA_GERAR_PDF, json!({ "idReceita": id }))
            .await?;
        Ok(doc.html)
    }

    pub async fn carregar_medicamentos(&mut self) -> Result<usize> {
        let lista: Medicamentos = self
            .api
            .call_as(names::MEDICAMENTOS_LISTAR_TODOS, json!({}))
            .await?;
        self.medicamentos = lista.medicamentos;
        Ok(self.medicamentos.len())
    }

    /// Active catalog entries matching `busca`, by name.
    pub fn buscar_medicamentos(&self, busca: &str) -> Vec<&Medicamento> {
        project(&self.medicamentos, &ListQuery::new(busca, true, SortKey::NomeAsc))
    }
}

/// Appends a catalog entry to the prescription text, one entry per line.
pub fn adicionar_ao_texto(texto: &str, medicamento: &Medicamento) -> String {
    let linha = medicamento.linha_prescricao();
    let atual = texto.trim_end();
    if atual.is_empty() {
        linha
    } else {
        format!("{atual}\n{linha}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn med(id: &str, nome: &str, ativo: bool) -> Medicamento {
        Medicamento {
            id_medicamento: id.into(),
            nome_medicacao: nome.into(),
            ativo,
            ..Default::default()
        }
    }

    #[test]
    fn catalog_search_skips_inactive_entries() {
        let mut session = Session::in_memory();
        let mut page = ReceitaPage::new(ApiClient::new("http://127.0.0.1:9/"), &mut session);
        page.medicamentos = vec![
            med("M1", "Amoxicilina", true),
            med("M2", "Amoxicilina + Clavulanato", false),
            med("M3", "Ácido acetilsalicílico", true),
        ];
        let nomes: Vec<&str> = page
            .buscar_medicamentos("")
            .into_iter()
            .map(|m| m.id_medicamento.as_str())
            .collect();
        assert_eq!(nomes, vec!["M3", "M1"]);
        assert_eq!(page.buscar_medicamentos("amoxi").len(), 1);
    }

    #[test]
    fn entries_are_appended_line_by_line() {
        let dipirona = Medicamento {
            nome_medicacao: "Dipirona 500mg".into(),
            posologia: "6/6h se dor".into(),
            ..Default::default()
        };
        let texto = adicionar_ao_texto("", &dipirona);
        assert_eq!(texto, "Dipirona 500mg\n   6/6h se dor");
        let texto = adicionar_ao_texto(&format!("{texto}\n\n"), &med("M1", "Amoxicilina", true));
        assert_eq!(texto, "Dipirona 500mg\n   6/6h se dor\nAmoxicilina");
    }

    #[tokio::test]
    async fn prescription_text_is_required() {
        let mut session = Session::in_memory();
        session.set_paciente_atual("PAC-1", "Ana").unwrap();
        let mut page = ReceitaPage::new(ApiClient::new("http://127.0.0.1:9/"), &mut session);
        let err = page.criar("  ", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Informe os medicamentos da receita.");
    }
}
