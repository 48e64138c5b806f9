//! Clinical documents attached to a patient.

use serde::{Deserialize, Serialize};

/// Progress note written from the chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evolucao {
    pub id_evolucao: String,
    pub id_paciente: String,
    #[serde(default)]
    pub id_agenda: String,
    pub texto: String,
    #[serde(default)]
    pub data_referencia: String,
    #[serde(default)]
    pub hora_referencia: String,
    #[serde(default)]
    pub origem: String,
    #[serde(default)]
    pub criado_em: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laudo {
    pub id_laudo: String,
    pub id_paciente: String,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub tipo: String,
    pub texto: String,
    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub criado_em: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receita {
    pub id_receita: String,
    pub id_paciente: String,
    pub texto_medicamentos: String,
    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub criado_em: String,
}

fn ativo_padrao() -> bool {
    true
}

/// Entry of the medication catalog used to fill prescriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicamento {
    pub id_medicamento: String,
    pub nome_medicacao: String,
    #[serde(default)]
    pub posologia: String,
    #[serde(default)]
    pub quantidade: String,
    #[serde(default)]
    pub via_administracao: String,
    #[serde(default = "ativo_padrao")]
    pub ativo: bool,
}

impl Medicamento {
    /// Prescription line built from the catalog entry.
    pub fn linha_prescricao(&self) -> String {
        let mut linha = self.nome_medicacao.trim().to_string();
        if !self.quantidade.trim().is_empty() {
            linha.push_str(&format!(" ({})", self.quantidade.trim()));
        }
        if !self.via_administracao.trim().is_empty() {
            linha.push_str(&format!(" - via {}", self.via_administracao.trim()));
        }
        if !self.posologia.trim().is_empty() {
            linha.push_str(&format!("\n   {}", self.posologia.trim()));
        }
        linha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescription_line_skips_empty_parts() {
        let med = Medicamento {
            nome_medicacao: "Dipirona 500mg".into(),
            posologia: "1 comprimido de 6/6h se dor".into(),
            quantidade: "10 comprimidos".into(),
            via_administracao: "oral".into(),
            ..Default::default()
        };
        assert_eq!(
            med.linha_prescricao(),
            "Dipirona 500mg (10 comprimidos) - via oral\n   1 comprimido de 6/6h se dor"
        );

        let bare = Medicamento {
            nome_medicacao: "Soro fisiológico".into(),
            ..Default::default()
        };
        assert_eq!(bare.linha_prescricao(), "Soro fisiológico");
    }
}
