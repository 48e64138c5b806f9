use serde::{Deserialize, Serialize};

fn ativo_padrao() -> bool {
    true
}

/// Patient record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paciente {
    #[serde(alias = "ID_Paciente")]
    pub id_paciente: String,
    pub nome_completo: String,
    #[serde(default)]
    pub data_nascimento: String,
    #[serde(default)]
    pub sexo: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub rg: String,
    #[serde(default)]
    pub telefone1: String,
    #[serde(default)]
    pub telefone2: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub endereco_bairro: String,
    #[serde(default)]
    pub endereco_cidade: String,
    #[serde(default)]
    pub endereco_uf: String,
    #[serde(default)]
    pub plano_saude: String,
    #[serde(default)]
    pub numero_carteirinha: String,
    #[serde(default)]
    pub obs_importantes: String,
    #[serde(default)]
    pub profissao: String,
    #[serde(default = "ativo_padrao")]
    pub ativo: bool,
    #[serde(default)]
    pub data_cadastro: Option<String>,
}

/// Short patient entry used by selection lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacienteResumo {
    #[serde(rename = "ID_Paciente", alias = "idPaciente")]
    pub id_paciente: String,
    #[serde(rename = "nomeCompleto", alias = "nome")]
    pub nome_completo: String,
    #[serde(default)]
    pub documento: String,
    #[serde(default)]
    pub telefone: String,
}

impl From<&Paciente> for PacienteResumo {
    fn from(p: &Paciente) -> Self {
        let telefone = if p.telefone1.is_empty() {
            p.telefone2.clone()
        } else {
            p.telefone1.clone()
        };
        Self {
            id_paciente: p.id_paciente.clone(),
            nome_completo: p.nome_completo.clone(),
            documento: p.cpf.clone(),
            telefone,
        }
    }
}
