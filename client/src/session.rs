//! Per-user context shared by the page controllers.
//!
//! Persisted as one JSON file and written back after every change. A missing
//! or unreadable file starts an empty session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacienteAtual {
    pub id: String,
    #[serde(default)]
    pub nome: String,
}

/// What the agenda hands over when opening a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextoAgenda {
    #[serde(default)]
    pub id_agenda: String,
    pub id_paciente: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub hora: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub origem: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tema {
    #[default]
    Claro,
    Escuro,
}

impl Tema {
    pub const fn alternado(self) -> Self {
        match self {
            Self::Claro => Self::Escuro,
            Self::Escuro => Self::Claro,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(default)]
    paciente_atual: Option<PacienteAtual>,
    #[serde(default)]
    agenda_atual_id: Option<String>,
    #[serde(default)]
    contexto_agenda: Option<ContextoAgenda>,
    #[serde(default)]
    colunas_visiveis: BTreeMap<String, bool>,
    #[serde(default)]
    tema: Tema,
}

impl Session {
    /// Session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut session = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<Session>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "session file unreadable, starting fresh");
                Session::default()
            }),
            Err(_) => Session::default(),
        };
        session.path = Some(path);
        session
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn paciente_atual(&self) -> Option<&PacienteAtual> {
        self.paciente_atual.as_ref()
    }

    /// An empty id clears the selection.
    pub fn set_paciente_atual(&mut self, id: &str, nome: &str) -> Result<()> {
        self.paciente_atual = if id.trim().is_empty() {
            None
        } else {
            Some(PacienteAtual {
                id: id.trim().to_string(),
                nome: nome.trim().to_string(),
            })
        };
        self.save()
    }

    pub fn clear_paciente_atual(&mut self) -> Result<()> {
        self.set_paciente_atual("", "")
    }

    pub fn agenda_atual_id(&self) -> Option<&str> {
        self.agenda_atual_id.as_deref()
    }

    pub fn set_agenda_atual(&mut self, id_agenda: Option<&str>) -> Result<()> {
        self.agenda_atual_id = id_agenda
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from);
        self.save()
    }

    pub fn contexto_agenda(&self) -> Option<&ContextoAgenda> {
        self.contexto_agenda.as_ref()
    }

    pub fn set_contexto_agenda(&mut self, contexto: Option<ContextoAgenda>) -> Result<()> {
        self.contexto_agenda = contexto;
        self.save()
    }

    /// Columns default to visible until hidden once.
    pub fn coluna_visivel(&self, coluna: &str) -> bool {
        self.colunas_visiveis.get(coluna).copied().unwrap_or(true)
    }

    pub fn colunas_visiveis(&self) -> &BTreeMap<String, bool> {
        &self.colunas_visiveis
    }

    pub fn set_coluna_visivel(&mut self, coluna: &str, visivel: bool) -> Result<()> {
        self.colunas_visiveis.insert(coluna.to_string(), visivel);
        self.save()
    }

    pub fn tema(&self) -> Tema {
        self.tema
    }

    pub fn set_tema(&mut self, tema: Tema) -> Result<()> {
        self.tema = tema;
        self.save()
    }

    pub fn alternar_tema(&mut self) -> Result<Tema> {
        self.set_tema(self.tema.alternado())?;
        Ok(self.tema)
    }
}
