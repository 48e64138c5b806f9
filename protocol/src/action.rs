//! Action names and the prefix routing table.

/// Handler group an action is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    Agenda,
    AgendaConfig,
    Pacientes,
    Evolucao,
    Laudos,
    Receita,
    Medicamentos,
    Configuracoes,
}

/// Prefix table in priority order. Matching is case-sensitive and the first
/// matching prefix wins.
pub const ROUTES: &[(&str, ActionGroup)] = &[
    ("Agenda_", ActionGroup::Agenda),
    ("Agenda.", ActionGroup::Agenda),
    ("AgendaConfig_", ActionGroup::AgendaConfig),
    ("AgendaConfig.", ActionGroup::AgendaConfig),
    ("Pacientes_", ActionGroup::Pacientes),
    ("Pacientes.", ActionGroup::Pacientes),
    ("Evolucao.", ActionGroup::Evolucao),
    ("Evolucao_", ActionGroup::Evolucao),
    ("Laudos.", ActionGroup::Laudos),
    ("Laudos_", ActionGroup::Laudos),
    ("Receita.", ActionGroup::Receita),
    ("Receita_", ActionGroup::Receita),
    ("Medicamentos.", ActionGroup::Medicamentos),
    ("Medicamentos_", ActionGroup::Medicamentos),
    ("Configuracoes.", ActionGroup::Configuracoes),
    ("Configuracoes_", ActionGroup::Configuracoes),
];

/// An action resolved to its group plus the verb after the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedAction<'a> {
    pub group: ActionGroup,
    pub verb: &'a str,
}

pub fn route(action: &str) -> Option<RoutedAction<'_>> {
    ROUTES.iter().find_map(|(prefix, group)| {
        action.strip_prefix(prefix).map(|verb| RoutedAction {
            group: *group,
            verb,
        })
    })
}

/// Action names used by the bundled front-end.
pub mod names {
    pub const AGENDA_CRIAR: &str = "Agenda.Criar";
    pub const AGENDA_ATUALIZAR: &str = "Agenda.Atualizar";
    pub const AGENDA_LISTAR_POR_DATA: &str = "Agenda.ListarPorData";
    pub const AGENDA_LIST_SLOTS_OF_DAY: &str = "Agenda.ListSlotsOfDay";
    pub const AGENDA_LISTAR_A_FUTURO: &str = "Agenda.ListarAFuturo";
    pub const AGENDA_BLOQUEAR_HORARIO: &str = "Agenda.BloquearHorario";

    pub const AGENDA_CONFIG_OBTER: &str = "AgendaConfig_Obter";
    pub const AGENDA_CONFIG_SALVAR: &str = "AgendaConfig_Salvar";

    pub const PACIENTES_LISTAR_TODOS: &str = "Pacientes.ListarTodos";
    pub const PACIENTES_LISTAR_SELECAO: &str = "Pacientes.ListarSelecao";
    pub const PACIENTES_CRIAR: &str = "Pacientes.Criar";
    pub const PACIENTES_CRIAR_BASICO: &str = "Pacientes.CriarBasico";
    pub const PACIENTES_ATUALIZAR: &str = "Pacientes.Atualizar";
    pub const PACIENTES_ALTERAR_STATUS_ATIVO: &str = "Pacientes.AlterarStatusAtivo";
    pub const PACIENTES_OBTER_POR_ID: &str = "Pacientes.ObterPorId";

    pub const EVOLUCAO_SALVAR: &str = "Evolucao.Salvar";
    pub const EVOLUCAO_LISTAR_POR_AGENDA: &str = "Evolucao.ListarPorAgenda";
    pub const EVOLUCAO_LISTAR_POR_PACIENTE: &str = "Evolucao.ListarPorPaciente";

    pub const LAUDOS_CRIAR: &str = "Laudos.Criar";
    pub const LAUDOS_LISTAR_POR_PACIENTE: &str = "Laudos.ListarPorPaciente";
    pub const LAUDOS_GERAR_PDF: &str = "Laudos.GerarPdf";

    pub const RECEITA_CRIAR: &str = "Receita.Criar";
    pub const RECEITA_LISTAR_POR_PACIENTE: &str = "Receita.ListarPorPaciente";
    pub const RECEITA_GERAR_PDF: &str = "Receita.GerarPdf";

    pub const MEDICAMENTOS_LISTAR_TODOS: &str = "Medicamentos.ListarTodos";
    pub const MEDICAMENTOS_CRIAR: &str = "Medicamentos.Criar";

    pub const CONFIGURACOES_OBTER: &str = "Configuracoes.Obter";
    pub const CONFIGURACOES_SALVAR: &str = "Configuracoes.Salvar";
}
