use anyhow::Context;
use clap::{Parser, Subcommand};
use prontio_client::agenda_view::SlotRow;
use prontio_client::pages::{AgendaPage, PacientesPage, ProntuarioPage};
use prontio_client::{ApiClient, ClientConfig, Session, SortKey, StatusFilter};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "prontio")]
#[command(about = "PRONTIO - terminal front-end for the clinic API")]
#[command(version)]
struct Args {
    /// API endpoint [default: PRONTIO_API_URL or http://localhost:3000/]
    #[arg(long)]
    api_url: Option<String>,

    /// Session file [default: PRONTIO_SESSION_FILE or ~/.prontio/session.json]
    #[arg(long)]
    session: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a raw action and print the envelope
    Call {
        action: String,
        /// JSON payload [default: {}]
        payload: Option<String>,
    },
    /// Day grid
    Agenda {
        /// Date as YYYY-MM-DD
        data: String,
        /// TODOS, LIVRE, OCUPADO, AGENDADO, CONFIRMADO, BLOQUEADO, CANCELADO
        #[arg(short, long, default_value = "TODOS")]
        filtro: StatusFilter,
    },
    /// Upcoming appointments
    Proximos {
        /// First date as YYYY-MM-DD [default: today]
        #[arg(long)]
        a_partir_de: Option<String>,
    },
    /// Patient list
    Pacientes {
        #[arg(short, long, default_value = "")]
        busca: String,
        /// Include inactive patients
        #[arg(long)]
        todos: bool,
        /// nomeAsc, nomeDesc, dataCadastroAsc, dataCadastroDesc
        #[arg(short, long, default_value = "dataCadastroDesc")]
        ordem: SortKey,
    },
    /// Make a patient the current one
    Selecionar { id_paciente: String },
    /// Current patient's chart and progress notes
    Prontuario,
    /// Switch between light and dark theme
    Tema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let defaults = ClientConfig::from_env();
    let api = ApiClient::new(args.api_url.unwrap_or(defaults.api_url));
    let mut session = Session::load(args.session.unwrap_or(defaults.session_file));

    match args.command {
        Command::Call { action, payload } => {
            let payload: Value = match payload {
                Some(raw) => serde_json::from_str(&raw).context("payload is not valid JSON")?,
                None => Value::Null,
            };
            let resp = api.call(&action, payload).await;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Command::Agenda { data, filtro } => {
            let mut page = AgendaPage::new(api, &mut session);
            let dia = page.carregar_dia(&data).await?;
            let resumo = dia.resumo.clone();
            if dia.synthesized {
                eprintln!("⚠ grade montada a partir da lista de agendamentos");
            }
            page.set_filtro(filtro);
            print_rows(&page.linhas());
            println!(
                "\n{} horários | {} ocupados | {} livres | {} bloqueados | {} cancelados",
                resumo.total_slots, resumo.ocupados, resumo.livres, resumo.bloqueados, resumo.cancelados
            );
        }
        Command::Proximos { a_partir_de } => {
            let page = AgendaPage::new(api, &mut session);
            for ag in page.proximos(a_partir_de.as_deref()).await? {
                println!(
                    "{} {}  {:<30} {}",
                    ag.data,
                    ag.hora,
                    ag.nome_paciente,
                    ag.status.humano()
                );
            }
        }
        Command::Pacientes { busca, todos, ordem } => {
            let mut page = PacientesPage::new(api, &mut session);
            page.carregar().await?;
            page.set_busca(&busca);
            page.set_somente_ativos(!todos);
            page.set_ordem(ordem);
            let lista = page.lista();
            for p in &lista {
                println!(
                    "{:<24} {:<32} {:<16} {}",
                    p.id_paciente,
                    p.nome_completo,
                    p.telefone1,
                    if p.ativo { "ativo" } else { "inativo" }
                );
            }
            println!("\n{} de {} pacientes", lista.len(), page.pacientes().len());
        }
        Command::Selecionar { id_paciente } => {
            let mut page = PacientesPage::new(api, &mut session);
            page.carregar().await?;
            let paciente = page.selecionar(&id_paciente)?;
            println!("✓ paciente atual: {}", paciente.nome_completo);
        }
        Command::Prontuario => {
            let mut page = ProntuarioPage::new(api, &mut session);
            let paciente = page.carregar().await?;
            println!("{} ({})", paciente.nome_completo, paciente.id_paciente);
            if !paciente.obs_importantes.trim().is_empty() {
                println!("⚠ {}", paciente.obs_importantes.trim());
            }
            for ev in page.carregar_evolucoes().await? {
                println!("\n[{}]\n{}", ev.criado_em, ev.texto);
            }
        }
        Command::Tema => {
            let tema = session.alternar_tema()?;
            println!("tema: {tema:?}");
        }
    }
    Ok(())
}

fn print_rows(rows: &[SlotRow]) {
    for row in rows {
        let marca = if row.riscado { "~" } else { " " };
        println!(
            "{marca}{:<6} {:<10} {:<30} {:<14} {}",
            row.hora,
            row.bucket.as_str(),
            row.paciente,
            row.status,
            row.observacoes
        );
    }
}
