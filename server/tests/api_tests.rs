use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use prontio_server::{app, db, router, AppState, ServerConfig};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePool;
use tower::ServiceExt;

async fn test_app() -> (Router, SqlitePool) {
    let pool = db::open_in_memory().await.expect("in-memory database");
    (app(AppState::new(pool.clone())), pool)
}

async fn post_raw(app: &Router, body: &str) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "text/plain;charset=utf-8")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = tokio_test::assert_ok!(app.clone().oneshot(request).await);

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = tokio_test::assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    serde_json::from_slice(&bytes).expect("envelope is JSON")
}

async fn call(app: &Router, action: &str, payload: Value) -> Value {
    post_raw(app, &json!({ "action": action, "payload": payload }).to_string()).await
}

fn assert_error(envelope: &Value, code: &str) {
    assert_eq!(envelope["success"], json!(false), "{envelope}");
    assert_eq!(envelope["data"], Value::Null);
    assert_eq!(envelope["errors"][0]["code"], json!(code), "{envelope}");
}

fn assert_ok(envelope: &Value) -> &Value {
    assert_eq!(envelope["success"], json!(true), "{envelope}");
    assert_eq!(envelope["errors"], json!([]));
    &envelope["data"]
}

fn slot_at<'a>(data: &'a Value, hora: &str) -> &'a Value {
    data["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["hora"] == json!(hora))
        .unwrap_or_else(|| panic!("no slot at {hora}"))
}

#[tokio::test]
async fn test_get_returns_usage_and_health() {
    let (app, _) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("PRONTIO"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_envelope_errors() {
    let (app, _) = test_app().await;

    let invalid = post_raw(&app, "{not json").await;
    assert_error(&invalid, "INVALID_JSON");
    assert!(invalid["errors"][0]["details"].is_string());

    assert_error(&post_raw(&app, "").await, "NO_ACTION");
    assert_error(&post_raw(&app, r#"{"payload": {}}"#).await, "NO_ACTION");

    let unknown = call(&app, "Financeiro.Listar", json!({})).await;
    assert_error(&unknown, "UNKNOWN_ACTION");
    assert_eq!(
        unknown["errors"][0]["message"],
        json!("Ação desconhecida: Financeiro.Listar")
    );

    assert_error(&call(&app, "agenda.Criar", json!({})).await, "UNKNOWN_ACTION");
    assert_error(&call(&app, "Agenda.Remarcar", json!({})).await, "EMPTY_RESULT");
}

#[tokio::test]
async fn test_create_appointment_then_conflict() {
    let (app, _) = test_app().await;
    let payload = json!({
        "idPaciente": "P1",
        "dataConsulta": "2025-03-05",
        "horaConsulta": "08:00"
    });

    let first = call(&app, "Agenda.Criar", payload.clone()).await;
    let data = assert_ok(&first);
    let id_agenda = data["idAgenda"].as_str().unwrap().to_string();
    assert_eq!(data["agendamento"]["status"], json!("AGENDADO"));

    let second = call(&app, "Agenda.Criar", payload).await;
    assert_error(&second, "CONFLITO_HORARIO");
    assert_eq!(second["errors"][0]["details"]["idAgenda"], json!(id_agenda));
}

#[tokio::test]
async fn test_missing_fields_are_validation_errors() {
    let (app, _) = test_app().await;

    let no_time = call(
        &app,
        "Agenda.Criar",
        json!({"idPaciente": "P1", "data": "2025-03-05"}),
    )
    .await;
    assert_error(&no_time, "VALIDATION_ERROR");
    assert_eq!(no_time["errors"][0]["details"]["campo"], json!("hora"));

    let bad_date = call(
        &app,
        "Agenda.Criar",
        json!({"idPaciente": "P1", "data": "05/03/2025", "hora": "08:00"}),
    )
    .await;
    assert_eq!(bad_date["errors"][0]["details"]["campo"], json!("data"));

    let no_name = call(&app, "Pacientes.Criar", json!({"cpf": "1"})).await;
    assert_eq!(no_name["errors"][0]["details"]["campo"], json!("nomeCompleto"));
}

#[tokio::test]
async fn test_day_slots_follow_appointments() {
    let (app, _) = test_app().await;

    let created = call(
        &app,
        "Agenda.Criar",
        json!({"idPaciente": "P1", "data": "2025-03-05", "hora": "08:00", "tipo": "Consulta"}),
    )
    .await;
    let id_agenda = assert_ok(&created)["idAgenda"].as_str().unwrap().to_string();
    assert_ok(
        &call(
            &app,
            "Agenda.BloquearHorario",
            json!({"data": "2025-03-05", "hora": "12:00", "motivo": "Almoço"}),
        )
        .await,
    );

    let day = call(&app, "Agenda.ListSlotsOfDay", json!({"data": "2025-03-05"})).await;
    let data = assert_ok(&day);
    assert_eq!(data["slots"].as_array().unwrap().len(), 20);
    assert_eq!(slot_at(data, "08:00")["status"], json!("OCUPADO"));
    assert_eq!(slot_at(data, "08:00")["id_agenda"], json!(id_agenda));
    assert_eq!(slot_at(data, "12:00")["status"], json!("BLOQUEADO"));
    assert_eq!(slot_at(data, "08:30")["status"], json!("LIVRE"));
    assert_eq!(data["resumo"]["ocupados"], json!(1));
    assert_eq!(data["resumo"]["bloqueados"], json!(1));
    assert_eq!(data["resumo"]["primeiro_livre"], json!("08:30"));

    let cancelled = call(
        &app,
        "Agenda.Atualizar",
        json!({"idAgenda": id_agenda, "status": "CANCELADO"}),
    )
    .await;
    assert_ok(&cancelled);

    let day = call(&app, "Agenda.ListSlotsOfDay", json!({"data": "2025-03-05"})).await;
    assert_eq!(slot_at(assert_ok(&day), "08:00")["status"], json!("CANCELADO"));

    // A cancelled appointment no longer holds the time.
    let rebooked = call(
        &app,
        "Agenda.Criar",
        json!({"idPaciente": "P2", "data": "2025-03-05", "hora": "08:00"}),
    )
    .await;
    assert_ok(&rebooked);

    let listed = call(&app, "Agenda.ListarPorData", json!({"data": "2025-03-05"})).await;
    assert_eq!(assert_ok(&listed)["agendamentos"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_moving_onto_taken_slot_conflicts() {
    let (app, _) = test_app().await;
    for hora in ["09:00", "09:30"] {
        assert_ok(
            &call(
                &app,
                "Agenda.Criar",
                json!({"idPaciente": "P1", "data": "2025-03-06", "hora": hora}),
            )
            .await,
        );
    }
    let listed = call(&app, "Agenda.ListarPorData", json!({"data": "2025-03-06"})).await;
    let segundo = assert_ok(&listed)["agendamentos"][1]["idAgenda"].clone();

    let moved = call(
        &app,
        "Agenda.Atualizar",
        json!({"idAgenda": segundo, "hora": "09:00"}),
    )
    .await;
    assert_error(&moved, "CONFLITO_HORARIO");

    let missing = call(&app, "Agenda.Atualizar", json!({"idAgenda": "AG-nada"})).await;
    assert_error(&missing, "NOT_FOUND");
}

#[tokio::test]
async fn test_upcoming_skips_past_and_cancelled() {
    let (app, _) = test_app().await;
    for (data, hora) in [("2030-01-10", "10:00"), ("2020-01-10", "10:00"), ("2030-01-09", "15:00")] {
        assert_ok(
            &call(
                &app,
                "Agenda.Criar",
                json!({"idPaciente": "P1", "data": data, "hora": hora}),
            )
            .await,
        );
    }
    assert_ok(
        &call(
            &app,
            "Agenda.Criar",
            json!({"idPaciente": "P1", "data": "2030-01-11", "hora": "10:00", "status": "CANCELADO"}),
        )
        .await,
    );

    let upcoming = call(&app, "Agenda.ListarAFuturo", json!({"aPartirDe": "2025-01-01"})).await;
    let datas: Vec<&str> = assert_ok(&upcoming)["agendamentos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["data"].as_str().unwrap())
        .collect();
    assert_eq!(datas, vec!["2030-01-09", "2030-01-10"]);
}

#[tokio::test]
async fn test_patient_lifecycle() {
    let (app, _) = test_app().await;

    let created = call(
        &app,
        "Pacientes.CriarBasico",
        json!({"nome": "José Álvares", "telefone": "(11) 98888-7777", "documento": "111.222.333-44"}),
    )
    .await;
    let data = assert_ok(&created);
    let id = data["ID_Paciente"].as_str().unwrap().to_string();
    assert_eq!(data["idPaciente"], json!(id));
    assert_eq!(data["paciente"]["telefone1"], json!("(11) 98888-7777"));
    assert_eq!(data["paciente"]["ativo"], json!(true));

    assert_ok(&call(&app, "Pacientes.Criar", json!({"nomeCompleto": "Ana Beatriz"})).await);

    let booked = call(
        &app,
        "Agenda.Criar",
        json!({"idPaciente": id, "data": "2025-03-05", "hora": "10:00"}),
    )
    .await;
    assert_eq!(
        assert_ok(&booked)["agendamento"]["nomePaciente"],
        json!("José Álvares")
    );

    let updated = call(
        &app,
        "Pacientes.Atualizar",
        json!({"idPaciente": id, "email": "jose@example.com"}),
    )
    .await;
    assert_eq!(assert_ok(&updated)["paciente"]["nomeCompleto"], json!("José Álvares"));

    let selecao = call(&app, "Pacientes.ListarSelecao", json!({})).await;
    let nomes: Vec<&str> = assert_ok(&selecao)["pacientes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["nomeCompleto"].as_str().unwrap())
        .collect();
    assert_eq!(nomes, vec!["Ana Beatriz", "José Álvares"]);

    assert_ok(
        &call(
            &app,
            "Pacientes_AlterarStatusAtivo",
            json!({"idPaciente": id, "ativo": false}),
        )
        .await,
    );
    let selecao = call(&app, "Pacientes.ListarSelecao", json!({})).await;
    assert_eq!(assert_ok(&selecao)["pacientes"].as_array().unwrap().len(), 1);

    let fetched = call(&app, "Pacientes.ObterPorId", json!({"idPaciente": id})).await;
    assert_eq!(assert_ok(&fetched)["paciente"]["email"], json!("jose@example.com"));
    assert_eq!(assert_ok(&fetched)["paciente"]["ativo"], json!(false));

    let missing = call(&app, "Pacientes.ObterPorId", json!({"idPaciente": "PAC-x"})).await;
    assert_error(&missing, "NOT_FOUND");
}

#[tokio::test]
async fn test_reads_are_repeatable() {
    let (app, _) = test_app().await;
    assert_ok(&call(&app, "Pacientes.Criar", json!({"nomeCompleto": "Maria"})).await);
    assert_ok(
        &call(
            &app,
            "Agenda.Criar",
            json!({"idPaciente": "P1", "data": "2025-03-05", "hora": "11:00"}),
        )
        .await,
    );

    for (action, payload) in [
        ("Agenda.ListarPorData", json!({"data": "2025-03-05"})),
        ("Pacientes.ListarTodos", json!({})),
    ] {
        let first = call(&app, action, payload.clone()).await;
        let second = call(&app, action, payload).await;
        assert_eq!(first, second, "{action} should be repeatable");
    }
}

#[tokio::test]
async fn test_reports_and_prescriptions_render_html() {
    let (app, _) = test_app().await;
    let created = call(&app, "Pacientes.Criar", json!({"nomeCompleto": "Carla <Dias>"})).await;
    let id = assert_ok(&created)["idPaciente"].as_str().unwrap().to_string();

    assert_ok(
        &call(
            &app,
            "Configuracoes.Salvar",
            json!({"medicoNomeCompleto": "Dra. Ana Lima", "medicoCRM": "12345-SP", "clinicaNome": "Clínica Vida"}),
        )
        .await,
    );

    let laudo = call(
        &app,
        "Laudos.Criar",
        json!({"idPaciente": id, "titulo": "Atestado", "texto": "Apta para atividades."}),
    )
    .await;
    let id_laudo = assert_ok(&laudo)["laudo"]["idLaudo"].clone();
    let pdf = call(&app, "Laudos.GerarPdf", json!({"idLaudo": id_laudo})).await;
    let html = assert_ok(&pdf)["html"].as_str().unwrap().to_string();
    assert!(html.contains("Carla &lt;Dias&gt;"));
    assert!(html.contains("Clínica Vida"));
    assert!(html.contains("CRM 12345-SP"));

    assert_error(
        &call(&app, "Receita.Criar", json!({"idPaciente": id})).await,
        "VALIDATION_ERROR",
    );
    let receita = call(
        &app,
        "Receita.Criar",
        json!({"idPaciente": id, "textoMedicamentos": "Dipirona 500mg"}),
    )
    .await;
    let id_receita = assert_ok(&receita)["receita"]["idReceita"].clone();
    let pdf = call(&app, "Receita_GerarPdf", json!({"idReceita": id_receita})).await;
    assert!(assert_ok(&pdf)["html"].as_str().unwrap().contains("Dipirona 500mg"));

    let listed = call(&app, "Receita.ListarPorPaciente", json!({"idPaciente": id})).await;
    assert_eq!(assert_ok(&listed)["receitas"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_progress_notes_newest_first() {
    let (app, _) = test_app().await;
    for texto in ["primeira", "segunda"] {
        assert_ok(
            &call(
                &app,
                "Evolucao.Salvar",
                json!({"idPaciente": "P1", "idAgenda": "AG-1", "texto": texto}),
            )
            .await,
        );
    }
    let listed = call(&app, "Evolucao.ListarPorPaciente", json!({"idPaciente": "P1"})).await;
    let textos: Vec<&str> = assert_ok(&listed)["evolucoes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["texto"].as_str().unwrap())
        .collect();
    assert_eq!(textos, vec!["segunda", "primeira"]);

    let by_agenda = call(&app, "Evolucao.ListarPorAgenda", json!({"idAgenda": "AG-2"})).await;
    assert_eq!(assert_ok(&by_agenda)["evolucoes"], json!([]));
}

#[tokio::test]
async fn test_agenda_settings_shape_the_grid() {
    let (app, _) = test_app().await;

    let defaults = call(&app, "AgendaConfig_Obter", json!({})).await;
    assert_eq!(assert_ok(&defaults)["duracao_grade_minutos"], json!(30));

    let invalid = call(
        &app,
        "AgendaConfig_Salvar",
        json!({"hora_inicio_padrao": "12:00", "hora_fim_padrao": "09:00"}),
    )
    .await;
    assert_error(&invalid, "VALIDATION_ERROR");

    assert_ok(
        &call(
            &app,
            "AgendaConfig_Salvar",
            json!({"hora_inicio_padrao": "09:00", "hora_fim_padrao": "11:00", "duracao_grade_minutos": 60}),
        )
        .await,
    );
    let day = call(&app, "Agenda.ListSlotsOfDay", json!({"data": "2025-03-05"})).await;
    let horas: Vec<&str> = assert_ok(&day)["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["hora"].as_str().unwrap())
        .collect();
    assert_eq!(horas, vec!["09:00", "10:00"]);

    let profile = call(&app, "Configuracoes.Salvar", json!({"clinicaNome": "Sem médico"})).await;
    assert_eq!(profile["errors"][0]["details"]["campo"], json!("medicoNomeCompleto"));
}

#[tokio::test]
async fn test_medication_catalog() {
    let (app, _) = test_app().await;
    for nome in ["Paracetamol 750mg", "Amoxicilina 500mg"] {
        assert_ok(
            &call(
                &app,
                "Medicamentos.Criar",
                json!({"nomeMedicacao": nome, "posologia": "8/8h"}),
            )
            .await,
        );
    }
    let listed = call(&app, "Medicamentos.ListarTodos", json!({})).await;
    let nomes: Vec<&str> = assert_ok(&listed)["medicamentos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["nomeMedicacao"].as_str().unwrap())
        .collect();
    assert_eq!(nomes, vec!["Amoxicilina 500mg", "Paracetamol 750mg"]);
}

#[tokio::test]
async fn test_corrupt_record_is_server_error() {
    let (app, pool) = test_app().await;
    sqlx::query(
        "INSERT INTO registros (id, tipo, dados, versao, atualizado_em)
         VALUES ('PAC-corrompido', 'Paciente', 'não é json', 1, '2025-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let envelope = call(&app, "Pacientes.ListarTodos", json!({})).await;
    assert_error(&envelope, "SERVER_ERROR");
    assert_eq!(envelope["errors"][0]["message"], json!("Erro interno na API."));
    assert!(envelope["errors"][0]["details"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_bookings_for_one_slot() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("agenda.db").display()),
        max_connections: 5,
        ..Default::default()
    };
    let state = AppState::new(db::connect(&config).await.unwrap());

    let body = json!({
        "action": "Agenda.Criar",
        "payload": { "idPaciente": "P1", "dataConsulta": "2025-03-05", "horaConsulta": "08:00" }
    })
    .to_string();
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            let body = body.clone();
            tokio::spawn(async move { router::handle(&state, &body).await })
        })
        .collect();

    let mut aceitos = 0;
    for task in tasks {
        let resp = task.await.unwrap();
        if resp.success {
            aceitos += 1;
        } else {
            assert_eq!(resp.errors[0].code, "CONFLITO_HORARIO", "{:?}", resp.errors);
        }
    }
    assert_eq!(aceitos, 1);

    let dia = router::handle(
        &state,
        &json!({ "action": "Agenda.ListarPorData", "payload": { "data": "2025-03-05" } }).to_string(),
    )
    .await;
    let data = dia.data.unwrap();
    assert_eq!(data["agendamentos"].as_array().unwrap().len(), 1);
}
