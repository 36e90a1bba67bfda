//! End-to-end tests for the failure normalization pipeline: arbitrary
//! backend failures in, one non-empty message plus exactly one toast and one
//! alert out.

use std::sync::{Arc, Mutex};

use serde_json::json;

use error_notify_rs::{
    classify, DiagnosticSink, FailureHandler, FailureInput, FailureRecord, HandlerConfig,
    MemorySink, NotificationEvent, ResponsePayload, DEFAULT_MESSAGE, DEFAULT_TITLE,
};

#[derive(Default)]
struct RecordingDiagnostics {
    records: Mutex<Vec<FailureRecord>>,
}

impl RecordingDiagnostics {
    fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn record(&self, record: &FailureRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

struct Pipeline {
    handler: FailureHandler,
    toast: Arc<MemorySink>,
    alert: Arc<MemorySink>,
    diagnostics: Arc<RecordingDiagnostics>,
}

fn pipeline() -> Pipeline {
    let toast = Arc::new(MemorySink::new());
    let alert = Arc::new(MemorySink::new());
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let handler = FailureHandler::with_sinks(
        HandlerConfig::default(),
        Box::new(toast.clone()),
        Box::new(alert.clone()),
        Box::new(diagnostics.clone()),
    );
    Pipeline {
        handler,
        toast,
        alert,
        diagnostics,
    }
}

fn server_failure(data: serde_json::Value) -> FailureInput {
    FailureInput::from_message("Request failed with status code 400")
        .with_response(ResponsePayload::new().with_status(400).with_data(data))
}

#[test]
fn every_input_yields_a_nonempty_message_and_both_notifications() {
    let inputs = vec![
        FailureInput::new(),
        FailureInput::from_message("Network Error"),
        FailureInput::from_message(""),
        FailureInput::new().with_response(ResponsePayload::new()),
        server_failure(json!(null)),
        server_failure(json!(3.5)),
        server_failure(json!([])),
        server_failure(json!({})),
        server_failure(json!("Erro de validação")),
        server_failure(json!({ "detail": "Sem estoque" })),
        server_failure(json!({ "mensagem": null })),
        server_failure(json!({ "nome": [] })),
        server_failure(json!({ "nome": { "aninhado": true } })),
        FailureInput::from_value(json!({ "totally": ["unexpected", 1] })),
        FailureInput::from_value(json!(17)),
    ];

    let p = pipeline();
    let total = inputs.len();

    for input in inputs {
        let message = p.handler.handle(&input);
        assert!(!message.trim().is_empty(), "empty message for {:?}", input);
    }

    assert_eq!(p.toast.len(), total);
    assert_eq!(p.alert.len(), total);
}

#[test]
fn detail_beats_mensagem_beats_error_beats_field_validation() {
    let p = pipeline();

    let all = server_failure(json!({
        "nome": ["Campo obrigatório"],
        "error": "erro generico",
        "mensagem": "mensagem generica",
        "detail": "detalhe especifico"
    }));
    assert_eq!(p.handler.handle(&all), "detalhe especifico");

    let no_detail = server_failure(json!({
        "error": "erro generico",
        "mensagem": "mensagem generica"
    }));
    assert_eq!(p.handler.handle(&no_detail), "mensagem generica");

    let no_mensagem = server_failure(json!({
        "nome": ["Campo obrigatório"],
        "error": "erro generico"
    }));
    assert_eq!(p.handler.handle(&no_mensagem), "erro generico");
}

#[test]
fn field_validation_surfaces_first_error_of_first_field() {
    let p = pipeline();

    let list = server_failure(json!({ "nome": ["Campo obrigatório", "Muito curto"] }));
    assert_eq!(p.handler.handle(&list), "nome: Campo obrigatório");

    let scalar = server_failure(json!({ "nome": "Campo obrigatório" }));
    assert_eq!(p.handler.handle(&scalar), "nome: Campo obrigatório");

    let two_fields = server_failure(json!({
        "quantidade": ["Valor inválido"],
        "nome": ["Campo obrigatório"]
    }));
    assert_eq!(p.handler.handle(&two_fields), "quantidade: Valor inválido");
}

#[test]
fn string_body_passes_through_verbatim() {
    let p = pipeline();
    let input = server_failure(json!("Erro de validação"));
    assert_eq!(p.handler.handle(&input), "Erro de validação");
}

#[test]
fn client_side_failures_surface_the_caller_message() {
    let p = pipeline();
    let input = FailureInput::from_message("Network Error");
    assert_eq!(p.handler.handle(&input), "Network Error");
}

#[test]
fn empty_input_converges_to_the_default_message_and_title() {
    let p = pipeline();
    let message = p.handler.handle(&FailureInput::new());

    assert_eq!(message, DEFAULT_MESSAGE);
    assert_eq!(
        p.toast.events(),
        vec![NotificationEvent::new(DEFAULT_TITLE, DEFAULT_MESSAGE)]
    );
}

#[test]
fn both_channels_carry_the_identical_event() {
    let p = pipeline();
    p.handler
        .handle_with_title(&server_failure(json!({ "detail": "Sem estoque" })), "Estoque");

    assert_eq!(p.toast.len(), 1);
    assert_eq!(p.toast.events(), p.alert.events());
    assert_eq!(
        p.toast.events()[0],
        NotificationEvent::new("Estoque", "Sem estoque")
    );
}

#[test]
fn classification_is_stable_across_repeated_calls() {
    let input = server_failure(json!({ "nome": ["Campo obrigatório"] }));
    assert_eq!(classify(&input), classify(&input));

    let p = pipeline();
    assert_eq!(p.handler.handle(&input), p.handler.handle(&input));
}

#[test]
fn diagnostics_are_redacted_but_the_user_message_is_not() {
    let p = pipeline();
    let input = server_failure(json!({
        "detail": "token=abc123 expirado",
        "senha": "secreta"
    }));

    // the user sees the extracted message exactly as delivered
    assert_eq!(p.handler.handle(&input), "token=abc123 expirado");

    // the diagnostic snapshot does not
    let records = p.diagnostics.records();
    assert_eq!(records.len(), 1);
    let body = records[0].body.as_ref().unwrap();
    assert_eq!(body["senha"], json!("[REDACTED]"));
    assert!(body["detail"].as_str().unwrap().contains("[REDACTED]"));
}

#[test]
fn configured_fallback_and_title_are_honored() {
    let toast = Arc::new(MemorySink::new());
    let alert = Arc::new(MemorySink::new());
    let handler = FailureHandler::with_sinks(
        HandlerConfig {
            default_title: "Atenção".to_string(),
            fallback_message: "Algo deu errado.".to_string(),
            ..HandlerConfig::default()
        },
        Box::new(toast.clone()),
        Box::new(alert.clone()),
        Box::new(RecordingDiagnostics::default()),
    );

    assert_eq!(handler.handle(&FailureInput::new()), "Algo deu errado.");
    assert_eq!(toast.events()[0].title, "Atenção");
}

#[test_log::test]
fn tracing_backed_handler_runs_headless() {
    // default wiring (tracing sinks + tracing diagnostics) must work with no
    // UI runtime attached
    let handler = FailureHandler::new(HandlerConfig::default());
    let message = handler.handle(&server_failure(json!({ "detail": "Sem estoque" })));
    assert_eq!(message, "Sem estoque");
}
