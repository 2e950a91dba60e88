//! Integration tests for template discovery, lookup and instantiation.

use std::sync::Arc;

use circlib_catalog::{
    Arguments, CatalogError, CatalogOptions, CircuitService, DiscoveryOutcome, InMemoryApi,
    Instantiation, TemplateCatalog, TemplateDefinition,
};
use serde_json::{Value, json};

fn qft() -> Value {
    json!({
        "name": "QFT",
        "description": "Quantum Fourier transform",
        "arguments": [
            {"name": "num_qubits", "description": "Width", "type": "int", "required": true}
        ],
        "families": ["arithmetic", "textbook"]
    })
}

fn bell() -> Value {
    json!({
        "name": "Bell",
        "description": "Bell pair",
        "arguments": [],
        "families": ["textbook"],
        "num_qubits": 2
    })
}

fn api() -> Arc<InMemoryApi> {
    Arc::new(InMemoryApi::new().with_template(qft()).with_template(bell()))
}

#[tokio::test]
async fn test_end_to_end_qft() {
    let mut catalog = TemplateCatalog::new(api());

    let err = catalog
        .instantiate("QFT", &Arguments::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::BadArguments { .. }));
    assert!(err.to_string().contains("num_qubits"));

    let result = catalog
        .instantiate("QFT", &Arguments::new().with("num_qubits", 3))
        .await
        .unwrap();
    let program = result.program().expect("server-materialized program");
    assert!(program.as_str().contains("QFT(num_qubits=3)"));

    let gates = program.remote_gates().unwrap();
    assert_eq!(gates.len(), 1);
    assert_eq!(gates[0].name(), "QFT");
    assert_eq!(gates[0].num_qubits(), 3);
}

#[tokio::test]
async fn test_discovery_runs_once() {
    let api = api();
    let mut catalog = TemplateCatalog::new(api.clone());

    let first = catalog.templates().await;
    let second = catalog.templates().await;

    assert_eq!(api.list_calls(), 1);
    assert_eq!(first.len(), 2);
    assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));
    assert_eq!(catalog.identifiers().await, ["qft", "bell"]);
}

#[tokio::test]
async fn test_refresh_drops_added_template() {
    let api = api();
    let mut catalog = TemplateCatalog::new(api.clone());
    catalog.discover().await;

    let stale = TemplateDefinition::from_record(
        api.clone(),
        CatalogOptions::default(),
        &json!({"name": "bad_circuit"}),
    )
    .unwrap();
    catalog.add(stale);
    assert!(catalog.template("bad_circuit").await.is_ok());

    catalog.refresh().await;

    let err = catalog.template("bad_circuit").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
    assert_eq!(api.list_calls(), 2);
}

#[tokio::test]
async fn test_malformed_records_are_skipped() {
    let api = Arc::new(
        InMemoryApi::new()
            .with_template(qft())
            .with_template(json!(42))
            .with_template(json!({"description": "no name"}))
            .with_template(bell()),
    );
    let mut catalog = TemplateCatalog::new(api);

    let outcome = catalog.discover().await;
    assert_eq!(
        outcome,
        DiscoveryOutcome::Discovered {
            instances: 2,
            skipped: 2
        }
    );
}

#[tokio::test]
async fn test_colliding_names_get_distinct_identifiers() {
    let api = Arc::new(
        InMemoryApi::new()
            .with_template(json!({"name": "QFT"}))
            .with_template(json!({"name": "qft"})),
    );
    let mut catalog = TemplateCatalog::new(api);

    assert_eq!(catalog.identifiers().await, ["qft", "qft_"]);
    assert_eq!(catalog.get("qft").await.unwrap().name(), "QFT");
    assert_eq!(catalog.get("qft_").await.unwrap().name(), "qft");

    let err = catalog.get("grover").await.unwrap_err();
    assert!(matches!(err, CatalogError::AttributeNotFound { .. }));
}

#[tokio::test]
async fn test_validation_reports_both_categories() {
    let mut catalog = TemplateCatalog::new(api());
    let args = Arguments::new().with("width", 3).with("depth", 1);

    let err = catalog.instantiate("QFT", &args).await.unwrap_err();
    assert_eq!(err.bad_argument_names(), ["width", "depth", "num_qubits"]);
    let message = err.to_string();
    assert!(message.contains("width,depth are not valid parameters for QFT"));
    assert!(message.contains("Required parameters num_qubits are missing."));
}

#[tokio::test]
async fn test_format_mismatch_is_protocol_error() {
    let api = Arc::new(
        InMemoryApi::new()
            .with_template(qft())
            .with_response_format("QASM3"),
    );
    let mut catalog = TemplateCatalog::new(api);

    let err = catalog
        .instantiate("QFT", &Arguments::new().with("num_qubits", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Protocol(_)));
    assert_eq!(
        err.to_string(),
        "Invalid output format QASM3 received from the server."
    );
}

#[tokio::test]
async fn test_single_fetch_before_discovery() {
    let api = api();
    let mut catalog = TemplateCatalog::new(api.clone());

    let qft = catalog.template("QFT").await.unwrap();
    let again = catalog.template("QFT").await.unwrap();
    assert!(Arc::ptr_eq(&qft, &again));
    assert_eq!(api.get_calls(), 1);
    assert_eq!(api.list_calls(), 0);
    assert!(!catalog.registry().is_initialized());

    let err = catalog.template("phantom_circuit").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let api = api();
    api.set_unreachable(true);
    let mut catalog = TemplateCatalog::new(api.clone());

    assert!(catalog.discover().await.failure().is_some());
    assert!(catalog.templates().await.is_empty());
    assert!(!catalog.registry().is_initialized());

    let err = catalog.template("QFT").await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport(_)));

    api.set_unreachable(false);
    assert_eq!(catalog.templates().await.len(), 2);
    let err = catalog.template("phantom_circuit").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_remote_template_builds_gate_locally() {
    let api = Arc::new(InMemoryApi::new().with_template(json!({
        "name": "Grover",
        "remote": true,
        "arguments": [
            {"name": "num_qubits", "type": "int", "required": true},
            {"name": "marked", "type": "int_array", "required": false}
        ]
    })));
    let mut catalog = TemplateCatalog::new(api.clone());

    let args = Arguments::new().with("num_qubits", 2).with("marked", json!([1, 2]));
    let result = catalog.instantiate("Grover", &args).await.unwrap();

    let Instantiation::Remote(gate) = result else {
        panic!("expected a remote gate");
    };
    assert_eq!(gate.num_qubits(), 2);
    assert_eq!(gate.params(), ["num_qubits=2", "marked=[1,2]"]);
    assert_eq!(api.materialize_calls(), 0);
}

#[tokio::test]
async fn test_families() {
    let api = Arc::new(
        InMemoryApi::new()
            .with_template(qft())
            .with_template(bell())
            .with_group(json!({
                "name": "textbook",
                "description": "Textbook circuits",
                "members": ["QFT", "Bell", "Deutsch"]
            })),
    );
    let mut service = CircuitService::new(api);

    let textbook = service.templates.templates_in_families(&["textbook"]).await;
    assert_eq!(textbook.len(), 2);
    let both = service
        .templates
        .templates_in_families(&["textbook", "arithmetic"])
        .await;
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].name(), "QFT");

    let family = service.families.family("textbook").await.unwrap();
    assert_eq!(family.members.len(), 3);

    let members = service.family_templates("textbook").await.unwrap();
    let names: Vec<&str> = members.iter().map(|t| t.name()).collect();
    assert_eq!(names, ["QFT", "Bell"]);

    let err = service.families.family("oracles").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn test_assemble_materialized_programs() {
    let mut service = CircuitService::new(api());
    let args = Arguments::new().with("num_qubits", 2);

    let first = service.instantiate("QFT", &args).await.unwrap();
    let second = service.instantiate("QFT", &args).await.unwrap();
    let programs: Vec<_> = [first, second]
        .iter()
        .filter_map(|i| i.program().cloned())
        .collect();

    let payload = service.assemble(&programs).unwrap();
    assert_eq!(payload.programs.len(), 2);
    assert_eq!(payload.remote_gates, ["QFT"]);

    let err = service.assemble(&[]).unwrap_err();
    assert!(matches!(err, CatalogError::Qasm(_)));
}
