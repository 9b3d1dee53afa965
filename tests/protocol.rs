//! End-to-end: host client -> gRPC server -> provider -> mocked alwaysdata API.

use std::time::Duration;

use hemmer_provider_alwaysdata::generated::{
    self, diagnostic::Severity, provider_client::ProviderClient,
};
use hemmer_provider_alwaysdata::{serve_with_shutdown, AlwaysdataProvider, ServeOptions};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn configure_and_read_database_over_grpc() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/database/7"))
        .and(basic_auth("grpc-key", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "name": "blog",
            "type": "POSTGRESQL",
            "href": "/v1/database/7/",
            "annotation": "",
            "permissions": {"blog": "FULL"},
            "extensions": ["unaccent"],
            "locale": "en_US.UTF-8"
        })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/database/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&api)
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(
        AlwaysdataProvider::new("test").with_env_api_key(None),
        listener,
        ServeOptions::new().with_shutdown_timeout(Duration::from_secs(5)),
        async {
            let _ = stop_rx.await;
        },
    ));

    let mut client = ProviderClient::connect(format!("http://{}", addr))
        .await
        .unwrap();

    let configured = client
        .configure(generated::ConfigureRequest {
            config: serde_json::to_vec(&json!({"endpoint": api.uri(), "apikey": "grpc-key"}))
                .unwrap(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(configured.diagnostics.is_empty());

    let validated = client
        .validate_data_source_config(generated::ValidateDataSourceConfigRequest {
            data_source_type: "alwaysdata_database".to_string(),
            config: serde_json::to_vec(&json!({"id": 0})).unwrap(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(validated.diagnostics.len(), 1);
    assert_eq!(validated.diagnostics[0].attribute, "id");
    assert_eq!(validated.diagnostics[0].severity, Severity::Error as i32);

    let read = client
        .read_data_source(generated::ReadDataSourceRequest {
            data_source_type: "alwaysdata_database".to_string(),
            config: serde_json::to_vec(&json!({"id": 7})).unwrap(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(read.diagnostics.is_empty());
    let state: Value = serde_json::from_slice(&read.state).unwrap();
    assert_eq!(state["id"], 7);
    assert_eq!(state["name"], "blog");
    assert_eq!(state["type"], "POSTGRESQL");
    assert_eq!(state["permissions"], json!({"blog": "FULL"}));
    assert_eq!(state["extensions"], json!(["unaccent"]));
    assert!(state["configurable_attribute"].is_null());

    let missing = client
        .read_data_source(generated::ReadDataSourceRequest {
            data_source_type: "alwaysdata_database".to_string(),
            config: serde_json::to_vec(&json!({"id": 8})).unwrap(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(missing.state.is_empty());
    assert!(missing.diagnostics[0]
        .summary
        .contains("Unable to read database"));

    drop(client);
    let _ = stop.send(());
    server.await.unwrap().unwrap();
}
