//! Acceptance tests against the live alwaysdata API.
//!
//! Run with:
//!
//! ```bash
//! HEMMER_ACC=1 AD_API_KEY=... AD_DATABASE_ID=... cargo test --test acceptance
//! ```
//!
//! Without those variables every test returns early.

use hemmer_provider_alwaysdata::testing::{assert_state_attr, ProviderTester};
use hemmer_provider_alwaysdata::{AlwaysdataProvider, ProviderError, API_KEY_ENV_VAR};
use serde_json::json;

struct AccEnv {
    database_id: u64,
}

fn acc_env() -> Option<AccEnv> {
    if std::env::var_os("HEMMER_ACC").is_none() {
        eprintln!("HEMMER_ACC not set, skipping acceptance test");
        return None;
    }
    if std::env::var(API_KEY_ENV_VAR).map_or(true, |k| k.is_empty()) {
        eprintln!("{} must be set for acceptance tests", API_KEY_ENV_VAR);
        return None;
    }
    let database_id = match std::env::var("AD_DATABASE_ID").ok().and_then(|v| v.parse().ok()) {
        Some(id) => id,
        None => {
            eprintln!("AD_DATABASE_ID must be set to a database id for acceptance tests");
            return None;
        },
    };
    Some(AccEnv { database_id })
}

#[tokio::test]
async fn acc_database_data_source() {
    let Some(env) = acc_env() else { return };

    let tester = ProviderTester::new(AlwaysdataProvider::new("acc"));
    tester.configure(json!({})).await.unwrap();

    let config = json!({
        "id": env.database_id,
        "configurable_attribute": "example",
    });
    tester
        .validate_data_source_config("alwaysdata_database", config.clone())
        .await
        .unwrap();
    let state = tester
        .read_data_source("alwaysdata_database", config)
        .await
        .unwrap();

    assert_state_attr(&state, "id", &env.database_id.to_string());
    assert_state_attr(&state, "configurable_attribute", "example");
    assert!(!state["name"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn acc_database_not_found() {
    let Some(_env) = acc_env() else { return };

    let tester = ProviderTester::new(AlwaysdataProvider::new("acc"));
    tester.configure(json!({})).await.unwrap();

    let err = tester
        .read_data_source("alwaysdata_database", json!({"id": i64::MAX}))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ProviderError::NotFound(_) | ProviderError::PermissionDenied(_)
        ),
        "got {err:?}"
    );
}
