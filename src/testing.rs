//! Testing utilities.
//!
//! `ProviderTester` drives a `ProviderService` directly, without spinning up
//! the gRPC server, and turns error diagnostics into `Err` values so tests can
//! use `?` and `unwrap` on them.
//!
//! # Example
//!
//! ```ignore
//! use hemmer_provider_alwaysdata::testing::{assert_state_attr, ProviderTester};
//! use hemmer_provider_alwaysdata::AlwaysdataProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn reads_database() {
//!     let tester = ProviderTester::new(AlwaysdataProvider::new("test"));
//!     tester.configure(json!({"apikey": "key"})).await.unwrap();
//!
//!     let state = tester
//!         .read_data_source("alwaysdata_database", json!({"id": 42}))
//!         .await
//!         .unwrap();
//!     assert_state_attr(&state, "id", "42");
//! }
//! ```

use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::server::ProviderService;
use serde_json::Value;

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate provider configuration.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    let has_errors = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error));

    assert!(has_errors, "Expected at least one error, but got none");
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

/// Assert that `state[attr]` renders as `expected`.
///
/// Strings compare by content, every other value by its JSON text, so
/// `assert_state_attr(&state, "id", "42")` matches the number `42`.
///
/// # Panics
///
/// Panics if the attribute is missing or holds a different value.
pub fn assert_state_attr(state: &Value, attr: &str, expected: &str) {
    let value = state
        .get(attr)
        .unwrap_or_else(|| panic!("Expected attribute '{}' in state {}", attr, state));

    let actual = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    assert_eq!(
        actual, expected,
        "Attribute '{}' is {}, expected {}",
        attr, actual, expected
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;

    struct EchoProvider;

    #[async_trait::async_trait]
    impl ProviderService for EchoProvider {
        fn type_name(&self) -> &str {
            "echo"
        }

        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new()
                .with_provider_config(
                    Schema::v0().with_attribute("token", Attribute::optional_string()),
                )
                .with_data_source(
                    "echo_value",
                    Schema::v0()
                        .with_attribute("id", Attribute::required_int64())
                        .with_attribute("name", Attribute::computed_string()),
                )
        }

        async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            if config.get("token").is_some() {
                Ok(vec![Diagnostic::warning("token is ignored")])
            } else {
                Ok(vec![Diagnostic::error("token is required").with_attribute("token")])
            }
        }

        async fn read_data_source(
            &self,
            data_source_type: &str,
            config: Value,
        ) -> Result<Value, ProviderError> {
            if data_source_type != "echo_value" {
                return Err(ProviderError::UnknownResource(data_source_type.to_string()));
            }
            Ok(json!({"id": config["id"], "name": "echoed"}))
        }
    }

    #[test]
    fn test_tester_metadata_from_schema() {
        let tester = ProviderTester::new(EchoProvider);
        assert_eq!(tester.data_source_types(), vec!["echo_value"]);
        assert!(tester.resource_types().is_empty());
        assert!(tester.schema().provider.attributes.contains_key("token"));
    }

    #[test]
    fn test_tester_configure_warnings_pass() {
        let tester = ProviderTester::new(EchoProvider);
        tokio_test::block_on(tester.configure(json!({"token": "t"}))).unwrap();
    }

    #[tokio::test]
    async fn test_tester_configure_errors_fail() {
        let tester = ProviderTester::new(EchoProvider);
        match tester.configure(json!({})).await {
            Err(TestError::Diagnostics(diags)) => {
                assert_eq!(diags.len(), 1);
                assert_error_contains(&diags, "token is required");
            },
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tester_default_trait_methods() {
        let tester = ProviderTester::new(EchoProvider);
        tester.validate_provider_config(json!({})).await.unwrap();
        tester
            .validate_data_source_config("echo_value", json!({}))
            .await
            .unwrap();
        tester.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_tester_read_data_source() {
        let tester = ProviderTester::new(EchoProvider);
        let state = tester
            .read_data_source("echo_value", json!({"id": 7}))
            .await
            .unwrap();
        assert_state_attr(&state, "id", "7");
        assert_state_attr(&state, "name", "echoed");

        assert!(tester
            .read_data_source("echo_other", json!({}))
            .await
            .is_err());
    }

    #[test]
    #[should_panic(expected = "Expected attribute 'missing'")]
    fn test_assert_state_attr_missing() {
        assert_state_attr(&json!({"id": 1}), "missing", "1");
    }

    #[test]
    #[should_panic(expected = "Attribute 'id' is 1, expected 2")]
    fn test_assert_state_attr_mismatch() {
        assert_state_attr(&json!({"id": 1}), "id", "2");
    }

    #[test]
    fn test_assert_no_errors() {
        let diagnostics = vec![Diagnostic::warning("Just a warning")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        let diagnostics = vec![Diagnostic::error("An error")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    fn test_assert_has_errors() {
        let diagnostics = vec![Diagnostic::error("An error")];
        assert_has_errors(&diagnostics);
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("First error").with_attribute("field1"),
            Diagnostic::error("Second error").with_detail("More info"),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("First error"));
        assert!(display.contains("Second error"));
        assert!(display.contains("field1"));
        assert!(display.contains("More info"));
    }
}
