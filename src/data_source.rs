//! The `alwaysdata_database` data source.
//!
//! Looks a database up by identifier and exposes its attributes to the host.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::api::Database;
use crate::client::Alwaysdata;
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Schema};
use crate::types::PROVIDER_TYPE_NAME;
use crate::validation::{as_int64, validate};

/// State of an `alwaysdata_database` data source, as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
    /// Free attribute passed through from configuration.
    pub configurable_attribute: Option<String>,
    /// Database identifier.
    pub id: i64,
    /// Name of the database.
    pub name: String,
    /// Type of the database.
    #[serde(rename = "type")]
    pub db_type: String,
    /// Hypertext path of the database.
    pub href: String,
    /// Annotation.
    pub annotation: String,
    /// Database locale.
    pub locale: String,
    /// Permissions keyed by database user; null when the API sent none.
    pub permissions: Option<BTreeMap<String, String>>,
    /// Installed extensions; null when the API sent none.
    pub extensions: Option<BTreeSet<String>>,
}

impl DatabaseModel {
    /// Map an API record into data source state.
    pub fn from_record(
        configurable_attribute: Option<String>,
        db: Database,
    ) -> Result<Self, ProviderError> {
        let id = i64::try_from(db.id).map_err(|_| {
            ProviderError::Api(format!("database id {} does not fit in an int64", db.id))
        })?;

        Ok(Self {
            configurable_attribute,
            id,
            name: db.name,
            db_type: db.db_type,
            href: db.href,
            annotation: db.annotation,
            locale: db.locale,
            permissions: db.permissions,
            extensions: db.extensions,
        })
    }
}

/// Configuration accepted by the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DatabaseConfig {
    configurable_attribute: Option<String>,
    id: u64,
}

/// The `alwaysdata_database` data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseDataSource;

impl DatabaseDataSource {
    /// Host type name (`alwaysdata_database`).
    pub fn type_name() -> String {
        format!("{}_database", PROVIDER_TYPE_NAME)
    }

    /// Schema of the data source.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Database data source")
            .with_attribute(
                "configurable_attribute",
                Attribute::optional_string().with_description("Database configurable attribute"),
            )
            .with_attribute(
                "id",
                Attribute::required_int64().with_description("Database identifier"),
            )
            .with_attribute(
                "name",
                Attribute::computed_string().with_description("Name of the database"),
            )
            .with_attribute(
                "type",
                Attribute::computed_string().with_description("Type of the database"),
            )
            .with_attribute(
                "href",
                Attribute::computed_string().with_description("Hypertext path of the database"),
            )
            .with_attribute(
                "annotation",
                Attribute::computed_string().with_description("String of annotation"),
            )
            .with_attribute(
                "locale",
                Attribute::computed_string().with_description("The database locale"),
            )
            .with_attribute(
                "permissions",
                Attribute::new(
                    AttributeType::map(AttributeType::String),
                    AttributeFlags::computed(),
                )
                .with_description("Permissions granted on the database, keyed by user"),
            )
            .with_attribute(
                "extensions",
                Attribute::new(
                    AttributeType::set(AttributeType::String),
                    AttributeFlags::computed(),
                )
                .with_description("Extensions installed in the database"),
            )
    }

    /// Validate a data source configuration.
    pub fn validate(config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validate(&Self::schema(), config);
        if diagnostics.iter().any(|d| d.attribute.as_deref() == Some("id")) {
            return diagnostics;
        }

        if let Some(id) = config.get("id").and_then(as_int64) {
            if id < 1 {
                diagnostics.push(
                    Diagnostic::error("id must be a positive integer")
                        .with_detail(format!("Got {}", id))
                        .with_attribute("id"),
                );
            }
        }
        diagnostics
    }

    /// Fetch the database named by `config` and return the resulting state.
    pub async fn read(client: &Alwaysdata, config: &Value) -> Result<Value, ProviderError> {
        let config = parse_config(config)?;
        debug!(id = config.id, "reading database");

        let db = client.get_database(config.id).await?;
        let model = DatabaseModel::from_record(config.configurable_attribute, db)?;

        trace!(id = model.id, "read a data source");
        Ok(serde_json::to_value(model)?)
    }
}

fn parse_config(config: &Value) -> Result<DatabaseConfig, ProviderError> {
    let diagnostics = DatabaseDataSource::validate(config);
    if let Some(first) = diagnostics.iter().find(|d| d.is_error()) {
        let detail = first.detail.as_deref().unwrap_or_default();
        return Err(ProviderError::Validation(
            format!("{} {}", first.summary, detail).trim_end().to_string(),
        ));
    }

    // Both lookups succeed once validation passed.
    let id = config
        .get("id")
        .and_then(as_int64)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| ProviderError::Validation("id must be a positive integer".to_string()))?;
    let configurable_attribute = config
        .get("configurable_attribute")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(DatabaseConfig {
        configurable_attribute,
        id,
    })
}
