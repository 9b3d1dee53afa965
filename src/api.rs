//! Records returned by the alwaysdata REST API.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A database as returned by `GET /v1/database/{id}`.
///
/// Fields missing from the response, or sent as `null`, decode to their zero
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Database identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Name of the database.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Database engine (`MYSQL`, `POSTGRESQL`, ...).
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub db_type: String,
    /// API path of the database.
    #[serde(deserialize_with = "null_as_default")]
    pub href: String,
    /// Free-form annotation.
    #[serde(deserialize_with = "null_as_default")]
    pub annotation: String,
    /// Permissions granted on the database, keyed by database user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, String>>,
    /// Installed extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeSet<String>>,
    /// Database locale.
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub locale: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
