//! Shared package records.
//!
//! A share package starts life in legacy form, carrying whole datasets under
//! `data`. Once migrated it carries one or more diff envelopes instead and its
//! `meta.format` is [`PATCH_FORMAT`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::envelope::DiffEnvelope;
use crate::error::TypeError;

/// `meta.format` value of a package rewritten as change sets.
pub const PATCH_FORMAT: &str = "patch";

/// One entry of the shared package index.
///
/// Only `id` is required. Optional properties that are missing, `null` or of
/// an unexpected type read as `None` and are left out when serialized, so a
/// record never gains keys it was not read with. Unknown properties are
/// preserved through `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub base_data_version: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl SummaryRecord {
    pub fn is_patch_form(&self) -> bool {
        self.format.as_deref() == Some(PATCH_FORMAT)
    }
}

/// A package holding whole datasets keyed by share key (`cards`, `mapEvents`, …).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyPackage {
    #[serde(default)]
    pub meta: Map<String, Value>,
    pub data: Map<String, Value>,
}

/// A package holding change sets against the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchPackage {
    pub meta: Map<String, Value>,
    #[serde(flatten)]
    pub body: PatchBody,
}

/// One envelope for a single-kind package, a list for several kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PatchBody {
    #[serde(rename = "patch")]
    Single(DiffEnvelope),
    #[serde(rename = "patches")]
    Multi(Vec<DiffEnvelope>),
}

impl PatchBody {
    /// Build the body from envelopes, collapsing a single one.
    pub fn from_envelopes(mut envelopes: Vec<DiffEnvelope>) -> Self {
        if envelopes.len() == 1 {
            if let Some(only) = envelopes.pop() {
                return PatchBody::Single(only);
            }
        }
        PatchBody::Multi(envelopes)
    }

    pub fn envelopes(&self) -> &[DiffEnvelope] {
        match self {
            PatchBody::Single(env) => std::slice::from_ref(env),
            PatchBody::Multi(envs) => envs,
        }
    }
}

/// Whatever a snapshot store holds for one package.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredSnapshot {
    Legacy(LegacyPackage),
    Patch(PatchPackage),
}

impl StoredSnapshot {
    /// Classify a raw package document.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        let is_patch = value
            .get("meta")
            .and_then(|m| m.get("format"))
            .and_then(Value::as_str)
            == Some(PATCH_FORMAT);

        if is_patch {
            return serde_json::from_value(value)
                .map(StoredSnapshot::Patch)
                .map_err(|e| TypeError::Serialization(e.to_string()));
        }

        match value.get("data") {
            Some(Value::Object(_)) => serde_json::from_value(value)
                .map(StoredSnapshot::Legacy)
                .map_err(|e| TypeError::Serialization(e.to_string())),
            _ => Err(TypeError::Serialization(
                "package has neither a data object nor patch format".into(),
            )),
        }
    }

    pub fn is_patch(&self) -> bool {
        matches!(self, StoredSnapshot::Patch(_))
    }
}
