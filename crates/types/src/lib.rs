//! Shared data model for the Octopus Deploy lookup client.
//!
//! Every type here is a read-only projection of JSON returned by the server.
//! The server speaks PascalCase (`Id`, `Name`, `IsDisabled`, ...); the serde
//! attributes below keep that wire casing while exposing idiomatic field names.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named deployment stage such as `Dev` or `Prod`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// A registered deployment target (tentacle, SSH target, ...).
///
/// Only the fields the lookups filter on are typed. Everything else the
/// server sends is kept in [`Machine::extra`] in response order so callers
/// asking for the full record get it back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Machine {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbprint: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub environment_ids: Vec<String>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Machine {
    /// True when the machine carries `role` in its role set.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|candidate| candidate == role)
    }

    /// True when the machine is scoped to the environment with `environment_id`.
    pub fn in_environment(&self, environment_id: &str) -> bool {
        self.environment_ids.iter().any(|candidate| candidate == environment_id)
    }

    /// Thumbprints are hex digests, so case is not significant.
    pub fn thumbprint_matches(&self, thumbprint: &str) -> bool {
        !thumbprint.is_empty() && self.thumbprint.eq_ignore_ascii_case(thumbprint)
    }

    /// True when the machine address contains `<name>.`, e.g. `web01` matches
    /// `https://web01.corp.example:10933/`.
    pub fn address_mentions(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let needle = format!("{}.", name.to_ascii_lowercase());
        self.uri.to_ascii_lowercase().contains(&needle)
    }
}

/// A deployable application definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Slug", default)]
    pub slug: String,
}

/// The two list shapes the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// The body is a JSON array of items.
    BareArray,
    /// The body is an object whose `Items` field holds the array.
    ItemsEnvelope,
}

/// A decoded list response, tagged with the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Envelope {
        #[serde(rename = "Items")]
        items: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Envelope { items } => items,
        }
    }

    pub fn shape(&self) -> ResponseShape {
        match self {
            ListResponse::Bare(_) => ResponseShape::BareArray,
            ListResponse::Envelope { .. } => ResponseShape::ItemsEnvelope,
        }
    }
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Decode `value` strictly as the shape an endpoint is documented to return.
    ///
    /// A bare array handed to an envelope endpoint (or the reverse) is an
    /// error rather than a silent success.
    pub fn decode(value: Value, expected: ResponseShape) -> Result<Self, serde_json::Error> {
        match expected {
            ResponseShape::BareArray => serde_json::from_value::<Vec<T>>(value).map(ListResponse::Bare),
            ResponseShape::ItemsEnvelope => {
                #[derive(Deserialize)]
                struct Envelope<I> {
                    #[serde(rename = "Items")]
                    items: Vec<I>,
                }
                serde_json::from_value::<Envelope<T>>(value).map(|envelope| ListResponse::Envelope { items: envelope.items })
            }
        }
    }
}
