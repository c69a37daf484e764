//! Workbook export model.
//!
//! The document-model collaborator parses the workbook container and hands
//! the engine a JSON export of its data sources and fields. This module owns
//! the serde shape of that export and nothing else; identity assignment and
//! classification happen in [`crate::identity`].
//!
//! Optional attributes default to empty values so that sparse exports load
//! without ceremony.

use crate::core::LineageError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Top level of a workbook export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWorkbook {
    /// Data sources in document order
    #[serde(default)]
    pub datasources: Vec<RawDataSource>,
}

/// A data source and its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataSource {
    /// Internal name, e.g. `federated.0abc` or `Parameters`
    pub name: String,
    /// Display caption; empty when the source was never renamed
    #[serde(default)]
    pub caption: String,
    /// Fields in document order
    #[serde(default)]
    pub fields: Vec<RawField>,
}

/// A single field as exported by the document model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    /// Field reference, normally already bracketed (`[Profit]`)
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Raw calculation text, empty for plain fields
    #[serde(default, deserialize_with = "null_as_empty")]
    pub calculation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "bool_or_text")]
    pub hidden: bool,
    /// Names of the worksheets using this field directly
    #[serde(default)]
    pub worksheets: Vec<String>,
}

impl RawWorkbook {
    /// Parse an export from JSON text.
    ///
    /// `origin` only labels the error.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, LineageError> {
        serde_json::from_str(text).map_err(|e| LineageError::InputParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Total number of field rows across all sources.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.datasources.iter().map(|ds| ds.fields.len()).sum()
    }
}

/// Wrap a reference in brackets unless it already is.
#[must_use]
pub fn bracketed(name: &str) -> String {
    if name.starts_with('[') && name.ends_with(']') {
        name.to_string()
    } else {
        format!("[{name}]")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn bool_or_text<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid hidden flag '{other}'"))),
        },
    }
}
