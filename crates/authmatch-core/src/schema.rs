//! Translation tables from document-specific labels to canonical fields.
//!
//! Each document template labels the same logical field differently
//! (`"Company name (User name)"` on the request form, `"DE User Name"` on the
//! issued authority). [`SchemaRegistry`] holds one declarative table per
//! template, each with its own fallback values, loaded once at startup and
//! read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::field::{CanonicalField, CanonicalFieldMap, RawFieldMap};

const BUILTIN_TABLES: &str = include_str!("../tables/v1.json");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("invalid translation table: {0}")]
    InvalidTable(String),

    #[error("cannot read translation tables from {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("translation table JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One `raw label → canonical field` row of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub label: String,
    pub field: CanonicalField,
}

/// Translation table for one document template.
///
/// Several labels may target the same field (label variants across form
/// revisions); the first label in table order with a value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldMapping>,
    /// Values applied to fields still absent after mapping a document of
    /// this type.
    #[serde(default)]
    pub defaults: BTreeMap<CanonicalField, String>,
}

impl DocumentTemplate {
    /// Raw labels in table order, duplicates removed.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.fields.len());
        for mapping in &self.fields {
            if !labels.contains(&mapping.label.as_str()) {
                labels.push(&mapping.label);
            }
        }
        labels
    }

    /// Canonical fields this template can populate, in reporting order.
    pub fn targets(&self) -> Vec<CanonicalField> {
        let mut targets: Vec<CanonicalField> = self.fields.iter().map(|m| m.field).collect();
        targets.sort();
        targets.dedup();
        targets
    }
}

/// Versioned set of translation tables keyed by document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    pub version: u32,
    pub templates: BTreeMap<String, DocumentTemplate>,
}

impl SchemaRegistry {
    /// The tables compiled into the crate.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_json(BUILTIN_TABLES)
    }

    /// Parse and validate tables from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load tables from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            version = registry.version,
            templates = registry.templates.len(),
            "loaded translation tables"
        );
        Ok(registry)
    }

    /// Check structural rules that serde cannot express.
    ///
    /// - at least one template, each with at least one mapping
    /// - no blank labels or document type names
    /// - a label (compared case- and punctuation-insensitively) never targets
    ///   two different fields within one template
    /// - defaults only for fields the template maps
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.templates.is_empty() {
            return Err(SchemaError::InvalidTable("no templates defined".into()));
        }
        for (document_type, template) in &self.templates {
            if document_type.trim().is_empty() {
                return Err(SchemaError::InvalidTable("blank document type".into()));
            }
            if template.fields.is_empty() {
                return Err(SchemaError::InvalidTable(format!(
                    "template '{document_type}' has no field mappings"
                )));
            }
            let mut seen: HashMap<String, CanonicalField> = HashMap::new();
            for mapping in &template.fields {
                let key = relaxed_key(&mapping.label);
                if key.is_empty() {
                    return Err(SchemaError::InvalidTable(format!(
                        "template '{document_type}' has a blank label"
                    )));
                }
                match seen.get(&key) {
                    Some(existing) if *existing != mapping.field => {
                        return Err(SchemaError::InvalidTable(format!(
                            "template '{document_type}': label '{}' maps to both {existing} and {}",
                            mapping.label, mapping.field
                        )));
                    }
                    Some(_) => {}
                    None => {
                        seen.insert(key, mapping.field);
                    }
                }
            }
            for field in template.defaults.keys() {
                if !template.fields.iter().any(|m| m.field == *field) {
                    return Err(SchemaError::InvalidTable(format!(
                        "template '{document_type}' has a default for unmapped field {field}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn template(&self, document_type: &str) -> Result<&DocumentTemplate, SchemaError> {
        self.templates
            .get(document_type)
            .ok_or_else(|| SchemaError::UnknownDocumentType(document_type.to_string()))
    }

    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// The full canonical vocabulary reachable through any template.
    pub fn vocabulary(&self) -> Vec<CanonicalField> {
        let mut fields: Vec<CanonicalField> = self
            .templates
            .values()
            .flat_map(|t| t.fields.iter().map(|m| m.field))
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Translate one document's raw fields into canonical fields.
    ///
    /// Labels are looked up exactly first, then by a relaxed key that ignores
    /// case, repeated whitespace and a trailing colon. Raw values that are
    /// `None` or blank count as absent. Labels not in the template are
    /// ignored. Fields still absent afterwards take the template's default,
    /// if any. A document with nothing mapped gets no defaults.
    pub fn map_to_canonical(
        &self,
        raw: &RawFieldMap,
        document_type: &str,
    ) -> Result<CanonicalFieldMap, SchemaError> {
        let template = self.template(document_type)?;

        let mut relaxed: HashMap<String, &str> = HashMap::with_capacity(raw.len());
        for (label, value) in raw {
            if let Some(v) = present(value) {
                relaxed.entry(relaxed_key(label)).or_insert(v);
            }
        }

        let mut fields = CanonicalFieldMap::new();
        for mapping in &template.fields {
            if fields.contains_key(&mapping.field) {
                continue;
            }
            let value = raw
                .get(&mapping.label)
                .and_then(present)
                .or_else(|| relaxed.get(&relaxed_key(&mapping.label)).copied());
            if let Some(v) = value {
                fields.insert(mapping.field, v.to_string());
            }
        }

        let mapped = fields.len();
        if mapped > 0 {
            for (field, fallback) in &template.defaults {
                fields.entry(*field).or_insert_with(|| fallback.clone());
            }
        }

        debug!(
            document_type,
            raw = raw.len(),
            mapped,
            defaulted = fields.len() - mapped,
            "mapped raw fields to canonical"
        );
        Ok(fields)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Loose comparison key for labels: lowercase, whitespace collapsed,
/// trailing colon dropped.
fn relaxed_key(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
