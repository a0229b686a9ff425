//! Multi-document field reconciliation.
//!
//! Given the canonical fields of two or more documents, decide field by field
//! whether the documents agree, and derive an overall verdict. Disagreement
//! is a normal outcome, reported in [`ReconciliationResult::mismatched_fields`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::context::RequestContext;
use crate::field::{CanonicalField, CanonicalFieldMap};
use crate::normalize::normalize;

/// Fewest documents a reconciliation accepts.
pub const MIN_DOCUMENTS: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("reconciliation needs at least {MIN_DOCUMENTS} documents, got {provided}")]
    InsufficientInputs { provided: usize },
}

/// Overall verdict across all considered fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Every considered field agrees.
    CompleteMatch,
    /// Some fields agree, some do not.
    PartialMatch,
    /// No field agrees, or nothing could be compared.
    NoMatch,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompleteMatch => "complete_match",
            Self::PartialMatch => "partial_match",
            Self::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict plus per-field diff.
///
/// `matching_fields` and `mismatched_fields` never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub status: MatchStatus,
    /// Field → the first document's original value.
    pub matching_fields: BTreeMap<CanonicalField, String>,
    /// Field → every present original value, in document order.
    pub mismatched_fields: BTreeMap<CanonicalField, Vec<String>>,
}

impl ReconciliationResult {
    /// Number of fields that were compared.
    pub fn considered(&self) -> usize {
        self.matching_fields.len() + self.mismatched_fields.len()
    }

    pub fn is_complete_match(&self) -> bool {
        self.status == MatchStatus::CompleteMatch
    }

    /// One-line description for logs and terminal output.
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} fields match",
            self.status,
            self.matching_fields.len(),
            self.considered()
        )
    }
}

/// Reconcile the canonical fields of `maps`, in document order.
///
/// A field is compared only when at least two documents provide a value for
/// it; a field seen on a single document is left out of both outputs.
/// Compared fields match when every present value normalises identically.
pub fn reconcile(maps: &[CanonicalFieldMap]) -> Result<ReconciliationResult, ReconcileError> {
    if maps.len() < MIN_DOCUMENTS {
        return Err(ReconcileError::InsufficientInputs {
            provided: maps.len(),
        });
    }

    let mut matching_fields = BTreeMap::new();
    let mut mismatched_fields = BTreeMap::new();

    for field in CanonicalField::ALL {
        let values: Vec<&String> = maps.iter().filter_map(|m| m.get(&field)).collect();
        if values.len() < MIN_DOCUMENTS {
            continue;
        }

        let first = normalize(values[0]);
        if values[1..].iter().all(|v| normalize(v) == first) {
            matching_fields.insert(field, values[0].clone());
        } else {
            mismatched_fields.insert(field, values.into_iter().cloned().collect());
        }
    }

    let status = if matching_fields.is_empty() {
        MatchStatus::NoMatch
    } else if mismatched_fields.is_empty() {
        MatchStatus::CompleteMatch
    } else {
        MatchStatus::PartialMatch
    };

    Ok(ReconciliationResult {
        status,
        matching_fields,
        mismatched_fields,
    })
}

/// [`reconcile`] with the outcome recorded against the request.
pub fn reconcile_in(
    ctx: &RequestContext,
    maps: &[CanonicalFieldMap],
) -> Result<ReconciliationResult, ReconcileError> {
    let result = reconcile(maps)?;
    info!(
        request_id = %ctx.request_id,
        documents = maps.len(),
        status = %result.status,
        matching = result.matching_fields.len(),
        mismatched = result.mismatched_fields.len(),
        "reconciled documents"
    );
    Ok(result)
}
