//! Field reconciliation core for transaction negotiation authority documents.
//!
//! Pure engine crate: receives the fields an extraction step produced for
//! each document, maps them onto one canonical vocabulary, and reports which
//! fields the documents agree on. No network or file IO beyond loading
//! translation tables.

pub mod context;
pub mod field;
pub mod normalize;
pub mod reconcile;
pub mod schema;

pub use context::RequestContext;
pub use field::{CanonicalField, CanonicalFieldMap, RawFieldMap};
pub use normalize::{NormalizedValue, normalize, normalize_display};
pub use reconcile::{
    MIN_DOCUMENTS, MatchStatus, ReconcileError, ReconciliationResult, reconcile, reconcile_in,
};
pub use schema::{DocumentTemplate, FieldMapping, SchemaError, SchemaRegistry};
