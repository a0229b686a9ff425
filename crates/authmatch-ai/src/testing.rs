//! Scripted extraction oracle for pipeline and API tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use authmatch_core::RawFieldMap;

use crate::error::OracleError;
use crate::oracle::{ExtractionOracle, OracleRequest};

enum Script {
    Fields(RawFieldMap),
    Fail(u16),
    Hang,
}

/// Oracle that answers from a per-document-type script.
///
/// Unscripted document types yield an empty field map.
#[derive(Default)]
pub struct ScriptedOracle {
    scripts: HashMap<String, Script>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<'a>(
        mut self,
        document_type: &str,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let map = fields
            .into_iter()
            .map(|(label, value)| (label.to_string(), Some(value.to_string())))
            .collect();
        self.scripts
            .insert(document_type.to_string(), Script::Fields(map));
        self
    }

    /// Answer this document type with a non-success status.
    pub fn with_failure(mut self, document_type: &str, status: u16) -> Self {
        self.scripts
            .insert(document_type.to_string(), Script::Fail(status));
        self
    }

    /// Never answer this document type.
    pub fn with_hang(mut self, document_type: &str) -> Self {
        self.scripts.insert(document_type.to_string(), Script::Hang);
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most calls that were running at the same moment.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExtractionOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(&self, request: OracleRequest<'_>) -> Result<RawFieldMap, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.scripts.get(request.document_type) {
            Some(Script::Fields(fields)) => Ok(fields.clone()),
            Some(Script::Fail(status)) => Err(OracleError::Status {
                status: *status,
                body: "scripted failure".to_string(),
            }),
            Some(Script::Hang) => std::future::pending().await,
            None => Ok(RawFieldMap::new()),
        }
    }
}
