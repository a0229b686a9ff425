//! `POST /compare-documents`

use std::collections::BTreeMap;

use authmatch_ai::{Comparison, DocumentInput};
use authmatch_core::RequestContext;
use axum::Json;
use axum::extract::{Multipart, State};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::types::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    DocumentType,
    File,
}

/// `document_type`, `document_type1`, `file`, `file2`, ...
///
/// Returns the kind and the numeric suffix, if any.
fn classify(name: &str) -> Option<(PartKind, Option<&str>)> {
    let numbered = |prefix: &str| {
        name.strip_prefix(prefix)
            .filter(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
            .map(|rest| (!rest.is_empty()).then_some(rest))
    };
    if let Some(suffix) = numbered("document_type") {
        Some((PartKind::DocumentType, suffix))
    } else {
        numbered("file").map(|suffix| (PartKind::File, suffix))
    }
}

#[derive(Default)]
struct Numbered {
    document_type: Option<String>,
    file: Option<Vec<u8>>,
}

/// Read the uploaded documents.
///
/// Numbered parts (`document_type2`, `file2`) pair by number and come back
/// in number order. Unnumbered parts pair by order of appearance. A request
/// uses one style or the other. Parts with other names are ignored.
async fn read_documents(mut multipart: Multipart) -> Result<Vec<DocumentInput>, ApiError> {
    let mut types = Vec::new();
    let mut files = Vec::new();
    let mut numbered: BTreeMap<u32, Numbered> = BTreeMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let Some((kind, suffix)) = classify(&name) else {
            debug!(part = %name, "ignoring multipart part");
            continue;
        };
        match suffix {
            None => match kind {
                PartKind::DocumentType => types.push(field.text().await?.trim().to_string()),
                PartKind::File => files.push(field.bytes().await?.to_vec()),
            },
            Some(digits) => {
                let index: u32 = digits
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("part '{name}' has a bad number")))?;
                let slot = numbered.entry(index).or_default();
                let duplicate = match kind {
                    PartKind::DocumentType => slot
                        .document_type
                        .replace(field.text().await?.trim().to_string())
                        .is_some(),
                    PartKind::File => slot.file.replace(field.bytes().await?.to_vec()).is_some(),
                };
                if duplicate {
                    return Err(ApiError::BadRequest(format!("part '{name}' sent twice")));
                }
            }
        }
    }

    if !numbered.is_empty() {
        if !types.is_empty() || !files.is_empty() {
            return Err(ApiError::BadRequest(
                "numbered and unnumbered document parts cannot be mixed".into(),
            ));
        }
        return numbered
            .into_iter()
            .map(|(index, part)| match (part.document_type, part.file) {
                (Some(document_type), Some(bytes)) => Ok(DocumentInput::new(document_type, bytes)),
                (None, _) => Err(ApiError::BadRequest(format!(
                    "file{index} has no document_type{index}"
                ))),
                (_, None) => Err(ApiError::BadRequest(format!(
                    "document_type{index} has no file{index}"
                ))),
            })
            .collect();
    }

    if types.len() != files.len() {
        return Err(ApiError::BadRequest(format!(
            "got {} files but {} document types",
            files.len(),
            types.len()
        )));
    }

    Ok(types
        .into_iter()
        .zip(files)
        .map(|(document_type, bytes)| DocumentInput::new(document_type, bytes))
        .collect())
}

pub async fn compare_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Comparison>, ApiError> {
    let ctx = RequestContext::new();
    let inputs = read_documents(multipart).await?;
    info!(
        request_id = %ctx.request_id,
        documents = inputs.len(),
        "comparison requested"
    );

    let comparison = state.pipeline.compare(&ctx, inputs).await?;
    Ok(Json(comparison))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_names() {
        assert_eq!(classify("document_type"), Some((PartKind::DocumentType, None)));
        assert_eq!(
            classify("document_type2"),
            Some((PartKind::DocumentType, Some("2")))
        );
        assert_eq!(classify("file"), Some((PartKind::File, None)));
        assert_eq!(classify("file1"), Some((PartKind::File, Some("1"))));
        assert_eq!(classify("filename"), None);
        assert_eq!(classify("document_types"), None);
        assert_eq!(classify("notes"), None);
    }
}
