use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::endpoints;
use crate::types::AppState;

/// Build the API router.
pub fn api_router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/compare-documents",
            post(endpoints::compare::compare_documents),
        )
        .route(
            "/compare-documents/",
            post(endpoints::compare::compare_documents),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use authmatch_ai::ComparePipeline;
    use authmatch_ai::testing::ScriptedOracle;
    use authmatch_core::SchemaRegistry;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const BOUNDARY: &str = "authmatch-test-boundary";

    enum Part<'a> {
        Text(&'a str),
        File(&'a [u8]),
    }

    fn multipart_request(parts: &[(&str, Part<'_>)]) -> Request<Body> {
        multipart_request_to("/compare-documents", parts)
    }

    fn multipart_request_to(uri: &str, parts: &[(&str, Part<'_>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, part) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(value) => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                ),
                Part::File(bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.jpg\"\r\n\
                             Content-Type: image/jpeg\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn scripted() -> ScriptedOracle {
        ScriptedOracle::new()
            .with_fields(
                "tna_request",
                [("Company name (User name)", "XYZ Corp"), ("MEID", "123456")],
            )
            .with_fields(
                "tna_authority",
                [("DE User Name", "XYZ Corp."), ("DE User ID", "123456")],
            )
    }

    fn router_with(oracle: Arc<ScriptedOracle>) -> Router {
        let pipeline = ComparePipeline::new(oracle, Arc::new(SchemaRegistry::builtin().unwrap()));
        api_router(AppState::new(pipeline))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn request_and_authority() -> Vec<(&'static str, Part<'static>)> {
        vec![
            ("document_type", Part::Text("tna_request")),
            ("file", Part::File(JPEG)),
            ("document_type", Part::Text("tna_authority")),
            ("file", Part::File(JPEG)),
        ]
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let app = router_with(Arc::new(scripted()));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn compare_returns_result_and_extractions() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request(&request_and_authority()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["request_id"].is_string());
        assert_eq!(json["result"]["status"], "complete_match");
        assert_eq!(json["result"]["matching_fields"]["user_name"], "XYZ Corp");
        assert_eq!(json["result"]["matching_fields"]["user_id"], "123456");
        assert_eq!(json["result"]["mismatched_fields"], serde_json::json!({}));
        assert_eq!(
            json["per_document_extractions"][1]["document_type"],
            "tna_authority"
        );
        assert_eq!(
            json["per_document_extractions"][1]["fields"]["user_name"],
            "XYZ Corp."
        );
    }

    #[tokio::test]
    async fn numbered_part_names_are_accepted() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request(&[
                ("file1", Part::File(JPEG)),
                ("file2", Part::File(JPEG)),
                ("document_type1", Part::Text("tna_request")),
                ("document_type2", Part::Text("tna_authority")),
                ("notes", Part::Text("ignored")),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"]["status"], "complete_match");
    }

    #[tokio::test]
    async fn trailing_slash_route_compares() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request_to(
                "/compare-documents/",
                &request_and_authority(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"]["status"], "complete_match");
    }

    #[tokio::test]
    async fn numbered_parts_pair_by_number_not_arrival() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request(&[
                ("document_type2", Part::Text("tna_authority")),
                ("document_type1", Part::Text("tna_request")),
                ("file1", Part::File(JPEG)),
                ("file2", Part::File(JPEG)),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["per_document_extractions"][0]["document_type"],
            "tna_request"
        );
        assert_eq!(
            json["per_document_extractions"][1]["document_type"],
            "tna_authority"
        );
    }

    #[tokio::test]
    async fn bad_numbered_parts_are_a_bad_request() {
        let cases: [&[(&str, Part<'_>)]; 3] = [
            // file2 has no type
            &[
                ("document_type1", Part::Text("tna_request")),
                ("file1", Part::File(JPEG)),
                ("file2", Part::File(JPEG)),
            ],
            // document_type1 twice
            &[
                ("document_type1", Part::Text("tna_request")),
                ("document_type1", Part::Text("tna_authority")),
                ("file1", Part::File(JPEG)),
            ],
            // mixed styles
            &[
                ("document_type1", Part::Text("tna_request")),
                ("file1", Part::File(JPEG)),
                ("document_type", Part::Text("tna_authority")),
                ("file", Part::File(JPEG)),
            ],
        ];
        for parts in cases {
            let oracle = Arc::new(scripted());
            let response = router_with(oracle.clone())
                .oneshot(multipart_request(parts))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
            assert_eq!(oracle.calls(), 0);
        }
    }

    #[tokio::test]
    async fn unpaired_parts_are_a_bad_request() {
        let oracle = Arc::new(scripted());
        let app = router_with(oracle.clone());
        let response = app
            .oneshot(multipart_request(&[
                ("document_type", Part::Text("tna_request")),
                ("file", Part::File(JPEG)),
                ("file", Part::File(JPEG)),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn single_document_is_insufficient() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request(&[
                ("document_type", Part::Text("tna_request")),
                ("file", Part::File(JPEG)),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INSUFFICIENT_INPUTS");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected_before_extraction() {
        let oracle = Arc::new(scripted());
        let app = router_with(oracle.clone());
        let response = app
            .oneshot(multipart_request(&[
                ("document_type", Part::Text("tna_request")),
                ("file", Part::File(JPEG)),
                ("document_type", Part::Text("tna_authority")),
                ("file", Part::File(b"plain text, not a scan")),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_IMAGE");
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_document_type_is_rejected() {
        let app = router_with(Arc::new(scripted()));
        let response = app
            .oneshot(multipart_request(&[
                ("document_type", Part::Text("tna_request")),
                ("file", Part::File(JPEG)),
                ("document_type", Part::Text("driver_licence")),
                ("file", Part::File(JPEG)),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "UNKNOWN_DOCUMENT_TYPE"
        );
    }

    #[tokio::test]
    async fn oracle_failure_is_bad_gateway() {
        let app = router_with(Arc::new(scripted().with_failure("tna_authority", 500)));
        let response = app
            .oneshot(multipart_request(&request_and_authority()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn oracle_timeout_is_gateway_timeout() {
        let pipeline = ComparePipeline::new(
            Arc::new(scripted().with_hang("tna_request")),
            Arc::new(SchemaRegistry::builtin().unwrap()),
        )
        .with_timeout(Duration::from_millis(50));
        let app = api_router(AppState::new(pipeline));
        let response = app
            .oneshot(multipart_request(&request_and_authority()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["error"]["code"], "EXTRACTION_TIMEOUT");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let oracle = Arc::new(scripted());
        let pipeline = ComparePipeline::new(
            oracle.clone(),
            Arc::new(SchemaRegistry::builtin().unwrap()),
        );
        let app = api_router(AppState::new(pipeline).with_body_limit(64));
        let mut large = JPEG.to_vec();
        large.resize(512, 0);
        let response = app
            .oneshot(multipart_request(&[
                ("document_type", Part::Text("tna_request")),
                ("file", Part::File(&large)),
                ("document_type", Part::Text("tna_authority")),
                ("file", Part::File(&large)),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(oracle.calls(), 0);
    }
}
