//! Integration tests for the admin endpoints

use rag_client::{RagClient, RagError};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_documents() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "filename": "civil-code.pdf",
                "type": "PDF",
                "chunks": 120,
                "total_chars": 250000,
                "page_count": 88
            }
        ])))
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    let docs = client.list_documents().await.expect("documents");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].filename, "civil-code.pdf");
    assert_eq!(docs[0].kind, "PDF");
    assert_eq!(docs[0].chunks, 120);
}

#[tokio::test]
async fn test_delete_document_encodes_filename() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/documents/labour%20proclamation.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    client
        .delete_document("labour proclamation.pdf")
        .await
        .expect("delete");
}

#[tokio::test]
async fn test_vector_search_posts_query_and_k() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/vector/search"))
        .and(body_json(serde_json::json!({"query": "ውል", "k": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"content": "አንቀጽ 1678", "score": 0.92, "metadata": {"source": "civil-code.pdf"}}
        ])))
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    let results = client.vector_search("ውል", 5).await.expect("search");

    assert_eq!(results.len(), 1);
    assert!(results[0].score > 0.9);
}

#[tokio::test]
async fn test_vector_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/vector/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_vectors": 4200,
            "index_size": "12.4 MB",
            "model_info": "all-MiniLM-L6-v2"
        })))
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    let stats = client.vector_stats().await.expect("stats");
    assert_eq!(stats.total_vectors, 4200);
}

#[tokio::test]
async fn test_audit_logs_passes_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit/logs"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    let logs = client.audit_logs(50).await.expect("logs");
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_admin_error_status_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/vector/clear"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = RagClient::with_base_url(mock_server.uri());
    match client.clear_vector_store().await {
        Err(RagError::Status(status)) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected status error, got {other:?}"),
    }
}
