//! Integration tests for the annotation client against a synthetic server.
//!
//! Each test binds a local TCP listener, serves exactly one scripted
//! exchange, and checks both what the client sent and what it parsed.

use std::time::Duration;

use annotation_gateway::client::{AnnotationStoreClient, ClientError, TcpConnector};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves one connection: reads `request_lines` lines, then writes `response`
/// and closes. Resolves to the lines received.
async fn serve_once(request_lines: usize, response: &'static str) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut received = Vec::new();
        for _ in 0..request_lines {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            received.push(line.trim_end_matches(['\r', '\n']).to_string());
        }

        write_half.write_all(response.as_bytes()).await.unwrap();
        write_half.shutdown().await.unwrap();
        received
    });

    (address, handle)
}

fn client(address: String) -> AnnotationStoreClient<TcpConnector> {
    AnnotationStoreClient::new(TcpConnector::new(address, Duration::from_secs(5)))
}

// =============================================================================
// Type listing
// =============================================================================

#[tokio::test]
async fn lists_types_from_server() {
    let (address, server) =
        serve_once(1, "GET_ANNOTATION_TYPES\r\nSentence\r\nParagraph\r\n").await;

    let types = client(address).list_annotation_types().await.unwrap();
    assert_eq!(types, vec!["Sentence", "Paragraph"]);

    let received = server.await.unwrap();
    assert_eq!(received, vec!["GET_ANNOTATION_TYPES"]);
}

#[tokio::test]
async fn type_listing_error_line_is_verbatim() {
    let (address, server) = serve_once(1, "Server is shutting down\n").await;

    let err = client(address).list_annotation_types().await.unwrap_err();
    assert!(matches!(err, ClientError::Server { .. }));
    assert_eq!(err.to_string(), "Server is shutting down");
    server.await.unwrap();
}

// =============================================================================
// Annotation fetching
// =============================================================================

#[tokio::test]
async fn fetches_annotations_across_blocks() {
    let response = "GET_ANNOTATIONS\n\
                    \"value\",\"rank\",\"sourceDocId\"\n\
                    \"Apis mellifera\",\"species\",\"D1\"\n\
                    \n\
                    \"value\",\"start index\",\"page\"\n\
                    \"Bombus terrestris\",\"4\",\"12\"\n\
                    \"\",\"9\",\"13\"\n\
                    \n";
    let (address, server) = serve_once(3, response).await;

    let annotations = client(address)
        .fetch_annotations("taxonomicName", None)
        .await
        .unwrap();

    assert_eq!(annotations.len(), 2);
    assert!(annotations
        .iter()
        .all(|a| a.annotation_type() == "taxonomicName"));

    let first = &annotations[0];
    assert_eq!(first.value(), "Apis mellifera");
    assert_eq!(first.attribute("rank"), Some("species"));
    assert_eq!(first.attribute("sourceDocId"), Some("D1"));

    let second = &annotations[1];
    assert_eq!(second.size(), 2);
    assert_eq!(second.attribute("start index"), None);
    assert_eq!(second.attribute("page"), Some("12"));

    let received = server.await.unwrap();
    assert_eq!(received, vec!["GET_ANNOTATIONS", "taxonomicName", ""]);
}

#[tokio::test]
async fn bad_type_fails_with_server_message() {
    let (address, server) = serve_once(3, "BAD_TYPE\n").await;

    let err = client(address)
        .fetch_annotations("noSuchType", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "BAD_TYPE");
    server.await.unwrap();
}

#[tokio::test]
async fn predicate_is_transmitted() {
    let (address, server) = serve_once(3, "GET_ANNOTATIONS\n").await;

    let annotations = client(address)
        .fetch_annotations("taxonomicName", Some("[@rank = 'genus']"))
        .await
        .unwrap();
    assert!(annotations.is_empty());

    let received = server.await.unwrap();
    assert_eq!(received[2], "[@rank = 'genus']");
}

#[tokio::test]
async fn each_call_uses_a_fresh_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut line = String::new();
            BufReader::new(&mut stream).read_line(&mut line).await.unwrap();
            stream
                .write_all(b"GET_ANNOTATION_TYPES\nSentence\n")
                .await
                .unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    let client = client(address);
    assert_eq!(client.list_annotation_types().await.unwrap(), vec!["Sentence"]);
    assert_eq!(client.list_annotation_types().await.unwrap(), vec!["Sentence"]);
    server.await.unwrap();
}
