//! Tool server protocol over in-memory streams.

mod common;

use common::FakeOcr;
use docmistral::mcp::{self, METHOD_NOT_FOUND};
use docmistral::{Converter, ConverterConfig, DocumentTools};
use serde_json::{json, Value};
use std::sync::Arc;

fn tools_with_fake() -> DocumentTools {
    let config = ConverterConfig::builder()
        .service(Arc::new(FakeOcr::default()))
        .build()
        .unwrap();
    DocumentTools::new(Converter::new(config).unwrap())
}

async fn roundtrip(tools: &DocumentTools, messages: &[Value]) -> Vec<Value> {
    common::init_test_logging();
    let mut input = Vec::new();
    for m in messages {
        input.extend(serde_json::to_vec(m).unwrap());
        input.push(b'\n');
    }
    let mut output = Vec::new();
    mcp::serve(tools, &input[..], &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

fn text_of(reply: &Value) -> &str {
    reply["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn handshake_then_list_tools() {
    let replies = roundtrip(
        &tools_with_fake(),
        &[
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        ],
    )
    .await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["result"]["capabilities"], json!({ "tools": {} }));
    let tools = replies[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["process_document", "get_supported_formats"]);
}

#[tokio::test]
async fn base64_upload_is_converted() {
    // "%PDF" in base64
    let replies = roundtrip(
        &tools_with_fake(),
        &[call(
            7,
            "process_document",
            json!({ "base64_content": "JVBERg==", "file_name": "upload", "mime_type": "application/pdf" }),
        )],
    )
    .await;

    assert_eq!(replies[0]["id"], json!(7));
    assert_eq!(replies[0]["result"]["isError"], json!(false));
    assert_eq!(
        text_of(&replies[0]),
        "Document processed successfully:\n\n<!-- Page 1 -->\nA\n\n<!-- Page 2 -->\nB"
    );
}

#[tokio::test]
async fn failures_are_error_blocks_not_protocol_errors() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, b"plain").unwrap();

    let replies = roundtrip(
        &tools_with_fake(),
        &[
            call(1, "process_document", json!({ "file_path": "/missing/file.pdf" })),
            call(2, "process_document", json!({ "file_path": txt.to_string_lossy() })),
            call(3, "process_document", json!({ "base64_content": "JVBERg==" })),
            call(4, "translate", json!({})),
        ],
    )
    .await;

    assert_eq!(replies.len(), 4);
    for reply in &replies {
        assert!(reply.get("error").is_none(), "{reply}");
        assert_eq!(reply["result"]["isError"], json!(true));
    }
    assert_eq!(text_of(&replies[0]), "File not found: /missing/file.pdf");
    assert!(text_of(&replies[1]).starts_with("Processing failed: Unsupported file format"));
    assert_eq!(
        text_of(&replies[2]),
        "Either file_path or (base64_content + file_name) is required"
    );
    assert_eq!(text_of(&replies[3]), "Unknown tool: translate");
}

#[tokio::test]
async fn unconfigured_server_still_lists_formats() {
    let tools = DocumentTools::new(Converter::new(ConverterConfig::default()).unwrap());
    let replies = roundtrip(
        &tools,
        &[
            call(1, "get_supported_formats", json!({})),
            call(2, "process_document", json!({ "base64_content": "JVBERg==", "file_name": "a.pdf" })),
            json!({ "jsonrpc": "2.0", "id": 3, "method": "prompts/list" }),
        ],
    )
    .await;

    assert!(text_of(&replies[0]).contains("Page limit: 1,000 pages per document"));
    assert_eq!(replies[1]["result"]["isError"], json!(true));
    assert!(text_of(&replies[1]).contains("not configured"));
    assert_eq!(replies[2]["error"]["code"], json!(METHOD_NOT_FOUND));
}

#[tokio::test]
async fn line_wrapped_base64_upload_is_converted() {
    // "%PDF-1.4" split across CRLF-wrapped lines
    let replies = roundtrip(
        &tools_with_fake(),
        &[call(
            1,
            "process_document",
            json!({ "base64_content": "JVBE\r\nRi0x\r\nLjQ=\r\n", "file_name": "wrapped.pdf" }),
        )],
    )
    .await;

    assert_eq!(replies[0]["result"]["isError"], json!(false), "{}", replies[0]);
    assert!(text_of(&replies[0]).starts_with("Document processed successfully:"));
}
