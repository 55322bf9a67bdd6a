//! Attack harness: the same payloads against both servers
//!
//! Each payload tries to leave a mark on the filesystem (a file created, a
//! directory removed). The hardened server must reject the port and leave no
//! mark; the vulnerable server must leave one. These tests spawn real
//! processes through `/bin/sh` and only run on unix.

#![cfg(unix)]

use std::path::Path;

use mcp_common::{CallToolResult, EmbeddableMcp};
use portcheck_mcp::{Config, PortCheckMcpServer, VulnerablePortCheckMcpServer};
use rmcp::model::RawContent;
use serde_json::json;
use tempfile::TempDir;

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn secure() -> PortCheckMcpServer {
    PortCheckMcpServer::with_config(Config::default()).unwrap()
}

fn vulnerable() -> VulnerablePortCheckMcpServer {
    VulnerablePortCheckMcpServer::with_config(Config::default())
}

async fn check_port(server: &dyn EmbeddableMcp, port: &str) -> CallToolResult {
    server
        .call_tool("which-app-on-port", json!({ "port": port }))
        .await
        .unwrap()
}

fn assert_rejected_port(result: &CallToolResult) {
    assert_eq!(result.is_error, Some(true));
    assert!(
        text_of(result).contains("Invalid port number"),
        "unexpected response: {}",
        text_of(result)
    );
}

/// Payloads from the demo, each expected to create `marker` if executed
fn marker_payloads(marker: &Path) -> Vec<(&'static str, String)> {
    let m = marker.display();
    vec![
        ("type coercion", format!("8080; touch {}; #", m)),
        (
            "backdoor",
            format!(
                "8080; echo \"#!/bin/sh\" > {m} && echo \"echo backdoor\" >> {m} && chmod +x {m}; #"
            ),
        ),
        ("information gathering", format!("8080; whoami > {}; #", m)),
        ("logical and", format!("8080 && touch {}", m)),
        ("logical or", format!("8080 || touch {}", m)),
        ("pipe", format!("8080 | touch {}", m)),
        ("subshell", format!("8080; $(touch {}); #", m)),
        ("backticks", format!("8080; `touch {}`; #", m)),
        ("redirection", format!("8080; echo test > {}; #", m)),
        ("newline", format!("8080\ntouch {}", m)),
    ]
}

#[tokio::test]
async fn secure_rejects_type_coercion_payload() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("pwned");
    let payload = format!("8080; touch {}; #", marker.display());

    let result = check_port(&secure(), &payload).await;

    assert_rejected_port(&result);
    assert!(!marker.exists());
}

#[tokio::test]
async fn vulnerable_executes_type_coercion_payload() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("pwned");
    let payload = format!("8080; touch {}; #", marker.display());

    check_port(&vulnerable(), &payload).await;

    assert!(marker.exists(), "negative control did not execute the payload");
}

fn payload_for(name: &str, marker: &Path) -> String {
    marker_payloads(marker)
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, payload)| payload)
        .unwrap()
}

const ALL_PAYLOADS: &[&str] = &[
    "type coercion",
    "backdoor",
    "information gathering",
    "logical and",
    "logical or",
    "pipe",
    "subshell",
    "backticks",
    "redirection",
    "newline",
];

#[tokio::test]
async fn secure_rejects_every_payload() {
    for name in ALL_PAYLOADS {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("mark");

        let result = check_port(&secure(), &payload_for(name, &marker)).await;

        assert_rejected_port(&result);
        assert!(!marker.exists(), "{} left a mark", name);
    }
}

#[tokio::test]
async fn vulnerable_executes_separator_payloads() {
    // `&&` and `||` depend on lsof's exit status, so only unconditional
    // separators are asserted here.
    for name in ALL_PAYLOADS
        .iter()
        .filter(|n| !matches!(**n, "logical and" | "logical or"))
    {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("mark");

        check_port(&vulnerable(), &payload_for(name, &marker)).await;

        assert!(marker.exists(), "{} did not execute on the negative control", name);
    }
}

#[tokio::test]
async fn chain_exploit_contrast() {
    // Stage 1 output is forged to look like a PID followed by a command.
    let secure_dir = TempDir::new().unwrap();
    let victim = secure_dir.path().join("victim");
    std::fs::create_dir(&victim).unwrap();
    let payload = format!("8080; echo \"123; rm -rf {}; #\" #", victim.display());

    let result = check_port(&secure(), &payload).await;
    assert_rejected_port(&result);
    assert!(victim.exists());

    let vulnerable_dir = TempDir::new().unwrap();
    let victim = vulnerable_dir.path().join("victim");
    std::fs::create_dir(&victim).unwrap();
    let payload = format!("8080; echo \"123; rm -rf {}; #\" #", victim.display());

    check_port(&vulnerable(), &payload).await;
    assert!(!victim.exists(), "negative control did not run the chained command");
}

#[tokio::test]
async fn secure_rejects_invalid_inputs() {
    let server = secure();
    for raw in [
        json!("abc"),
        json!("-1"),
        json!("0"),
        json!("99999"),
        json!("8080.5"),
        json!(""),
        json!("null"),
        json!("undefined"),
        json!(null),
    ] {
        let result = server
            .call_tool("which-app-on-port", json!({ "port": raw }))
            .await
            .unwrap();
        assert_rejected_port(&result);
    }

    let missing = server
        .call_tool("which-app-on-port", json!({}))
        .await
        .unwrap();
    assert_rejected_port(&missing);
}

#[tokio::test]
async fn secure_valid_port_reaches_lookup() {
    // Whether lsof exists or anything listens is up to the host; the port
    // itself must get past validation either way.
    let result = check_port(&secure(), "8080").await;
    let text = text_of(&result);

    assert!(!text.contains("Invalid port number"), "{}", text);
    assert!(
        text.starts_with("No application found running on port 8080")
            || text.starts_with("Application running on port 8080")
            || text.starts_with("Error checking port 8080")
            || text == "Error: Invalid process ID returned from system.",
        "{}",
        text
    );
}

#[tokio::test]
async fn system_info_contrast() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("pwned");
    let command = format!("uname; touch {}", marker.display());

    let err = secure()
        .call_tool("system-info", json!({ "command": command }))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("invalid parameters"));
    assert!(!marker.exists());

    vulnerable()
        .call_tool("system-info", json!({ "command": command }))
        .await
        .unwrap();
    assert!(marker.exists());
}
