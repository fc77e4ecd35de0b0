//! HTTPS serving and fatal TLS misconfiguration.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use rpc_gateway::net::ListenerError;
use rpc_gateway::Gateway;

mod common;
use common::{path_of, self_signed, RecordingBackend};

#[tokio::test]
async fn serves_https_with_registered_certificates() {
    let (api_cert, api_key) = self_signed(&["api.localhost"]);
    let (admin_cert, admin_key) = self_signed(&["admin.localhost"]);

    let backend = RecordingBackend::replying(r#"{"secure":true}"#);
    let mut gateway = Gateway::new(0, backend.clone());
    gateway.enable_tls(path_of(&api_cert), path_of(&api_key)).unwrap();
    gateway.enable_tls(path_of(&admin_cert), path_of(&admin_key)).unwrap();
    assert!(gateway.is_tls());

    let running = gateway.start().unwrap();
    let port = running.local_addr().await.unwrap().port();

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .build()
        .unwrap();
    let res = client
        .post(format!("https://127.0.0.1:{port}/vault/read"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"secure":true}"#);
    assert_eq!(backend.calls()[0].identifier, "_vault.HTTP_read");
    running.shutdown(Duration::from_secs(1));
}

#[test]
fn empty_tls_paths_are_rejected() {
    let mut gateway = Gateway::new(0, RecordingBackend::replying("{}"));
    assert!(matches!(
        gateway.enable_tls("", "server.key"),
        Err(ListenerError::MissingTlsPath)
    ));
    assert!(matches!(
        gateway.enable_tls("server.crt", ""),
        Err(ListenerError::MissingTlsPath)
    ));
    assert!(!gateway.is_tls());
}

#[tokio::test]
async fn missing_certificate_fails_serve() {
    let mut gateway = Gateway::new(0, RecordingBackend::replying("{}"));
    gateway
        .enable_tls("/no/such/server.crt", "/no/such/server.key")
        .unwrap();

    let err = gateway.into_listener().unwrap().serve().await.unwrap_err();
    assert!(matches!(err, ListenerError::Tls { .. }));
}

#[tokio::test]
async fn missing_certificate_terminates_the_process() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config,
        r#"
[listener]
port = 0

[[listener.tls]]
cert_path = "/no/such/server.crt"
key_path = "/no/such/server.key"
"#
    )
    .unwrap();

    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_rpc-gateway"))
        .arg("--config")
        .arg(config.path())
        .env("RUST_LOG", "rpc_gateway=info")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let output = tokio::time::timeout(Duration::from_secs(30), child.wait_with_output())
        .await
        .expect("gateway did not exit")
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("fatal"), "logs: {logs}");
    assert!(!logs.contains("Gateway ready"), "logs: {logs}");
}
