use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{read_to_string, write};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use tempfile::tempdir;

fn base_command(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("tunnel-link").expect("Binary exists");
    cmd.current_dir(dir)
        .env("TUNNEL_LINK_OWNER", "octo")
        .env("TUNNEL_LINK_REPO", "pwa")
        .env("TUNNEL_LINK_TOKEN", "ghp_test")
        .env("TUNNEL_LINK_LOG_FILE", dir.join("tunnel.log"))
        .env("TUNNEL_LINK_MANIFEST_FILE", dir.join("manifest.json"))
        .env("TUNNEL_LINK_CREDENTIAL_FILE", dir.join("gh_token"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_tunnel_log_fails_with_guidance() {
    let dir = tempdir().unwrap();
    base_command(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cloudflared tunnel --url http://localhost:3000"));
    assert!(!dir.path().join("manifest.json").exists());
}

#[test]
fn unreachable_api_fails_after_local_update() {
    let dir = tempdir().unwrap();
    write(
        dir.path().join("tunnel.log"),
        "INF |  https://quiet-river-42.trycloudflare.com  |\n",
    )
    .unwrap();

    base_command(dir.path())
        .env("TUNNEL_LINK_API_URL", "http://127.0.0.1:1")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Tunnel URL detected in log: https://quiet-river-42.trycloudflare.com",
        ))
        .stdout(predicate::str::contains("manifest.json updated."))
        .stderr(predicate::str::contains("request failed"));

    let local = read_to_string(dir.path().join("manifest.json")).unwrap();
    assert!(local.contains("\"app_url\": \"https://quiet-river-42.trycloudflare.com\""));
}

/// Answers each incoming request with the next canned `(status line, body)` and
/// returns the request lines it saw.
fn canned_server(replies: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status_line, reply) in replies {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let header_end = loop {
                let n = socket.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed before headers were complete");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed before body was complete");
                buf.extend_from_slice(&chunk[..n]);
            }
            seen.push(head.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            socket.write_all(response.as_bytes()).unwrap();
        }
        seen
    });
    (format!("http://{addr}"), handle)
}

#[test]
fn rejected_publish_reports_error_but_exits_zero() {
    let dir = tempdir().unwrap();
    write(
        dir.path().join("tunnel.log"),
        "INF |  https://quiet-river-42.trycloudflare.com  |\n",
    )
    .unwrap();
    let (api_url, server) = canned_server(vec![
        ("404 Not Found", r#"{"message":"Not Found"}"#),
        ("422 Unprocessable Entity", r#"{"message":"Invalid request"}"#),
    ]);

    base_command(dir.path())
        .env("TUNNEL_LINK_API_URL", &api_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote manifest updated successfully").not())
        .stderr(predicate::str::contains(
            "remote update failed with status 422: {\"message\":\"Invalid request\"}",
        ));

    let seen = server.join().unwrap();
    assert!(seen[0].starts_with("GET /repos/octo/pwa/contents/manifest.json"));
    assert!(seen[1].starts_with("PUT /repos/octo/pwa/contents/manifest.json"));
    let local = read_to_string(dir.path().join("manifest.json")).unwrap();
    assert!(local.contains("https://quiet-river-42.trycloudflare.com"));
}

#[test]
fn missing_repository_config_fails() {
    let dir = tempdir().unwrap();
    base_command(dir.path())
        .env_remove("TUNNEL_LINK_REPO")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TUNNEL_LINK_REPO"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use tunnel_link::cli::{run, Cli};

    let cli = Cli {
        config: Some(std::path::PathBuf::from("does-not-exist.yaml")),
    };
    let res = run(cli).await;
    assert!(res.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
