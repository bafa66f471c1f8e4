//! Drives the real server over TCP with hand-written HTTP/1.1 requests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tabula::store::{FilePersistence, TableStore};
use tabula::{Server, users};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start(db: &Path) -> Self {
        let store = TableStore::open(Arc::new(FilePersistence::new(db)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::from_listener(listener);
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        let (shutdown, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(users::routes(store), async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        let server = Self { addr, shutdown, handle };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&self) {
        for _ in 0..100 {
            if self.send("GET", "/readyz", None).await.status == 200 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("server never became ready");
    }

    async fn send(&self, method: &str, target: &str, body: Option<&str>) -> Reply {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        let body = body.unwrap_or("");
        let request = format!(
            "{method} {target} HTTP/1.1\r\n\
             host: localhost\r\n\
             connection: close\r\n\
             content-type: application/json\r\n\
             content-length: {}\r\n\
             \r\n\
             {body}",
            body.len()
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        parse_reply(&String::from_utf8(raw).unwrap())
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.unwrap();
    }
}

fn parse_reply(raw: &str) -> Reply {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");
    let status: u16 = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
    Reply { status, headers, body: body.to_owned() }
}

/// Polls the document on disk until `check` accepts it.
async fn wait_for_document(db: &Path, check: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..200 {
        if let Ok(bytes) = tokio::fs::read(db).await {
            if let Ok(doc) = serde_json::from_slice::<Value>(&bytes) {
                if check(&doc) {
                    return doc;
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("document at {} never reached the expected state", db.display());
}

#[test]
fn configured_address_is_reported_before_binding() {
    let addr: SocketAddr = "127.0.0.1:3333".parse().unwrap();
    assert_eq!(Server::bind(addr).local_addr().unwrap(), addr);
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(&dir.path().join("db.json")).await;

    let created = server
        .send("POST", "/users", Some(r#"{"name":"Ana","email":"ana@x.com"}"#))
        .await;
    assert_eq!(created.status, 201);
    assert!(created.body.is_empty());
    let location = created.header("location").unwrap().to_owned();
    let id = location.strip_prefix("/users/").unwrap().to_owned();

    let listed = server.send("GET", "/users?search=ana", None).await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.header("content-type"), Some("application/json"));
    assert_eq!(
        listed.json(),
        json!([{ "id": id, "name": "Ana", "email": "ana@x.com" }])
    );

    let updated = server
        .send("PUT", &location, Some(r#"{"name":"Ana B","email":"ana@y.com"}"#))
        .await;
    assert_eq!(updated.status, 204);
    let fetched = server.send("GET", &location, None).await;
    assert_eq!(fetched.json()["email"], "ana@y.com");

    let deleted = server.send("DELETE", &location, None).await;
    assert_eq!(deleted.status, 204);

    let gone = server.send("GET", &location, None).await;
    assert_eq!(gone.status, 200);
    assert!(gone.body.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn unmatched_and_malformed_requests() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(&dir.path().join("db.json")).await;

    for (method, target) in [("GET", "/nope"), ("GET", "/users/"), ("PATCH", "/users/1")] {
        let reply = server.send(method, target, None).await;
        assert_eq!(reply.status, 404, "{method} {target}");
        assert!(reply.body.is_empty());
    }

    let bad = server.send("POST", "/users", Some("{ nope")).await;
    assert_eq!(bad.status, 400);

    for _ in 0..2 {
        let reply = server.send("DELETE", "/users/missing", None).await;
        assert_eq!(reply.status, 204);
    }
    let listed = server.send("GET", "/users", None).await;
    assert_eq!(listed.json(), json!([]));

    server.stop().await;
}

#[tokio::test]
async fn document_is_persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let server = TestServer::start(&db).await;
    // The failed initial load writes an empty document; let it land first.
    wait_for_document(&db, |doc| doc.is_object()).await;

    let created = server
        .send("POST", "/users", Some(r#"{"name":"Ana","email":"ana@x.com"}"#))
        .await;
    assert_eq!(created.status, 201);

    let doc = wait_for_document(&db, |doc| {
        doc["users"].as_array().is_some_and(|users| users.len() == 1)
    })
    .await;
    assert_eq!(doc["users"][0]["name"], "Ana");
    server.stop().await;

    let restarted = TestServer::start(&db).await;
    let listed = restarted.send("GET", "/users", None).await;
    assert_eq!(listed.json().as_array().unwrap().len(), 1);
    assert_eq!(listed.json()[0]["email"], "ana@x.com");
    restarted.stop().await;
}
